//! PCM16 wire codec
//!
//! The remote model speaks base64-armored little-endian PCM16 mono inside
//! its JSON envelopes, in both directions. These are pure conversions;
//! sample rates are declared out-of-band by the caller.

use crate::{Result, VoiceError};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

/// Convert float samples in [-1, 1] to little-endian PCM16 bytes.
///
/// Out-of-range input is clamped rather than wrapped so a hot microphone
/// produces clipping, not glitches.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let scaled = (sample * 32768.0).clamp(-32768.0, 32767.0) as i16;
        bytes.extend_from_slice(&scaled.to_le_bytes());
    }
    bytes
}

/// Convert little-endian PCM16 bytes back to float samples.
///
/// An odd trailing byte is an incomplete sample and is dropped.
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / 32768.0)
        .collect()
}

/// Encode one frame of captured samples into its wire form.
pub fn encode_frame(samples: &[f32]) -> String {
    B64.encode(f32_to_pcm16(samples))
}

/// Decode one wire-form audio payload into float samples.
pub fn decode_frame(data: &str) -> Result<Vec<f32>> {
    let bytes = B64
        .decode(data)
        .map_err(|e| VoiceError::CodecError(format!("Invalid base64 audio payload: {}", e)))?;
    Ok(pcm16_to_f32(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_quantization_step() {
        let samples: Vec<f32> = (0..1000)
            .map(|i| ((i as f32) * 0.013).sin() * 0.8)
            .collect();

        let decoded = decode_frame(&encode_frame(&samples)).unwrap();
        assert_eq!(decoded.len(), samples.len());

        let step = 1.0 / 32768.0;
        for (a, b) in samples.iter().zip(decoded.iter()) {
            assert!((a - b).abs() <= step, "sample drifted: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_out_of_range_input_clamps() {
        let bytes = f32_to_pcm16(&[2.0, -2.0, 1.0, -1.0]);
        let decoded = pcm16_to_f32(&bytes);
        assert!((decoded[0] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(decoded[1], -1.0);
        assert!((decoded[2] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(decoded[3], -1.0);
    }

    #[test]
    fn test_odd_byte_count_truncates() {
        let decoded = pcm16_to_f32(&[0x00, 0x40, 0x7f]);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        assert!(decode_frame("not base64!!").is_err());
    }

    #[test]
    fn test_empty_frame() {
        assert_eq!(encode_frame(&[]), "");
        assert!(decode_frame("").unwrap().is_empty());
    }
}
