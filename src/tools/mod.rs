pub mod dispatch;
pub mod schema;

pub use dispatch::{ToolDispatcher, ToolInvocation, ToolResult};
pub use schema::tool_declarations;
