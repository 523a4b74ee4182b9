//! MCP Tool Surface
//!
//! JSON-RPC 2.0 server exposing the Finam API as MCP tools.
//!
//! - `protocol`: request/response frames and error codes
//! - `catalog`: tool names, descriptions and input schemas
//! - `envelope`: the success/failure payload carried in tool results
//! - `tools`: argument parsing and dispatch onto `FinamApiPort`
//! - `server`: method routing and the stdio loop

mod catalog;
mod envelope;
mod protocol;
mod server;
mod tools;

pub use catalog::{Tool, ToolDef, tool_catalog};
pub use envelope::{ErrorDetails, ErrorEnvelope, OkEnvelope};
pub use protocol::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpError};
pub use server::{McpServer, PROTOCOL_VERSION};
pub use tools::{ToolOutput, ToolRouter};
