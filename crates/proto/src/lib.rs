//! Shared protocol types for the command surface and the engine boundary.
//!
//! This crate defines the serializable tool call/result structures, the
//! browser and locator domain types, and the strongly-typed error enums
//! shared across the workspace.

pub mod browser;
pub mod error;
pub mod tool;

/// Re-export of browser kind and locator types.
pub use browser::{BrowserKind, Locator, LocatorStrategy};
/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of tool call definition and result types.
pub use tool::{ToolCall, ToolDefinition, ToolResult};
