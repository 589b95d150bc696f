//! Tool trait, tool registry, and the browser command surface.
//!
//! Every remotely invokable operation is a [`Tool`]: it takes named JSON
//! arguments and always returns a textual [`ToolResult`], converting every
//! internal error into a descriptive failure message at its own boundary.

pub mod browser;
pub mod registry;
pub mod session;
pub mod testing;

pub use browser::{
    BrowserContext, ClickElementTool, CloseSessionTool, DoubleClickTool, DragAndDropTool,
    FindElementTool, GetElementTextTool, HoverTool, NavigateTool, PressKeyTool, RightClickTool,
    SendKeysTool, StartBrowserTool, TakeScreenshotTool, UploadFileTool, register_browser_tools,
};
pub use registry::ToolRegistry;
pub use session::SessionRegistry;

use async_trait::async_trait;
use proto::ToolResult;

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name exposed to callers.
    fn name(&self) -> &str;
    /// Human-readable description for tool selection.
    fn description(&self) -> &str;
    /// JSON schema for accepted tool arguments.
    fn parameters_schema(&self) -> serde_json::Value;
    /// Executes the tool with the given call id and JSON args.
    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult;
}
