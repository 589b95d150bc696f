//! Browser command surface: one tool per dispatcher operation.
//!
//! Every tool resolves the current session through the shared
//! [`BrowserContext`], performs exactly one engine operation, and formats
//! both success and failure into a human-readable result string.

pub mod element;
pub mod lifecycle;
pub mod page;
pub mod pointer;

pub use element::{
    ClickElementTool, FindElementTool, GetElementTextTool, SendKeysTool, UploadFileTool,
};
pub use lifecycle::{CloseSessionTool, StartBrowserTool};
pub use page::{NavigateTool, TakeScreenshotTool};
pub use pointer::{DoubleClickTool, DragAndDropTool, HoverTool, PressKeyTool, RightClickTool};

use std::sync::Arc;
use std::time::Duration;

use engine::Engine;
use serde::Deserialize;
use tracing::info;

use crate::registry::ToolRegistry;
use crate::session::SessionRegistry;

/// Element-wait timeout used when the caller does not give one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Shared state handed to every browser tool: the engine plus the session
/// registry. Constructed once at process start and passed explicitly,
/// never held in a global.
pub struct BrowserContext<E: Engine> {
    engine: E,
    sessions: SessionRegistry<E::Handle>,
}

impl<E: Engine> BrowserContext<E> {
    /// Creates a context with an empty session registry.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            sessions: SessionRegistry::new(),
        }
    }

    /// The engine used to launch sessions.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The session registry.
    pub fn sessions(&self) -> &SessionRegistry<E::Handle> {
        &self.sessions
    }

    /// Cleanup sweep for process shutdown: closes every session, ignoring
    /// individual release failures.
    pub async fn shutdown(&self) {
        let swept = self.sessions.clear().await;
        if swept > 0 {
            info!("cleanup sweep closed {swept} browser session(s)");
        }
    }
}

/// Registers the full browser command surface on `registry`.
pub fn register_browser_tools<E: Engine>(
    registry: &mut ToolRegistry,
    ctx: &Arc<BrowserContext<E>>,
) {
    registry.register(StartBrowserTool::new(ctx.clone()));
    registry.register(NavigateTool::new(ctx.clone()));
    registry.register(FindElementTool::new(ctx.clone()));
    registry.register(ClickElementTool::new(ctx.clone()));
    registry.register(SendKeysTool::new(ctx.clone()));
    registry.register(GetElementTextTool::new(ctx.clone()));
    registry.register(HoverTool::new(ctx.clone()));
    registry.register(DragAndDropTool::new(ctx.clone()));
    registry.register(DoubleClickTool::new(ctx.clone()));
    registry.register(RightClickTool::new(ctx.clone()));
    registry.register(PressKeyTool::new(ctx.clone()));
    registry.register(UploadFileTool::new(ctx.clone()));
    registry.register(TakeScreenshotTool::new(ctx.clone()));
    registry.register(CloseSessionTool::new(ctx.clone()));
}

/// Arguments shared by every element-targeting operation.
#[derive(Debug, Deserialize)]
pub(crate) struct TargetArgs {
    pub by: String,
    pub value: String,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Converts a caller timeout in milliseconds into the wait duration.
pub(crate) fn timeout_duration(timeout_ms: Option<u64>) -> Duration {
    Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
}
