//! Session lifecycle tools: start a browser, close the current session.

use std::sync::Arc;

use async_trait::async_trait;
use engine::{BrowserHandle, Engine};
use proto::{AutomationError, BrowserKind, ToolResult};
use serde::Deserialize;
use tracing::info;

use super::BrowserContext;
use crate::Tool;

#[derive(Debug, Deserialize)]
struct StartBrowserArgs {
    browser: String,
    #[serde(default)]
    headless: bool,
    #[serde(default)]
    arguments: Vec<String>,
}

/// Tool that launches a browser and registers it as the current session.
pub struct StartBrowserTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> StartBrowserTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: StartBrowserArgs) -> Result<String, AutomationError> {
        // Validate the browser name before any launch work happens.
        let kind = BrowserKind::parse(&args.browser)?;
        let handle = self
            .ctx
            .engine()
            .launch(kind, args.headless, &args.arguments)
            .await?;
        let id = self.ctx.sessions().lock().await.insert(kind, handle);
        info!("started {kind} session {id}");
        Ok(format!("Browser started with session_id: {id}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for StartBrowserTool<E> {
    fn name(&self) -> &str {
        "start_browser"
    }

    fn description(&self) -> &str {
        "Start a browser (supports Chrome and Firefox) and make it the current session."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "browser": {
                    "type": "string",
                    "enum": ["chrome", "firefox"],
                    "description": "Browser type"
                },
                "headless": {
                    "type": "boolean",
                    "description": "Whether to run in headless mode (default: false)"
                },
                "arguments": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Additional browser startup arguments"
                }
            },
            "required": ["browser"]
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: StartBrowserArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error starting browser: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error starting browser: {e}"))
            }
        }
    }
}

/// Tool that closes and deregisters the current session.
pub struct CloseSessionTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> CloseSessionTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self) -> Result<String, AutomationError> {
        // The entry is removed first; a failing quit still leaves the
        // registry clean, and the failure surfaces in the result text.
        let (id, mut handle) = self.ctx.sessions().lock().await.remove_current()?;
        handle.quit().await?;
        info!("closed browser session {id}");
        Ok(format!("Browser session {id} closed"))
    }
}

#[async_trait]
impl<E: Engine> Tool for CloseSessionTool<E> {
    fn name(&self) -> &str {
        "close_session"
    }

    fn description(&self) -> &str {
        "Close the current browser session."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, call_id: &str, _args: serde_json::Value) -> ToolResult {
        match self.run().await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error closing session: {e}"))
            }
        }
    }
}
