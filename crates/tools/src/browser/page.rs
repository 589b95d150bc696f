//! Page-level tools: navigation and screenshots.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use engine::{BrowserHandle, Engine};
use proto::{AutomationError, ToolResult};
use serde::Deserialize;

use super::BrowserContext;
use crate::Tool;

#[derive(Debug, Deserialize)]
struct NavigateArgs {
    url: String,
}

/// Tool that navigates the current session to a URL.
pub struct NavigateTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> NavigateTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: NavigateArgs) -> Result<String, AutomationError> {
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        handle.navigate(&args.url).await?;
        Ok(format!("Navigated to {}", args.url))
    }
}

#[async_trait]
impl<E: Engine> Tool for NavigateTool<E> {
    fn name(&self) -> &str {
        "navigate"
    }

    fn description(&self) -> &str {
        "Navigate the current browser session to a URL."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to navigate to"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: NavigateArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error navigating: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(call_id, self.name(), format!("Error navigating: {e}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScreenshotArgs {
    #[serde(default)]
    output_path: Option<String>,
}

/// Tool that captures a screenshot of the current page.
pub struct TakeScreenshotTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> TakeScreenshotTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: ScreenshotArgs) -> Result<String, AutomationError> {
        let encoded = {
            let guard = self.ctx.sessions().lock().await;
            let handle = guard.current()?;
            handle.screenshot_base64().await?
        };
        match args.output_path {
            Some(path) if !path.is_empty() => {
                let bytes = general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| {
                        AutomationError::Engine(format!("invalid screenshot encoding: {e}"))
                    })?;
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|e| AutomationError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                Ok(format!("Screenshot saved to {path}"))
            }
            _ => Ok(format!("Screenshot captured as base64: {encoded}")),
        }
    }
}

#[async_trait]
impl<E: Engine> Tool for TakeScreenshotTool<E> {
    fn name(&self) -> &str {
        "take_screenshot"
    }

    fn description(&self) -> &str {
        "Capture a screenshot of the current page. Saves to output_path when \
         given, otherwise returns the image as base64."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "output_path": {
                    "type": "string",
                    "description": "Optional path where to save the screenshot"
                }
            }
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: ScreenshotArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error taking screenshot: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error taking screenshot: {e}"))
            }
        }
    }
}
