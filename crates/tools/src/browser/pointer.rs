//! Pointer and keyboard tools: hover, drag and drop, double and right
//! click, and raw key presses.

use std::sync::Arc;

use async_trait::async_trait;
use engine::{BrowserHandle, Engine, WaitCondition};
use proto::{AutomationError, Locator, ToolResult};
use serde::Deserialize;

use super::{BrowserContext, TargetArgs, timeout_duration};
use crate::Tool;

fn element_target_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "by": {
                "type": "string",
                "enum": ["id", "css", "xpath", "name", "tag", "class"],
                "description": "Locator strategy"
            },
            "value": {
                "type": "string",
                "description": "Value for the locator strategy"
            },
            "timeout": {
                "type": "integer",
                "description": "Maximum time to wait for the element in milliseconds (default: 10000)"
            }
        },
        "required": ["by", "value"]
    })
}

/// Tool that moves the pointer over an element.
pub struct HoverTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> HoverTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: TargetArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        handle.move_to(&element).await?;
        Ok(format!("Hovered over element using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for HoverTool<E> {
    fn name(&self) -> &str {
        "hover"
    }

    fn description(&self) -> &str {
        "Move the mouse pointer over an element."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        element_target_schema()
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error hovering over element: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(
                call_id,
                self.name(),
                format!("Error hovering over element: {e}"),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DragAndDropArgs {
    by: String,
    value: String,
    target_by: String,
    target_value: String,
    #[serde(default)]
    timeout: Option<u64>,
}

/// Tool that drags one element onto another.
pub struct DragAndDropTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> DragAndDropTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: DragAndDropArgs) -> Result<String, AutomationError> {
        // Both locators must parse before any waiting starts.
        let source = Locator::parse(&args.by, &args.value)?;
        let target = Locator::parse(&args.target_by, &args.target_value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let source_el = handle
            .wait_until(WaitCondition::Present, &source, timeout)
            .await?;
        let target_el = handle
            .wait_until(WaitCondition::Present, &target, timeout)
            .await?;
        handle.drag_and_drop(&source_el, &target_el).await?;
        Ok(format!(
            "Drag and drop completed from {source} to {target}"
        ))
    }
}

#[async_trait]
impl<E: Engine> Tool for DragAndDropTool<E> {
    fn name(&self) -> &str {
        "drag_and_drop"
    }

    fn description(&self) -> &str {
        "Drag an element and drop it onto another element."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "by": {
                    "type": "string",
                    "enum": ["id", "css", "xpath", "name", "tag", "class"],
                    "description": "Locator strategy for the source element"
                },
                "value": {
                    "type": "string",
                    "description": "Value for the source locator strategy"
                },
                "target_by": {
                    "type": "string",
                    "enum": ["id", "css", "xpath", "name", "tag", "class"],
                    "description": "Locator strategy for the target element"
                },
                "target_value": {
                    "type": "string",
                    "description": "Value for the target locator strategy"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Maximum time to wait for each element in milliseconds (default: 10000)"
                }
            },
            "required": ["by", "value", "target_by", "target_value"]
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: DragAndDropArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error performing drag and drop: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(
                call_id,
                self.name(),
                format!("Error performing drag and drop: {e}"),
            ),
        }
    }
}

/// Tool that double-clicks an element.
pub struct DoubleClickTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> DoubleClickTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: TargetArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        handle.double_click(&element).await?;
        Ok(format!("Double click performed on element using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for DoubleClickTool<E> {
    fn name(&self) -> &str {
        "double_click"
    }

    fn description(&self) -> &str {
        "Double-click an element."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        element_target_schema()
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error performing double click: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(
                call_id,
                self.name(),
                format!("Error performing double click: {e}"),
            ),
        }
    }
}

/// Tool that right-clicks (context-clicks) an element.
pub struct RightClickTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> RightClickTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: TargetArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        handle.context_click(&element).await?;
        Ok(format!("Right click performed on element using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for RightClickTool<E> {
    fn name(&self) -> &str {
        "right_click"
    }

    fn description(&self) -> &str {
        "Right-click an element, opening its context menu."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        element_target_schema()
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error performing right click: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(
                call_id,
                self.name(),
                format!("Error performing right click: {e}"),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PressKeyArgs {
    key: String,
}

/// Tool that presses and releases a keyboard key on the page.
pub struct PressKeyTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> PressKeyTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: PressKeyArgs) -> Result<String, AutomationError> {
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        handle.key_down_up(&args.key).await?;
        Ok(format!("Key '{}' pressed", args.key))
    }
}

#[async_trait]
impl<E: Engine> Tool for PressKeyTool<E> {
    fn name(&self) -> &str {
        "press_key"
    }

    fn description(&self) -> &str {
        "Press a keyboard key, e.g. 'Enter', 'Tab', 'Escape' or a single character."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Key to press (e.g. 'Enter', 'Tab', 'a')"
                }
            },
            "required": ["key"]
        })
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: PressKeyArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error pressing key: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(call_id, self.name(), format!("Error pressing key: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::StartBrowserTool;
    use crate::testing::{MockBehavior, MockEngine};

    async fn started_context(behavior: MockBehavior) -> Arc<BrowserContext<MockEngine>> {
        let ctx = Arc::new(BrowserContext::new(MockEngine::with_behavior(behavior)));
        let start = StartBrowserTool::new(ctx.clone());
        let result = start
            .execute("s", serde_json::json!({"browser":"chrome"}))
            .await;
        assert!(!result.is_error);
        ctx
    }

    #[tokio::test]
    async fn hover_moves_the_pointer_to_the_element() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = HoverTool::new(ctx.clone());

        let result = tool
            .execute("c1", serde_json::json!({"by":"css","value":".menu"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "Hovered over element using css='.menu'");
        assert!(
            ctx.engine()
                .events()
                .contains(&"move_to css='.menu'".to_string())
        );
    }

    #[tokio::test]
    async fn drag_and_drop_waits_for_both_elements_in_order() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = DragAndDropTool::new(ctx.clone());

        let result = tool
            .execute(
                "c2",
                serde_json::json!({
                    "by":"id","value":"card",
                    "target_by":"id","target_value":"column"
                }),
            )
            .await;
        assert!(!result.is_error);
        assert_eq!(
            result.output,
            "Drag and drop completed from id='card' to id='column'"
        );

        let events = ctx.engine().events();
        let source_wait = events
            .iter()
            .position(|e| e == "wait Present id='card'")
            .expect("source wait");
        let target_wait = events
            .iter()
            .position(|e| e == "wait Present id='column'")
            .expect("target wait");
        let drag = events
            .iter()
            .position(|e| e == "drag id='card' -> id='column'")
            .expect("drag");
        assert!(source_wait < target_wait && target_wait < drag);
    }

    #[tokio::test]
    async fn drag_is_skipped_when_the_target_never_appears() {
        let behavior = MockBehavior {
            missing_values: ["column".to_string()].into_iter().collect(),
            ..MockBehavior::default()
        };
        let ctx = started_context(behavior).await;
        let tool = DragAndDropTool::new(ctx.clone());

        let result = tool
            .execute(
                "c3",
                serde_json::json!({
                    "by":"id","value":"card",
                    "target_by":"id","target_value":"column",
                    "timeout":100
                }),
            )
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error performing drag and drop: element id='column' not found within 100ms"
        );
        assert!(
            !ctx.engine()
                .events()
                .iter()
                .any(|e| e.starts_with("drag"))
        );
    }

    #[tokio::test]
    async fn drag_rejects_a_bad_target_strategy_before_any_wait() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = DragAndDropTool::new(ctx.clone());

        let result = tool
            .execute(
                "c4",
                serde_json::json!({
                    "by":"id","value":"card",
                    "target_by":"link_text","target_value":"Drop here"
                }),
            )
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error performing drag and drop: Unsupported locator strategy: link_text"
        );
        assert!(
            !ctx.engine()
                .events()
                .iter()
                .any(|e| e.starts_with("wait"))
        );
    }

    #[tokio::test]
    async fn double_and_right_click_report_their_locators() {
        let ctx = started_context(MockBehavior::default()).await;

        let double = DoubleClickTool::new(ctx.clone())
            .execute("c5", serde_json::json!({"by":"id","value":"cell"}))
            .await;
        assert!(!double.is_error);
        assert_eq!(
            double.output,
            "Double click performed on element using id='cell'"
        );

        let right = RightClickTool::new(ctx.clone())
            .execute("c6", serde_json::json!({"by":"id","value":"cell"}))
            .await;
        assert!(!right.is_error);
        assert_eq!(
            right.output,
            "Right click performed on element using id='cell'"
        );

        let events = ctx.engine().events();
        assert!(events.contains(&"double_click id='cell'".to_string()));
        assert!(events.contains(&"context_click id='cell'".to_string()));
    }

    #[tokio::test]
    async fn press_key_forwards_the_key_name() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = PressKeyTool::new(ctx.clone());

        let result = tool
            .execute("c7", serde_json::json!({"key":"Enter"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "Key 'Enter' pressed");
        assert!(ctx.engine().events().contains(&"key Enter".to_string()));
    }

    #[tokio::test]
    async fn press_key_requires_a_session() {
        let ctx = Arc::new(BrowserContext::new(MockEngine::new()));
        let tool = PressKeyTool::new(ctx);

        let result = tool
            .execute("c8", serde_json::json!({"key":"Enter"}))
            .await;
        assert!(result.is_error);
        assert_eq!(result.output, "Error pressing key: No active browser session");
    }
}
