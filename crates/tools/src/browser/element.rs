//! Element tools: locate, click, type into, read from and upload to
//! elements on the current page.

use std::sync::Arc;

use async_trait::async_trait;
use engine::{BrowserHandle, ElementHandle, Engine, WaitCondition};
use proto::{AutomationError, Locator, ToolResult};
use serde::Deserialize;

use super::{BrowserContext, TargetArgs, timeout_duration};
use crate::Tool;

fn target_schema(extra: serde_json::Value) -> serde_json::Value {
    let mut properties = serde_json::json!({
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
    });
    let mut required: Vec<String> = vec!["by".into(), "value".into()];
    if let serde_json::Value::Object(map) = extra {
        for (key, value) in map {
            required.push(key.clone());
            properties[key] = value;
        }
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Tool that waits for an element to be present on the page.
pub struct FindElementTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> FindElementTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: TargetArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        Ok(format!("Element found using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for FindElementTool<E> {
    fn name(&self) -> &str {
        "find_element"
    }

    fn description(&self) -> &str {
        "Find an element on the page, waiting until it is present."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        target_schema(serde_json::json!({}))
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error finding element: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error finding element: {e}"))
            }
        }
    }
}

/// Tool that clicks an element once it is clickable.
pub struct ClickElementTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> ClickElementTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: TargetArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Clickable, &locator, timeout)
            .await?;
        element.click().await?;
        Ok(format!("Element clicked using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for ClickElementTool<E> {
    fn name(&self) -> &str {
        "click_element"
    }

    fn description(&self) -> &str {
        "Click an element, waiting until it is clickable."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        target_schema(serde_json::json!({}))
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error clicking element: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error clicking element: {e}"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendKeysArgs {
    by: String,
    value: String,
    text: String,
    #[serde(default)]
    timeout: Option<u64>,
}

/// Tool that clears an input and types text into it.
pub struct SendKeysTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> SendKeysTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: SendKeysArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        element.clear().await?;
        element.type_text(&args.text).await?;
        Ok(format!(
            "Text '{}' entered into element using {locator}",
            args.text
        ))
    }
}

#[async_trait]
impl<E: Engine> Tool for SendKeysTool<E> {
    fn name(&self) -> &str {
        "send_keys"
    }

    fn description(&self) -> &str {
        "Send keys to an element, i.e. type text into it. Clears the existing value first."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        target_schema(serde_json::json!({
            "text": {
                "type": "string",
                "description": "Text to enter into the element"
            }
        }))
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: SendKeysArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error entering text: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(call_id, self.name(), format!("Error entering text: {e}")),
        }
    }
}

/// Tool that reads the visible text of an element.
pub struct GetElementTextTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> GetElementTextTool<E> {
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
        let text = element.read_text().await?;
        Ok(format!("Text of element using {locator}: {text}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for GetElementTextTool<E> {
    fn name(&self) -> &str {
        "get_element_text"
    }

    fn description(&self) -> &str {
        "Get the visible text of an element."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        target_schema(serde_json::json!({}))
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: TargetArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error getting element text: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => ToolResult::error(
                call_id,
                self.name(),
                format!("Error getting element text: {e}"),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadFileArgs {
    by: String,
    value: String,
    file_path: String,
    #[serde(default)]
    timeout: Option<u64>,
}

/// Tool that sends a local file path to a file input element.
pub struct UploadFileTool<E: Engine> {
    ctx: Arc<BrowserContext<E>>,
}

impl<E: Engine> UploadFileTool<E> {
    pub fn new(ctx: Arc<BrowserContext<E>>) -> Self {
        Self { ctx }
    }

    async fn run(&self, args: UploadFileArgs) -> Result<String, AutomationError> {
        let locator = Locator::parse(&args.by, &args.value)?;
        let timeout = timeout_duration(args.timeout);
        let guard = self.ctx.sessions().lock().await;
        let handle = guard.current()?;
        let element = handle
            .wait_until(WaitCondition::Present, &locator, timeout)
            .await?;
        element.set_file_path(&args.file_path).await?;
        Ok(format!("File upload initiated using {locator}"))
    }
}

#[async_trait]
impl<E: Engine> Tool for UploadFileTool<E> {
    fn name(&self) -> &str {
        "upload_file"
    }

    fn description(&self) -> &str {
        "Upload a file by sending its path to a file input element."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        target_schema(serde_json::json!({
            "file_path": {
                "type": "string",
                "description": "Absolute path to the file to upload"
            }
        }))
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let parsed: UploadFileArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(
                    call_id,
                    self.name(),
                    format!("Error uploading file: invalid arguments: {e}"),
                );
            }
        };
        match self.run(parsed).await {
            Ok(msg) => ToolResult::success(call_id, self.name(), msg),
            Err(e) => {
                ToolResult::error(call_id, self.name(), format!("Error uploading file: {e}"))
            }
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
    async fn find_element_waits_for_presence() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = FindElementTool::new(ctx.clone());

        let result = tool
            .execute("c1", serde_json::json!({"by":"id","value":"login"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "Element found using id='login'");
        assert!(
            ctx.engine()
                .events()
                .contains(&"wait Present id='login'".to_string())
        );
    }

    #[tokio::test]
    async fn unsupported_strategy_fails_before_reaching_the_engine() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = FindElementTool::new(ctx.clone());

        let result = tool
            .execute("c2", serde_json::json!({"by":"partial_link","value":"x"}))
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error finding element: Unsupported locator strategy: partial_link"
        );
        assert!(
            !ctx.engine()
                .events()
                .iter()
                .any(|e| e.starts_with("wait"))
        );
    }

    #[tokio::test]
    async fn find_element_timeout_names_the_locator_and_budget() {
        let behavior = MockBehavior {
            missing_values: ["ghost".to_string()].into_iter().collect(),
            ..MockBehavior::default()
        };
        let ctx = started_context(behavior).await;
        let tool = FindElementTool::new(ctx);

        let result = tool
            .execute(
                "c3",
                serde_json::json!({"by":"css","value":"ghost","timeout":250}),
            )
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error finding element: element css='ghost' not found within 250ms"
        );
    }

    #[tokio::test]
    async fn click_waits_for_clickable_then_clicks() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = ClickElementTool::new(ctx.clone());

        let result = tool
            .execute("c4", serde_json::json!({"by":"css","value":"#submit"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "Element clicked using css='#submit'");

        let events = ctx.engine().events();
        let wait = events
            .iter()
            .position(|e| e == "wait Clickable css='#submit'")
            .expect("clickable wait");
        let click = events
            .iter()
            .position(|e| e == "click css='#submit'")
            .expect("click");
        assert!(wait < click);
    }

    #[tokio::test]
    async fn send_keys_clears_before_typing() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = SendKeysTool::new(ctx.clone());

        let result = tool
            .execute(
                "c5",
                serde_json::json!({"by":"name","value":"q","text":"rust"}),
            )
            .await;
        assert!(!result.is_error);
        assert_eq!(
            result.output,
            "Text 'rust' entered into element using name='q'"
        );

        let events = ctx.engine().events();
        let clear = events
            .iter()
            .position(|e| e == "clear name='q'")
            .expect("clear");
        let typed = events
            .iter()
            .position(|e| e == "type name='q' 'rust'")
            .expect("type");
        assert!(clear < typed);
    }

    #[tokio::test]
    async fn get_element_text_reports_the_scripted_text() {
        let behavior = MockBehavior {
            texts: [("title".to_string(), "Welcome".to_string())]
                .into_iter()
                .collect(),
            ..MockBehavior::default()
        };
        let ctx = started_context(behavior).await;
        let tool = GetElementTextTool::new(ctx);

        let result = tool
            .execute("c6", serde_json::json!({"by":"id","value":"title"}))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "Text of element using id='title': Welcome");
    }

    #[tokio::test]
    async fn upload_file_sends_the_path_to_the_input() {
        let ctx = started_context(MockBehavior::default()).await;
        let tool = UploadFileTool::new(ctx.clone());

        let result = tool
            .execute(
                "c7",
                serde_json::json!({
                    "by":"id","value":"avatar","file_path":"/tmp/pic.png"
                }),
            )
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "File upload initiated using id='avatar'");
        assert!(
            ctx.engine()
                .events()
                .contains(&"set_file_path id='avatar' /tmp/pic.png".to_string())
        );
    }

    #[tokio::test]
    async fn element_tools_require_a_session() {
        let ctx = Arc::new(BrowserContext::new(MockEngine::new()));
        let tool = ClickElementTool::new(ctx);

        let result = tool
            .execute("c8", serde_json::json!({"by":"id","value":"x"}))
            .await;
        assert!(result.is_error);
        assert_eq!(
            result.output,
            "Error clicking element: No active browser session"
        );
    }
}
