//! Scriptable fake engine used by the tool tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use engine::{BrowserHandle, ElementHandle, Engine, EngineResult, WaitCondition};
use proto::{AutomationError, BrowserKind, Locator};

/// Knobs for rigging mock failures and element lookups.
#[derive(Clone, Default)]
pub struct MockBehavior {
    /// Refuse every launch.
    pub fail_launch: bool,
    /// Sessions of this kind fail their `quit`.
    pub fail_quit_for: Option<BrowserKind>,
    /// Locator values that never appear on the page.
    pub missing_values: HashSet<String>,
    /// Element text by locator value.
    pub texts: HashMap<String, String>,
}

/// Fake engine recording every call into a shared event log.
pub struct MockEngine {
    pub behavior: MockBehavior,
    events: Arc<Mutex<Vec<String>>>,
    launches: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::default())
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            events: Arc::new(Mutex::new(Vec::new())),
            launches: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the recorded engine calls.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Engine for MockEngine {
    type Handle = MockBrowser;

    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
        args: &[String],
    ) -> EngineResult<MockBrowser> {
        if self.behavior.fail_launch {
            return Err(AutomationError::Launch("mock launch refused".to_string()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(format!("launch {kind} headless={headless} args={}", args.len()));
        Ok(MockBrowser {
            kind,
            behavior: self.behavior.clone(),
            events: self.events.clone(),
        })
    }
}

/// Fake session handle.
pub struct MockBrowser {
    kind: BrowserKind,
    behavior: MockBehavior,
    events: Arc<Mutex<Vec<String>>>,
}

impl MockBrowser {
    /// Standalone handle with default behavior, for registry tests.
    pub fn plain(kind: BrowserKind) -> Self {
        Self {
            kind,
            behavior: MockBehavior::default(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Standalone handle whose `quit` always fails.
    pub fn failing_quit(kind: BrowserKind) -> Self {
        Self {
            kind,
            behavior: MockBehavior {
                fail_quit_for: Some(kind),
                ..MockBehavior::default()
            },
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl BrowserHandle for MockBrowser {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> EngineResult<()> {
        self.record(format!("navigate {url}"));
        Ok(())
    }

    async fn wait_until(
        &self,
        condition: WaitCondition,
        locator: &Locator,
        timeout: Duration,
    ) -> EngineResult<MockElement> {
        self.record(format!("wait {condition:?} {locator}"));
        if self.behavior.missing_values.contains(&locator.value) {
            return Err(AutomationError::WaitTimeout {
                locator: locator.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(MockElement {
            locator: locator.to_string(),
            text: self
                .behavior
                .texts
                .get(&locator.value)
                .cloned()
                .unwrap_or_default(),
            events: self.events.clone(),
        })
    }

    async fn move_to(&self, element: &MockElement) -> EngineResult<()> {
        self.record(format!("move_to {}", element.locator));
        Ok(())
    }

    async fn drag_and_drop(&self, source: &MockElement, target: &MockElement) -> EngineResult<()> {
        self.record(format!("drag {} -> {}", source.locator, target.locator));
        Ok(())
    }

    async fn double_click(&self, element: &MockElement) -> EngineResult<()> {
        self.record(format!("double_click {}", element.locator));
        Ok(())
    }

    async fn context_click(&self, element: &MockElement) -> EngineResult<()> {
        self.record(format!("context_click {}", element.locator));
        Ok(())
    }

    async fn key_down_up(&self, key: &str) -> EngineResult<()> {
        self.record(format!("key {key}"));
        Ok(())
    }

    async fn screenshot_base64(&self) -> EngineResult<String> {
        self.record("screenshot".to_string());
        Ok(general_purpose::STANDARD.encode(b"mock png bytes"))
    }

    async fn quit(&mut self) -> EngineResult<()> {
        self.record(format!("quit {}", self.kind));
        if self.behavior.fail_quit_for == Some(self.kind) {
            return Err(AutomationError::Engine("mock quit failure".to_string()));
        }
        Ok(())
    }
}

/// Fake element reference.
pub struct MockElement {
    locator: String,
    text: String,
    events: Arc<Mutex<Vec<String>>>,
}

impl MockElement {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ElementHandle for MockElement {
    async fn click(&self) -> EngineResult<()> {
        self.record(format!("click {}", self.locator));
        Ok(())
    }

    async fn clear(&self) -> EngineResult<()> {
        self.record(format!("clear {}", self.locator));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> EngineResult<()> {
        self.record(format!("type {} '{text}'", self.locator));
        Ok(())
    }

    async fn read_text(&self) -> EngineResult<String> {
        self.record(format!("read_text {}", self.locator));
        Ok(self.text.clone())
    }

    async fn set_file_path(&self, path: &str) -> EngineResult<()> {
        self.record(format!("set_file_path {} {path}", self.locator));
        Ok(())
    }
}
