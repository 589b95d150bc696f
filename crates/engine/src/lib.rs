//! Browser-automation engine boundary.
//!
//! The command dispatcher talks to the browser through the capability traits
//! defined here, never through a concrete client type. The production
//! implementation in [`webdriver`] drives a real browser over the WebDriver
//! protocol; tests substitute scriptable fakes.

pub mod driver;
pub mod keys;
pub mod webdriver;

pub use webdriver::{EngineConfig, WebDriverBrowser, WebDriverEngine};

use std::time::Duration;

use async_trait::async_trait;
use proto::{AutomationError, BrowserKind, Locator};

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, AutomationError>;

/// Condition an element wait polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// The element exists in the DOM.
    Present,
    /// The element exists, is displayed, and is enabled.
    Clickable,
}

/// Launches browsers and hands out owned session handles.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    type Handle: BrowserHandle;

    /// Launches a browser of the given kind and returns its handle.
    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
        args: &[String],
    ) -> EngineResult<Self::Handle>;
}

/// A live browser session.
///
/// Element references returned by [`wait_until`](Self::wait_until) are
/// transient values; the dispatcher never stores them.
#[async_trait]
pub trait BrowserHandle: Send + Sync + 'static {
    type Element: ElementHandle;

    /// Loads a URL in the session's window.
    async fn navigate(&self, url: &str) -> EngineResult<()>;

    /// Polls for an element matching `locator` until `condition` holds or
    /// `timeout` expires.
    async fn wait_until(
        &self,
        condition: WaitCondition,
        locator: &Locator,
        timeout: Duration,
    ) -> EngineResult<Self::Element>;

    /// Moves the pointer to the element's center.
    async fn move_to(&self, element: &Self::Element) -> EngineResult<()>;

    /// Drags `source` onto `target`.
    async fn drag_and_drop(
        &self,
        source: &Self::Element,
        target: &Self::Element,
    ) -> EngineResult<()>;

    /// Double-clicks the element.
    async fn double_click(&self, element: &Self::Element) -> EngineResult<()>;

    /// Context-clicks (right-clicks) the element.
    async fn context_click(&self, element: &Self::Element) -> EngineResult<()>;

    /// Presses and releases a key against whatever currently has focus.
    async fn key_down_up(&self, key: &str) -> EngineResult<()>;

    /// Captures the current page as a base64-encoded PNG.
    async fn screenshot_base64(&self) -> EngineResult<String>;

    /// Ends the session. The handle is unusable afterwards.
    async fn quit(&mut self) -> EngineResult<()>;
}

/// A transient reference to one page element.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    async fn click(&self) -> EngineResult<()>;
    async fn clear(&self) -> EngineResult<()>;
    async fn type_text(&self, text: &str) -> EngineResult<()>;
    async fn read_text(&self) -> EngineResult<String>;
    /// Sets a local file path on a file-input element. Path validation is
    /// left to the browser.
    async fn set_file_path(&self, path: &str) -> EngineResult<()>;
}
