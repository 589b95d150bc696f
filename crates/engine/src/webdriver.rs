//! WebDriver-backed implementation of the engine capability traits.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use proto::{AutomationError, BrowserKind, Locator, LocatorStrategy};
use serde::{Deserialize, Serialize};
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, FirefoxCapabilities};
use tokio::time::Instant;
use tracing::info;

use crate::driver::DriverProcess;
use crate::keys::resolve_key;
use crate::{BrowserHandle, ElementHandle, Engine, EngineResult, WaitCondition};

/// Engine settings, deserialized from the `[engine]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// chromedriver binary to spawn for Chrome sessions.
    pub chromedriver_bin: String,
    /// geckodriver binary to spawn for Firefox sessions.
    pub geckodriver_bin: String,
    /// Non-empty: connect to this endpoint instead of spawning chromedriver.
    pub chrome_url: String,
    /// Non-empty: connect to this endpoint instead of spawning geckodriver.
    pub firefox_url: String,
    /// Bound on driver spawn + readiness.
    pub launch_timeout_ms: u64,
    /// Interval between element-wait polls.
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chromedriver_bin: "chromedriver".to_string(),
            geckodriver_bin: "geckodriver".to_string(),
            chrome_url: String::new(),
            firefox_url: String::new(),
            launch_timeout_ms: 15_000,
            poll_interval_ms: 250,
        }
    }
}

/// Launches browsers through per-session WebDriver server processes.
pub struct WebDriverEngine {
    config: EngineConfig,
}

impl WebDriverEngine {
    /// Creates an engine with the given settings.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolves the WebDriver endpoint for `kind`: either the configured
    /// URL, or a freshly spawned driver process.
    async fn endpoint(&self, kind: BrowserKind) -> EngineResult<(String, Option<DriverProcess>)> {
        let (url, bin) = match kind {
            BrowserKind::Chrome => (&self.config.chrome_url, &self.config.chromedriver_bin),
            BrowserKind::Firefox => (&self.config.firefox_url, &self.config.geckodriver_bin),
        };
        if !url.is_empty() {
            return Ok((url.clone(), None));
        }
        let process =
            DriverProcess::spawn(bin, Duration::from_millis(self.config.launch_timeout_ms))
                .await?;
        let url = process.url();
        Ok((url, Some(process)))
    }
}

#[async_trait]
impl Engine for WebDriverEngine {
    type Handle = WebDriverBrowser;

    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
        args: &[String],
    ) -> EngineResult<WebDriverBrowser> {
        let (endpoint, mut process) = self.endpoint(kind).await?;
        let connect = match kind {
            BrowserKind::Chrome => {
                WebDriver::new(&endpoint, chrome_caps(headless, args)?).await
            }
            BrowserKind::Firefox => {
                WebDriver::new(&endpoint, firefox_caps(headless, args)?).await
            }
        };
        match connect {
            Ok(driver) => {
                info!("launched {kind} session via {endpoint}");
                Ok(WebDriverBrowser {
                    driver: Some(driver),
                    process,
                    poll_interval: Duration::from_millis(self.config.poll_interval_ms),
                })
            }
            Err(e) => {
                if let Some(p) = process.as_mut() {
                    p.kill().await;
                }
                Err(AutomationError::Launch(e.to_string()))
            }
        }
    }
}

fn chrome_caps(headless: bool, args: &[String]) -> EngineResult<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    if headless {
        caps.add_arg("--headless=new").map_err(launch_err)?;
    }
    for arg in args {
        caps.add_arg(arg).map_err(launch_err)?;
    }
    Ok(caps)
}

fn firefox_caps(headless: bool, args: &[String]) -> EngineResult<FirefoxCapabilities> {
    let mut caps = DesiredCapabilities::firefox();
    if headless {
        caps.add_arg("--headless").map_err(launch_err)?;
    }
    for arg in args {
        caps.add_arg(arg).map_err(launch_err)?;
    }
    Ok(caps)
}

fn launch_err(e: WebDriverError) -> AutomationError {
    AutomationError::Launch(e.to_string())
}

fn op_err(e: WebDriverError) -> AutomationError {
    AutomationError::Engine(e.to_string())
}

/// Maps a locator to the engine-native `By` selector.
fn to_by(locator: &Locator) -> By {
    let value = locator.value.clone();
    match locator.strategy {
        LocatorStrategy::Id => By::Id(value),
        LocatorStrategy::Css => By::Css(value),
        LocatorStrategy::XPath => By::XPath(value),
        LocatorStrategy::Name => By::Name(value),
        LocatorStrategy::Tag => By::Tag(value),
        LocatorStrategy::Class => By::ClassName(value),
    }
}

/// One live browser session: the WebDriver connection plus the driver
/// process that serves it (when spawned rather than configured).
pub struct WebDriverBrowser {
    driver: Option<WebDriver>,
    process: Option<DriverProcess>,
    poll_interval: Duration,
}

impl WebDriverBrowser {
    fn driver(&self) -> EngineResult<&WebDriver> {
        self.driver
            .as_ref()
            .ok_or_else(|| AutomationError::Engine("session already quit".to_string()))
    }
}

#[async_trait]
impl BrowserHandle for WebDriverBrowser {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> EngineResult<()> {
        self.driver()?.goto(url).await.map_err(op_err)
    }

    async fn wait_until(
        &self,
        condition: WaitCondition,
        locator: &Locator,
        timeout: Duration,
    ) -> EngineResult<WebElement> {
        let driver = self.driver()?;
        let by = to_by(locator);
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = driver.find(by.clone()).await {
                match condition {
                    WaitCondition::Present => return Ok(element),
                    WaitCondition::Clickable => {
                        // Stale or mid-render reads count as not ready yet.
                        let displayed = element.is_displayed().await.unwrap_or(false);
                        let enabled = element.is_enabled().await.unwrap_or(false);
                        if displayed && enabled {
                            return Ok(element);
                        }
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::WaitTimeout {
                    locator: locator.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn move_to(&self, element: &WebElement) -> EngineResult<()> {
        self.driver()?
            .action_chain()
            .move_to_element_center(element)
            .perform()
            .await
            .map_err(op_err)
    }

    async fn drag_and_drop(&self, source: &WebElement, target: &WebElement) -> EngineResult<()> {
        self.driver()?
            .action_chain()
            .drag_and_drop_element(source, target)
            .perform()
            .await
            .map_err(op_err)
    }

    async fn double_click(&self, element: &WebElement) -> EngineResult<()> {
        self.driver()?
            .action_chain()
            .double_click_element(element)
            .perform()
            .await
            .map_err(op_err)
    }

    async fn context_click(&self, element: &WebElement) -> EngineResult<()> {
        self.driver()?
            .action_chain()
            .context_click_element(element)
            .perform()
            .await
            .map_err(op_err)
    }

    async fn key_down_up(&self, key: &str) -> EngineResult<()> {
        let ch = resolve_key(key)
            .ok_or_else(|| AutomationError::Engine(format!("unknown key '{key}'")))?;
        self.driver()?
            .action_chain()
            .key_down(ch)
            .key_up(ch)
            .perform()
            .await
            .map_err(op_err)
    }

    async fn screenshot_base64(&self) -> EngineResult<String> {
        let png = self.driver()?.screenshot_as_png().await.map_err(op_err)?;
        Ok(general_purpose::STANDARD.encode(png))
    }

    async fn quit(&mut self) -> EngineResult<()> {
        let outcome = match self.driver.take() {
            Some(driver) => driver.quit().await.map_err(op_err),
            None => Ok(()),
        };
        if let Some(process) = self.process.as_mut() {
            process.kill().await;
        }
        self.process = None;
        outcome
    }
}

#[async_trait]
impl ElementHandle for WebElement {
    async fn click(&self) -> EngineResult<()> {
        WebElement::click(self).await.map_err(op_err)
    }

    async fn clear(&self) -> EngineResult<()> {
        WebElement::clear(self).await.map_err(op_err)
    }

    async fn type_text(&self, text: &str) -> EngineResult<()> {
        WebElement::send_keys(self, text).await.map_err(op_err)
    }

    async fn read_text(&self) -> EngineResult<String> {
        WebElement::text(self).await.map_err(op_err)
    }

    async fn set_file_path(&self, path: &str) -> EngineResult<()> {
        // WebDriver file uploads set the path as keys on the input element.
        WebElement::send_keys(self, path).await.map_err(op_err)
    }
}
