//! WebDriver server process management.
//!
//! Each launched browser gets its own chromedriver/geckodriver child on a
//! free local port. The child is killed when the session quits and, as a
//! fallback, when the handle is dropped.

use std::process::Stdio;
use std::time::Duration;

use proto::AutomationError;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::EngineResult;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A spawned WebDriver server (chromedriver or geckodriver).
#[derive(Debug)]
pub struct DriverProcess {
    child: Child,
    port: u16,
}

impl DriverProcess {
    /// Spawns `bin` on a free local port and waits until its `/status`
    /// endpoint answers.
    pub async fn spawn(bin: &str, launch_timeout: Duration) -> EngineResult<Self> {
        let port = free_port()?;
        let child = Command::new(bin)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AutomationError::Launch(format!("failed to spawn {bin}: {e}")))?;

        debug!("spawned {bin} on port {port}");
        let process = Self { child, port };
        process.wait_ready(bin, launch_timeout).await?;
        Ok(process)
    }

    /// Base URL of the spawned server.
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Kills the child process. Best-effort.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("failed to kill webdriver process: {e}");
        }
    }

    async fn wait_ready(&self, bin: &str, timeout: Duration) -> EngineResult<()> {
        let status_url = format!("{}/status", self.url());
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => {}
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Launch(format!(
                    "{bin} did not become ready within {}ms",
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Asks the OS for a free TCP port on the loopback interface.
fn free_port() -> EngineResult<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| AutomationError::Launch(format!("no free local port: {e}")))?;
    let port = listener
        .local_addr()
        .map_err(|e| AutomationError::Launch(format!("no free local port: {e}")))?
        .port();
    Ok(port)
}
