use thiserror::Error;

/// Errors raised underneath the command dispatcher.
///
/// Every dispatcher operation catches this type at its boundary and formats
/// it into the result text; nothing propagates past a tool's `execute`.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Browser name outside the supported set, rejected before launch.
    #[error("Unsupported browser type '{0}'. Use 'chrome' or 'firefox'.")]
    UnsupportedBrowser(String),

    /// Locator strategy outside the supported set, rejected before any
    /// engine call.
    #[error("Unsupported locator strategy: {0}")]
    UnsupportedLocatorStrategy(String),

    /// No current session is registered.
    #[error("No active browser session")]
    NoActiveSession,

    /// The engine failed to launch a browser.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// An element wait expired.
    #[error("element {locator} not found within {timeout_ms}ms")]
    WaitTimeout {
        /// Formatted locator (`strategy='value'`).
        locator: String,
        /// The caller-specified timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Catch-all for failures inside the automation engine.
    #[error("WebDriver operation failed: {0}")]
    Engine(String),

    /// Screenshot/upload path problem.
    #[error("{path}: {source}")]
    Io {
        /// Path the operation was writing to or reading from.
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_message_names_locator_and_timeout() {
        let err = AutomationError::WaitTimeout {
            locator: "id='missing-element'".to_string(),
            timeout_ms: 100,
        };
        let text = err.to_string();
        assert!(text.contains("id='missing-element'"));
        assert!(text.contains("not found within 100ms"));
    }

    #[test]
    fn unsupported_browser_message_suggests_alternatives() {
        let err = AutomationError::UnsupportedBrowser("safari".to_string());
        assert!(err.to_string().contains("'safari'"));
        assert!(err.to_string().contains("'chrome' or 'firefox'"));
    }

    #[test]
    fn no_active_session_message_is_stable() {
        assert_eq!(
            AutomationError::NoActiveSession.to_string(),
            "No active browser session"
        );
    }
}
