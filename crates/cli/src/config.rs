//! Agent configuration loaded from TOML with env overrides.

use std::path::{Path, PathBuf};

use engine::EngineConfig;
use proto::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebDriver engine settings.
    pub engine: EngineConfig,
}

impl Config {
    /// Loads configuration from an explicit path, fallback locations, and
    /// env overrides. A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).or_else(|| {
            // Look in current dir, then home dir
            let cwd = std::env::current_dir().ok()?.join("wd-agent.toml");
            if cwd.exists() {
                return Some(cwd);
            }
            let home = std::env::var("HOME").ok()?;
            let home_config = PathBuf::from(home).join(".wd-agent").join("config.toml");
            if home_config.exists() {
                return Some(home_config);
            }
            None
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        // Environment variable overrides (highest priority)
        if let Ok(bin) = std::env::var("WD_AGENT_CHROMEDRIVER") {
            config.engine.chromedriver_bin = bin;
        }
        if let Ok(bin) = std::env::var("WD_AGENT_GECKODRIVER") {
            config.engine.geckodriver_bin = bin;
        }
        if let Ok(url) = std::env::var("WD_AGENT_CHROME_URL") {
            config.engine.chrome_url = url;
        }
        if let Ok(url) = std::env::var("WD_AGENT_FIREFOX_URL") {
            config.engine.firefox_url = url;
        }

        debug!(
            chromedriver = %config.engine.chromedriver_bin,
            geckodriver = %config.engine.geckodriver_bin,
            "Config loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_explicit_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[engine]
chromedriver_bin = "/opt/drivers/chromedriver"
launch_timeout_ms = 5000
"#,
        )
        .expect("write config");

        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.engine.chromedriver_bin, "/opt/drivers/chromedriver");
        assert_eq!(config.engine.launch_timeout_ms, 5000);
        // Unspecified fields keep their defaults.
        assert_eq!(config.engine.geckodriver_bin, "geckodriver");
        assert_eq!(config.engine.poll_interval_ms, 250);
    }

    #[test]
    fn load_returns_toml_error_for_invalid_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").expect("write config");

        let err = Config::load(Some(&path)).expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let err = Config::load(Some(Path::new("/nonexistent/wd-agent.toml")))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
