use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Milliseconds between menu redraws, which is also the walkthrough tick
    #[serde(default = "default_ui_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_ui_tick_rate() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_ui_tick_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Milliseconds between walkthrough ticks in headless mode
    #[serde(default = "default_runner_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_runner_tick_rate() -> u64 {
    50
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_runner_tick_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for logs and other runtime state
    #[serde(default = "default_state_path")]
    pub state: String,
    /// Authoring file opened when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walkthrough: Option<String>,
}

fn default_state_path() -> String {
    ".walkthrough".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
            walkthrough: None,
        }
    }
}

impl Config {
    /// Path to the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".walkthrough/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the tool works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/walkthrough/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("walkthrough").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables such as WALKTHROUGH__UI__TICK_RATE_MS
        builder = builder.add_source(
            config::Environment::with_prefix("WALKTHROUGH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        absolutize(Path::new(&self.paths.state))
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    /// Pick the authoring file: explicit argument first, then config
    pub fn walkthrough_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.paths.walkthrough.as_ref().map(PathBuf::from))
            .map(|p| absolutize(&p))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.to_file);
        assert_eq!(config.ui.tick_rate_ms, 100);
        assert_eq!(config.runner.tick_rate_ms, 50);
        assert!(config.paths.walkthrough.is_none());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[ui]\ntick_rate_ms = 16\n\n[paths]\nwalkthrough = \"tour.toml\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 16);
        assert_eq!(config.runner.tick_rate_ms, 50);
        assert_eq!(config.paths.walkthrough.as_deref(), Some("tour.toml"));
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_walkthrough_path_prefers_explicit() {
        let mut config = Config::default();
        config.paths.walkthrough = Some("/from/config.toml".to_string());

        assert_eq!(
            config.walkthrough_path(Some(Path::new("/from/cli.toml"))),
            Some(PathBuf::from("/from/cli.toml"))
        );
        assert_eq!(
            config.walkthrough_path(None),
            Some(PathBuf::from("/from/config.toml"))
        );

        config.paths.walkthrough = None;
        assert_eq!(config.walkthrough_path(None), None);
    }
}
