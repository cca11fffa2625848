//! Configuration file handling for veo-studio.
//!
//! Loads configuration from `~/.config/veo-studio/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::veo::{
    parse_aspect_ratio, PollPolicy, VideoSettings, DEFAULT_MAX_POLLS, DEFAULT_MODEL,
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, MIN_POLL_INTERVAL, VEO_API_BASE_URL,
};

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "veo-studio";

/// Configuration file structure for veo-studio.
/// Loaded from ~/.config/veo-studio/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub share: ShareConfig,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// 0 disables the cap.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    /// 0 disables the cap.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_polls: default_max_polls(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollingConfig {
    /// Build the poll policy. Intervals below `MIN_POLL_INTERVAL` are raised
    /// to it.
    pub fn policy(&self) -> PollPolicy {
        let mut interval = Duration::from_millis(self.interval_ms);
        if interval < MIN_POLL_INTERVAL {
            log::warn!(
                "polling.interval_ms = {} is too short, using {}",
                self.interval_ms,
                MIN_POLL_INTERVAL.as_millis()
            );
            interval = MIN_POLL_INTERVAL;
        }
        PollPolicy::unbounded(interval)
            .with_max_polls((self.max_polls > 0).then_some(self.max_polls))
            .with_timeout((self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub number_of_videos: Option<u32>,
    #[serde(default)]
    pub quality: Option<String>,
}

impl DefaultsConfig {
    pub fn settings(&self) -> VideoSettings {
        let base = VideoSettings::default();
        VideoSettings {
            aspect_ratio: self.aspect_ratio.as_deref().and_then(parse_aspect_ratio),
            duration_seconds: self.duration_seconds.filter(|secs| *secs > 0),
            quality: self.quality.clone(),
            number_of_videos: self
                .number_of_videos
                .filter(|n| *n > 0)
                .unwrap_or(base.number_of_videos),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Where downloaded videos are written (default: current directory).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ShareConfig {
    /// Command run with the video path to share it. Sharing is unavailable
    /// when unset.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_base_url() -> String {
    VEO_API_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_max_polls() -> u32 {
    DEFAULT_MAX_POLLS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_POLL_TIMEOUT.as_secs()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            Self::parse(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Default contents written by `veo-studio config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# veo-studio configuration

[api]
# Generative Language API endpoint and Veo model
base_url = "https://generativelanguage.googleapis.com"
model = "veo-2.0-generate-001"

[polling]
# Delay between status checks (at least 100)
interval_ms = 1000
# Give up after this many status checks (0 = no cap)
max_polls = 600
# Give up after this many seconds (0 = no cap)
timeout_secs = 600

[defaults]
# One of 1:1, 16:9, 9:16, 3:4, 4:3
# aspect_ratio = "16:9"
# duration_seconds = 5
number_of_videos = 1
# Not supported by the service; recorded only
# quality = "high"

[output]
# Directory for downloaded videos (default: current directory)
# dir = "~/Videos/veo"

[share]
# Command used to share a video; receives the file path as its argument
# command = "open"
"#;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Directory holding the config file and saved preferences.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join(APP_DIR_NAME)
        })
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::veo::AspectRatio;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, VEO_API_BASE_URL);
        assert_eq!(config.api.model, DEFAULT_MODEL);
        assert_eq!(config.polling.policy(), PollPolicy::default());
        assert!(config.output.dir.is_none());
        assert!(config.share.command.is_none());
    }

    #[test]
    fn test_template_parses() {
        let config = Config::parse(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.defaults.settings().number_of_videos, 1);
    }

    #[test]
    fn test_zero_caps_disable_limits() {
        let config = Config::parse("[polling]\nmax_polls = 0\ntimeout_secs = 0\ninterval_ms = 250\n")
            .unwrap();
        let policy = config.polling.policy();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert!(policy.max_polls.is_none());
        assert!(policy.timeout.is_none());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config::parse("[polling]\ninterval_ms = 0\n").unwrap();
        let policy = config.polling.policy();
        assert_eq!(policy.interval, MIN_POLL_INTERVAL);
        assert_eq!(policy.max_polls, Some(DEFAULT_MAX_POLLS));
    }

    #[test]
    fn test_defaults_become_settings() {
        let config = Config::parse(
            "[defaults]\naspect_ratio = \"9:16\"\nduration_seconds = 0\nnumber_of_videos = 2\nquality = \"high\"\n",
        )
        .unwrap();
        let settings = config.defaults.settings();
        assert_eq!(settings.aspect_ratio, Some(AspectRatio::Portrait));
        assert_eq!(settings.duration_seconds, None);
        assert_eq!(settings.number_of_videos, 2);
        assert_eq!(settings.quality.as_deref(), Some("high"));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.api.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_load_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[polling\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("veo-studio/config.toml"));
    }
}
