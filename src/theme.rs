//! Persisted dark/light theme preference.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::config_dir;

/// Name of the preference key holding the theme.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("Unknown theme '{}'. Use 'dark' or 'light'", other)),
        }
    }
}

/// Whether a `COLORFGBG` value ("fg;bg") describes a dark background.
///
/// Background indices 0-6 and 8 are the dark ANSI colours.
pub fn system_prefers_dark(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to access preferences '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse preferences '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// On-disk preferences document. Only the theme is stored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

/// Reads and writes the theme preference file.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/veo-studio/preferences.toml`.
    pub fn with_default_path() -> Self {
        Self::new(config_dir().join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved theme, if any.
    pub fn load(&self) -> Result<Option<Theme>, ThemeError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| ThemeError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let prefs: Preferences = toml::from_str(&content).map_err(|e| ThemeError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(prefs.theme)
    }

    pub fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        let io_err = |e| ThemeError::Io {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string(&Preferences { theme: Some(theme) })?;
        std::fs::write(&self.path, content).map_err(io_err)?;
        log::debug!("Saved {} = {} to {}", THEME_KEY, theme, self.path.display());
        Ok(())
    }

    /// Theme to start with: saved preference, else the terminal background,
    /// else light. An unreadable preference file is logged and ignored.
    pub fn resolve_initial(&self) -> Theme {
        let saved = self.load().unwrap_or_else(|e| {
            log::warn!("{}", e);
            None
        });
        saved.unwrap_or_else(|| {
            let colorfgbg = std::env::var("COLORFGBG").ok();
            if system_prefers_dark(colorfgbg.as_deref()) {
                Theme::Dark
            } else {
                Theme::Light
            }
        })
    }

    /// Flip `current`, persist and return the new theme.
    pub fn toggle(&self, current: Theme) -> Result<Theme, ThemeError> {
        let next = current.toggled();
        self.save(next)?;
        Ok(next)
    }
}
