//! Editor configuration.
//!
//! Loaded from `<config dir>/qwerty/config.toml`. Every section uses
//! `#[serde(default)]`, so a config file only needs the keys it changes.
//!
//! ```toml
//! [gutter]
//! base_margin = 12.0
//!
//! [runner]
//! interpreter = "python3"
//!
//! [theme.keyword]
//! color = "#ff79c6"
//! bold = true
//! ```

use qwerty_syntax::{Category, Style, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub gutter: GutterConfig,
    pub runner: RunnerConfig,

    /// Style overrides keyed by category name (`keyword`, `string`, ...)
    pub theme: BTreeMap<String, Style>,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("qwerty").join("config.toml"))
    }

    /// Builds the highlighting theme: One Dark plus overrides.
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::one_dark();
        for (key, style) in &self.theme {
            match Category::ALL.iter().find(|c| c.theme_key() == key) {
                Some(category) => theme.set(*category, *style),
                None => tracing::warn!(key = %key, "Unknown theme category"),
            }
        }
        theme
    }
}

/// Editor behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tab width in spaces
    pub tab_width: usize,

    /// Enable syntax highlighting for recognized file types
    pub highlighting: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            highlighting: true,
        }
    }
}

/// Line-number gutter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    /// Show line numbers
    pub visible: bool,

    /// Space added to the digit columns
    pub base_margin: f32,

    /// Gap between the numbers and the text area
    pub right_padding: f32,

    /// Glyph advance used by hosts without font metrics
    pub digit_advance: f32,

    /// Line height used by hosts without font metrics
    pub line_height: f32,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            visible: true,
            base_margin: 10.0,
            right_padding: 5.0,
            digit_advance: 8.0,
            line_height: 16.0,
        }
    }
}

/// Configuration for running the current file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Interpreter command; the language's default when unset
    pub interpreter: Option<String>,

    /// Extra arguments placed before the file path
    pub args: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
