//! Configuration management for goa-diary.
//!
//! Configuration is read from `~/.config/goa-diary/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;
use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::sources::refresh::{
    RefreshPolicy, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_STEP, DEFAULT_STALE_AFTER_MINUTES,
};

pub const DEFAULT_CATALOG_URL: &str = "http://www.omgoa.com/scripts/newsSources.py";
pub const DEFAULT_CONTACT_URL: &str = "https://www.facebook.com/Goa-Diary-100396581877453/";
pub const DEFAULT_SUBSCRIBE_URL: &str = "http://www.omgoa.com/emailSubscribeSubmit";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub refresh: RefreshConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Where the catalog lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub catalog_url: String,
    pub timeout_secs: u64,
    /// Concurrent source fetches for `digest`
    pub workers: usize,
    pub contact_url: String,
    pub subscribe_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            contact_url: DEFAULT_CONTACT_URL.to_string(),
            subscribe_url: DEFAULT_SUBSCRIBE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub page_size: u32,
    pub page_step: u32,
    pub stale_after_minutes: i64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_step: DEFAULT_PAGE_STEP,
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
        }
    }
}

impl RefreshConfig {
    pub fn policy(&self) -> Result<RefreshPolicy, ConfigError> {
        let stale_after = Duration::try_minutes(self.stale_after_minutes)
            .filter(|d| *d >= Duration::zero())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "refresh.stale_after_minutes out of range: {}",
                    self.stale_after_minutes
                ))
            })?;

        Ok(RefreshPolicy {
            page_size: self.page_size,
            page_step: self.page_step,
            stale_after,
        })
    }
}

impl Config {
    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// If the default config file doesn't exist, creates one with comments.
    /// An explicitly given path must exist.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::default_config_path()?;
                if !p.exists() {
                    Self::create_default_config(&p)?;
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;
        config.refresh.policy()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get the default config file path: `~/.config/goa-diary/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("goa-diary").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        tracing::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# goa-diary configuration
#
# Colors can be named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB" / "#RGB").
#
# Keys are single characters ("a", "R"), special keys (Enter, Tab, BackTab,
# Space, Up, Down, PageUp, PageDown, Esc, F1-F12) or modified ("Ctrl+c").

[network]
catalog_url = "http://www.omgoa.com/scripts/newsSources.py"
timeout_secs = 10
# Concurrent source fetches for `goa-diary digest`
workers = 4
contact_url = "https://www.facebook.com/Goa-Diary-100396581877453/"
subscribe_url = "http://www.omgoa.com/emailSubscribeSubmit"

[refresh]
# Headlines requested per page (forced into the `limit=` parameter)
page_size = 5
# Offset step for next/previous page
page_step = 10
# Returning to the terminal refetches sources older than this
stale_after_minutes = 5

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg_active = "Cyan"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"
enabled_source = "LightGreen"
disabled_source = "DarkGray"
headline_date = "Yellow"
hint = "Cyan"
error = "LightRed"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]
toggle_source = ["Enter", "Space"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
refresh_source = ["r"]
reload_catalog = ["R"]
clear_selections = ["X"]
open_headline = ["o"]
share_headline = ["s"]
open_contact = ["c"]
open_subscribe = ["S"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
