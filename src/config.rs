// =============================================================================
// Settings — static engine configuration loaded at startup
// =============================================================================
//
// Everything here is read once at boot from `settings.json`; API keys stay in
// the environment and never touch this file. All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// settings file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:4100".to_string()
}

fn default_watchlist_path() -> String {
    "watchlist.json".to_string()
}

fn default_alpha_vantage_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_news_page_size() -> u32 {
    5
}

// =============================================================================
// Settings
// =============================================================================

/// Top-level settings for the dashboard engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path of the persisted watchlist JSON file.
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,

    /// Market data provider root URL.
    #[serde(default = "default_alpha_vantage_base_url")]
    pub alpha_vantage_base_url: String,

    /// News provider root URL.
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,

    /// Maximum headlines fetched per symbol.
    #[serde(default = "default_news_page_size")]
    pub news_page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            watchlist_path: default_watchlist_path(),
            alpha_vantage_base_url: default_alpha_vantage_base_url(),
            news_base_url: default_news_base_url(),
            news_page_size: default_news_page_size(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;

        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %settings.bind_addr,
            "settings loaded"
        );

        Ok(settings)
    }
}
