//! Startup configuration.
//!
//! The only value taken from the environment is the API credential. It is
//! resolved once, before any tool screen is opened, so a missing key shows
//! up as a configuration error instead of a failure mid-request.

use crate::error::{CanvasError, Result};
use crate::image::providers::{GeminiModel, DEFAULT_BASE_URL};

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Resolved configuration for talking to the generation service.
#[derive(Clone)]
pub struct Config {
    /// Secret credential for the remote service.
    pub api_key: String,
    /// Model variant to request.
    pub model: GeminiModel,
    /// API base URL, without a trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration using `lookup` to read variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = resolve_api_key(lookup)?;
        Ok(Self {
            api_key,
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Sets the model variant.
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Finds the first non-blank API key among [`API_KEY_ENV_VARS`].
pub fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or_else(|| {
            CanvasError::Config(format!(
                "no API key provided; set {}",
                API_KEY_ENV_VARS.join(" or ")
            ))
        })
}
