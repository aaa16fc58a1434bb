use std::{fmt, time::Duration};

use crate::error::{ConfigError, GatewayError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Checked in order; the first non-empty value wins.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];
pub const MODEL_ENV_VAR: &str = "INFOVAR_MODEL";
pub const BASE_URL_ENV_VAR: &str = "INFOVAR_BASE_URL";
pub const TIMEOUT_ENV_VAR: &str = "INFOVAR_TIMEOUT_SECS";

#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = API_KEY_ENV_VARS.iter().find_map(|&var| get(var));

        if let Some(model) = get(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(base_url) = get(BASE_URL_ENV_VAR) {
            config.base_url = base_url;
        }
        if let Some(raw) = get(TIMEOUT_ENV_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: TIMEOUT_ENV_VAR,
                    value: raw.clone(),
                    reason: "expected a positive number of seconds".to_string(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate that a credential is configured
    pub fn api_key(&self) -> Result<&str, GatewayError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GatewayError::Auth {
                reason: format!(
                    "missing API key: set {} or {}",
                    API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
                ),
            })
    }
}
