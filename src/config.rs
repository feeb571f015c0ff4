use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ds::yahoo::DEFAULT_API_BASE,
    error::{DfError, DfResult},
    utils::net::{INITIAL_BACKOFF, MAX_RETRIES, RetryOptions},
};

const CONFIG_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DfConfig {
    pub api_base: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for DfConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            max_retries: MAX_RETRIES,
            initial_backoff_ms: INITIAL_BACKOFF.as_millis() as u64,
        }
    }
}

impl DfConfig {
    pub fn load() -> DfResult<Self> {
        confy::load(CONFIG_NAME, None).map_err(Into::into)
    }

    pub fn store(&self) -> DfResult<()> {
        confy::store(CONFIG_NAME, None, self).map_err(Into::into)
    }

    /// Updates one field from its text form. Keys are case-insensitive.
    pub fn set(&mut self, key: &str, value: &str) -> DfResult<()> {
        let value = value.trim();

        match key.to_lowercase().as_str() {
            "api_base" => {
                let url = Url::parse(value).map_err(|err| invalid_value(key, value, err))?;
                self.api_base = url.as_str().trim_end_matches('/').to_string();
            }
            "max_retries" => {
                self.max_retries = value.parse().map_err(|err| invalid_value(key, value, err))?;
            }
            "initial_backoff_ms" => {
                self.initial_backoff_ms =
                    value.parse().map_err(|err| invalid_value(key, value, err))?;
            }
            _ => {
                return Err(DfError::Invalid {
                    code: "UNKNOWN_CONFIG_KEY",
                    message: format!("Unknown config key '{key}'"),
                });
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_base", self.api_base.clone()),
            ("max_retries", self.max_retries.to_string()),
            ("initial_backoff_ms", self.initial_backoff_ms.to_string()),
        ]
    }

    pub fn api_base(&self) -> DfResult<Url> {
        Ok(Url::parse(&self.api_base)?)
    }

    pub fn retry_options(&self) -> RetryOptions {
        RetryOptions {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }
}

fn invalid_value(key: &str, value: &str, err: impl std::fmt::Display) -> DfError {
    DfError::Invalid {
        code: "INVALID_CONFIG_VALUE",
        message: format!("Invalid value '{value}' for '{key}': {err}"),
    }
}
