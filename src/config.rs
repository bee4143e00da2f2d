//! Credentials and API settings read from the process environment.
//!
//! | Variable       | Meaning                                  |
//! |----------------|------------------------------------------|
//! | `WTB_APP_ID`   | TransportAPI application id (required)   |
//! | `WTB_APP_KEY`  | TransportAPI application key (required)  |
//! | `WTB_API_BASE` | API base URL, defaults to [`DEFAULT_API_BASE`] |

use reqwest::Url;
use std::fmt;

use crate::error::ConfigError;

pub const APP_ID_VAR: &str = "WTB_APP_ID";
pub const APP_KEY_VAR: &str = "WTB_APP_KEY";
pub const API_BASE_VAR: &str = "WTB_API_BASE";

pub const DEFAULT_API_BASE: &str = "http://transportapi.com/v3/";

/// The id/secret pair sent with every API request. Never mutated after loading.
#[derive(Clone)]
pub struct Credentials {
    app_id: String,
    app_key: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: app_key.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to build a [`crate::infra::transportapi::TransportApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub credentials: Credentials,
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingCredential { var })
        };

        let credentials = Credentials::new(required(APP_ID_VAR)?, required(APP_KEY_VAR)?);

        let base = lookup(API_BASE_VAR)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let base_url = parse_base_url(&base)?;

        Ok(Self {
            base_url,
            credentials,
        })
    }
}

/// Parses an API base, ensuring a trailing slash so relative joins keep its path.
pub fn parse_base_url(base: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(base).map_err(|e| ConfigError::InvalidBaseUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(base.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
