//! Client configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::auth::{TokenStore, TOKEN_KEY};
use crate::client::ResourceClient;
use crate::resource::ResourceConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub export_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("DASHBOARD_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DASHBOARD_API_URL"))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                name: "DASHBOARD_API_URL",
                value: base_url,
            });
        }

        Ok(Self {
            base_url,
            token: lookup("DASHBOARD_API_TOKEN").filter(|v| !v.trim().is_empty()),
            export_dir: lookup("DASHBOARD_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Token store seeded with the configured token.
    pub fn token_store(&self) -> TokenStore {
        let store = TokenStore::new();
        if let Some(token) = &self.token {
            store.set(TOKEN_KEY, token);
        }
        store
    }

    pub fn client(&self, resource: ResourceConfig, store: &TokenStore) -> ResourceClient {
        ResourceClient::new(&self.base_url, resource, Arc::new(store.clone()))
    }
}
