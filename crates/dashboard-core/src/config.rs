//! Remote storage configuration

use crate::error::{DashboardError, Result};
use crate::kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Key holding the persisted remote configuration
pub const REMOTE_CONFIG_KEY: &str = "remoteConfig";

/// Default upper bound on a single remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_TABLE_NAME: &str = "Domains";

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Credentials and location of the remote table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_id: String,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            table_name: default_table_name(),
            api_url: default_api_url(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        if !table_name.trim().is_empty() {
            self.table_name = table_name;
        }
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Both the key and the base id are present
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.base_id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(DashboardError::Config(
                "API key and base ID are required".to_string(),
            ));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(DashboardError::Config(format!(
                "Invalid API URL: {}. URL must start with http:// or https://",
                self.api_url
            )));
        }
        Ok(())
    }

    /// API key with everything but the edges hidden
    pub fn masked_key(&self) -> String {
        let key = &self.api_key;
        if key.len() > 8 && key.is_ascii() {
            format!("{}****{}", &key[..4], &key[key.len() - 4..])
        } else {
            "****".to_string()
        }
    }

    /// Read the persisted configuration.
    ///
    /// Missing, unreadable or incomplete configuration yields `None`.
    pub fn load(kv: &dyn KeyValueStore) -> Option<Self> {
        let raw = match kv.get(REMOTE_CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read remote configuration: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<RemoteConfig>(&raw) {
            Ok(config) if config.is_complete() => Some(config),
            Ok(_) => {
                error!("Ignoring remote configuration without API key or base ID");
                None
            }
            Err(e) => {
                error!("Failed to parse remote configuration: {}", e);
                None
            }
        }
    }

    pub fn save(&self, kv: &dyn KeyValueStore) -> Result<()> {
        let content = serde_json::to_string(self)?;
        kv.set(REMOTE_CONFIG_KEY, &content)?;
        info!(
            "Saved remote configuration (base: {}, table: {})",
            self.base_id, self.table_name
        );
        Ok(())
    }

    pub fn forget(kv: &dyn KeyValueStore) -> Result<()> {
        kv.remove(REMOTE_CONFIG_KEY)
    }
}
