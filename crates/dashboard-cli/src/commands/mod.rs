//! CLI commands

pub mod domain;
pub mod list;
pub mod map;
pub mod remote;
pub mod task;
pub mod transfer;

use crate::config::{AppSettings, SettingsManager};
use anyhow::{Context, Result};
use dashboard_core::{BackendSelector, FileKv, KeyValueStore, TableClient};
use dashboard_types::{Domain, Task};
use std::sync::Arc;
use tracing::debug;

/// Open the dashboard under the home directory and load the working set
pub async fn open(settings: &AppSettings) -> Result<BackendSelector> {
    let store_dir = SettingsManager::store_dir()?;
    debug!("Using store at {:?}", store_dir);

    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKv::new(store_dir));
    let remote = Arc::new(
        TableClient::new(settings.remote_timeout()).context("Failed to build HTTP client")?,
    );

    let mut selector = BackendSelector::startup(kv, remote, settings.remote_timeout()).await;
    selector.load().await;
    Ok(selector)
}

/// Resolve a domain argument by id, then by name
pub fn resolve_domain(selector: &BackendSelector, id_or_name: &str) -> Result<Domain> {
    selector
        .find(id_or_name)
        .cloned()
        .with_context(|| format!("Domain '{}' not found", id_or_name))
}

pub fn resolve_task<'a>(domain: &'a Domain, id_or_name: &str) -> Result<&'a Task> {
    domain
        .find_task(id_or_name)
        .with_context(|| format!("Task '{}' not found on {}", id_or_name, domain.name))
}
