//! Remote table storage
//!
//! [`RemoteDomains`] is the port the backend selector talks to;
//! [`TableClient`] implements it over the tabular-data HTTP API.
//! Implementations absorb their own failures: an operation that cannot
//! complete returns an empty list, `None` or `false` and logs why.

mod client;
pub mod row;

pub use client::TableClient;

use crate::config::RemoteConfig;
use crate::store::RecordStore;
use async_trait::async_trait;
use dashboard_types::Domain;
use tracing::{error, info};

#[async_trait]
pub trait RemoteDomains: Send + Sync {
    /// Install credentials. Operations before this fail fast.
    async fn configure(&self, config: RemoteConfig);

    async fn is_configured(&self) -> bool;

    async fn fetch(&self) -> Vec<Domain>;

    async fn create(&self, domain: &Domain) -> Option<Domain>;

    async fn create_many(&self, domains: &[Domain]) -> Vec<Domain>;

    async fn update(&self, domain: &Domain) -> Option<Domain>;

    async fn delete(&self, domain_id: &str) -> bool;

    /// Copy every local record to the remote table.
    ///
    /// The local store is cleared only when at least one row was created;
    /// otherwise it is left untouched.
    async fn migrate(&self, store: &RecordStore) -> Vec<Domain> {
        let local = store.list();
        if local.is_empty() {
            info!("No local domains to migrate");
            return Vec::new();
        }

        let created = self.create_many(&local).await;
        if created.is_empty() {
            error!("Migration created no remote rows, keeping {} local domains", local.len());
            return created;
        }

        info!("Successfully migrated {} domains to remote storage", created.len());
        if let Err(e) = store.clear() {
            error!("Failed to clear local domains after migration: {}", e);
        }
        created
    }
}
