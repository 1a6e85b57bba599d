//! Backend selection between the remote table and the local store
//!
//! When remote storage is configured it is tried first for every operation.
//! A failed, empty or timed-out remote call falls back to the equivalent
//! local operation, so the local store always holds whatever the user last
//! saw succeed. Writes that fell back are not replayed against the remote
//! later; callers that need the two sides consistent must reconcile them.

use crate::config::RemoteConfig;
use crate::error::{DashboardError, Result};
use crate::kv::KeyValueStore;
use crate::normalize::{is_duplicate, normalize_name, normalize_url};
use crate::remote::RemoteDomains;
use crate::store::{plan_batch, RecordStore};
use dashboard_types::{Domain, DomainDraft, Task, TaskPatch};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct BackendSelector {
    store: RecordStore,
    remote: Arc<dyn RemoteDomains>,
    /// `Some` while the remote table is the primary backend
    remote_config: Option<RemoteConfig>,
    timeout: Duration,
    /// Working set shown to the user; never the source of truth
    domains: Vec<Domain>,
}

impl BackendSelector {
    /// Local-only selector
    pub fn new(store: RecordStore, remote: Arc<dyn RemoteDomains>, timeout: Duration) -> Self {
        Self {
            store,
            remote,
            remote_config: None,
            timeout,
            domains: Vec::new(),
        }
    }

    /// Build the selector, switching to remote storage when a persisted
    /// configuration is found
    pub async fn startup(
        kv: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteDomains>,
        timeout: Duration,
    ) -> Self {
        let mut selector = Self::new(RecordStore::new(kv), remote, timeout);

        if let Some(config) = RemoteConfig::load(selector.store.kv()) {
            selector.remote.configure(config.clone()).await;
            selector.remote_config = Some(config);
        }

        selector
    }

    pub fn using_remote(&self) -> bool {
        self.remote_config.is_some()
    }

    pub fn remote_config(&self) -> Option<&RemoteConfig> {
        self.remote_config.as_ref()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Current working set
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Look a domain up by id, then by case-insensitive name
    pub fn find(&self, id_or_name: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|d| d.id == id_or_name)
            .or_else(|| {
                self.domains
                    .iter()
                    .find(|d| d.name.eq_ignore_ascii_case(id_or_name))
            })
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Remote {} timed out after {:?}", what, self.timeout);
                None
            }
        }
    }

    fn remember(&mut self, domain: Domain) {
        match self.domains.iter_mut().find(|d| d.id == domain.id) {
            Some(slot) => *slot = domain,
            None => self.domains.push(domain),
        }
    }

    fn lookup(&self, domain_id: &str) -> Option<Domain> {
        self.domains
            .iter()
            .find(|d| d.id == domain_id)
            .cloned()
            .or_else(|| self.store.list().into_iter().find(|d| d.id == domain_id))
    }

    /// Refresh the working set: remote rows when there are any, else local storage
    pub async fn load(&mut self) -> &[Domain] {
        if self.using_remote() {
            match self.bounded("fetch", self.remote.fetch()).await {
                Some(domains) if !domains.is_empty() => {
                    self.domains = domains;
                    return &self.domains;
                }
                Some(_) => info!("No remote domains, using local storage"),
                None => {}
            }
        }

        self.domains = self.store.list();
        &self.domains
    }

    pub async fn add(&mut self, draft: DomainDraft) -> Result<Domain> {
        let url = normalize_url(&draft.url);
        let name = normalize_name(&draft.name);
        if let Some(existing) = self.domains.iter().find(|d| is_duplicate(d, &url, &name)) {
            return Ok(existing.clone());
        }

        if self.using_remote() {
            let domain = Domain::new(draft.clone());
            if let Some(Some(created)) = self.bounded("create", self.remote.create(&domain)).await {
                self.remember(created.clone());
                return Ok(created);
            }
            warn!("Saving {} to local storage instead", draft.url);
        }

        let domain = self.store.add(draft)?;
        self.remember(domain.clone());
        Ok(domain)
    }

    /// Bulk-add bare URLs with the batch duplicate policy of [`RecordStore::add_many`]
    pub async fn add_many(&mut self, urls: &[String]) -> Result<Vec<Domain>> {
        if self.using_remote() {
            let (planned, created) = plan_batch(&self.domains, urls);
            if created == 0 {
                return Ok(planned);
            }

            let fresh: Vec<Domain> = planned
                .iter()
                .filter(|d| !self.domains.iter().any(|k| k.id == d.id))
                .cloned()
                .collect();

            if let Some(rows) = self.bounded("bulk create", self.remote.create_many(&fresh)).await {
                if !rows.is_empty() {
                    for row in &rows {
                        self.remember(row.clone());
                    }
                    return Ok(planned
                        .into_iter()
                        .map(|d| rows.iter().find(|r| r.id == d.id).cloned().unwrap_or(d))
                        .collect());
                }
            }
            warn!("Saving {} new domains to local storage instead", fresh.len());

            self.store.insert_new(&fresh)?;
            for domain in fresh {
                self.remember(domain);
            }
            return Ok(planned);
        }

        let added = self.store.add_many(urls)?;
        for domain in &added {
            self.remember(domain.clone());
        }
        Ok(added)
    }

    pub async fn update(&mut self, domain: Domain) -> Result<Domain> {
        if self.using_remote() {
            if let Some(Some(updated)) = self.bounded("update", self.remote.update(&domain)).await {
                self.remember(updated.clone());
                return Ok(updated);
            }
            warn!("Saving changes to {} in local storage instead", domain.id);

            let saved = match self.store.update(domain.clone())? {
                Some(saved) => saved,
                None => self.store.upsert(domain)?,
            };
            self.remember(saved.clone());
            return Ok(saved);
        }

        let id = domain.id.clone();
        let updated = self
            .store
            .update(domain)?
            .ok_or_else(|| DashboardError::NotFound(format!("domain {}", id)))?;
        self.remember(updated.clone());
        Ok(updated)
    }

    pub async fn update_task(
        &mut self,
        domain_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Domain> {
        if self.using_remote() {
            let mut domain = self
                .lookup(domain_id)
                .ok_or_else(|| DashboardError::NotFound(format!("domain {}", domain_id)))?;
            domain
                .task_mut(task_id)
                .ok_or_else(|| DashboardError::NotFound(format!("task {}", task_id)))?
                .apply(patch);
            domain.touch();

            if let Some(Some(updated)) = self.bounded("update", self.remote.update(&domain)).await {
                self.remember(updated.clone());
                return Ok(updated);
            }
            warn!("Saving task change of {} in local storage instead", domain_id);

            let saved = match self.store.update_task(domain_id, task_id, patch)? {
                Some(saved) => saved,
                None => self.store.upsert(domain)?,
            };
            self.remember(saved.clone());
            return Ok(saved);
        }

        let updated = self
            .store
            .update_task(domain_id, task_id, patch)?
            .ok_or_else(|| {
                DashboardError::NotFound(format!("task {} of domain {}", task_id, domain_id))
            })?;
        self.remember(updated.clone());
        Ok(updated)
    }

    /// Flip one task's completion without opening an editor
    pub async fn toggle_task_inline(&mut self, domain_id: &str, task_id: &str) -> Result<Domain> {
        let completed = self
            .lookup(domain_id)
            .and_then(|d| d.task(task_id).map(|t| t.completed))
            .ok_or_else(|| {
                DashboardError::NotFound(format!("task {} of domain {}", task_id, domain_id))
            })?;

        self.update_task(domain_id, task_id, &TaskPatch::completed(!completed))
            .await
    }

    /// Save the result of the task editor: completion and notes of every
    /// listed task, matched by id, in a single update
    pub async fn save_tasks(&mut self, domain_id: &str, edited: &[Task]) -> Result<Domain> {
        let mut domain = self
            .lookup(domain_id)
            .ok_or_else(|| DashboardError::NotFound(format!("domain {}", domain_id)))?;

        for change in edited {
            if let Some(task) = domain.task_mut(&change.id) {
                task.completed = change.completed;
                task.notes = change.notes.clone().filter(|n| !n.is_empty());
            }
        }

        self.update(domain).await
    }

    pub async fn delete(&mut self, domain_id: &str) -> Result<()> {
        let mut removed_remotely = false;
        if self.using_remote() {
            removed_remotely = self
                .bounded("delete", self.remote.delete(domain_id))
                .await
                .unwrap_or(false);
            if !removed_remotely {
                warn!("Deleting {} from local storage instead", domain_id);
            }
        }

        if !removed_remotely {
            self.store.delete(domain_id)?;
        }
        self.domains.retain(|d| d.id != domain_id);
        Ok(())
    }

    /// Switch to remote storage: migrate local records, persist the
    /// configuration and reload. Returns how many records were migrated.
    pub async fn connect_remote(&mut self, config: RemoteConfig) -> Result<usize> {
        config.validate()?;

        self.remote.configure(config.clone()).await;
        let migrated = self.remote.migrate(&self.store).await;

        config.save(self.store.kv())?;
        self.remote_config = Some(config);
        self.load().await;

        Ok(migrated.len())
    }

    /// Forget the remote configuration and go back to local storage
    pub async fn disconnect_remote(&mut self) -> Result<()> {
        RemoteConfig::forget(self.store.kv())?;
        self.remote_config = None;
        info!("Remote storage disconnected, using local storage");
        self.load().await;
        Ok(())
    }

    /// Export the working set when remote is primary, the local store otherwise
    pub fn export_json(&self) -> Result<String> {
        if self.using_remote() {
            return Ok(serde_json::to_string_pretty(&self.domains)?);
        }
        self.store.export_json()
    }

    /// Replace the local store with an exported array and reload
    pub async fn import_json(&mut self, text: &str) -> Result<usize> {
        let count = self.store.import_json(text)?;
        self.load().await;
        Ok(count)
    }
}
