//! Local record store
//!
//! Keeps the whole ordered collection of domains as one JSON array under the
//! `domains` key of a [`KeyValueStore`]. Every mutation is a read-modify-write
//! of that array; single-process access is assumed.

use crate::error::{DashboardError, Result};
use crate::kv::KeyValueStore;
use crate::normalize::{canonical_url, is_duplicate, normalize_name, normalize_url};
use chrono::Utc;
use dashboard_types::{Domain, DomainDraft, TaskPatch};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Key holding the JSON array of domains
pub const DOMAINS_KEY: &str = "domains";

#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// All records in storage order. Unreadable or corrupt storage yields an empty list.
    pub fn list(&self) -> Vec<Domain> {
        match self.try_list() {
            Ok(domains) => domains,
            Err(e) => {
                error!("Error loading domains: {}", e);
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> Result<Vec<Domain>> {
        match self.kv.get(DOMAINS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| DashboardError::StorageUnavailable(format!("corrupt domain list: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, domains: &[Domain]) -> Result<()> {
        let content = serde_json::to_string(domains)?;
        self.kv.set(DOMAINS_KEY, &content)?;
        debug!("Saved {} domains", domains.len());
        Ok(())
    }

    /// Add a domain unless one with the same normalized URL or name exists,
    /// in which case the existing record is returned untouched.
    pub fn add(&self, draft: DomainDraft) -> Result<Domain> {
        let mut domains = self.list();

        let url = normalize_url(&draft.url);
        let name = normalize_name(&draft.name);
        if let Some(existing) = domains.iter().find(|d| is_duplicate(d, &url, &name)) {
            debug!("Domain {} already exists as {}", draft.url, existing.id);
            return Ok(existing.clone());
        }

        let domain = Domain::new(draft);
        domains.push(domain.clone());
        self.save(&domains)?;

        info!("Added domain {} ({})", domain.name, domain.id);
        Ok(domain)
    }

    /// Add many domains from bare URLs.
    ///
    /// Existing records are returned as-is; URLs repeated within the batch
    /// collapse to their first occurrence.
    pub fn add_many<I, S>(&self, urls: I) -> Result<Vec<Domain>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domains = self.list();
        let (result, created) = plan_batch(&domains, urls);

        if created > 0 {
            let known: HashSet<String> = domains.iter().map(|d| d.id.clone()).collect();
            domains.extend(result.iter().filter(|d| !known.contains(&d.id)).cloned());
            self.save(&domains)?;
            info!("Added {} new domains", created);
        }

        Ok(result)
    }

    /// Replace a stored record by id. `None` means no record has that id.
    pub fn update(&self, domain: Domain) -> Result<Option<Domain>> {
        let mut domains = self.list();
        let Some(slot) = domains.iter_mut().find(|d| d.id == domain.id) else {
            debug!("Domain {} not found for update", domain.id);
            return Ok(None);
        };

        let created_at = slot.created_at;
        *slot = Domain {
            created_at,
            updated_at: Utc::now(),
            ..domain
        };
        let updated = slot.clone();

        self.save(&domains)?;
        Ok(Some(updated))
    }

    /// Merge `patch` into one task. `None` when the domain or the task is unknown.
    pub fn update_task(
        &self,
        domain_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Domain>> {
        let mut domains = self.list();
        let Some(domain) = domains.iter_mut().find(|d| d.id == domain_id) else {
            return Ok(None);
        };
        let Some(task) = domain.task_mut(task_id) else {
            return Ok(None);
        };

        task.apply(patch);
        domain.touch();
        let updated = domain.clone();

        self.save(&domains)?;
        Ok(Some(updated))
    }

    /// Append records whose ids are not stored yet, in one write
    pub fn insert_new(&self, records: &[Domain]) -> Result<usize> {
        let mut domains = self.list();
        let known: HashSet<String> = domains.iter().map(|d| d.id.clone()).collect();

        let before = domains.len();
        domains.extend(records.iter().filter(|d| !known.contains(&d.id)).cloned());
        let inserted = domains.len() - before;

        if inserted > 0 {
            self.save(&domains)?;
            info!("Stored {} domains locally", inserted);
        }
        Ok(inserted)
    }

    /// Replace by id, or append when the id is new
    pub fn upsert(&self, domain: Domain) -> Result<Domain> {
        let mut domains = self.list();
        let mut domain = domain;
        domain.touch();

        match domains.iter_mut().find(|d| d.id == domain.id) {
            Some(slot) => {
                domain.created_at = slot.created_at;
                *slot = domain.clone();
            }
            None => domains.push(domain.clone()),
        }

        self.save(&domains)?;
        Ok(domain)
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut domains = self.list();
        let before = domains.len();
        domains.retain(|d| d.id != id);

        if domains.len() != before {
            self.save(&domains)?;
            info!("Deleted domain {}", id);
        }
        Ok(())
    }

    /// Drop the whole collection
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(DOMAINS_KEY)
    }

    /// Pretty-printed JSON array of every record
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list())?)
    }

    /// Replace the collection with an exported array.
    ///
    /// Anything other than an array of domain records is rejected and the
    /// stored data is left as it was.
    pub fn import_json(&self, text: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            error!("Error importing domains: {}", e);
            DashboardError::ImportFormatInvalid(e.to_string())
        })?;

        if !value.is_array() {
            error!("Error importing domains: expected an array");
            return Err(DashboardError::ImportFormatInvalid(
                "expected an array of domains".to_string(),
            ));
        }

        let domains: Vec<Domain> = serde_json::from_value(value).map_err(|e| {
            error!("Error importing domains: {}", e);
            DashboardError::ImportFormatInvalid(e.to_string())
        })?;

        self.save(&domains)?;
        info!("Imported {} domains", domains.len());
        Ok(domains.len())
    }
}

/// Resolve a batch of URLs against `existing`.
///
/// Returns the per-URL records in input order (in-batch repeats skipped) and
/// how many of them are new.
pub fn plan_batch<I, S>(existing: &[Domain], urls: I) -> (Vec<Domain>, usize)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    let mut created = 0;

    for url in urls {
        let url = url.as_ref().trim();
        if url.is_empty() {
            continue;
        }

        let normalized = normalize_url(url);
        if !seen.insert(normalized.clone()) {
            continue;
        }

        if let Some(found) = existing.iter().find(|d| normalize_url(&d.url) == normalized) {
            result.push(found.clone());
            continue;
        }

        result.push(Domain::new(DomainDraft::new(normalized, canonical_url(url))));
        created += 1;
    }

    (result, created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryKv::new()))
    }

    #[test]
    fn test_list_empty_and_corrupt() -> Result<()> {
        let store = store();
        assert!(store.list().is_empty());

        store.kv().set(DOMAINS_KEY, "{broken")?;
        assert!(store.list().is_empty());
        Ok(())
    }

    #[test]
    fn test_add_duplicate_returns_existing() -> Result<()> {
        let store = store();
        let first = store.add(DomainDraft::new("a", "https://a.com"))?;
        let second = store.add(DomainDraft::new("a", "https://a.com"))?;

        assert_eq!(second.id, first.id);
        assert_eq!(store.list().len(), 1);

        // same name, different URL
        let by_name = store.add(DomainDraft::new("A", "https://b.com"))?;
        assert_eq!(by_name.id, first.id);

        // same URL modulo scheme, slash and case
        let by_url = store.add(DomainDraft::new("other", "HTTP://A.COM/"))?;
        assert_eq!(by_url.id, first.id);
        assert_eq!(store.list().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_creates_checklist() -> Result<()> {
        let store = store();
        let mut draft = DomainDraft::new("shop", "https://ushops.net");
        draft.da = Some(21);
        let domain = store.add(draft)?;

        assert_eq!(domain.tasks.len(), 8);
        assert_eq!(domain.da, Some(21));
        assert_eq!(store.list(), vec![domain]);
        Ok(())
    }

    #[test]
    fn test_add_many_collapses_batch_duplicates() -> Result<()> {
        let store = store();
        let added = store.add_many(["a.com", "https://a.com/"])?;

        assert_eq!(added.len(), 1);
        assert_eq!(store.list().len(), 1);
        assert_eq!(added[0].name, "a.com");
        assert_eq!(added[0].url, "https://a.com");
        Ok(())
    }

    #[test]
    fn test_add_many_returns_existing_in_order() -> Result<()> {
        let store = store();
        let existing = store.add(DomainDraft::new("Latest", "https://latestexam.de"))?;

        let added = store.add_many(["xcomputer.site", "https://LatestExam.de", "latestexam.de"])?;
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].name, "xcomputer.site");
        assert_eq!(added[1].id, existing.id);

        let stored = store.list();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, existing.id);
        assert_eq!(stored[1].id, added[0].id);
        Ok(())
    }

    #[test]
    fn test_update() -> Result<()> {
        let store = store();
        let domain = store.add(DomainDraft::new("a", "https://a.com"))?;

        let mut edited = domain.clone();
        edited.name = "renamed".to_string();
        edited.dr = Some(40);
        edited.created_at = Utc::now() + chrono::Duration::days(1);

        let updated = store.update(edited)?.expect("domain exists");
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.created_at, domain.created_at);
        assert!(updated.updated_at >= domain.updated_at);
        assert_eq!(store.list(), vec![updated]);
        Ok(())
    }

    #[test]
    fn test_update_missing_is_none() -> Result<()> {
        let store = store();
        store.add(DomainDraft::new("a", "https://a.com"))?;
        let before = store.export_json()?;

        let ghost = Domain::new(DomainDraft::new("ghost", "ghost.com"));
        assert!(store.update(ghost)?.is_none());
        assert_eq!(store.export_json()?, before);
        Ok(())
    }

    #[test]
    fn test_update_task() -> Result<()> {
        let store = store();
        let domain = store.add(DomainDraft::new("a", "https://a.com"))?;
        let task_id = domain.tasks[0].id.clone();

        let updated = store
            .update_task(&domain.id, &task_id, &TaskPatch::completed(true))?
            .expect("task exists");
        assert!(updated.tasks[0].completed);
        assert_eq!(updated.progress(), 13);
        assert!(store.list()[0].tasks[0].completed);
        Ok(())
    }

    #[test]
    fn test_update_task_missing_leaves_storage() -> Result<()> {
        let store = store();
        let domain = store.add(DomainDraft::new("a", "https://a.com"))?;
        let before = store.kv().get(DOMAINS_KEY)?;

        let patch = TaskPatch::completed(true);
        assert!(store.update_task("missing", &domain.tasks[0].id, &patch)?.is_none());
        assert!(store.update_task(&domain.id, "missing", &patch)?.is_none());
        assert_eq!(store.kv().get(DOMAINS_KEY)?, before);
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<()> {
        let store = store();
        let a = store.add(DomainDraft::new("a", "a.com"))?;
        let b = store.add(DomainDraft::new("b", "b.com"))?;

        store.delete("unknown")?;
        assert_eq!(store.list().len(), 2);

        store.delete(&a.id)?;
        assert_eq!(store.list(), vec![b]);
        Ok(())
    }

    #[test]
    fn test_upsert() -> Result<()> {
        let store = store();
        let a = store.add(DomainDraft::new("a", "a.com"))?;

        let remote_only = Domain::new(DomainDraft::new("r", "r.com"));
        store.upsert(remote_only.clone())?;
        assert_eq!(store.list().len(), 2);

        let mut renamed = a.clone();
        renamed.name = "a2".to_string();
        store.upsert(renamed)?;
        let stored = store.list();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "a2");
        assert_eq!(stored[1].id, remote_only.id);
        Ok(())
    }

    #[test]
    fn test_export_import_round_trip() -> Result<()> {
        let empty = store();
        let exported = empty.export_json()?;
        assert_eq!(empty.import_json(&exported)?, 0);
        assert!(empty.list().is_empty());

        let source = store();
        source.add(DomainDraft::new("a", "a.com"))?;
        source.add(DomainDraft::new("b", "b.com"))?;
        let c = source.add(DomainDraft::new("c", "c.com"))?;
        source.update_task(&c.id, &c.tasks[3].id, &TaskPatch::notes("needs copy"))?;

        let target = store();
        assert_eq!(target.import_json(&source.export_json()?)?, 3);
        assert_eq!(target.list(), source.list());
        Ok(())
    }

    #[test]
    fn test_import_rejects_non_array() -> Result<()> {
        let store = store();
        let a = store.add(DomainDraft::new("a", "a.com"))?;

        let result = store.import_json(r#"{"id":"x","name":"x","url":"x"}"#);
        assert!(matches!(result, Err(DashboardError::ImportFormatInvalid(_))));

        assert!(store.import_json("not json").is_err());
        assert!(store.import_json(r#"[{"name":"missing id"}]"#).is_err());
        assert_eq!(store.list(), vec![a]);
        Ok(())
    }

    #[test]
    fn test_import_accepts_legacy_task_map() -> Result<()> {
        let store = store();
        let payload = r#"[{
            "id": "2",
            "name": "another-domain",
            "url": "https://another-domain.com",
            "tasks": {"installation": true, "configuration": true, "gscSetup": true,
                      "content": true, "wwwStatus": true, "uxPublishing": false,
                      "traffic": false, "monetization": false},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }]"#;

        assert_eq!(store.import_json(payload)?, 1);
        let domain = &store.list()[0];
        assert_eq!(domain.tasks.len(), 8);
        assert_eq!(domain.progress(), 63);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let store = store();
        store.add(DomainDraft::new("a", "a.com"))?;
        store.clear()?;
        assert!(store.list().is_empty());
        assert_eq!(store.kv().get(DOMAINS_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_insert_new_skips_known_ids() -> Result<()> {
        let store = store();
        let existing = store.add(DomainDraft::new("a", "a.com"))?;
        let fresh = Domain::new(DomainDraft::new("b", "b.com"));

        let inserted = store.insert_new(&[existing.clone(), fresh.clone()])?;
        assert_eq!(inserted, 1);
        assert_eq!(store.list(), vec![existing, fresh]);
        Ok(())
    }
}
