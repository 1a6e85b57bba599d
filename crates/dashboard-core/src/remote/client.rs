//! HTTP client for the remote table

use super::row::{
    domain_to_fields, row_to_domain, CreateRequest, CreateResponse, ListResponse, RowWrite,
    TableRow,
};
use super::RemoteDomains;
use crate::config::RemoteConfig;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use dashboard_types::Domain;
use reqwest::{Client as ReqwestClient, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Most rows the service accepts in one create request
pub const MAX_ROWS_PER_REQUEST: usize = 10;

/// Remote adapter over the tabular-data REST API.
///
/// Row ids returned by the service are cached per logical domain id so that
/// updates and deletes address the row directly. A cache miss, or a 404 on a
/// cached id, falls back to scanning the whole table.
pub struct TableClient {
    http: ReqwestClient,
    config: RwLock<Option<RemoteConfig>>,
    row_ids: Mutex<HashMap<String, String>>,
}

impl TableClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            config: RwLock::new(None),
            row_ids: Mutex::new(HashMap::new()),
        })
    }

    async fn current_config(&self) -> Result<RemoteConfig> {
        match self.config.read().await.as_ref() {
            Some(config) if config.is_complete() => Ok(config.clone()),
            _ => {
                error!("Remote API key or base ID not set");
                Err(DashboardError::RemoteUnconfigured)
            }
        }
    }

    fn table_url(config: &RemoteConfig, row_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&config.api_url)
            .map_err(|e| DashboardError::Config(format!("Invalid API URL {}: {}", config.api_url, e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                DashboardError::Config(format!("API URL cannot be a base: {}", config.api_url))
            })?;
            segments.pop_if_empty().push(&config.base_id).push(&config.table_name);
            if let Some(row_id) = row_id {
                segments.push(row_id);
            }
        }
        Ok(url)
    }

    async fn remember(&self, rows: &[TableRow]) {
        let mut row_ids = self.row_ids.lock().await;
        for row in rows {
            if let Some(ref id) = row.fields.id {
                row_ids.insert(id.clone(), row.id.clone());
            }
        }
    }

    async fn forget(&self, domain_id: &str) {
        self.row_ids.lock().await.remove(domain_id);
    }

    /// Cached row id of a domain, if any
    pub async fn cached_row_id(&self, domain_id: &str) -> Option<String> {
        self.row_ids.lock().await.get(domain_id).cloned()
    }

    /// All rows, following the pagination cursor
    async fn list_rows(&self, config: &RemoteConfig) -> Result<Vec<TableRow>> {
        let url = Self::table_url(config, None)?;
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).bearer_auth(&config.api_key);
            if let Some(ref cursor) = offset {
                request = request.query(&[("offset", cursor)]);
            }
            debug!("GET {} (offset: {:?})", url, offset);

            let page: ListResponse = read_json(request.send().await?).await?;
            rows.extend(page.records);

            match page.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }

        Ok(rows)
    }

    pub async fn try_fetch(&self) -> Result<Vec<Domain>> {
        let config = self.current_config().await?;
        let rows = self.list_rows(&config).await?;

        let mut row_ids = HashMap::new();
        for row in &rows {
            if let Some(ref id) = row.fields.id {
                row_ids.insert(id.clone(), row.id.clone());
            }
        }
        *self.row_ids.lock().await = row_ids;

        Ok(rows.iter().filter_map(row_to_domain).collect())
    }

    pub async fn try_create_many(&self, domains: &[Domain]) -> Result<Vec<Domain>> {
        let config = self.current_config().await?;
        let url = Self::table_url(&config, None)?;
        let mut created = Vec::with_capacity(domains.len());

        for chunk in domains.chunks(MAX_ROWS_PER_REQUEST) {
            let body = CreateRequest {
                records: chunk
                    .iter()
                    .map(|d| RowWrite {
                        fields: domain_to_fields(d),
                    })
                    .collect(),
            };
            debug!("POST {} ({} rows)", url, body.records.len());

            let response = self
                .http
                .post(url.clone())
                .bearer_auth(&config.api_key)
                .json(&body)
                .send()
                .await?;
            let result: CreateResponse = read_json(response).await?;

            self.remember(&result.records).await;
            created.extend(result.records.iter().filter_map(row_to_domain));
        }

        Ok(created)
    }

    /// Row id for a domain and whether it came from the cache
    async fn resolve_row_id(&self, config: &RemoteConfig, domain_id: &str) -> Result<(String, bool)> {
        if let Some(row_id) = self.cached_row_id(domain_id).await {
            return Ok((row_id, true));
        }
        Ok((self.scan_row_id(config, domain_id).await?, false))
    }

    /// Repair path: list the whole table to find the row of a domain
    async fn scan_row_id(&self, config: &RemoteConfig, domain_id: &str) -> Result<String> {
        warn!("Row id of domain {} not cached, scanning remote table", domain_id);
        let rows = self.list_rows(config).await?;
        self.remember(&rows).await;

        rows.iter()
            .find(|row| row.fields.id.as_deref() == Some(domain_id))
            .map(|row| row.id.clone())
            .ok_or_else(|| DashboardError::NotFound(format!("domain {} in remote table", domain_id)))
    }

    async fn patch_row(&self, config: &RemoteConfig, row_id: &str, domain: &Domain) -> Result<Domain> {
        let url = Self::table_url(config, Some(row_id))?;
        debug!("PATCH {}", url);

        let response = self
            .http
            .patch(url)
            .bearer_auth(&config.api_key)
            .json(&RowWrite {
                fields: domain_to_fields(domain),
            })
            .send()
            .await?;
        let row: TableRow = read_json(response).await?;

        self.remember(std::slice::from_ref(&row)).await;
        row_to_domain(&row).ok_or_else(|| {
            DashboardError::RemoteRequestFailed {
                status: 200,
                message: "updated row has no domain id".to_string(),
            }
        })
    }

    async fn delete_row(&self, config: &RemoteConfig, row_id: &str) -> Result<()> {
        let url = Self::table_url(config, Some(row_id))?;
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(url)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(request_failed(status, &body));
        }
        Ok(())
    }

    pub async fn try_update(&self, domain: &Domain) -> Result<Domain> {
        let config = self.current_config().await?;
        let (row_id, cached) = self.resolve_row_id(&config, &domain.id).await?;

        match self.patch_row(&config, &row_id, domain).await {
            Err(DashboardError::RemoteRequestFailed { status: 404, .. }) if cached => {
                self.forget(&domain.id).await;
                let row_id = self.scan_row_id(&config, &domain.id).await?;
                self.patch_row(&config, &row_id, domain).await
            }
            other => other,
        }
    }

    pub async fn try_delete(&self, domain_id: &str) -> Result<()> {
        let config = self.current_config().await?;
        let (row_id, cached) = self.resolve_row_id(&config, domain_id).await?;

        let result = match self.delete_row(&config, &row_id).await {
            Err(DashboardError::RemoteRequestFailed { status: 404, .. }) if cached => {
                self.forget(domain_id).await;
                let row_id = self.scan_row_id(&config, domain_id).await?;
                self.delete_row(&config, &row_id).await
            }
            other => other,
        };

        if result.is_ok() {
            self.forget(domain_id).await;
        }
        result
    }
}

#[async_trait]
impl RemoteDomains for TableClient {
    async fn configure(&self, config: RemoteConfig) {
        info!(
            "Using remote table {}/{} with key {}",
            config.base_id,
            config.table_name,
            config.masked_key()
        );
        *self.config.write().await = Some(config);
        self.row_ids.lock().await.clear();
    }

    async fn is_configured(&self) -> bool {
        self.config
            .read()
            .await
            .as_ref()
            .map(RemoteConfig::is_complete)
            .unwrap_or(false)
    }

    async fn fetch(&self) -> Vec<Domain> {
        self.try_fetch().await.unwrap_or_else(|e| {
            error!("Error fetching domains from remote table: {}", e);
            Vec::new()
        })
    }

    async fn create(&self, domain: &Domain) -> Option<Domain> {
        match self.try_create_many(std::slice::from_ref(domain)).await {
            Ok(mut created) if !created.is_empty() => Some(created.remove(0)),
            Ok(_) => {
                error!("Remote table returned no row for domain {}", domain.id);
                None
            }
            Err(e) => {
                error!("Error creating domain in remote table: {}", e);
                None
            }
        }
    }

    async fn create_many(&self, domains: &[Domain]) -> Vec<Domain> {
        if domains.is_empty() {
            return Vec::new();
        }
        self.try_create_many(domains).await.unwrap_or_else(|e| {
            error!("Error creating {} domains in remote table: {}", domains.len(), e);
            Vec::new()
        })
    }

    async fn update(&self, domain: &Domain) -> Option<Domain> {
        self.try_update(domain)
            .await
            .map_err(|e| error!("Error updating domain {} in remote table: {}", domain.id, e))
            .ok()
    }

    async fn delete(&self, domain_id: &str) -> bool {
        match self.try_delete(domain_id).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error deleting domain {} from remote table: {}", domain_id, e);
                false
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(request_failed(status, &body));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Error for a non-2xx response; the service reports `{"error": {"message"}}` or `{"error": "CODE"}`
fn request_failed(status: StatusCode, body: &str) -> DashboardError {
    let value: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    let message = value["error"]["message"]
        .as_str()
        .or_else(|| value["error"].as_str())
        .or_else(|| status.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string();

    DashboardError::RemoteRequestFailed {
        status: status.as_u16(),
        message,
    }
}
