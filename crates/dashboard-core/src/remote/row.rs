//! Mapping between domain records and remote table rows
//!
//! A row mirrors a domain field by field, except `tasks`, which the table
//! stores as one JSON-encoded string.

use chrono::{DateTime, Utc};
use dashboard_types::{tasks_from_json, Domain};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Column values of a row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub da: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A row as returned by the service, keyed by its native row id
#[derive(Debug, Clone, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub fields: RowFields,
}

/// Outgoing row body
#[derive(Debug, Clone, Serialize)]
pub struct RowWrite {
    pub fields: RowFields,
}

#[derive(Debug, Serialize)]
pub struct CreateRequest {
    pub records: Vec<RowWrite>,
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub records: Vec<TableRow>,
    /// Cursor for the next page, absent on the last one
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub records: Vec<TableRow>,
}

/// Columns for a domain. Missing DA/DR are written as 0 and `updatedAt` is stamped now.
pub fn domain_to_fields(domain: &Domain) -> RowFields {
    let tasks = match serde_json::to_string(&domain.tasks) {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Failed to encode tasks of {}: {}", domain.id, e);
            "[]".to_string()
        }
    };

    RowFields {
        id: Some(domain.id.clone()),
        name: Some(domain.name.clone()),
        url: Some(domain.url.clone()),
        da: Some(domain.da.unwrap_or(0) as f64),
        dr: Some(domain.dr.unwrap_or(0) as f64),
        tasks: Some(tasks),
        created_at: Some(domain.created_at.to_rfc3339()),
        updated_at: Some(Utc::now().to_rfc3339()),
    }
}

/// Rebuild a domain from a row.
///
/// Rows without a logical id are skipped. An undecodable `tasks` column
/// yields an empty checklist instead of dropping the row.
pub fn row_to_domain(row: &TableRow) -> Option<Domain> {
    let fields = &row.fields;
    let Some(id) = fields.id.clone().filter(|id| !id.is_empty()) else {
        warn!("Skipping remote row {} without a domain id", row.id);
        return None;
    };

    let tasks = match fields.tasks.as_deref() {
        Some(raw) if !raw.trim().is_empty() => tasks_from_json(raw).unwrap_or_else(|e| {
            error!("Error parsing tasks JSON of row {}: {}", row.id, e);
            Vec::new()
        }),
        _ => Vec::new(),
    };

    Some(Domain {
        id,
        name: fields.name.clone().unwrap_or_default(),
        url: fields.url.clone().unwrap_or_default(),
        da: fields.da.and_then(score),
        dr: fields.dr.and_then(score),
        tasks,
        created_at: parse_timestamp(fields.created_at.as_deref()),
        updated_at: parse_timestamp(fields.updated_at.as_deref()),
    })
}

fn score(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u32)
}

fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
