//! Normalization used for duplicate detection

use dashboard_types::Domain;
use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// Lower-case, drop a leading http(s) scheme and one trailing slash
pub fn normalize_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let without_scheme = SCHEME_RE.replace(&lowered, "");
    without_scheme
        .strip_suffix('/')
        .unwrap_or(&without_scheme)
        .to_string()
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Same site by URL or by name
pub fn is_duplicate(domain: &Domain, normalized_url: &str, normalized_name: &str) -> bool {
    normalize_url(&domain.url) == normalized_url || normalize_name(&domain.name) == normalized_name
}

/// URL form stored for bulk-added entries: keep an explicit scheme, else assume https
pub fn canonical_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
