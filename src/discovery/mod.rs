//! One-shot introspection of an endpoint's response into selectable field paths.

pub mod walker;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{validate_url, JsonFetcher};
use crate::json_path::FieldPath;

pub use walker::enumerate_fields;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const DEFAULT_MAX_DEPTH: usize = 4;
pub const DEFAULT_MAX_FIELDS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryOptions {
    /// Maximum number of segments in a discovered path.
    pub max_depth: usize,
    /// Enumeration stops once this many paths are collected.
    pub max_fields: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub success: bool,
    pub fields: Vec<FieldPath>,
    /// The parsed sample document, kept for previewing field values.
    #[serde(alias = "sampleData")]
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl DiscoveryResult {
    pub fn succeeded(fields: Vec<FieldPath>, data: Value) -> Self {
        Self {
            success: true,
            fields,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            fields: Vec::new(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// Status line shown next to the "test connection" button.
    pub fn summary(&self) -> String {
        if self.success {
            format!("API connection successful! {} fields found.", self.fields.len())
        } else {
            self.error
                .clone()
                .unwrap_or_else(|| "Failed to connect to API".to_string())
        }
    }
}

/// Fetches `url` once and enumerates its fields. Failures are reported in the
/// result, never partially: a failed discovery carries no fields.
pub async fn discover(
    fetcher: &dyn JsonFetcher,
    url: &str,
    options: &DiscoveryOptions,
) -> DiscoveryResult {
    let url = url.trim();
    if let Err(err) = validate_url(url) {
        return DiscoveryResult::failed(err.to_string());
    }

    let doc = match fetcher.fetch_json(url).await {
        Ok(doc) => doc,
        Err(err) => {
            log_warn!("discovery failed for {}: {}", url, err);
            return DiscoveryResult::failed(err.to_string());
        }
    };

    let fields = enumerate_fields(&doc, options);
    log_info!("discovered {} fields at {}", fields.len(), url);
    DiscoveryResult::succeeded(fields, doc)
}
