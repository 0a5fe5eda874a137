//! Category unit lookup
//!
//! Asks a remote unit service which units a category offers and falls back
//! to the local catalog whenever that fails.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::catalog::{UnitCatalog, UnitOption};

/// Remote lookup error types
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unit service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Where a unit listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitListSource {
    Remote,
    Local,
}

/// Units offered for a category
#[derive(Debug, Clone, Serialize)]
pub struct UnitListing {
    pub category_id: i64,
    pub units: Vec<UnitOption>,
    pub source: UnitListSource,
}

/// Category unit lookup with local fallback
pub struct UnitLookup {
    client: reqwest::Client,
    base_url: Option<String>,
    catalog: &'static UnitCatalog,
}

impl UnitLookup {
    /// Create a lookup. With no base URL every listing is served locally.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            catalog: UnitCatalog::standard(),
        })
    }

    /// A lookup that never leaves the process
    pub fn local() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
            catalog: UnitCatalog::standard(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Fetch `{base}/categories/{id}/units`
    pub async fn fetch_remote(&self, base_url: &str, category_id: i64) -> Result<Vec<UnitOption>, RemoteError> {
        let url = format!("{}/categories/{}/units", base_url, category_id);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(response.json::<Vec<UnitOption>>().await?)
    }

    /// Units for a category, preferring the remote service
    pub async fn units_for_category(&self, category_id: i64) -> UnitListing {
        if let Some(base_url) = &self.base_url {
            match self.fetch_remote(base_url, category_id).await {
                Ok(units) => {
                    tracing::debug!(category_id, count = units.len(), "Units served by remote service");
                    return UnitListing {
                        category_id,
                        units,
                        source: UnitListSource::Remote,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "Unit service lookup for category {} failed, using local catalog: {}",
                        category_id,
                        e
                    );
                }
            }
        }

        UnitListing {
            category_id,
            units: self.catalog.list_units_for_category(Some(category_id)),
            source: UnitListSource::Local,
        }
    }
}
