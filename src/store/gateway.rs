//! Record Store Gateway
//!
//! Thin executor for filtered read queries against the remote store's REST
//! interface. The gateway assumes well-formed filter formulas and returns
//! whatever the store yields in store-defined order; it follows the store's
//! pagination cursor until the result set is complete. It is not a query
//! planner.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::StoreConfig;
use crate::store::models::{RawRecord, RecordPage};

/// Failures surfaced by the gateway. Service-layer callers catch these,
/// log them, and degrade to empty results.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned HTTP {status} for collection '{collection}'")]
    Status {
        status: StatusCode,
        collection: String,
    },
}

/// A queryable source of raw records. The production implementation talks
/// to the remote store over HTTP; tests substitute an in-memory source.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// Execute a filtered read against a named collection, optionally
    /// restricted to a field subset to keep payloads small.
    async fn query(
        &self,
        collection: &str,
        filter: &str,
        fields: Option<&[&str]>,
    ) -> Result<Vec<RawRecord>, StoreError>;
}

/// HTTP client for the remote record store
pub struct RecordStore {
    client: Client,
    base: Url,
    base_id: String,
    api_key: String,
}

impl RecordStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let base = Url::parse(&config.api_url).expect("STORE_API_URL must be a valid URL");

        Self {
            client,
            base,
            base_id: config.base_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, collection: &str) -> Url {
        let mut url = self.base.clone();
        // The base URL is validated at construction, so segments always apply
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.base_id).push(collection);
        }
        url
    }
}

impl RecordSource for RecordStore {
    async fn query(
        &self,
        collection: &str,
        filter: &str,
        fields: Option<&[&str]>,
    ) -> Result<Vec<RawRecord>, StoreError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params: Vec<(&str, String)> =
                vec![("filterByFormula", filter.to_string())];
            if let Some(fields) = fields {
                for field in fields {
                    params.push(("fields[]", field.to_string()));
                }
            }
            if let Some(offset) = &cursor {
                params.push(("offset", offset.clone()));
            }

            let response = self
                .client
                .get(self.endpoint(collection))
                .bearer_auth(&self.api_key)
                .query(&params)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(StoreError::Status {
                    status: response.status(),
                    collection: collection.to_string(),
                });
            }

            let page: RecordPage = response.json().await?;
            records.extend(page.records);

            match page.offset {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            "Fetched {} records from collection '{}'",
            records.len(),
            collection
        );
        Ok(records)
    }
}
