//! Search commands
//!
//! Thin orchestration over the platform clients: pick the operation for a
//! target, manage the cached Idealista token and serialize the batch.

use anyhow::{Context, Result};
use domain::{BoundingBox, SearchResultBatch};
use infrastructure::TokenStore;
use integration_fotocasa::FotocasaClient;
use integration_idealista::IdealistaClient;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// What to search for
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTarget {
    BoundingBox { bbox: BoundingBox, page: u32 },
    Location { name: String, page: u32 },
}

/// A decoded batch ready for printing
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub count: usize,
    pub total: Option<u64>,
    pub body: Value,
}

impl Outcome {
    fn from_batch<R: Serialize, M: Serialize>(batch: &SearchResultBatch<R, M>) -> Result<Self> {
        Ok(Self {
            count: batch.len(),
            total: batch.total,
            body: serde_json::to_value(batch).context("Failed to serialize results")?,
        })
    }
}

/// Run a Fotocasa search; `None` when the request failed
pub async fn fotocasa(client: &dyn FotocasaClient, target: &SearchTarget) -> Result<Option<Outcome>> {
    let batch = match target {
        SearchTarget::BoundingBox { bbox, page } => {
            client.search_by_bounding_box(bbox, *page).await?
        },
        SearchTarget::Location { name, .. } => client.search_by_location(name).await?,
    };
    batch.as_ref().map(Outcome::from_batch).transpose()
}

/// Run an Idealista search; `None` when the request failed
pub async fn idealista(
    client: &dyn IdealistaClient,
    target: &SearchTarget,
) -> Result<Option<Outcome>> {
    let batch = match target {
        SearchTarget::BoundingBox { bbox, page } => {
            client.search_by_bounding_box(bbox, *page).await?
        },
        SearchTarget::Location { name, page } => client.search_by_location(name, *page).await?,
    };
    batch.as_ref().map(Outcome::from_batch).transpose()
}

/// Load the cached token, or authorize and cache a new one
pub async fn ensure_session(client: &dyn IdealistaClient, store: &TokenStore) -> Result<()> {
    if let Some(raw) = store.load_token().await? {
        match client.load_token(&raw).await {
            Ok(()) => {
                let written = store.token_date().await?;
                debug!(path = %store.token_path().display(), ?written, "Using cached token");
                return Ok(());
            },
            Err(e) => {
                warn!(path = %store.token_path().display(), error = %e, "Cached token unusable");
            },
        }
    }

    let raw = client
        .authorize()
        .await
        .context("Idealista authorization failed")?;
    store.store_token(&raw).await?;
    info!("Idealista token cached");
    Ok(())
}
