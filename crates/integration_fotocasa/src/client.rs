//! Fotocasa mobile API client
//!
//! Every call is signed just before it is sent. Transport failures (no
//! connection, timeout, error status, non-JSON body) are logged and reported
//! as `Ok(None)`; an empty batch means the search matched nothing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::{
    BoundingBox, DeviceIdentity, DomainError, GeoLocation, TransportFailure, TransportFailureKind,
};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::FotocasaConfig;
use crate::error::FotocasaError;
use crate::models::{
    FotocasaSearchResult, FotocasaSuggestion, decode_search_response, decode_suggestions,
};
use crate::request::{RequestModelBuilder, SignedRequest, payload_shape};
use crate::signer::RequestSigner;

const BOUNDING_BOX_SEARCH: &str = "/BoundingBoxSearchV2";
const SEARCH: &str = "/Search";
const GET_SUGGEST: &str = "/GetSuggest";

/// Trait for Fotocasa search clients
#[async_trait]
pub trait FotocasaClient: Send + Sync {
    /// Listings inside a bounding box, one page at a time
    async fn search_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        page: u32,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError>;

    /// Listings around a point, nearest first
    async fn search_by_coordinates(
        &self,
        location: GeoLocation,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError>;

    /// Location suggestions for free text
    async fn get_suggestions(
        &self,
        text: &str,
    ) -> Result<Option<Vec<FotocasaSuggestion>>, FotocasaError>;

    /// Listings within the given location codes
    async fn search_by_location_codes(
        &self,
        codes: &[String],
        location: GeoLocation,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError>;

    /// Listings for a place name, resolved through the first suggestion
    async fn search_by_location(
        &self,
        text: &str,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError>;
}

/// Client for the Fotocasa v3 mobile API
#[derive(Debug)]
pub struct FotocasaApiClient {
    client: Client,
    config: FotocasaConfig,
    signer: RequestSigner,
    identity: DeviceIdentity,
    models: RequestModelBuilder,
    last_request_time: Mutex<Option<Duration>>,
}

impl FotocasaApiClient {
    /// Create a new client
    ///
    /// Uses the configured device identity, or synthesizes one that is kept
    /// for the lifetime of the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &FotocasaConfig) -> Result<Self, FotocasaError> {
        config.validate().map_err(FotocasaError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FotocasaError::ConfigurationError(e.to_string()))?;

        let identity = config
            .device_identity
            .clone()
            .unwrap_or_else(DeviceIdentity::generate_random);
        debug!(%identity, environment = ?config.environment, "Fotocasa client ready");

        Ok(Self {
            client,
            config: config.clone(),
            signer: RequestSigner::from_passphrase(&config.cipher_passphrase),
            identity,
            models: RequestModelBuilder::from_config(config),
            last_request_time: Mutex::new(None),
        })
    }

    /// Device identity requests are signed with
    #[must_use]
    pub const fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Round-trip time of the last completed request
    #[must_use]
    pub fn last_request_time(&self) -> Option<Duration> {
        *self.last_request_time.lock()
    }

    /// Sign a body, post it and parse the JSON answer
    async fn post_signed<M: SignedRequest>(
        &self,
        endpoint: &str,
        mut body: M,
    ) -> Result<Option<Value>, FotocasaError> {
        body.set_signature(self.signer.sign_now(&self.identity.to_string())?);
        let url = format!("{}{endpoint}", self.config.endpoint_base());

        let start = Instant::now();
        match self.send(&url, &body).await {
            Ok(value) => {
                let elapsed = start.elapsed();
                *self.last_request_time.lock() = Some(elapsed);
                debug!(%url, time_ms = elapsed.as_millis(), "Fotocasa request completed");
                Ok(Some(value))
            },
            Err(failure) => {
                warn!(
                    %url,
                    payload = ?payload_shape(&body),
                    kind = %failure.kind,
                    retryable = failure.is_retryable(),
                    error = %failure.message,
                    "Fotocasa request failed"
                );
                Ok(None)
            },
        }
    }

    async fn send<M: Serialize + Sync>(
        &self,
        url: &str,
        body: &M,
    ) -> Result<Value, TransportFailure> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failure(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::new(
                TransportFailureKind::Status(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| TransportFailure::new(TransportFailureKind::InvalidBody, e.to_string()))?;

        serde_json::from_str(&text)
            .map_err(|e| TransportFailure::new(TransportFailureKind::InvalidBody, e.to_string()))
    }

    async fn search(
        &self,
        endpoint: &str,
        body: impl SignedRequest,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError> {
        let Some(response) = self.post_signed(endpoint, body).await? else {
            return Ok(None);
        };
        let batch = decode_search_response(&response)?;
        debug!(count = batch.len(), "Fotocasa listings decoded");
        Ok(Some(batch))
    }
}

/// Classify a reqwest error
fn transport_failure(err: &reqwest::Error) -> TransportFailure {
    let kind = if err.is_timeout() {
        TransportFailureKind::Timeout
    } else if err.is_connect() {
        TransportFailureKind::Connection
    } else {
        TransportFailureKind::Other
    };
    TransportFailure::new(kind, err.to_string())
}

fn require_text(text: &str) -> Result<&str, FotocasaError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("location text must not be empty").into());
    }
    Ok(text)
}

#[async_trait]
impl FotocasaClient for FotocasaApiClient {
    #[instrument(skip(self, bbox), fields(bbox = %bbox))]
    async fn search_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        page: u32,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError> {
        let body = self.models.bounding_box(bbox, page);
        info!(page = body.base.page, "Searching Fotocasa by bounding box");
        self.search(BOUNDING_BOX_SEARCH, body).await
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn search_by_coordinates(
        &self,
        location: GeoLocation,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError> {
        info!("Searching Fotocasa by coordinates");
        self.search(SEARCH, self.models.coordinates(location)).await
    }

    #[instrument(skip(self))]
    async fn get_suggestions(
        &self,
        text: &str,
    ) -> Result<Option<Vec<FotocasaSuggestion>>, FotocasaError> {
        let text = require_text(text)?;
        let Some(response) = self.post_signed(GET_SUGGEST, self.models.suggestions(text)).await?
        else {
            return Ok(None);
        };
        let suggestions = decode_suggestions(&response)?;
        debug!(count = suggestions.len(), "Fotocasa suggestions decoded");
        Ok(Some(suggestions))
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn search_by_location_codes(
        &self,
        codes: &[String],
        location: GeoLocation,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError> {
        self.search(SEARCH, self.models.location_codes(codes, location))
            .await
    }

    #[instrument(skip(self))]
    async fn search_by_location(
        &self,
        text: &str,
    ) -> Result<Option<FotocasaSearchResult>, FotocasaError> {
        let Some(suggestions) = self.get_suggestions(text).await? else {
            return Ok(None);
        };
        let Some(first) = suggestions.first() else {
            info!("No Fotocasa location matches the text");
            return Ok(None);
        };
        let codes = first.location_codes();
        let location = first.location()?;
        debug!(?codes, %location, "Resolved location suggestion");
        self.search_by_location_codes(&codes, location).await
    }
}
