//! Idealista mobile API client
//!
//! Searches require credentials from [`IdealistaClient::authorize`] or
//! [`IdealistaClient::load_token`]. Transport failures are logged and
//! reported as `Ok(None)`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::{BoundingBox, DomainError, TransportFailure, TransportFailureKind};
use parking_lot::Mutex;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::IdealistaConfig;
use crate::error::IdealistaError;
use crate::models::{IdealistaSearchResult, decode_search_response};
use crate::request::{SearchForm, SearchQuery};
use crate::session::OAuthSession;

/// Trait for Idealista search clients
#[async_trait]
pub trait IdealistaClient: Send + Sync {
    /// Obtain a token; returns the raw token response for caching
    async fn authorize(&self) -> Result<String, IdealistaError>;

    /// Adopt a cached token response
    async fn load_token(&self, raw: &str) -> Result<(), IdealistaError>;

    /// Listings inside a bounding box
    async fn search_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        page: u32,
    ) -> Result<Option<IdealistaSearchResult>, IdealistaError>;

    /// Listings for a place name
    async fn search_by_location(
        &self,
        location_name: &str,
        page: u32,
    ) -> Result<Option<IdealistaSearchResult>, IdealistaError>;
}

/// Client for the Idealista 3.5 mobile API
#[derive(Debug)]
pub struct IdealistaApiClient {
    client: Client,
    config: IdealistaConfig,
    session: OAuthSession,
    last_request_time: Mutex<Option<Duration>>,
}

impl IdealistaApiClient {
    /// Create a new, unauthenticated client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &IdealistaConfig) -> Result<Self, IdealistaError> {
        config
            .validate()
            .map_err(IdealistaError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdealistaError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            session: OAuthSession::new(client.clone(), config),
            client,
            config: config.clone(),
            last_request_time: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn session(&self) -> &OAuthSession {
        &self.session
    }

    /// Round-trip time of the last completed search
    #[must_use]
    pub fn last_request_time(&self) -> Option<Duration> {
        *self.last_request_time.lock()
    }

    async fn search(
        &self,
        page: u32,
        form: SearchForm,
    ) -> Result<Option<IdealistaSearchResult>, IdealistaError> {
        let credentials = self
            .session
            .credentials()
            .ok_or(IdealistaError::NotAuthorized)?;
        let headers = credentials.headers()?;
        let query = SearchQuery::new(page, &self.config, credentials.terminal.t());
        let url = self.config.search_url.as_str();

        let start = Instant::now();
        let response = match self.send(url, headers, &query, &form).await {
            Ok(value) => {
                let elapsed = start.elapsed();
                *self.last_request_time.lock() = Some(elapsed);
                debug!(%url, time_ms = elapsed.as_millis(), "Idealista request completed");
                value
            },
            Err(failure) => {
                warn!(
                    %url,
                    payload = ?form.shape_of(),
                    kind = %failure.kind,
                    retryable = failure.is_retryable(),
                    error = %failure.message,
                    "Idealista request failed"
                );
                return Ok(None);
            },
        };

        let batch = decode_search_response(&response)?;
        debug!(
            count = batch.len(),
            total = ?batch.total,
            total_pages = ?batch.total_pages,
            "Idealista listings decoded"
        );
        Ok(Some(batch))
    }

    async fn send(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &SearchQuery,
        form: &SearchForm,
    ) -> Result<Value, TransportFailure> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .query(query)
            .form(form)
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
}

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

#[async_trait]
impl IdealistaClient for IdealistaApiClient {
    async fn authorize(&self) -> Result<String, IdealistaError> {
        self.session.authorize().await
    }

    async fn load_token(&self, raw: &str) -> Result<(), IdealistaError> {
        self.session.load_token(raw).await
    }

    #[instrument(skip(self, bbox), fields(bbox = %bbox))]
    async fn search_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        page: u32,
    ) -> Result<Option<IdealistaSearchResult>, IdealistaError> {
        info!("Searching Idealista by bounding box");
        self.search(page, SearchForm::for_bounding_box(&self.config, bbox))
            .await
    }

    #[instrument(skip(self))]
    async fn search_by_location(
        &self,
        location_name: &str,
        page: u32,
    ) -> Result<Option<IdealistaSearchResult>, IdealistaError> {
        let location_name = location_name.trim();
        if location_name.is_empty() {
            return Err(DomainError::validation("location name must not be empty").into());
        }
        info!("Searching Idealista by location name");
        self.search(page, SearchForm::for_location(&self.config, location_name))
            .await
    }
}
