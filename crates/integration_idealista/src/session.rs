//! OAuth session for the Idealista mobile API
//!
//! The app authenticates itself, not a user: a client-credentials exchange
//! with the key and secret embedded in the app yields a bearer token. Each
//! exchange happens from a *terminal*, a `t` parameter derived from the
//! current time together with the device identifier hashed from it and a
//! user agent drawn from a fixed pool. Every authenticated call must send
//! the token together with the headers of the terminal that obtained it.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use domain::DomainError;
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::IdealistaConfig;
use crate::error::IdealistaError;

/// Header carrying the app build version
pub const APP_VERSION_HEADER: &str = "app_version";

/// Header carrying the device identifier
pub const DEVICE_IDENTIFIER_HEADER: &str = "device_identifier";

/// Hex characters kept from the digest of `t`
pub const DEVICE_IDENTIFIER_LEN: usize = 16;

/// `t` parameter: epoch seconds (microsecond resolution) times 10 000
#[must_use]
pub fn terminal_parameter(now: DateTime<Utc>) -> String {
    #[allow(clippy::cast_precision_loss)]
    let seconds = now.timestamp_micros() as f64 / 1_000_000.0;
    let scaled = seconds * 10_000.0;
    if scaled.fract() == 0.0 {
        format!("{scaled:.1}")
    } else {
        scaled.to_string()
    }
}

/// Last 16 hex characters of the SHA-256 digest of `t`
#[must_use]
pub fn device_identifier(t: &str) -> String {
    let digest = hex::encode(Sha256::digest(t.as_bytes()));
    digest[digest.len() - DEVICE_IDENTIFIER_LEN..].to_string()
}

/// The simulated device a token is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    t: String,
    device_identifier: String,
    user_agent: String,
    app_version: String,
}

impl Terminal {
    /// Build a terminal from an explicit `t` parameter
    pub fn new(
        t: impl Into<String>,
        user_agent: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        let t = t.into();
        Self {
            device_identifier: device_identifier(&t),
            t,
            user_agent: user_agent.into(),
            app_version: app_version.into(),
        }
    }

    /// Create a terminal for the given instant, picking a user agent at random
    pub fn create<R: Rng + ?Sized>(
        rng: &mut R,
        now: DateTime<Utc>,
        config: &IdealistaConfig,
    ) -> Self {
        let user_agent = config
            .user_agents
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        Self::new(terminal_parameter(now), user_agent, config.app_version.as_str())
    }

    #[must_use]
    pub fn t(&self) -> &str {
        &self.t
    }

    #[must_use]
    pub fn device_identifier(&self) -> &str {
        &self.device_identifier
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// The three terminal headers plus the given `Authorization` value
    ///
    /// # Errors
    ///
    /// Returns a validation error if a value is not a legal header value.
    pub fn headers(&self, authorization: &str) -> Result<HeaderMap, DomainError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);
        headers.insert(
            HeaderName::from_static(APP_VERSION_HEADER),
            header_value(&self.app_version)?,
        );
        headers.insert(
            HeaderName::from_static(DEVICE_IDENTIFIER_HEADER),
            header_value(&self.device_identifier)?,
        );
        let mut auth = header_value(authorization)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, DomainError> {
    HeaderValue::from_str(value)
        .map_err(|e| DomainError::validation(format!("invalid header value: {e}")))
}

/// A bearer token from the client-credentials exchange
#[derive(Clone)]
pub struct OAuthToken {
    access_token: SecretString,
    acquired_at: DateTime<Utc>,
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

impl OAuthToken {
    pub fn new(access_token: impl Into<String>, acquired_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            acquired_at,
        }
    }

    /// Extract the token from a raw token-endpoint response
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload is not a JSON object with a
    /// string `access_token`.
    pub fn parse(raw: &str, acquired_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let payload: Value = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation(format!("token payload is not JSON: {e}")))?;
        let token = payload
            .as_object()
            .ok_or_else(|| DomainError::validation("token payload must be a JSON object"))?
            .get("access_token")
            .ok_or_else(|| DomainError::missing_field("OAuthToken", "access_token"))?
            .as_str()
            .ok_or_else(|| DomainError::validation("access_token must be a string"))?;
        Ok(Self::new(token, acquired_at))
    }

    #[must_use]
    pub const fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

/// A token together with the terminal it is bound to
#[derive(Debug, Clone)]
pub struct Credentials {
    pub terminal: Terminal,
    pub token: OAuthToken,
}

impl Credentials {
    /// Headers for an authenticated call
    ///
    /// # Errors
    ///
    /// Returns a validation error if the token holds characters illegal in
    /// a header.
    pub fn headers(&self) -> Result<HeaderMap, DomainError> {
        self.terminal.headers(&self.token.bearer())
    }
}

/// Holds the current credentials; replacing them is serialized
#[derive(Debug)]
pub struct OAuthSession {
    http: Client,
    config: IdealistaConfig,
    credentials: ArcSwapOption<Credentials>,
    replace_lock: Mutex<()>,
}

impl OAuthSession {
    #[must_use]
    pub fn new(http: Client, config: &IdealistaConfig) -> Self {
        Self {
            http,
            config: config.clone(),
            credentials: ArcSwapOption::empty(),
            replace_lock: Mutex::new(()),
        }
    }

    /// Current credentials, if authenticated
    #[must_use]
    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        self.credentials.load_full()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.load().is_some()
    }

    /// Run the client-credentials exchange from a fresh terminal
    ///
    /// Returns the raw response body so callers can cache it. On failure the
    /// session is left unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`IdealistaError::AuthError`] on transport failure, a
    /// non-success status or a body without `access_token`.
    #[instrument(skip(self))]
    pub async fn authorize(&self) -> Result<String, IdealistaError> {
        let terminal = Terminal::create(&mut rand::rng(), Utc::now(), &self.config);
        let _guard = self.replace_lock.lock().await;

        let basic = format!("Basic {}", self.config.basic_credentials.expose_secret());
        let mut headers = terminal.headers(&basic)?;
        headers.insert(
            HeaderName::from_static("country"),
            header_value(&self.config.country)?,
        );

        let url = self.config.token_url();
        debug!(%url, device_identifier = terminal.device_identifier(), "Requesting token");

        match self.exchange(&url, headers).await {
            Ok(body) => {
                let token = OAuthToken::parse(&body, Utc::now()).map_err(|e| {
                    self.credentials.store(None);
                    IdealistaError::AuthError(e.to_string())
                })?;
                self.credentials
                    .store(Some(Arc::new(Credentials { terminal, token })));
                info!("Idealista session authorized");
                Ok(body)
            },
            Err(message) => {
                warn!(%url, payload = ?["grant_type", "scope"], error = %message, "Token exchange failed");
                self.credentials.store(None);
                Err(IdealistaError::AuthError(message))
            },
        }
    }

    async fn exchange(&self, url: &str, headers: HeaderMap) -> Result<String, String> {
        let response = self
            .http
            .post(url)
            .headers(headers)
            .form(&[("grant_type", "client_credentials"), ("scope", "write")])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        response.text().await.map_err(|e| e.to_string())
    }

    /// Adopt a previously obtained token response
    ///
    /// A fresh terminal is created for it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload holds no access token; the
    /// current credentials are kept in that case.
    pub async fn load_token(&self, raw: &str) -> Result<(), IdealistaError> {
        let token = OAuthToken::parse(raw, Utc::now())?;
        let terminal = Terminal::create(&mut rand::rng(), Utc::now(), &self.config);
        let _guard = self.replace_lock.lock().await;
        self.credentials
            .store(Some(Arc::new(Credentials { terminal, token })));
        debug!("Loaded cached Idealista token");
        Ok(())
    }
}
