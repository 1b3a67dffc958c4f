//! Idealista client configuration

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Kind of property searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    #[default]
    Homes,
    Offices,
    /// Commercial premises
    Premises,
    Garages,
    Buildings,
    StorageRooms,
    Lands,
    /// Rooms in shared flats
    Bedrooms,
}

impl PropertyType {
    /// Wire value of `propertyType`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Homes => "homes",
            Self::Offices => "offices",
            Self::Premises => "premises",
            Self::Garages => "garages",
            Self::Buildings => "buildings",
            Self::StorageRooms => "storageRooms",
            Self::Lands => "lands",
            Self::Bedrooms => "bedrooms",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of transaction searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Rent,
    Sale,
}

impl Operation {
    /// Wire value of `operation`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Idealista mobile API client
#[derive(Clone, Serialize, Deserialize)]
pub struct IdealistaConfig {
    /// OAuth base URL; the token endpoint is `{oauth_base_url}/token`
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    /// Search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Results per page (`maxItems`)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Response language
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub property_type: PropertyType,

    #[serde(default)]
    pub operation: Operation,

    /// Application key sent as the `k` query parameter
    #[serde(default = "default_client_key")]
    pub client_key: String,

    /// `app_version` header of the impersonated app build
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// `country` header of the token exchange
    #[serde(default = "default_country")]
    pub country: String,

    /// Pool the per-terminal `User-Agent` is picked from
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Base64 `key:secret` of the app, sent as Basic auth to the token endpoint
    #[serde(default = "default_basic_credentials", skip_serializing)]
    pub basic_credentials: SecretString,
}

impl fmt::Debug for IdealistaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdealistaConfig")
            .field("oauth_base_url", &self.oauth_base_url)
            .field("search_url", &self.search_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("locale", &self.locale)
            .field("property_type", &self.property_type)
            .field("operation", &self.operation)
            .field("client_key", &self.client_key)
            .field("app_version", &self.app_version)
            .field("country", &self.country)
            .field("user_agents", &self.user_agents.len())
            .field("basic_credentials", &"[REDACTED]")
            .finish()
    }
}

fn default_oauth_base_url() -> String {
    "https://secure.idealista.com/api/oauth".to_string()
}

fn default_search_url() -> String {
    "https://secure.idealista.com/api/3.5/es/search".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_page_size() -> u32 {
    50
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_client_key() -> String {
    "5b85c03c16bbb85d96e232b112ee85dc".to_string()
}

fn default_app_version() -> String {
    "7.3.7".to_string()
}

fn default_country() -> String {
    "es".to_string()
}

fn default_user_agents() -> Vec<String> {
    [
        "Dalvik/2.1.0 (Linux; U; Android 6.0.1; SM-G930F Build/MMB29K)",
        "Dalvik/2.1.0 (Linux; U; Android 6.0.1; Aquaris E5 Build/MMB29M)",
        "Dalvik/2.1.0 (Linux; U; Android 6.0; LG-H815 Build/MRA58k)",
        "Dalvik/2.1.0 (Linux; U; Android 7.0; Moto C Plus Build/NRD90M.03.040)",
        "Dalvik/2.1.0 (Linux; U; Android 7.1.1; XT1710-02 Build/NDSS26.118-23-11)",
    ]
    .iter()
    .map(|ua| (*ua).to_string())
    .collect()
}

fn default_basic_credentials() -> SecretString {
    SecretString::from("NWI4NWMwM2MxNmJiYjg1ZDk2ZTIzMmIxMTJlZTg1ZGM6aWRlYSUzQmFuZHIwMWQ=")
}

impl Default for IdealistaConfig {
    fn default() -> Self {
        Self {
            oauth_base_url: default_oauth_base_url(),
            search_url: default_search_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            locale: default_locale(),
            property_type: PropertyType::default(),
            operation: Operation::default(),
            client_key: default_client_key(),
            app_version: default_app_version(),
            country: default_country(),
            user_agents: default_user_agents(),
            basic_credentials: default_basic_credentials(),
        }
    }
}

impl IdealistaConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            page_size: 20,
            ..Default::default()
        }
    }

    /// Token endpoint
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/token", self.oauth_base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.oauth_base_url.is_empty() {
            return Err("oauth_base_url must not be empty".to_string());
        }

        if self.search_url.is_empty() {
            return Err("search_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }

        if self.user_agents.is_empty() {
            return Err("user_agents must contain at least one entry".to_string());
        }

        Ok(())
    }
}
