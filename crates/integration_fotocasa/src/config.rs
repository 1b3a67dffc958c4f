//! Fotocasa client configuration

use std::fmt;
use std::str::FromStr;

use domain::DeviceIdentity;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Deployment of the mobile API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FotocasaEnvironment {
    /// Production
    #[default]
    Pro,
    /// Pre-production
    Pre,
    /// Second pre-production host (TLS)
    Pre2,
    /// Development
    Dev,
    /// Integration
    Integra,
    /// UI-automation host (same as pre-production)
    Calabash,
}

impl FotocasaEnvironment {
    /// Base URL of the v3 SOAP-style JSON endpoints
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Pro => "https://ws.fotocasa.es/mobile/api/v3.asmx",
            Self::Pre | Self::Calabash => "http://prews.fotocasa.es/mobile/api/v3.asmx",
            Self::Pre2 => "https://prews2.fotocasa.es/mobile/api/v3.asmx",
            Self::Dev => "http://ws.dev.fotocasa.es/mobile/api/v3.asmx",
            Self::Integra => "http://ws.integra.fotocasa.es/mobile/api/v3.asmx",
        }
    }

    /// Base URL of the handler endpoints
    #[must_use]
    pub const fn handler_url(self) -> &'static str {
        match self {
            Self::Pro => "https://ws.fotocasa.es/mobile/api",
            Self::Pre | Self::Calabash => "http://prews.fotocasa.es/mobile/api",
            Self::Pre2 => "https://prews2.fotocasa.es/mobile/api",
            Self::Dev => "http://ws.dev.fotocasa.es/mobile/api",
            Self::Integra => "http://ws.integra.fotocasa.es/mobile/api",
        }
    }

    /// Resolve an alias, falling back to production for unknown names
    #[must_use]
    pub fn from_alias(alias: &str) -> Self {
        alias.parse().unwrap_or_default()
    }
}

impl FromStr for FotocasaEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRO" => Ok(Self::Pro),
            "PRE" => Ok(Self::Pre),
            "PRE2" => Ok(Self::Pre2),
            "DEV" => Ok(Self::Dev),
            "INTEGRA" => Ok(Self::Integra),
            "CALABASH" => Ok(Self::Calabash),
            _ => Err(format!("Unknown Fotocasa environment: {s}")),
        }
    }
}

/// Kind of estate, sent as a `(categoryTypeId, purchaseTypeId)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstateType {
    /// Second-hand homes
    #[default]
    Home,
    /// New-build homes
    NewHome,
    /// Garages
    Garage,
    /// Land (no rent offers)
    Land,
    /// Commercial premises
    Commercial,
    /// Offices
    Office,
    /// Storage rooms
    StorageRoom,
}

impl EstateType {
    /// `categoryTypeId` wire value
    #[must_use]
    pub const fn category_type_id(self) -> &'static str {
        match self {
            Self::Home | Self::NewHome => "2",
            Self::Garage => "3",
            Self::Land => "4",
            Self::Commercial => "5",
            Self::Office => "6",
            Self::StorageRoom => "7",
        }
    }

    /// `purchaseTypeId` wire value
    #[must_use]
    pub const fn purchase_type_id(self) -> &'static str {
        match self {
            Self::Home | Self::Garage => "2",
            _ => "1",
        }
    }
}

/// Offer type, sent as `offerTypeId`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    /// Purchase
    Buy,
    /// Long-term rent
    #[default]
    Rent,
    /// Lease transfer (commercial premises only)
    Transfer,
    /// Shared flats (homes only)
    Share,
    /// Rent with purchase option
    WithPurchaseOption,
    /// Holiday rental
    HolidayRental,
}

impl OfferType {
    /// `offerTypeId` wire value
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Buy => "1",
            Self::Rent => "3",
            Self::Transfer => "4",
            Self::Share => "5",
            Self::WithPurchaseOption => "7",
            Self::HolidayRental => "8",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Configuration for the Fotocasa mobile API client
#[derive(Clone, Serialize, Deserialize)]
pub struct FotocasaConfig {
    /// API deployment
    #[serde(default)]
    pub environment: FotocasaEnvironment,

    /// Explicit base URL, overriding the environment's
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Estate category searched
    #[serde(default)]
    pub estate_type: EstateType,

    /// Offer type searched
    #[serde(default)]
    pub offer_type: OfferType,

    /// Device identity used for signatures (random per client when unset)
    #[serde(default)]
    pub device_identity: Option<DeviceIdentity>,

    /// `User-Agent` of the Android app build being impersonated
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Passphrase the signature key is derived from (embedded in the app)
    #[serde(default = "default_cipher_passphrase", skip_serializing)]
    pub cipher_passphrase: SecretString,
}

impl fmt::Debug for FotocasaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FotocasaConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("estate_type", &self.estate_type)
            .field("offer_type", &self.offer_type)
            .field("device_identity", &self.device_identity)
            .field("user_agent", &self.user_agent)
            .field("cipher_passphrase", &"[REDACTED]")
            .finish()
    }
}

const fn default_timeout_secs() -> u64 {
    5
}

const fn default_page_size() -> u32 {
    200
}

fn default_user_agent() -> String {
    "AndroidApp/5.63 (6.0.1/23; Samsung; Samsung_S8; 3.10.48-g1abae1a; 4.0.0.04_20181125-1352)"
        .to_string()
}

fn default_cipher_passphrase() -> SecretString {
    SecretString::from("ftcipanuntis2009")
}

impl Default for FotocasaConfig {
    fn default() -> Self {
        Self {
            environment: FotocasaEnvironment::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            estate_type: EstateType::default(),
            offer_type: OfferType::default(),
            device_identity: None,
            user_agent: default_user_agent(),
            cipher_passphrase: default_cipher_passphrase(),
        }
    }
}

impl FotocasaConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            page_size: 36,
            ..Default::default()
        }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn endpoint_base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.as_deref().is_some_and(str::is_empty) {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = FotocasaConfig::default();
        assert_eq!(config.environment, FotocasaEnvironment::Pro);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.page_size, 200);
        assert_eq!(config.estate_type, EstateType::Home);
        assert_eq!(config.offer_type, OfferType::Rent);
        assert!(config.device_identity.is_none());
        assert_eq!(config.cipher_passphrase.expose_secret(), "ftcipanuntis2009");
        assert_eq!(
            config.endpoint_base(),
            "https://ws.fotocasa.es/mobile/api/v3.asmx"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = FotocasaConfig {
            base_url: Some("http://localhost:1234".to_string()),
            ..Default::default()
        };
        assert_eq!(config.endpoint_base(), "http://localhost:1234");
    }

    #[test]
    fn test_environment_aliases() {
        assert_eq!(FotocasaEnvironment::from_alias("pre"), FotocasaEnvironment::Pre);
        assert_eq!(FotocasaEnvironment::from_alias("PRE2"), FotocasaEnvironment::Pre2);
        assert_eq!(FotocasaEnvironment::from_alias("nope"), FotocasaEnvironment::Pro);
        assert_eq!(
            FotocasaEnvironment::Calabash.base_url(),
            FotocasaEnvironment::Pre.base_url()
        );
        assert_eq!(
            FotocasaEnvironment::Dev.handler_url(),
            "http://ws.dev.fotocasa.es/mobile/api"
        );
    }

    #[test]
    fn test_estate_type_ids() {
        assert_eq!(EstateType::Home.category_type_id(), "2");
        assert_eq!(EstateType::Home.purchase_type_id(), "2");
        assert_eq!(EstateType::NewHome.purchase_type_id(), "1");
        assert_eq!(EstateType::Garage.purchase_type_id(), "2");
        assert_eq!(EstateType::StorageRoom.category_type_id(), "7");
        assert_eq!(EstateType::Land.purchase_type_id(), "1");
    }

    #[test]
    fn test_offer_type_ids() {
        assert_eq!(OfferType::Buy.id(), "1");
        assert_eq!(OfferType::Rent.id(), "3");
        assert_eq!(OfferType::HolidayRental.id(), "8");
        assert_eq!(OfferType::WithPurchaseOption.to_string(), "7");
    }

    #[test]
    fn test_validation() {
        assert!(FotocasaConfig::default().validate().is_ok());
        assert!(
            FotocasaConfig {
                timeout_secs: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            FotocasaConfig {
                page_size: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            FotocasaConfig {
                base_url: Some(String::new()),
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FotocasaConfig = serde_json::from_str(
            r#"{"environment": "DEV", "estate_type": "garage", "device_identity": "536449977880378"}"#,
        )
        .unwrap();
        assert_eq!(config.environment, FotocasaEnvironment::Dev);
        assert_eq!(config.estate_type, EstateType::Garage);
        assert_eq!(config.page_size, 200);
        assert_eq!(
            config.device_identity.map(|d| d.to_string()).as_deref(),
            Some("536449977880378")
        );
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let rendered = format!("{:?}", FotocasaConfig::default());
        assert!(!rendered.contains("ftcipanuntis2009"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
