//! Idealista integration for CasaScout
//!
//! Client for the undocumented 3.5 mobile API used by the Idealista Android
//! app. The app authenticates itself with an OAuth2 client-credentials
//! exchange; the resulting token is bound to a synthetic *terminal* (a time
//! parameter, the device identifier hashed from it and a user agent) whose
//! headers accompany every search.
//!
//! # Architecture
//!
//! [`IdealistaClient`] defines the operations, implemented by
//! [`IdealistaApiClient`] on top of an [`OAuthSession`]. Searches post a
//! [`SearchForm`] with a [`SearchQuery`] and decode into
//! [`IdealistaListing`] records.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::BoundingBox;
//! use integration_idealista::{IdealistaApiClient, IdealistaClient, IdealistaConfig};
//!
//! let client = IdealistaApiClient::new(&IdealistaConfig::default())?;
//! let raw_token = client.authorize().await?;
//! let bbox = BoundingBox::new(41.38, 2.15, 41.40, 2.18)?;
//!
//! if let Some(batch) = client.search_by_bounding_box(&bbox, 1).await? {
//!     println!("{} of {:?} listings", batch.len(), batch.total);
//! }
//! ```

mod client;
mod config;
mod error;
mod models;
mod request;
mod session;

pub use client::{IdealistaApiClient, IdealistaClient};
pub use config::{IdealistaConfig, Operation, PropertyType};
pub use error::IdealistaError;
pub use models::{
    IdealistaContact, IdealistaDetailedType, IdealistaImage, IdealistaListing,
    IdealistaMultimedia, IdealistaPhone, IdealistaSearchResult, IdealistaSearchResults,
    decode_search_response,
};
pub use request::{M_POLYGONS, SEARCH_DISTANCE, SearchForm, SearchQuery};
pub use session::{
    APP_VERSION_HEADER, Credentials, DEVICE_IDENTIFIER_HEADER, DEVICE_IDENTIFIER_LEN, OAuthSession,
    OAuthToken, Terminal, device_identifier, terminal_parameter,
};
