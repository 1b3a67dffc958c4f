//! Fotocasa integration for CasaScout
//!
//! Client for the undocumented v3 mobile API used by the Fotocasa Android
//! app. Each request carries a signature built from a synthetic device
//! identity and the current time, AES-128-CBC encrypted with a key derived
//! from a passphrase embedded in the app (see [`RequestSigner`]).
//!
//! # Architecture
//!
//! [`FotocasaClient`] defines the search operations, implemented by
//! [`FotocasaApiClient`]. Request bodies are assembled by
//! [`RequestModelBuilder`] and responses are decoded into schema-checked
//! records ([`FotocasaProperty`], [`FotocasaSuggestion`]) plus the
//! [`FotocasaMetadata`] side channel.
//!
//! [`RadialFilterRequest`] is exported as a wire model only; no client
//! operation sends it.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::BoundingBox;
//! use integration_fotocasa::{FotocasaApiClient, FotocasaClient, FotocasaConfig};
//!
//! let client = FotocasaApiClient::new(&FotocasaConfig::default())?;
//! let bbox = BoundingBox::new(40.40, -3.72, 40.43, -3.68)?;
//!
//! match client.search_by_bounding_box(&bbox, 1).await? {
//!     Some(batch) => println!("{} listings", batch.len()),
//!     None => println!("request failed"),
//! }
//! ```

mod client;
mod config;
mod error;
mod models;
mod request;
mod signer;

pub use client::{FotocasaApiClient, FotocasaClient};
pub use config::{EstateType, FotocasaConfig, FotocasaEnvironment, OfferType};
pub use error::FotocasaError;
pub use models::{
    FotocasaMetadata, FotocasaProperty, FotocasaSearchResult, FotocasaSuggestion,
    METADATA_INT_KEYS, METADATA_STR_KEYS, decode_property, decode_search_response,
    decode_suggestions,
};
pub use request::{
    BaseFilter, DEFAULT_RADIUS, FilterRequest, MAP_ZOOM, MapFilterRequest, RadialFilterRequest,
    RequestModelBuilder, SignedRequest, SuggestionRequest, payload_shape,
};
pub use signer::{
    BLOCK_SIZE, EncryptionKey, RequestSigner, SIGNATURE_PAYLOAD_LEN, TIMESTAMP_DIGITS, pkcs7_pad,
    pkcs7_unpad, signature_payload, signature_timestamp,
};
