//! Infrastructure layer for CasaScout
//!
//! Configuration loading, the on-disk token and result store, and logging
//! setup shared by the binaries.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod token_store;

pub use config::{AppConfig, StorageConfig};
pub use error::InfrastructureError;
pub use telemetry::{init_tracing, log_filter_from_verbosity};
pub use token_store::{TOKEN_FILE_NAME, TokenStore};
