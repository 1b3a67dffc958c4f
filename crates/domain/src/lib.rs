//! Domain layer for CasaScout
//!
//! Shared vocabulary of the listing integrations: search areas and their
//! polygon encodings, synthetic device identities, the schema-driven record
//! decoder and the result batch type.

pub mod entities;
pub mod errors;
pub mod schema;
pub mod value_objects;

pub use entities::*;
pub use errors::{DomainError, TransportFailure, TransportFailureKind};
pub use schema::{FromRecord, Record, RecordSchema};
pub use value_objects::*;
