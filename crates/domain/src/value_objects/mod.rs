//! Value Objects - Immutable, identity-less domain primitives

mod bounding_box;
mod device_identity;
mod geo_location;
mod geo_shape;

pub use bounding_box::BoundingBox;
pub use device_identity::{
    DeviceIdentity, IDENTITY_DIGITS, REPORTING_BODY_IDS, check_digit, passes_luhn,
};
pub use geo_location::GeoLocation;
pub use geo_shape::{EncodedShape, Elevation, GeoShape, RING_VERTICES, format_coordinate};
