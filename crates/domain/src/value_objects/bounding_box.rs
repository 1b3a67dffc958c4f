//! Bounding box value object

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoLocation;
use crate::errors::DomainError;

/// Axis-aligned latitude/longitude rectangle
///
/// Longitudes are taken as given: a box crossing the antimeridian is not
/// normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl BoundingBox {
    /// Create a bounding box from its south-west and north-east extremes
    ///
    /// # Errors
    ///
    /// Returns a validation error if any coordinate is not finite or
    /// `min_lat` is greater than `max_lat`.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self, DomainError> {
        if ![min_lat, min_lon, max_lat, max_lon].iter().all(|c| c.is_finite()) {
            return Err(DomainError::validation("bounding box coordinates must be finite"));
        }
        if min_lat > max_lat {
            return Err(DomainError::validation(format!(
                "bounding box min_lat {min_lat} is greater than max_lat {max_lat}"
            )));
        }
        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }

    /// Southern latitude
    #[must_use]
    pub const fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Western longitude
    #[must_use]
    pub const fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Northern latitude
    #[must_use]
    pub const fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Eastern longitude
    #[must_use]
    pub const fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Arithmetic mean of the latitude and longitude extremes
    ///
    /// Near the antimeridian (`min_lon = 179`, `max_lon = -179`) this lands on
    /// the opposite side of the globe. Kept as the plain midpoint because the
    /// remote services were only ever fed this value.
    #[must_use]
    pub fn center(&self) -> GeoLocation {
        GeoLocation::new_unchecked(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {} - {}, {})",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
