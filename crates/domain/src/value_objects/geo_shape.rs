//! Polygon encodings of a bounding box
//!
//! Both listing APIs describe the search area as a closed five-vertex ring
//! in lon,lat order, starting at the south-west corner and running
//! counter-clockwise. One API takes it as a flat `lon,lat;lon,lat;...`
//! string, the other as a GeoJSON MultiPolygon with a `0` elevation on every
//! vertex.

use serde_json::{Value, json};

use super::{BoundingBox, GeoLocation};

/// Number of vertices in a closed rectangular ring
pub const RING_VERTICES: usize = 5;

/// Whether vertices carry a third (elevation) component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// `lon,lat`
    Omitted,
    /// `lon,lat,0`
    Zero,
}

/// Closed ring derived from a bounding box, vertices as `(lon, lat)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoShape {
    ring: [(f64, f64); RING_VERTICES],
    center: GeoLocation,
}

/// Wire encodings of a [`GeoShape`]
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedShape {
    /// Flat `;`-separated vertex list
    pub native_ring: String,
    /// GeoJSON MultiPolygon holding the same ring
    pub geo_json: String,
    /// Midpoint of the source box
    pub center: GeoLocation,
}

impl GeoShape {
    /// Build the ring for a bounding box
    #[must_use]
    pub fn from_bounding_box(bbox: &BoundingBox) -> Self {
        let (lat_0, lon_0) = (bbox.min_lat(), bbox.min_lon());
        let (lat_1, lon_1) = (bbox.max_lat(), bbox.max_lon());
        Self {
            ring: [
                (lon_0, lat_0),
                (lon_1, lat_0),
                (lon_1, lat_1),
                (lon_0, lat_1),
                (lon_0, lat_0),
            ],
            center: bbox.center(),
        }
    }

    /// Encode a bounding box in one step
    #[must_use]
    pub fn encode(bbox: &BoundingBox, elevation: Elevation) -> EncodedShape {
        let shape = Self::from_bounding_box(bbox);
        EncodedShape {
            native_ring: shape.native_ring(elevation),
            geo_json: shape.geo_json(elevation),
            center: shape.center,
        }
    }

    /// Ring vertices as `(lon, lat)`; the first and last are identical
    #[must_use]
    pub const fn vertices(&self) -> &[(f64, f64); RING_VERTICES] {
        &self.ring
    }

    /// Midpoint of the source bounding box
    #[must_use]
    pub const fn center(&self) -> GeoLocation {
        self.center
    }

    /// `lon,lat[,0];lon,lat[,0];...`
    #[must_use]
    pub fn native_ring(&self, elevation: Elevation) -> String {
        self.ring
            .iter()
            .map(|&(lon, lat)| match elevation {
                Elevation::Omitted => {
                    format!("{},{}", format_coordinate(lon), format_coordinate(lat))
                },
                Elevation::Zero => {
                    format!("{},{},0", format_coordinate(lon), format_coordinate(lat))
                },
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    /// GeoJSON MultiPolygon value (Polygon → ring → vertex)
    #[must_use]
    pub fn geo_json_value(&self, elevation: Elevation) -> Value {
        let ring: Vec<Value> = self
            .ring
            .iter()
            .map(|&(lon, lat)| match elevation {
                Elevation::Omitted => json!([lon, lat]),
                Elevation::Zero => json!([lon, lat, 0]),
            })
            .collect();
        json!({
            "type": "MultiPolygon",
            "coordinates": [[ring]],
        })
    }

    /// GeoJSON MultiPolygon rendered as a string
    #[must_use]
    pub fn geo_json(&self, elevation: Elevation) -> String {
        self.geo_json_value(elevation).to_string()
    }
}

/// Render a coordinate the way the mobile apps do: integral values keep a
/// trailing `.0`
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    let rendered = value.to_string();
    if !value.is_finite() || rendered.contains('.') {
        rendered
    } else {
        format!("{rendered}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> BoundingBox {
        BoundingBox::new(41.38, 2.15, 41.40, 2.19).unwrap()
    }

    #[test]
    fn ring_is_closed_and_counter_clockwise() {
        let shape = GeoShape::from_bounding_box(&sample_box());
        let v = shape.vertices();
        assert_eq!(v.len(), RING_VERTICES);
        assert_eq!(v[0], v[4]);
        assert_eq!(v[0], (2.15, 41.38));
        assert_eq!(v[1], (2.19, 41.38));
        assert_eq!(v[2], (2.19, 41.40));
        assert_eq!(v[3], (2.15, 41.40));
    }

    #[test]
    fn native_ring_without_elevation() {
        let shape = GeoShape::from_bounding_box(&sample_box());
        assert_eq!(
            shape.native_ring(Elevation::Omitted),
            "2.15,41.38;2.19,41.38;2.19,41.4;2.15,41.4;2.15,41.38"
        );
    }

    #[test]
    fn native_ring_with_zero_elevation() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0).unwrap();
        let shape = GeoShape::from_bounding_box(&bbox);
        assert_eq!(
            shape.native_ring(Elevation::Zero),
            "0.0,0.0,0;20.0,0.0,0;20.0,10.0,0;0.0,10.0,0;0.0,0.0,0"
        );
    }

    #[test]
    fn geo_json_nests_three_levels() {
        let shape = GeoShape::from_bounding_box(&sample_box());
        let value = shape.geo_json_value(Elevation::Zero);
        assert_eq!(value["type"], "MultiPolygon");
        let ring = value["coordinates"][0][0].as_array().unwrap();
        assert_eq!(ring.len(), RING_VERTICES);
        assert_eq!(ring[0], json!([2.15, 41.38, 0]));
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn geo_json_string_parses_back() {
        let encoded = GeoShape::encode(&sample_box(), Elevation::Zero);
        let parsed: Value = serde_json::from_str(&encoded.geo_json).unwrap();
        assert_eq!(parsed["coordinates"][0][0][2], json!([2.19, 41.40, 0]));
    }

    #[test]
    fn encode_carries_center() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0).unwrap();
        let encoded = GeoShape::encode(&bbox, Elevation::Omitted);
        assert!((encoded.center.latitude() - 5.0).abs() < f64::EPSILON);
        assert!((encoded.center.longitude() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn format_coordinate_keeps_decimal_point() {
        assert_eq!(format_coordinate(2.0), "2.0");
        assert_eq!(format_coordinate(-3.5), "-3.5");
        assert_eq!(format_coordinate(41.387_917), "41.387917");
    }
}
