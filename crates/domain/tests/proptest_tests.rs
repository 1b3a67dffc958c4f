//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::schema::{RecordSchema, decode_record};
use domain::value_objects::{
    BoundingBox, DeviceIdentity, Elevation, GeoShape, IDENTITY_DIGITS, RING_VERTICES,
    check_digit, passes_luhn,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// Check digit Property Tests
// ============================================================================

mod check_digit_tests {
    use super::*;

    proptest! {
        #[test]
        fn completed_identity_passes_luhn(partial in "[0-9]{14}") {
            let digit = check_digit(&partial);
            prop_assert!(digit <= 9);
            let full = format!("{partial}{digit}");
            prop_assert!(passes_luhn(&full));
        }

        #[test]
        fn check_digit_is_deterministic(partial in "[0-9]{14}") {
            prop_assert_eq!(check_digit(&partial), check_digit(&partial));
        }

        #[test]
        fn only_one_digit_completes_the_identity(partial in "[0-9]{14}") {
            let valid: Vec<u8> = (0..10u8)
                .filter(|d| passes_luhn(&format!("{partial}{d}")))
                .collect();
            prop_assert_eq!(valid, vec![check_digit(&partial)]);
        }

        #[test]
        fn seeded_identities_are_valid(seed in any::<u64>()) {
            let identity = DeviceIdentity::generate(&mut StdRng::seed_from_u64(seed));
            let rendered = identity.to_string();
            prop_assert_eq!(rendered.len(), IDENTITY_DIGITS);
            prop_assert!(passes_luhn(&rendered));
            prop_assert!(DeviceIdentity::parse(&rendered).is_ok());
        }
    }
}

// ============================================================================
// GeoShape Property Tests
// ============================================================================

mod geo_shape_tests {
    use super::*;

    fn any_box() -> impl Strategy<Value = BoundingBox> {
        (-90.0f64..=90.0, -90.0f64..=90.0, -180.0f64..=180.0, -180.0f64..=180.0).prop_map(
            |(a, b, lon_0, lon_1)| {
                BoundingBox::new(a.min(b), lon_0, a.max(b), lon_1).expect("ordered latitudes")
            },
        )
    }

    proptest! {
        #[test]
        fn ring_is_closed(bbox in any_box()) {
            let shape = GeoShape::from_bounding_box(&bbox);
            let vertices = shape.vertices();
            prop_assert_eq!(vertices.len(), RING_VERTICES);
            prop_assert_eq!(vertices[0], vertices[RING_VERTICES - 1]);
        }

        #[test]
        fn native_ring_has_five_vertices(bbox in any_box()) {
            let shape = GeoShape::from_bounding_box(&bbox);
            let plain = shape.native_ring(Elevation::Omitted);
            let parts: Vec<&str> = plain.split(';').collect();
            prop_assert_eq!(parts.len(), RING_VERTICES);
            prop_assert_eq!(parts[0], parts[RING_VERTICES - 1]);

            let elevated = shape.native_ring(Elevation::Zero);
            prop_assert!(elevated.split(';').all(|v| v.ends_with(",0")));
        }

        #[test]
        fn center_lies_between_extremes(bbox in any_box()) {
            let center = bbox.center();
            prop_assert!(center.latitude() >= bbox.min_lat());
            prop_assert!(center.latitude() <= bbox.max_lat());
        }

        #[test]
        fn inverted_latitudes_rejected(lat in 0.1f64..90.0, lon in -180.0f64..180.0) {
            prop_assert!(BoundingBox::new(lat, lon, -lat, lon).is_err());
        }
    }
}

// ============================================================================
// Record decoding Property Tests
// ============================================================================

mod schema_tests {
    use super::*;
    use serde_json::{Map, Value};

    const SCHEMA: RecordSchema = RecordSchema {
        name: "Sample",
        required: &["Id"],
        optional: &["Phone", "Price"],
    };

    proptest! {
        #[test]
        fn decoded_record_holds_exactly_declared_fields(
            id in "[0-9]{1,8}",
            extra_key in "[a-z]{3,10}",
            extra_value in "[a-z]{0,10}"
        ) {
            let mut object = Map::new();
            object.insert("Id".to_string(), Value::String(id.clone()));
            object.insert(extra_key.clone(), Value::String(extra_value));
            let record = decode_record(&Value::Object(object), &SCHEMA).unwrap();

            prop_assert_eq!(record.len(), 3);
            prop_assert_eq!(record.str("Id"), Some(id.as_str()));
            prop_assert!(record.contains("Phone"));
            prop_assert!(record.is_null("Price"));
            prop_assert!(!record.contains(&extra_key));
        }
    }
}
