//! Search request form and query parameters
//!
//! The values below are what the Android app sends for a map search; they
//! are part of the wire contract.

use domain::{BoundingBox, Elevation, GeoShape};
use serde::Serialize;

use crate::config::IdealistaConfig;

/// `mPolygons` value the app sends; a stringified Java object reference
pub const M_POLYGONS: &str = "[com.idealista.android.domain.model.polygon.Polygon@d58f746]";

/// Search radius in metres
pub const SEARCH_DISTANCE: u32 = 2000;

/// Form body of a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    pub order: String,
    pub m_polygons: String,
    pub property_type: String,
    pub locale: String,
    pub is_poi: String,
    pub max_items: u32,
    pub location_name: String,
    pub num_page: u32,
    pub operation: String,
    pub distance: u32,
    pub sort: String,
    pub height: u32,
    pub width: u32,
    pub gallery: String,
    pub quality: String,
}

impl SearchForm {
    /// App defaults for the configured search, without an area
    #[must_use]
    pub fn new(config: &IdealistaConfig) -> Self {
        Self {
            shape: None,
            order: "distance".to_string(),
            m_polygons: M_POLYGONS.to_string(),
            property_type: config.property_type.as_str().to_string(),
            locale: config.locale.clone(),
            is_poi: "true".to_string(),
            max_items: config.page_size,
            location_name: String::new(),
            num_page: 1,
            operation: config.operation.as_str().to_string(),
            distance: SEARCH_DISTANCE,
            sort: "asc".to_string(),
            height: 450,
            width: 600,
            gallery: "true".to_string(),
            quality: "high".to_string(),
        }
    }

    /// Search inside a bounding box, sent as a GeoJSON MultiPolygon
    #[must_use]
    pub fn for_bounding_box(config: &IdealistaConfig, bbox: &BoundingBox) -> Self {
        Self {
            shape: Some(GeoShape::encode(bbox, Elevation::Zero).geo_json),
            ..Self::new(config)
        }
    }

    /// Search by place name
    #[must_use]
    pub fn for_location(config: &IdealistaConfig, location_name: &str) -> Self {
        Self {
            location_name: location_name.to_string(),
            ..Self::new(config)
        }
    }

    /// Names of the form fields, for logging
    #[must_use]
    pub fn shape_of(&self) -> Vec<&'static str> {
        let mut fields = vec![
            "order",
            "mPolygons",
            "propertyType",
            "locale",
            "isPoi",
            "maxItems",
            "locationName",
            "numPage",
            "operation",
            "distance",
            "sort",
            "height",
            "width",
            "gallery",
            "quality",
        ];
        if self.shape.is_some() {
            fields.insert(0, "shape");
        }
        fields
    }
}

/// Query string of a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Requested page; pages below 1 are clamped to 1
    #[serde(rename = "numPage")]
    pub num_page: u32,
    /// Application key
    pub k: String,
    /// Terminal parameter of the current credentials
    pub t: String,
}

impl SearchQuery {
    #[must_use]
    pub fn new(page: u32, config: &IdealistaConfig, t: &str) -> Self {
        Self {
            num_page: page.max(1),
            k: config.client_key.clone(),
            t: t.to_string(),
        }
    }
}
