//! Request bodies for the Fotocasa mobile API
//!
//! Field names, defaults and value types mirror what the Android app sends;
//! they are part of the wire contract. Every model is built from its fixed
//! defaults first and caller values are applied on top. The `signature`
//! field is left empty here and filled by the client right before sending.

use domain::{BoundingBox, Elevation, GeoLocation, GeoShape, format_coordinate};
use serde::Serialize;

use crate::config::{EstateType, FotocasaConfig, OfferType};

/// Zoom level the app uses for map and radial searches
pub const MAP_ZOOM: u8 = 16;

/// Search radius, in metres, of radial searches
pub const DEFAULT_RADIUS: &str = "2000";

/// Suggestions requested per lookup
pub const SUGGESTION_MAX_ITEMS: &str = "10";

/// A request body carrying a per-request signature
pub trait SignedRequest: Serialize + Send + Sync {
    /// Attach a freshly computed signature
    fn set_signature(&mut self, signature: String);
}

/// Filter fields shared by every listing search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseFilter {
    pub offer_type_id: String,
    pub category_type_id: String,
    pub purchase_type_id: String,
    pub bathrooms: String,
    pub conservation_states: String,
    pub extras: String,
    pub language_id: String,
    pub latitude: String,
    pub locations: String,
    pub longitude: String,
    pub olap_origin_id: String,
    pub page: u32,
    pub page_size: u32,
    pub periodicity_ids: String,
    pub platform_id: String,
    pub portal_id: String,
    pub price_from: String,
    pub price_to: String,
    pub rooms_from: String,
    pub rooms_to: String,
    pub signature: String,
    pub subcategory_types: String,
    pub surface_from: String,
    pub surface_to: String,
    pub text: String,
}

impl BaseFilter {
    /// App defaults for an estate/offer combination
    #[must_use]
    pub fn new(estate_type: EstateType, offer_type: OfferType) -> Self {
        Self {
            offer_type_id: offer_type.id().to_string(),
            category_type_id: estate_type.category_type_id().to_string(),
            purchase_type_id: estate_type.purchase_type_id().to_string(),
            bathrooms: "0".to_string(),
            conservation_states: String::new(),
            extras: String::new(),
            language_id: "3".to_string(),
            latitude: String::new(),
            locations: String::new(),
            longitude: String::new(),
            olap_origin_id: "109".to_string(),
            page: 1,
            page_size: 36,
            periodicity_ids: "0".to_string(),
            platform_id: "4".to_string(),
            portal_id: "49".to_string(),
            price_from: "0".to_string(),
            price_to: "0".to_string(),
            rooms_from: "0".to_string(),
            rooms_to: "0".to_string(),
            signature: String::new(),
            subcategory_types: String::new(),
            surface_from: "0".to_string(),
            surface_to: "0".to_string(),
            text: String::new(),
        }
    }

    fn set_location(&mut self, location: GeoLocation) {
        self.latitude = format_coordinate(location.latitude());
        self.longitude = format_coordinate(location.longitude());
    }
}

/// Body of `/Search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub client_id: String,
    pub sort: String,
}

impl FilterRequest {
    #[must_use]
    pub fn new(estate_type: EstateType, offer_type: OfferType) -> Self {
        Self {
            base: BaseFilter::new(estate_type, offer_type),
            client_id: "0".to_string(),
            sort: "0".to_string(),
        }
    }
}

impl SignedRequest for FilterRequest {
    fn set_signature(&mut self, signature: String) {
        self.base.signature = signature;
    }
}

/// Body of `/BoundingBoxSearchV2`
///
/// With `disableClustering` set the service drops everything but ids and
/// coordinates, so it stays `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFilterRequest {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub disable_clustering: String,
    pub map_bounding_box: String,
    pub polygon: String,
    pub sort: String,
    pub zoom: u8,
}

impl MapFilterRequest {
    #[must_use]
    pub fn new(estate_type: EstateType, offer_type: OfferType) -> Self {
        Self {
            base: BaseFilter::new(estate_type, offer_type),
            disable_clustering: "false".to_string(),
            map_bounding_box: String::new(),
            polygon: String::new(),
            sort: "0".to_string(),
            zoom: MAP_ZOOM,
        }
    }

    /// Set the search area: a closed lon,lat ring plus its midpoint
    pub fn set_bounding_box(&mut self, bbox: &BoundingBox) {
        let shape = GeoShape::encode(bbox, Elevation::Omitted);
        self.map_bounding_box = shape.native_ring;
        self.base.set_location(shape.center);
    }
}

impl SignedRequest for MapFilterRequest {
    fn set_signature(&mut self, signature: String) {
        self.base.signature = signature;
    }
}

/// Radial search body: a point plus a fixed radius
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialFilterRequest {
    #[serde(flatten)]
    pub base: BaseFilter,
    pub radius: String,
    pub zoom: u8,
}

impl RadialFilterRequest {
    #[must_use]
    pub fn new(estate_type: EstateType, offer_type: OfferType) -> Self {
        Self {
            base: BaseFilter::new(estate_type, offer_type),
            radius: DEFAULT_RADIUS.to_string(),
            zoom: MAP_ZOOM,
        }
    }
}

impl SignedRequest for RadialFilterRequest {
    fn set_signature(&mut self, signature: String) {
        self.base.signature = signature;
    }
}

/// Body of `/GetSuggest`
///
/// Suggestions always use the app's home/rent ids regardless of the
/// configured search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub category_type_id: String,
    pub language_id: String,
    pub max_items: String,
    pub offer_type_id: String,
    pub purchase_type_id: String,
    pub signature: String,
    pub subcategory_types: String,
    pub text: String,
}

impl Default for SuggestionRequest {
    fn default() -> Self {
        Self {
            category_type_id: "2".to_string(),
            language_id: "3".to_string(),
            max_items: SUGGESTION_MAX_ITEMS.to_string(),
            offer_type_id: "3".to_string(),
            purchase_type_id: "2".to_string(),
            signature: String::new(),
            subcategory_types: "0".to_string(),
            text: String::new(),
        }
    }
}

impl SignedRequest for SuggestionRequest {
    fn set_signature(&mut self, signature: String) {
        self.signature = signature;
    }
}

/// Builds request bodies for the configured search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestModelBuilder {
    estate_type: EstateType,
    offer_type: OfferType,
    page_size: u32,
}

impl RequestModelBuilder {
    #[must_use]
    pub const fn new(estate_type: EstateType, offer_type: OfferType, page_size: u32) -> Self {
        Self {
            estate_type,
            offer_type,
            page_size,
        }
    }

    #[must_use]
    pub const fn from_config(config: &FotocasaConfig) -> Self {
        Self::new(config.estate_type, config.offer_type, config.page_size)
    }

    /// Map search over a bounding box; pages below 1 are clamped to 1
    #[must_use]
    pub fn bounding_box(&self, bbox: &BoundingBox, page: u32) -> MapFilterRequest {
        let mut model = MapFilterRequest::new(self.estate_type, self.offer_type);
        model.set_bounding_box(bbox);
        model.base.page_size = self.page_size;
        model.base.page = page.max(1);
        model
    }

    /// Search around a point, sorted by distance
    #[must_use]
    pub fn coordinates(&self, location: GeoLocation) -> FilterRequest {
        let mut model = FilterRequest::new(self.estate_type, self.offer_type);
        model.base.page_size = self.page_size;
        model.base.set_location(location);
        model.sort = "1".to_string();
        model
    }

    /// Search within location codes returned by a suggestion
    #[must_use]
    pub fn location_codes(&self, codes: &[String], location: GeoLocation) -> FilterRequest {
        let mut model = FilterRequest::new(self.estate_type, self.offer_type);
        model.base.locations = codes.join(",");
        model.base.page_size = self.page_size;
        model.base.set_location(location);
        model
    }

    /// Radial search around a point
    #[must_use]
    pub fn radial(&self, location: GeoLocation) -> RadialFilterRequest {
        let mut model = RadialFilterRequest::new(self.estate_type, self.offer_type);
        model.base.page_size = self.page_size;
        model.base.set_location(location);
        model
    }

    /// Location suggestions for free text
    #[must_use]
    pub fn suggestions(&self, text: &str) -> SuggestionRequest {
        SuggestionRequest {
            text: text.to_string(),
            ..SuggestionRequest::default()
        }
    }
}

/// Names of the top-level fields of a request body, for logging
#[must_use]
pub fn payload_shape<T: Serialize>(body: &T) -> Vec<String> {
    match serde_json::to_value(body) {
        Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}
