//! Fotocasa response records
//!
//! Search responses wrap everything in a top-level `d` object holding the
//! `Properties` list and a `DataLayer` analytics string; suggestion responses
//! hold a `Suggest` list under the same `d`.

use std::collections::BTreeMap;

use domain::schema::{self, decode_list};
use domain::{DomainError, FromRecord, GeoLocation, Record, RecordSchema, SearchResultBatch};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

/// A listing returned by `/BoundingBoxSearchV2` or `/Search`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FotocasaProperty {
    fields: Record,
}

impl FromRecord for FotocasaProperty {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "FotocasaProperty",
        required: &[
            "Id",
            "PriceDescription",
            "X",
            "Y",
            "Surface",
            "Bathrooms",
            "OfferTypeId",
            "ListDate",
            "LocationDescription",
            "NRooms",
            "PromotionId",
            "IsDevelopment",
            "TitleDescription",
        ],
        optional: &[
            "Phone",
            "Photo",
            "PhotoSmall",
            "PhotoLarge",
            "PhotoMedium",
            "MediaList",
            "SubTitleDescription",
            "ProductList",
            "Distance",
            "PeriodicityId",
            "ShowPoi",
            "Comments",
        ],
    };

    fn from_record(fields: Record, _source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self { fields })
    }
}

impl FotocasaProperty {
    /// All declared attributes
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }

    /// Listing id, rendered as text
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.fields.text("Id")
    }

    /// Human readable price, e.g. `"950 €/mes"`
    #[must_use]
    pub fn price_description(&self) -> Option<&str> {
        self.fields.str("PriceDescription")
    }

    /// Listing title
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.str("TitleDescription")
    }

    /// Position from the `Y`/`X` fields, when both parse as valid coordinates
    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        let lat = self.fields.f64("Y")?;
        let lon = self.fields.f64("X")?;
        GeoLocation::new(lat, lon).ok()
    }

    /// Contact phone, when published
    #[must_use]
    pub fn phone(&self) -> Option<String> {
        self.fields.text("Phone")
    }
}

/// A location suggestion returned by `/GetSuggest`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FotocasaSuggestion {
    fields: Record,
}

impl FromRecord for FotocasaSuggestion {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "FotocasaSuggestion",
        required: &[
            "LocationLevel1",
            "LocationLevel2",
            "LocationLevel3",
            "LocationLevel4",
            "LocationLevel5",
            "X",
            "Y",
        ],
        optional: &["Text"],
    };

    fn from_record(fields: Record, _source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self { fields })
    }
}

impl FotocasaSuggestion {
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }

    /// Display text of the suggestion
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.fields.str("Text")
    }

    /// The five location-level codes, in level order
    #[must_use]
    pub fn location_codes(&self) -> Vec<String> {
        (1..=5)
            .map(|level| {
                self.fields
                    .text(&format!("LocationLevel{level}"))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Suggested search center
    ///
    /// # Errors
    ///
    /// Returns a validation error if `Y`/`X` are not valid coordinates.
    pub fn location(&self) -> Result<GeoLocation, DomainError> {
        let lat = self
            .fields
            .f64("Y")
            .ok_or_else(|| DomainError::validation("suggestion latitude is not numeric"))?;
        let lon = self
            .fields
            .f64("X")
            .ok_or_else(|| DomainError::validation("suggestion longitude is not numeric"))?;
        GeoLocation::new(lat, lon)
    }
}

/// Integer keys of the `DataLayer` string; missing ones read as 0
pub const METADATA_INT_KEYS: &[&str] = &[
    "language_id",
    "country_id",
    "region_level1_id",
    "region_level2_id",
    "county_id",
    "city_zone_id",
    "city_id",
    "locality_id",
    "district_id",
    "neighbourhood_id",
    "price_min",
    "price_max",
    "mts2_min",
    "mts2_max",
    "bathrooms_min",
    "rooms_min",
    "rooms_max",
    "transaction_id",
    "property_id",
    "property_sub_id",
    "search_results_position",
    "search_results_number",
];

/// String keys of the `DataLayer` string; missing ones read as empty
pub const METADATA_STR_KEYS: &[&str] = &["transaction", "property"];

/// Analytics metadata decoded from the URL-encoded `DataLayer` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FotocasaMetadata {
    #[serde(flatten)]
    integers: BTreeMap<&'static str, i64>,
    #[serde(flatten)]
    strings: BTreeMap<&'static str, String>,
}

impl Default for FotocasaMetadata {
    fn default() -> Self {
        Self {
            integers: METADATA_INT_KEYS.iter().map(|&k| (k, 0)).collect(),
            strings: METADATA_STR_KEYS.iter().map(|&k| (k, String::new())).collect(),
        }
    }
}

impl FotocasaMetadata {
    /// Parse a `key=value&key=value` string
    ///
    /// Only the known keys are kept. A token that is not a single
    /// `key=value` pair, or an integer key whose value does not parse, is
    /// logged and skipped. Values are taken verbatim, without
    /// percent-decoding.
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        let mut metadata = Self::default();
        for pair in encoded.split('&').filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=').filter(|(_, v)| !v.contains('=')) else {
                warn!(pair, "Skipping malformed metadata pair");
                continue;
            };
            if let Some(slot) = metadata.integers.get_mut(key) {
                match value.trim().parse() {
                    Ok(parsed) => *slot = parsed,
                    Err(e) => warn!(key, value, error = %e, "Skipping non-integer metadata value"),
                }
            } else if let Some(slot) = metadata.strings.get_mut(key) {
                *slot = value.to_string();
            }
        }
        metadata
    }

    /// Integer value of a known key
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.integers.get(key).copied()
    }

    /// String value of a known key
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }
}

/// Decoded `/BoundingBoxSearchV2` or `/Search` response
pub type FotocasaSearchResult = SearchResultBatch<FotocasaProperty, FotocasaMetadata>;

const SEARCH_RESPONSE: &str = "FotocasaSearchResponse";

/// Decode a search response
///
/// `d` must be present. A missing `Properties` list is an empty batch and
/// a missing `DataLayer` leaves the metadata unset. Any property missing a
/// required field fails the whole batch.
///
/// # Errors
///
/// Returns the first decode error found.
pub fn decode_search_response(body: &Value) -> Result<FotocasaSearchResult, DomainError> {
    let data = envelope(body, SEARCH_RESPONSE)?;

    let metadata = match data.get("DataLayer") {
        Some(Value::String(encoded)) => Some(FotocasaMetadata::parse(encoded)),
        Some(Value::Null) | None => None,
        Some(_) => {
            warn!("DataLayer is not a string, ignoring metadata");
            None
        },
    };

    let records = match data.get("Properties") {
        Some(Value::Null) | None => Vec::new(),
        Some(list) => decode_list::<FotocasaProperty>(list).inspect_err(|e| {
            error!(error = %e, "Failed to decode Fotocasa properties");
        })?,
    };

    Ok(SearchResultBatch::new(records).with_metadata(metadata))
}

/// Decode a `/GetSuggest` response; a missing `Suggest` list means none
///
/// # Errors
///
/// Returns the first decode error found.
pub fn decode_suggestions(body: &Value) -> Result<Vec<FotocasaSuggestion>, DomainError> {
    let data = envelope(body, "FotocasaSuggestResponse")?;
    match data.get("Suggest") {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(list) => decode_list::<FotocasaSuggestion>(list).inspect_err(|e| {
            error!(error = %e, "Failed to decode Fotocasa suggestions");
        }),
    }
}

fn envelope<'a>(body: &'a Value, name: &'static str) -> Result<&'a Map<String, Value>, DomainError> {
    let data = body
        .as_object()
        .ok_or_else(|| DomainError::validation(format!("{name} must be a JSON object")))?
        .get("d")
        .ok_or_else(|| DomainError::missing_field(name, "d"))?;
    data.as_object()
        .ok_or_else(|| DomainError::validation(format!("{name}.d must be a JSON object")))
}

/// Decode a single property object
///
/// # Errors
///
/// Returns a missing-field error naming the first absent required field.
pub fn decode_property(value: &Value) -> Result<FotocasaProperty, DomainError> {
    schema::decode(value)
}
