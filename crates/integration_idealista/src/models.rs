//! Idealista response records

use domain::schema::{decode, decode_list, decode_nested};
use domain::{DomainError, FromRecord, GeoLocation, Record, RecordSchema, SearchResultBatch};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

/// A listing photo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdealistaImage {
    fields: Record,
}

impl FromRecord for IdealistaImage {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaImage",
        required: &["url"],
        optional: &["multimediaTag"],
    };

    fn from_record(fields: Record, _source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self { fields })
    }
}

impl IdealistaImage {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.fields.str("url")
    }

    /// Room or feature the photo shows, e.g. `"kitchen"`
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.fields.str("multimediaTag")
    }
}

/// Media attached to a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdealistaMultimedia {
    pub images: Vec<IdealistaImage>,
}

impl FromRecord for IdealistaMultimedia {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaMultimedia",
        required: &[],
        optional: &[],
    };

    fn from_record(_fields: Record, source: &Map<String, Value>) -> Result<Self, DomainError> {
        let images = match source.get("images") {
            Some(Value::Null) | None => Vec::new(),
            Some(list) => decode_list(list)?,
        };
        Ok(Self { images })
    }
}

/// A phone number in the formats the app displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdealistaPhone {
    fields: Record,
}

impl FromRecord for IdealistaPhone {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaPhone",
        required: &[],
        optional: &[
            "phoneNumberForMobileDialing",
            "formattedPhone",
            "nationalNumber",
            "phoneNumber",
        ],
    };

    fn from_record(fields: Record, _source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self { fields })
    }
}

impl IdealistaPhone {
    /// Best number to dial from a mobile
    #[must_use]
    pub fn dialable(&self) -> Option<String> {
        self.fields
            .text("phoneNumberForMobileDialing")
            .or_else(|| self.fields.text("phoneNumber"))
    }
}

/// Advertiser contact details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealistaContact {
    #[serde(flatten)]
    fields: Record,
    pub phone1: Option<IdealistaPhone>,
}

impl FromRecord for IdealistaContact {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaContact",
        required: &[],
        optional: &["inVirtualMicrosite", "contactMethod", "contactName", "userType"],
    };

    fn from_record(fields: Record, source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self {
            fields,
            phone1: decode_nested(source, "phone1")?,
        })
    }
}

impl IdealistaContact {
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.str("contactName")
    }

    /// `"private"` or `"professional"`
    #[must_use]
    pub fn user_type(&self) -> Option<&str> {
        self.fields.str("userType")
    }
}

/// Typology of a listing, e.g. `flat` / `studio`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdealistaDetailedType {
    fields: Record,
}

impl FromRecord for IdealistaDetailedType {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaDetailedType",
        required: &[],
        optional: &["typology", "subTypology"],
    };

    fn from_record(fields: Record, _source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self { fields })
    }
}

impl IdealistaDetailedType {
    #[must_use]
    pub fn typology(&self) -> Option<&str> {
        self.fields.str("typology")
    }

    #[must_use]
    pub fn sub_typology(&self) -> Option<&str> {
        self.fields.str("subTypology")
    }
}

/// One element of a search result's `elementList`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealistaListing {
    #[serde(flatten)]
    fields: Record,
    pub contact_info: Option<IdealistaContact>,
    pub multimedia: Option<IdealistaMultimedia>,
    /// Kept as sent; the shape varies between listings
    pub suggested_texts: Option<Value>,
    pub detailed_type: Option<IdealistaDetailedType>,
}

impl FromRecord for IdealistaListing {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaListing",
        required: &[
            "propertyCode",
            "propertyType",
            "url",
            "latitude",
            "longitude",
            "address",
            "country",
            "province",
            "municipality",
            "price",
            "operation",
            "numPhotos",
            "hasVideo",
        ],
        optional: &[
            "floor",
            "bathrooms",
            "exterior",
            "hasLift",
            "size",
            "distance",
            "status",
            "topHighlight",
            "urgentVisualHighlight",
            "visualHighlight",
            "preferenceHighlight",
            "showAddress",
            "rooms",
            "priceByArea",
            "newDevelopment",
            "newProperty",
            "favourite",
            "firstActivationDate",
            "externalReference",
            "neighborhood",
            "district",
            "thumbnail",
        ],
    };

    fn from_record(fields: Record, source: &Map<String, Value>) -> Result<Self, DomainError> {
        Ok(Self {
            fields,
            contact_info: decode_nested(source, "contactInfo")?,
            multimedia: decode_nested(source, "multimedia")?,
            suggested_texts: source.get("suggestedTexts").cloned(),
            detailed_type: decode_nested(source, "detailedType")?,
        })
    }
}

impl IdealistaListing {
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }

    #[must_use]
    pub fn property_code(&self) -> Option<String> {
        self.fields.text("propertyCode")
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.fields.str("url")
    }

    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.fields.f64("price")
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.fields.str("address")
    }

    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        GeoLocation::new(self.fields.f64("latitude")?, self.fields.f64("longitude")?).ok()
    }

    /// Photos, when the listing carries a `multimedia` block
    #[must_use]
    pub fn images(&self) -> &[IdealistaImage] {
        self.multimedia
            .as_ref()
            .map(|m| m.images.as_slice())
            .unwrap_or_default()
    }
}

/// Top-level search response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealistaSearchResults {
    #[serde(flatten)]
    fields: Record,
    pub element_list: Vec<IdealistaListing>,
}

impl FromRecord for IdealistaSearchResults {
    const SCHEMA: RecordSchema = RecordSchema {
        name: "IdealistaSearchResults",
        required: &["totalPages"],
        optional: &["total", "actualPage", "upperRangePosition"],
    };

    fn from_record(fields: Record, source: &Map<String, Value>) -> Result<Self, DomainError> {
        let element_list = match source.get("elementList") {
            Some(Value::Null) | None => Vec::new(),
            Some(list) => decode_list(list)?,
        };
        Ok(Self {
            fields,
            element_list,
        })
    }
}

impl IdealistaSearchResults {
    #[must_use]
    pub const fn fields(&self) -> &Record {
        &self.fields
    }

    /// Convert into a result batch; the page counters travel as metadata
    #[must_use]
    pub fn into_batch(self) -> IdealistaSearchResult {
        let total_pages = self.fields.i64("totalPages").and_then(|v| u64::try_from(v).ok());
        let total = self.fields.i64("total").and_then(|v| u64::try_from(v).ok());
        SearchResultBatch::new(self.element_list)
            .with_metadata(Some(self.fields))
            .with_counters(total_pages, total)
    }
}

/// Decoded search response; metadata holds `totalPages`, `total`,
/// `actualPage` and `upperRangePosition`
pub type IdealistaSearchResult = SearchResultBatch<IdealistaListing, Record>;

/// Decode a search response body
///
/// # Errors
///
/// Returns the first required-field violation in the response or any of
/// its elements.
pub fn decode_search_response(body: &Value) -> Result<IdealistaSearchResult, DomainError> {
    decode::<IdealistaSearchResults>(body)
        .inspect_err(|e| error!(error = %e, "Failed to decode Idealista search results"))
        .map(IdealistaSearchResults::into_batch)
}
