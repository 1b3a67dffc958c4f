//! Schema-driven projection of loosely typed JSON into flat records
//!
//! The listing APIs return large, heterogeneous objects whose fields come and
//! go between app releases. Each record kind declares which fields it needs
//! (`required`) and which it merely understands (`optional`):
//!
//! - a missing required field fails the whole record with a
//!   [`DomainError::MissingField`] naming it
//! - a missing optional field is stored as an explicit `null`, so every
//!   declared attribute is always present on the decoded record
//! - undeclared fields are ignored
//!
//! Nested objects are decoded the same way by the record kind that owns
//! them, via [`FromRecord`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// Field lists for one record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    /// Record kind, used in error messages
    pub name: &'static str,
    /// Fields that must be present
    pub required: &'static [&'static str],
    /// Fields that default to `null` when absent
    pub optional: &'static [&'static str],
}

impl RecordSchema {
    /// Returns true if the field is declared by this schema
    #[must_use]
    pub fn declares(&self, field: &str) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }
}

/// Flat projection of a JSON object onto a [`RecordSchema`]
///
/// Holds exactly the declared fields, absent optional ones as `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Raw value of a declared field (`Some(Value::Null)` when defaulted)
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns true if the field is an attribute of this record
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns true if the field is absent from the record or `null`
    #[must_use]
    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).is_none_or(Value::is_null)
    }

    /// Field as a string slice, if it is a JSON string
    #[must_use]
    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Field as an integer, accepting numeric strings
    #[must_use]
    pub fn i64(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field as a float, accepting numeric strings
    #[must_use]
    pub fn f64(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field as a boolean
    #[must_use]
    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Field rendered as text: strings verbatim, other scalars via JSON
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Iterate over `(field, value)` pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes on the record
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declared no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A typed record kind built from a decoded [`Record`]
pub trait FromRecord: Sized {
    /// Field lists for this kind
    const SCHEMA: RecordSchema;

    /// Assemble the typed record
    ///
    /// `source` is the original JSON object, for kinds that own nested
    /// sub-records.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested sub-record fails to decode.
    fn from_record(fields: Record, source: &Map<String, Value>) -> Result<Self, DomainError>;
}

/// Project a JSON object onto a schema
///
/// # Errors
///
/// Returns [`DomainError::MissingField`] for the first absent required field.
pub fn project(object: &Map<String, Value>, schema: &RecordSchema) -> Result<Record, DomainError> {
    let mut fields = BTreeMap::new();
    for &field in schema.required {
        let value = object
            .get(field)
            .ok_or_else(|| DomainError::missing_field(schema.name, field))?;
        fields.insert(field.to_string(), value.clone());
    }
    for &field in schema.optional {
        let value = object.get(field).cloned().unwrap_or(Value::Null);
        fields.insert(field.to_string(), value);
    }
    Ok(Record { fields })
}

/// Decode a JSON value against a bare schema
///
/// # Errors
///
/// Returns a validation error if the value is not an object, or a
/// missing-field error from [`project`].
pub fn decode_record(input: &Value, schema: &RecordSchema) -> Result<Record, DomainError> {
    project(expect_object(input, schema.name)?, schema)
}

/// Decode a JSON value into a typed record kind
///
/// # Errors
///
/// Returns a validation error if the value is not an object, or the first
/// required-field violation found in the record or its sub-records.
pub fn decode<T: FromRecord>(input: &Value) -> Result<T, DomainError> {
    let object = expect_object(input, T::SCHEMA.name)?;
    let fields = project(object, &T::SCHEMA)?;
    T::from_record(fields, object)
}

/// Decode every element of a JSON array independently
///
/// Strict: the first element that fails aborts the whole list.
///
/// # Errors
///
/// Returns a validation error if the value is not an array, or the first
/// element's decode error.
pub fn decode_list<T: FromRecord>(input: &Value) -> Result<Vec<T>, DomainError> {
    let items = input.as_array().ok_or_else(|| {
        DomainError::validation(format!("expected a list of {}", T::SCHEMA.name))
    })?;
    items.iter().map(decode::<T>).collect()
}

/// Decode an optional nested sub-record: absent or `null` yields `None`
///
/// # Errors
///
/// Returns the nested record's decode error when it is present but invalid.
pub fn decode_nested<T: FromRecord>(
    source: &Map<String, Value>,
    field: &str,
) -> Result<Option<T>, DomainError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(value).map(Some),
    }
}

/// Parse raw JSON text and decode it against a bare schema
///
/// # Errors
///
/// Returns a validation error if the text is not JSON, otherwise as
/// [`decode_record`].
pub fn decode_record_str(raw: &str, schema: &RecordSchema) -> Result<Record, DomainError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| DomainError::validation(format!("{} is not valid JSON: {e}", schema.name)))?;
    decode_record(&value, schema)
}

fn expect_object<'a>(input: &'a Value, name: &str) -> Result<&'a Map<String, Value>, DomainError> {
    input
        .as_object()
        .ok_or_else(|| DomainError::validation(format!("{name} must be a JSON object")))
}
