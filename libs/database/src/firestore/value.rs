//! Conversion between plain JSON documents and Firestore's typed REST values.
//!
//! Firestore's REST surface wraps every field in a single-key object naming its
//! type, e.g. `{"integerValue": "42"}` or `{"mapValue": {"fields": {...}}}`.
//! Reads unwrap those into ordinary JSON; writes wrap JSON back up.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

use super::store::Document;
use crate::common::{DatabaseError, DatabaseResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    /// Payload is `null` on the wire; the content is ignored on read
    NullValue(Value),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl FirestoreValue {
    /// Unwrap into plain JSON. Timestamps, bytes and references become strings.
    pub fn into_json(self) -> DatabaseResult<Value> {
        Ok(match self {
            Self::NullValue(_) => Value::Null,
            Self::BooleanValue(b) => Value::Bool(b),
            Self::IntegerValue(raw) => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| DatabaseError::Codec(format!("invalid integerValue '{raw}'")))?;
                Value::Number(n.into())
            }
            Self::DoubleValue(d) => Number::from_f64(d).map_or(Value::Null, Value::Number),
            Self::TimestampValue(s)
            | Self::StringValue(s)
            | Self::BytesValue(s)
            | Self::ReferenceValue(s) => Value::String(s),
            Self::GeoPointValue(point) => serde_json::json!({
                "latitude": point.latitude,
                "longitude": point.longitude,
            }),
            Self::ArrayValue(array) => Value::Array(
                array
                    .values
                    .into_iter()
                    .map(Self::into_json)
                    .collect::<DatabaseResult<_>>()?,
            ),
            Self::MapValue(map) => Value::Object(decode_fields(map.fields)?),
        })
    }

    /// Wrap a JSON value. Integral numbers that fit in `i64` are written as
    /// `integerValue`; every other number becomes `doubleValue`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::NullValue(Value::Null),
            Value::Bool(b) => Self::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::IntegerValue(i.to_string()),
                None => Self::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::StringValue(s.clone()),
            Value::Array(items) => Self::ArrayValue(ArrayValue {
                values: items.iter().map(Self::from_json).collect(),
            }),
            Value::Object(map) => Self::MapValue(MapValue {
                fields: encode_fields(map),
            }),
        }
    }
}

/// Decode a document's `fields` object
pub fn decode_fields(fields: BTreeMap<String, FirestoreValue>) -> DatabaseResult<Document> {
    fields
        .into_iter()
        .map(|(key, value)| Ok((key, value.into_json()?)))
        .collect()
}

/// Encode a document into a `fields` object
pub fn encode_fields(document: &Document) -> BTreeMap<String, FirestoreValue> {
    document
        .iter()
        .map(|(key, value)| (key.clone(), FirestoreValue::from_json(value)))
        .collect()
}
