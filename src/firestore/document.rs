//! Firestore documents in the REST JSON encoding.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Firestore value, externally tagged as in the REST API (`{"stringValue": "x"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    /// int64 values are transported as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
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
    pub fields: HashMap<String, FirestoreValue>,
}

impl FirestoreValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FirestoreValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view; whole doubles within the i64 range are accepted too
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FirestoreValue::IntegerValue(s) => s.parse().ok(),
            FirestoreValue::DoubleValue(d)
                if d.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(d) =>
            {
                Some(*d as i64)
            }
            _ => None,
        }
    }
}

/// A document snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{path}`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FirestoreValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(key, FirestoreValue::StringValue(value.into()))
    }

    pub fn with_create_time(mut self, create_time: DateTime<Utc>) -> Self {
        self.create_time = Some(create_time);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FirestoreValue> {
        self.fields.get(key)
    }

    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(FirestoreValue::as_str)
    }

    pub fn integer_field(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(FirestoreValue::as_i64)
    }
}

/// Path of a document in a top-level collection, relative to the database root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Parse `collection/id`. Nested paths and empty segments are rejected.
    pub fn parse(relative: &str) -> Option<Self> {
        let mut segments = relative.trim_matches('/').split('/');
        let collection = segments.next().filter(|s| !s.is_empty())?;
        let id = segments.next().filter(|s| !s.is_empty())?;
        if segments.next().is_some() {
            return None;
        }
        Some(Self::new(collection, id))
    }

    /// Parse a full resource name or a CloudEvent subject (`documents/collection/id`).
    pub fn from_resource_name(name: &str) -> Option<Self> {
        let relative = match name.find("/documents/") {
            Some(idx) => &name[idx + "/documents/".len()..],
            None => name.strip_prefix("documents/")?,
        };
        Self::parse(relative)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
