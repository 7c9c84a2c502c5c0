use std::fmt;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::Bson;

use crate::error::StoreError;

/// Internal identifier of a product document (its `_id`).
///
/// Kept as raw BSON so that collections keyed by ObjectIds, integers or
/// strings all round-trip into the update filter unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordId(Bson);

impl RecordId {
    pub fn as_bson(&self) -> &Bson {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Bson::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            Bson::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<Bson> for RecordId {
    fn from(value: Bson) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for RecordId {
    fn from(value: ObjectId) -> Self {
        Self(Bson::ObjectId(value))
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self(Bson::Int32(value))
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(Bson::Int64(value))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(Bson::String(value.to_string()))
    }
}

/// A product as seen by the backfill: its id, the join key and the
/// cross-reference into the vector index, if already assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: RecordId,
    pub name: String,
    pub cross_ref: Option<String>,
}

impl ProductRecord {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cross_ref: None,
        }
    }

    pub fn with_cross_ref(mut self, cross_ref: impl Into<String>) -> Self {
        self.cross_ref = Some(cross_ref.into());
        self
    }

    pub fn is_linked(&self) -> bool {
        self.cross_ref.is_some()
    }
}

/// Everything a candidate query returned. Documents that matched the query
/// but could not be decoded stay here so they are counted and reported
/// alongside the records that can be reconciled.
#[derive(Debug, Default)]
pub struct Candidates {
    pub records: Vec<ProductRecord>,
    pub unreadable: Vec<StoreError>,
}

impl Candidates {
    /// Number of documents the query matched.
    pub fn len(&self) -> usize {
        self.records.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
