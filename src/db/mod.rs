// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Services talk to a [`DocumentStore`]: a schemaless collection-of-documents
//! service. Production uses Firestore; local development and tests use the
//! in-process [`MemoryStore`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Collection names as constants.
pub mod collections {
    pub const EVENTS: &str = "events";
    pub const WORKOUTS: &str = "workouts";
    pub const POSTS: &str = "messageboard";
    pub const USERS: &str = "users";
    pub const LOGIN_HISTORY: &str = "loginHistory";
    pub const LOGS: &str = "logs";
    pub const ANNOUNCEMENTS: &str = "announcements";
}

/// Top-level fields of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by the store. The id is never part of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Query over one collection: equality filters plus an optional ordering.
///
/// Documents that lack the order-by field are not returned. Filtering on one
/// field while ordering by another needs a composite index in Firestore;
/// no index definitions ship with the portal, so such queries are rejected.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    /// Whether Firestore would need a composite index to serve this query.
    pub fn needs_composite_index(&self) -> bool {
        match &self.order_by {
            Some((order_field, _)) => self.filters.iter().any(|(f, _)| f != order_field),
            None => false,
        }
    }
}

/// Precondition for [`DocumentStore::update_fields_checked`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGuard {
    pub field: String,
    pub expected: Value,
    /// Also accept a document where the field is absent.
    pub allow_missing: bool,
}

impl FieldGuard {
    pub fn new(field: &str, expected: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            expected: expected.into(),
            allow_missing: false,
        }
    }

    pub fn allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        match fields.get(&self.field) {
            Some(current) => *current == self.expected,
            None => self.allow_missing,
        }
    }
}

/// Primitives the portal needs from a document store.
///
/// `update_fields` overwrites whole top-level fields and fails with
/// `NotFound` when the document does not exist. `array_union`,
/// `array_remove` and `increment` are applied atomically by the store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a document with a store-generated id and return that id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Create or replace the document with the given id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Like `update_fields`, but fails with `Conflict` unless `guard` holds.
    async fn update_fields_checked(
        &self,
        collection: &str,
        id: &str,
        guard: FieldGuard,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError>;

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError>;

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError>;
}

// ─── Typed helpers ───────────────────────────────────────────

/// Serialize a model into document fields, dropping its `id`.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(StoreError::Serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize a document into a model, exposing the document id as `id`.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    let Document { id, mut fields } = doc;
    fields.insert("id".to_string(), Value::String(id));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(collection, id)
        .await?
        .map(from_document)
        .transpose()
}

/// List a collection as models. Documents that fail to deserialize are
/// skipped with a warning so one malformed document cannot hide the rest.
pub async fn list_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    query: Query,
) -> Result<Vec<T>, StoreError> {
    let docs = store.list(collection, query).await?;
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.id.clone();
        match from_document(doc) {
            Ok(model) => out.push(model),
            Err(e) => tracing::warn!(collection, id = %id, error = %e, "Skipping malformed document"),
        }
    }
    Ok(out)
}

/// Document-store value ordering: null < bool < number < string < array < map.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
