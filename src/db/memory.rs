// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Backs local development (`STORE_BACKEND=memory`) and tests. Each
//! collection sits behind one dashmap shard entry, so every primitive is
//! atomic with respect to other writers on the same collection.

use crate::db::{
    compare_values, Direction, Document, DocumentStore, FieldGuard, Fields, Query, StoreError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

type Collection = BTreeMap<String, Fields>;

/// Document store held entirely in memory. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    fn with_document<R>(
        &self,
        collection: &str,
        id: &str,
        f: impl FnOnce(&mut Fields) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let fields = docs.get_mut(id).ok_or_else(|| not_found(collection, id))?;
        f(fields)
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound(format!("{}/{}", collection, id))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        if query.needs_composite_index() {
            return Err(StoreError::Backend(format!(
                "FAILED_PRECONDITION: query on {} requires a composite index",
                collection
            )));
        }

        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = docs
            .iter()
            .filter(|(_, fields)| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| fields.get(field) == Some(value))
            })
            .filter(|(_, fields)| match &query.order_by {
                Some((field, _)) => fields.contains_key(field),
                None => true,
            })
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();
        drop(docs);

        if let Some((field, direction)) = &query.order_by {
            matched.sort_by(|a, b| {
                let ord = compare_values(&a.fields[field], &b.fields[field]);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        Ok(matched)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.collections.get(collection).and_then(|docs| {
            docs.get(id).map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
        }))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.with_document(collection, id, |doc| {
            doc.extend(fields);
            Ok(())
        })
    }

    async fn update_fields_checked(
        &self,
        collection: &str,
        id: &str,
        guard: FieldGuard,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.with_document(collection, id, |doc| {
            if !guard.matches(doc) {
                return Err(StoreError::Conflict(format!(
                    "{}/{}: {} changed since it was read",
                    collection, id, guard.field
                )));
            }
            doc.extend(fields);
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError> {
        self.with_document(collection, id, |doc| {
            let slot = doc
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                for element in elements {
                    if !items.contains(&element) {
                        items.push(element);
                    }
                }
            }
            Ok(())
        })
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError> {
        self.with_document(collection, id, |doc| {
            let mut items = match doc.remove(field) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            items.retain(|item| !elements.contains(item));
            doc.insert(field.to_string(), Value::Array(items));
            Ok(())
        })
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.with_document(collection, id, |doc| {
            let next = match doc.get(field) {
                Some(Value::Number(n)) if n.is_i64() => {
                    Value::from(n.as_i64().unwrap_or_default().saturating_add(delta))
                }
                Some(Value::Number(n)) => Value::from(n.as_f64().unwrap_or_default() + delta as f64),
                // Non-numeric or missing fields are replaced by the delta.
                _ => Value::from(delta),
            };
            doc.insert(field.to_string(), next);
            Ok(())
        })
    }
}
