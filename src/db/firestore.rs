// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of [`DocumentStore`].
//!
//! Documents are read and written as `serde_json` maps. Atomic array and
//! counter operations use Firestore field transforms guarded by an existence
//! precondition; the checked update reads and writes inside one transaction.

use crate::db::{Direction, Document, DocumentStore, FieldGuard, Fields, Query, StoreError};
use async_trait::async_trait;
use firestore::{
    FirestoreConsistencySelector, FirestoreQueryDirection, FirestoreValue,
    FirestoreWritePrecondition,
};
use gcloud_sdk::google::firestore::v1 as proto;
use serde_json::Value;

/// Metadata keys the firestore crate adds when deserializing a document.
const FIRESTORE_ID_KEY: &str = "_firestore_id";
const FIRESTORE_META_PREFIX: &str = "_firestore_";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return `Unavailable` if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("Database not connected (offline mode)".to_string()))
    }

    /// Apply one field transform atomically. The document must exist.
    async fn transform(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        transform: Transform,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let mut transaction = client.begin_transaction().await.map_err(map_error)?;

        client
            .fluent()
            .update()
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .transforms(|t| {
                let op = match &transform {
                    Transform::Union(values) => t.field(field).append_missing_elements(values.clone()),
                    Transform::Remove(values) => t.field(field).remove_all_from_array(values.clone()),
                    Transform::Increment(delta) => t.field(field).increment(*delta),
                };
                t.fields([op])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(map_error)?;

        commit_or_not_found(transaction, collection, id).await
    }
}

/// Read one document through `db`, which may be bound to a transaction.
async fn read_document(
    db: &firestore::FirestoreDb,
    collection: &str,
    id: &str,
) -> Result<Option<Document>, StoreError> {
    let value: Option<Value> = db
        .fluent()
        .select()
        .by_id_in(collection)
        .obj()
        .one(id)
        .await
        .map_err(map_error)?;

    value
        .map(|v| {
            into_document(v).map(|mut doc| {
                doc.id = id.to_string();
                doc
            })
        })
        .transpose()
}

/// Commit, reporting a failed existence precondition as `NotFound`.
async fn commit_or_not_found(
    transaction: firestore::FirestoreTransaction<'_>,
    collection: &str,
    id: &str,
) -> Result<(), StoreError> {
    match transaction.commit().await.map_err(map_error) {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => Err(StoreError::NotFound(format!("{}/{}", collection, id))),
        Err(e) => Err(e),
    }
}

enum Transform {
    Union(Vec<FirestoreValue>),
    Remove(Vec<FirestoreValue>),
    Increment(i64),
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let mut builder = self.get_client()?.fluent().select().from(collection);

        if !query.filters.is_empty() {
            let filters: Vec<(String, FirestoreValue)> = query
                .filters
                .iter()
                .map(|(field, value)| (field.clone(), to_firestore_value(value)))
                .collect();
            builder = builder.filter(move |q| {
                q.for_all(
                    filters
                        .iter()
                        .map(|(field, value)| q.field(field.as_str()).eq(value.clone())),
                )
            });
        }

        if let Some((field, direction)) = &query.order_by {
            let direction = match direction {
                Direction::Ascending => FirestoreQueryDirection::Ascending,
                Direction::Descending => FirestoreQueryDirection::Descending,
            };
            builder = builder.order_by([(field.as_str(), direction)]);
        }

        let values: Vec<Value> = builder.obj().query().await.map_err(map_error)?;
        values.into_iter().map(into_document).collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        read_document(self.get_client()?, collection, id).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let created: Value = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .generate_document_id()
            .object(&Value::Object(fields))
            .execute()
            .await
            .map_err(map_error)?;

        let doc = into_document(created)?;
        if doc.id.is_empty() {
            return Err(StoreError::Backend(
                "Firestore did not return a document id".to_string(),
            ));
        }
        Ok(doc.id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(&Value::Object(fields))
            .execute()
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let paths: Vec<String> = fields.keys().cloned().collect();
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths)
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(&Value::Object(fields))
            .execute()
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn update_fields_checked(
        &self,
        collection: &str,
        id: &str,
        guard: FieldGuard,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let mut transaction = client.begin_transaction().await.map_err(map_error)?;

        // Reads through the transaction register the document for conflict
        // detection, so a concurrent commit aborts this one.
        let in_transaction = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let current = read_document(&in_transaction, collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;

        if !guard.matches(&current.fields) {
            let _ = transaction.rollback().await;
            return Err(StoreError::Conflict(format!(
                "{}/{}: {} changed since it was read",
                collection, id, guard.field
            )));
        }

        let paths: Vec<String> = fields.keys().cloned().collect();
        client
            .fluent()
            .update()
            .fields(paths)
            .in_col(collection)
            .document_id(id)
            .object(&Value::Object(fields))
            .add_to_transaction(&mut transaction)
            .map_err(map_error)?;

        match transaction.commit().await.map_err(map_error) {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict(_)) => Err(StoreError::Conflict(format!(
                "{}/{}: updated concurrently",
                collection, id
            ))),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError> {
        let values = elements.iter().map(to_firestore_value).collect();
        self.transform(collection, id, field, Transform::Union(values))
            .await
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        elements: Vec<Value>,
    ) -> Result<(), StoreError> {
        let values = elements.iter().map(to_firestore_value).collect();
        self.transform(collection, id, field, Transform::Remove(values))
            .await
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.transform(collection, id, field, Transform::Increment(delta))
            .await
    }
}

/// Split a deserialized Firestore document into its id and plain fields.
fn into_document(value: Value) -> Result<Document, StoreError> {
    let Value::Object(mut fields) = value else {
        return Err(StoreError::Serialization(
            "Firestore document is not a map".to_string(),
        ));
    };

    let id = match fields.remove(FIRESTORE_ID_KEY) {
        Some(Value::String(id)) => id,
        _ => String::new(),
    };
    fields.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));

    Ok(Document { id, fields })
}

fn to_proto_value(value: &Value) -> proto::Value {
    use proto::value::ValueType;

    let value_type = match value {
        Value::Null => ValueType::NullValue(0),
        Value::Bool(b) => ValueType::BooleanValue(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ValueType::IntegerValue(i),
            None => ValueType::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => ValueType::StringValue(s.clone()),
        Value::Array(items) => ValueType::ArrayValue(proto::ArrayValue {
            values: items.iter().map(to_proto_value).collect(),
        }),
        Value::Object(map) => ValueType::MapValue(proto::MapValue {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), to_proto_value(v)))
                .collect(),
        }),
    };

    proto::Value {
        value_type: Some(value_type),
    }
}

fn to_firestore_value(value: &Value) -> FirestoreValue {
    FirestoreValue::from(to_proto_value(value))
}

/// Classify a Firestore error into the store taxonomy.
fn map_error(err: firestore::errors::FirestoreError) -> StoreError {
    classify(err.to_string())
}

fn classify(message: String) -> StoreError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") {
        StoreError::PermissionDenied(message)
    } else if lower.contains("notfound") || lower.contains("not_found") || lower.contains("not found") {
        StoreError::NotFound(message)
    } else if lower.contains("unavailable") || lower.contains("network") || lower.contains("deadline") {
        StoreError::Unavailable(message)
    } else if lower.contains("conflict") || lower.contains("aborted") {
        StoreError::Conflict(message)
    } else {
        StoreError::Backend(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_document_strips_metadata() {
        let doc = into_document(json!({
            "_firestore_id": "evt-1",
            "_firestore_created": "2024-01-01T00:00:00Z",
            "title": "Fran"
        }))
        .unwrap();

        assert_eq!(doc.id, "evt-1");
        assert_eq!(doc.fields.len(), 1);
        assert_eq!(doc.fields["title"], json!("Fran"));
    }

    #[test]
    fn test_classify_errors() {
        assert!(matches!(
            classify("Database general error occurred: PermissionDenied".to_string()),
            StoreError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify("Data not found error: events/x".to_string()),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            classify("Network error: Unavailable".to_string()),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            classify("something odd".to_string()),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn test_proto_value_nested() {
        let value = to_proto_value(&json!({"likes": ["u1"], "likesCount": 2}));
        match value.value_type {
            Some(proto::value::ValueType::MapValue(map)) => {
                assert_eq!(map.fields.len(), 2);
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = FirestoreStore::new_mock();
        let err = store.get("events", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
