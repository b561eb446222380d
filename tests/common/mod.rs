// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use gym_portal::config::Config;
use gym_portal::db::{collections, DocumentStore, FirestoreStore, MemoryStore};
use gym_portal::middleware::auth::create_jwt;
use gym_portal::routes::create_router;
use gym_portal::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Firestore store on the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app over a fresh in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone()));
    (create_router(state.clone()), state, store)
}

/// Bearer token for `uid` signed with the test key.
#[allow(dead_code)]
pub fn token_for(uid: &str) -> String {
    create_jwt(
        uid,
        Some(&format!("{}@example.com", uid)),
        &Config::default().jwt_signing_key,
    )
    .unwrap()
}

/// Store a profile with the given role.
#[allow(dead_code)]
pub async fn seed_profile(store: &dyn DocumentStore, uid: &str, name: &str, role: &str) {
    let fields = json!({
        "uid": uid,
        "displayName": name,
        "email": format!("{}@example.com", uid),
        "role": role,
        "createdAt": "2024-01-01T00:00:00.000Z",
    });
    store
        .set(collections::USERS, uid, fields.as_object().unwrap().clone())
        .await
        .unwrap();
}

/// Store a library workout and return its id.
#[allow(dead_code)]
pub async fn seed_workout(store: &dyn DocumentStore, name: &str) -> String {
    let fields = json!({
        "name": name,
        "description": format!("{} for time", name),
        "category": "benchmark",
        "exercises": [{ "name": "Thrusters", "sets": "21-15-9", "reps": "", "notes": "" }],
    });
    store
        .add(collections::WORKOUTS, fields.as_object().unwrap().clone())
        .await
        .unwrap()
}

/// Send a request and return the status and the JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}
