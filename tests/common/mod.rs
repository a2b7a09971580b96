//! Shared helpers for the integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rand::Rng;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use tower::ServiceExt;
use vehicle_inventory::infra::database::MIGRATOR;
use vehicle_inventory::storage::Repositories;
use vehicle_inventory::transport::http::{build_app, AppState};

/// Full app (docs, CORS, tracing layers) over an empty in-memory store.
pub fn memory_app() -> Router {
    build_app(AppState::new(Repositories::in_memory()), None)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

pub async fn seed_brand(app: &Router, name: &str) -> i64 {
    let (status, body) = post(app, "/api/brands", json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "seed brand: {body}");
    body["data"]["id"].as_i64().unwrap()
}

pub async fn seed_model(app: &Router, name: &str, brand_id: i64, fipe_value: f64) -> i64 {
    let (status, body) = post(
        app,
        "/api/models",
        json!({ "name": name, "brandId": brand_id, "fipeValue": fipe_value }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed model: {body}");
    body["data"]["id"].as_i64().unwrap()
}

pub fn car_json(model_id: i64, color: &str, year: i32, ports: i32) -> Value {
    json!({
        "color": color,
        "year": year,
        "numberOfPorts": ports,
        "fuel": "Flex",
        "value": 50000.0,
        "modelId": model_id
    })
}

pub async fn seed_car(app: &Router, model_id: i64, color: &str, year: i32, ports: i32) -> i64 {
    let (status, body) = post(app, "/api/cars", car_json(model_id, color, year, ports)).await;
    assert_eq!(status, StatusCode::CREATED, "seed car: {body}");
    body["data"]["id"].as_i64().unwrap()
}

pub fn assert_error(body: &Value, status: StatusCode, kind: &str) {
    assert_eq!(body["statusCode"].as_u64(), Some(u64::from(status.as_u16())), "{body}");
    assert_eq!(body["error"], kind, "{body}");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{body}");
}

/// A migrated schema private to one test. Dropped by `cleanup`.
pub struct TestDb {
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    /// `None` when `DATABASE_URL` is unset, so Postgres tests skip quietly.
    pub async fn connect() -> Option<Self> {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").ok()?;

        let schema = format!("inventory_test_{}", rand::thread_rng().gen::<u32>());
        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await.ok()?;
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .ok()?;

        let options = PgConnectOptions::from_str(&url)
            .ok()?
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .ok()?;
        MIGRATOR.run(&pool).await.ok()?;

        Some(Self { pool, admin, schema })
    }

    pub async fn cleanup(self) {
        self.pool.close().await;
        let _ = sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await;
        self.admin.close().await;
    }
}
