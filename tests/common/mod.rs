// tests/common/mod.rs
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use gestao_usuarios::{
    config::{Config, MIN_BCRYPT_COST},
    db,
    state::AppState,
    web::routes::create_router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

pub const BASE_URL: &str = "http://api.teste.local";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        app_url: BASE_URL.into(),
        host: "127.0.0.1".into(),
        port: 0,
        db_max_connections: 1,
        bcrypt_cost: MIN_BCRYPT_COST,
    }
}

// Uma única conexão que nunca expira: a base em memória vive enquanto o pool viver
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let app = create_router(AppState::new(pool.clone(), test_config()));
    (app, pool)
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, raw: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

pub fn user_payload(suffix: &str) -> Value {
    json!({
        "name": format!("Usuário {suffix}"),
        "cpf": format!("123.456.789-{suffix}"),
        "whatsapp": "(11) 98888-7777",
        "user": format!("usuario_{suffix}"),
        "password": "senha123",
        "mail": format!("usuario{suffix}@example.com"),
        "date_birth": "1990-05-15",
        "zip_code": "01234-567",
    })
}

/// Cria um utilizador via API e devolve o ID.
pub async fn create_user(app: &Router, suffix: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/api/v1/users", Some(user_payload(suffix))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["record"]["id"].as_i64().unwrap()
}
