// tests/misc_api.rs
mod common;

use axum::http::{Method, StatusCode};
use common::{send, test_app};
use serde_json::json;

#[tokio::test]
async fn health_responde() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API funcionando");
    assert_eq!(body["data"]["record"]["service"], "gestao-usuarios");
    assert!(body["data"]["record"]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn contatos_paginados() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/contatos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["table"], "contatos");
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["meta_data"]["limite"], 50);
    assert_eq!(
        body["meta_data"]["paginacao"],
        json!({ "pagina_atual": 1, "total_paginas": 1, "total_registros": 2 })
    );

    let (_, body) = send(&app, Method::GET, "/api/v1/contatos?limite=1&pagina=2", None).await;
    assert_eq!(body["data"]["records"][0]["name"], "Maria Oliveira");
    assert_eq!(body["meta_data"]["paginacao"]["total_paginas"], 2);

    // Valores inválidos voltam ao padrão
    let (_, body) = send(&app, Method::GET, "/api/v1/contatos?limite=abc&pagina=0", None).await;
    assert_eq!(body["meta_data"]["limite"], 50);
    assert_eq!(body["meta_data"]["paginacao"]["pagina_atual"], 1);
}

#[tokio::test]
async fn contato_por_id() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/contatos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["record"]["name"], "João da Silva");

    let (status, body) = send(&app, Method::GET, "/api/v1/contatos/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contato não encontrado");
}

#[tokio::test]
async fn rota_desconhecida_e_metodo_errado_usam_envelope() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/nada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["meta_data"]["www"]["path"], "api/v1/nada");

    let (status, body) = send(&app, Method::POST, "/api/health", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["http_code"], 405);
}
