// src/web/contato_handlers.rs
use crate::{
    models::contato::{self, CONTATOS_TABLE},
    web::{
        request_context::RequestContext,
        response::{build_error, build_response, build_success, ApiResponse},
    },
};
use axum::extract::{Path, Query};
use serde_json::{json, Map};
use std::collections::HashMap;

const DEFAULT_LIMITE: usize = 50;

// Valor ausente, não numérico ou < 1 usa o padrão
fn positive_param(params: &HashMap<String, String>, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// GET /api/v1/contatos?limite=50&pagina=1
pub async fn index(ctx: RequestContext, Query(params): Query<HashMap<String, String>>) -> ApiResponse {
    let limite = positive_param(&params, "limite", DEFAULT_LIMITE);
    let pagina = positive_param(&params, "pagina", 1);

    let page = contato::paginate(limite, pagina);

    let mut extra = Map::new();
    extra.insert(
        "paginacao".into(),
        json!({
            "pagina_atual": page.pagina_atual,
            "total_paginas": page.total_paginas,
            "total_registros": page.total_registros,
        }),
    );
    extra.insert("limite".into(), json!(page.limite));

    build_response(
        &ctx,
        true,
        200,
        Some("Contatos listados com sucesso"),
        Some(json!(page.items)),
        Some(CONTATOS_TABLE),
        extra,
    )
}

/// GET /api/v1/contatos/{id}
pub async fn show(ctx: RequestContext, Path(id): Path<String>) -> ApiResponse {
    match contato::find(&id) {
        Some(found) => build_success(
            &ctx,
            200,
            Some("Contato encontrado"),
            Some(json!(found)),
            Some(CONTATOS_TABLE),
        ),
        None => build_error(&ctx, 404, Some("Contato não encontrado"), None),
    }
}
