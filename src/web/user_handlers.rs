// src/web/user_handlers.rs
use crate::{
    error::{ApiError, ResultExt},
    models::user::USER_TABLE,
    services::user_service::{self, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    state::AppState,
    web::{
        request_context::RequestContext,
        response::{build_error, build_response, build_success, ApiResponse},
        validation,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

type HandlerResult = Result<ApiResponse, ApiError>;

// Corpo JSON malformado é recusado antes da validação
fn parse_body(ctx: &RequestContext, body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiResponse> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Corpo JSON rejeitado: {}", rejection.body_text());
        build_error(ctx, 400, Some("Corpo da requisição inválido (JSON esperado)"), None)
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// GET /api/v1/users/columns
pub async fn get_columns(ctx: RequestContext, State(state): State<AppState>) -> HandlerResult {
    let columns = user_service::get_table_columns(&state.db_pool)
        .await
        .or_envelope(&ctx, "Erro ao buscar informações das colunas")?;

    Ok(build_success(
        &ctx,
        200,
        Some("Colunas da tabela recuperadas com sucesso"),
        Some(to_json(&columns)),
        Some(USER_TABLE),
    ))
}

/// GET /api/v1/users/column-names
pub async fn get_column_names(ctx: RequestContext, State(state): State<AppState>) -> HandlerResult {
    let names = user_service::get_column_names(&state.db_pool)
        .await
        .or_envelope(&ctx, "Erro ao buscar nomes das colunas")?;

    Ok(build_success(
        &ctx,
        200,
        Some("Nomes das colunas recuperados com sucesso"),
        Some(json!(names)),
        Some(USER_TABLE),
    ))
}

/// GET /api/v1/users?limit=15&page=1
pub async fn index(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    // Fora de 1..=100 (ou não numérico) volta ao padrão
    let limit = params
        .get("limit")
        .and_then(|l| l.trim().parse::<i64>().ok())
        .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let page = params
        .get("page")
        .and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    let users = user_service::get_all_users(&state.db_pool, limit, page)
        .await
        .or_envelope(&ctx, "Erro ao listar usuários")?;
    let deleted = user_service::count_deleted_users(&state.db_pool)
        .await
        .or_envelope(&ctx, "Erro ao listar usuários")?;

    let mut extra = Map::new();
    extra.insert(
        "usuarios".into(),
        json!({ "ativos": users.total, "removidos": deleted }),
    );

    Ok(build_response(
        &ctx,
        true,
        200,
        Some("Usuários listados com sucesso"),
        Some(to_json(&users)),
        Some(USER_TABLE),
        extra,
    ))
}

/// POST /api/v1/users
pub async fn store(
    ctx: RequestContext,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> HandlerResult {
    let body = match parse_body(&ctx, body) {
        Ok(body) => body,
        Err(response) => return Ok(response),
    };

    let new_user = validation::validate_store(&state.db_pool, body)
        .await
        .or_envelope(&ctx, "Erro ao criar usuário")?;

    let user = user_service::create_user(&state.db_pool, new_user, state.config.bcrypt_cost)
        .await
        .or_envelope(&ctx, "Erro ao salvar usuário no banco de dados")?;

    Ok(build_success(
        &ctx,
        201,
        Some("Usuário criado com sucesso"),
        Some(to_json(&user)),
        Some(USER_TABLE),
    ))
}

/// GET /api/v1/users/{id}
pub async fn show(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let id = validation::validate_id(&raw_id).or_envelope(&ctx, "Erro ao buscar usuário")?;

    let user = user_service::get_user_by_id(&state.db_pool, id)
        .await
        .or_envelope(&ctx, "Erro ao buscar usuário")?;

    Ok(match user {
        Some(user) => build_success(
            &ctx,
            200,
            Some("Usuário encontrado"),
            Some(to_json(&user)),
            Some(USER_TABLE),
        ),
        None => build_error(&ctx, 404, Some("Usuário não encontrado"), None),
    })
}

/// PUT|PATCH /api/v1/users/{id}
pub async fn update(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HandlerResult {
    let body = match parse_body(&ctx, body) {
        Ok(body) => body,
        Err(response) => return Ok(response),
    };

    let (id, changes) = validation::validate_update(&state.db_pool, &raw_id, body)
        .await
        .or_envelope(&ctx, "Erro ao atualizar usuário")?;

    let user = user_service::update_user(&state.db_pool, id, changes, state.config.bcrypt_cost)
        .await
        .or_envelope(&ctx, "Erro ao atualizar usuário")?;

    Ok(match user {
        Some(user) => build_success(
            &ctx,
            200,
            Some("Usuário atualizado com sucesso"),
            Some(to_json(&user)),
            Some(USER_TABLE),
        ),
        None => build_error(&ctx, 404, Some("Usuário não encontrado"), None),
    })
}

/// DELETE /api/v1/users/{id} (soft delete)
pub async fn delete(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let id = validation::validate_id(&raw_id).or_envelope(&ctx, "Erro ao remover usuário")?;

    let removed = user_service::delete_user(&state.db_pool, id)
        .await
        .or_envelope(&ctx, "Erro ao remover usuário")?;
    if !removed {
        return Ok(build_error(&ctx, 404, Some("Usuário não encontrado"), None));
    }

    let deleted_at = user_service::find_user_with_trashed(&state.db_pool, id)
        .await
        .or_envelope(&ctx, "Erro ao remover usuário")?
        .and_then(|u| u.deleted_at);

    Ok(build_success(
        &ctx,
        200,
        Some("Usuário removido com sucesso"),
        Some(json!({ "id": id, "deleted_at": deleted_at })),
        Some(USER_TABLE),
    ))
}

/// DELETE /api/v1/users/{id}/force (hard delete, inclui removidos)
pub async fn destroy(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let id = validation::validate_id(&raw_id)
        .or_envelope(&ctx, "Erro ao remover usuário permanentemente")?;

    let removed = user_service::force_delete_user(&state.db_pool, id)
        .await
        .or_envelope(&ctx, "Erro ao remover usuário permanentemente")?;
    if !removed {
        return Ok(build_error(&ctx, 404, Some("Usuário não encontrado"), None));
    }

    Ok(build_success(
        &ctx,
        200,
        Some("Usuário removido permanentemente"),
        Some(json!({ "id": id, "status": "permanently_deleted" })),
        Some(USER_TABLE),
    ))
}

/// DELETE /api/v1/users/clear
pub async fn clear(ctx: RequestContext, State(state): State<AppState>) -> HandlerResult {
    let total_cleared = user_service::clear_deleted_users(&state.db_pool)
        .await
        .or_envelope(&ctx, "Erro ao limpar usuários removidos")?;

    let message = if total_cleared == 0 {
        "Nenhum usuário pendente de remoção"
    } else {
        "Usuários removidos limpos permanentemente"
    };

    Ok(build_success(
        &ctx,
        200,
        Some(message),
        Some(json!({ "total_cleared": total_cleared })),
        Some(USER_TABLE),
    ))
}
