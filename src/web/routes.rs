// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        contato_handlers, health_handlers,
        request_context::RequestContext,
        response::{build_error, ApiResponse},
        user_handlers,
    },
};
use axum::{
    routing::{delete, get},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    let contato_routes = Router::new()
        .route("/api/v1/contatos", get(contato_handlers::index))
        .route("/api/v1/contatos/{id}", get(contato_handlers::show));

    // Rotas estáticas têm prioridade sobre /{id} no matcher do axum
    let user_routes = Router::new()
        .route("/api/v1/users/columns", get(user_handlers::get_columns))
        .route("/api/v1/users/column-names", get(user_handlers::get_column_names))
        .route("/api/v1/users/clear", delete(user_handlers::clear))
        .route(
            "/api/v1/users",
            get(user_handlers::index).post(user_handlers::store),
        )
        .route(
            "/api/v1/users/{id}",
            get(user_handlers::show)
                .put(user_handlers::update)
                .patch(user_handlers::update)
                .delete(user_handlers::delete),
        )
        .route("/api/v1/users/{id}/force", delete(user_handlers::destroy));

    Router::new()
        .route("/api/health", get(health_handlers::health))
        .merge(contato_routes)
        .merge(user_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(app_state)
}

// Rota inexistente
async fn not_found(ctx: RequestContext) -> ApiResponse {
    tracing::debug!(method = %ctx.method(), path = %ctx.path(), "Rota não encontrada");
    build_error(&ctx, 404, Some("Rota não encontrada"), None)
}

// Rota existe mas não aceita o método
async fn method_not_allowed(ctx: RequestContext) -> ApiResponse {
    build_error(&ctx, 405, None, None)
}
