// src/web/health_handlers.rs
use crate::web::{
    request_context::RequestContext,
    response::{build_success, ApiResponse},
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// GET /api/health
pub async fn health(ctx: RequestContext) -> ApiResponse {
    build_success(
        &ctx,
        200,
        Some("API funcionando"),
        Some(json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })),
        None,
    )
}
