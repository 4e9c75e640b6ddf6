// src/web/response.rs
//! Envelope de resposta padronizado da API.
//!
//! Todas as respostas (sucesso, erro, validação, listas e registos únicos)
//! têm a mesma forma:
//!
//! ```json
//! { "success": true, "http_code": 200, "message": "Sucesso",
//!   "data": { "table": "user_management", "record": { ... } },
//!   "meta_data": { "www": { ... }, "timestamp": "2025-11-02 23:38:45" } }
//! ```
//!
//! O `timestamp` é sempre UTC no formato `YYYY-MM-DD HH:MM:SS`.

use crate::web::{request_context::RequestContext, validation::FieldErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub http_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Map<String, Value>>,
}

/// Envelope + status HTTP, devolvido pelos handlers.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Forma geral; `build_success` e `build_error` delegam aqui.
pub fn build_response(
    ctx: &RequestContext,
    success: bool,
    http_code: u16,
    message: Option<&str>,
    payload: Option<Value>,
    table: Option<&str>,
    extra_meta: Map<String, Value>,
) -> ApiResponse {
    let message = message.map(str::to_string).unwrap_or_else(|| http_message(http_code).to_string());
    let data = payload
        .filter(|p| !p.is_null())
        .map(|p| format_data(p, table));

    ApiResponse {
        status: status_for(http_code),
        envelope: Envelope {
            success,
            http_code,
            message,
            data,
            errors: None,
            meta_data: Some(build_meta_data(ctx, extra_meta)),
        },
    }
}

pub fn build_success(
    ctx: &RequestContext,
    http_code: u16,
    message: Option<&str>,
    payload: Option<Value>,
    table: Option<&str>,
) -> ApiResponse {
    build_response(ctx, true, http_code, message, payload, table, Map::new())
}

pub fn build_error(
    ctx: &RequestContext,
    http_code: u16,
    message: Option<&str>,
    errors: Option<Value>,
) -> ApiResponse {
    let mut response = build_response(ctx, false, http_code, message, None, None, Map::new());
    response.envelope.errors = errors;
    response
}

pub fn build_validation_error(
    ctx: &RequestContext,
    errors: FieldErrors,
    message: Option<&str>,
) -> ApiResponse {
    build_error(
        ctx,
        422,
        Some(message.unwrap_or("Entidade não processável")),
        Some(errors.into_value()),
    )
}

/// Embrulha o payload conforme a sua forma:
/// objeto → `record`, lista de escalares → `columns`, outras listas → `records`,
/// restante → `data`.
pub fn format_data(payload: Value, table: Option<&str>) -> Value {
    let table = table.map(|t| Value::String(t.to_string())).unwrap_or(Value::Null);

    match payload {
        Value::Object(record) if !record.is_empty() => json!({ "table": table, "record": record }),
        Value::Array(items) => {
            let total = items.len();
            let key = if !items.is_empty() && items.iter().all(is_scalar) {
                "columns"
            } else {
                "records"
            };
            let mut data = Map::new();
            data.insert("table".into(), table);
            data.insert(key.into(), Value::Array(items));
            data.insert("total".into(), total.into());
            Value::Object(data)
        }
        other => json!({ "table": table, "data": other }),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

pub fn build_meta_data(ctx: &RequestContext, extra: Map<String, Value>) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert(
        "www".into(),
        json!({
            "base_url": ctx.base_url(),
            "path": ctx.path(),
            "method": ctx.method(),
            "full_url": ctx.full_url(),
            "segments": ctx.segments(),
        }),
    );
    meta.insert(
        "timestamp".into(),
        Value::String(Utc::now().format(TIMESTAMP_FORMAT).to_string()),
    );
    // Metadados extra sobrepõem-se aos gerados se a chave repetir
    meta.extend(extra);
    meta
}

fn status_for(http_code: u16) -> StatusCode {
    StatusCode::from_u16(http_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Mensagem padrão para cada código HTTP (total: códigos desconhecidos têm mensagem própria).
pub fn http_message(http_code: u16) -> &'static str {
    match http_code {
        // 1xx - Informativos
        100 => "Continuar requisição",
        101 => "Mudando protocolo",
        102 => "Processando requisição",
        103 => "Cabeçalhos iniciais enviados",

        // 2xx - Sucesso
        200 => "Sucesso",
        201 => "Criado com sucesso",
        202 => "Aceito para processamento",
        203 => "Informação não autorizada",
        204 => "Sem conteúdo",
        205 => "Resetar conteúdo",
        206 => "Conteúdo parcial",
        207 => "Status múltiplos",
        208 => "Já reportado",
        226 => "IM usado",

        // 3xx - Redirecionamentos
        300 => "Múltiplas escolhas",
        301 => "Movido permanentemente",
        302 => "Encontrado / redirecionado",
        303 => "Ver outro recurso",
        304 => "Não modificado",
        305 => "Usar proxy",
        306 => "Proxy obsoleto",
        307 => "Redirecionamento temporário",
        308 => "Redirecionamento permanente",

        // 4xx - Erros do cliente
        400 => "Requisição inválida",
        401 => "Não autorizado",
        402 => "Pagamento requerido",
        403 => "Proibido",
        404 => "Não encontrado",
        405 => "Método não permitido",
        406 => "Não aceitável",
        407 => "Autenticação proxy requerida",
        408 => "Tempo esgotado",
        409 => "Conflito",
        410 => "Recurso removido",
        411 => "Comprimento necessário",
        412 => "Pré-condição falhou",
        413 => "Corpo muito grande",
        414 => "URI muito longa",
        415 => "Tipo não suportado",
        416 => "Faixa não satisfatória",
        417 => "Expectativa falhou",
        418 => "Sou um bule de chá",
        421 => "Requisição mal direcionada",
        422 => "Entidade não processável",
        423 => "Recurso bloqueado",
        424 => "Dependência falhou",
        425 => "Muito cedo",
        426 => "Upgrade necessário",
        428 => "Pré-condição obrigatória",
        429 => "Muitas requisições",
        431 => "Cabeçalhos muito grandes",
        451 => "Bloqueado por razões legais",

        // 5xx - Erros do servidor
        500 => "Erro interno servidor",
        501 => "Não implementado",
        502 => "Gateway ruim",
        503 => "Serviço indisponível",
        504 => "Tempo de gateway esgotado",
        505 => "Versão HTTP não suportada",
        506 => "Variante também negocia",
        507 => "Armazenamento insuficiente",
        508 => "Loop detectado",
        510 => "Não estendido",
        511 => "Autenticação de rede necessária",

        _ => "Código HTTP desconhecido",
    }
}
