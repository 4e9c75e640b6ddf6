// src/error.rs
use crate::web::{
    request_context::RequestContext,
    response::{build_error, build_validation_error},
    validation::FieldErrors,
};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Erro interno inesperado")]
    InternalServerError,

    /// Falha de validação; é a única variante que chega ao cliente com detalhe.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
}

impl AppError {
    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        AppError::Validation {
            message: message.into(),
            errors,
        }
    }

    /// Verdadeiro quando a base de dados rejeitou por índice UNIQUE.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::SqlxError(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Erro já associado ao contexto do pedido, pronto a virar envelope.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub context: RequestContext,
    /// Mensagem genérica mostrada ao cliente em erros internos
    pub message: &'static str,
}

// Ponto único de conversão de erros em respostas HTTP
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.error {
            AppError::Validation { message, errors } => {
                tracing::debug!(
                    path = %self.context.path(),
                    campos = ?errors.fields(),
                    "Pedido rejeitado na validação"
                );
                build_validation_error(&self.context, errors, Some(&message)).into_response()
            }
            other => {
                // Loga o erro detalhado no servidor, o cliente só vê a mensagem genérica
                tracing::error!(
                    method = %self.context.method(),
                    path = %self.context.path(),
                    error = ?other,
                    "{}",
                    self.message
                );
                build_error(&self.context, 500, Some(self.message), None).into_response()
            }
        }
    }
}

/// Liga um `AppResult` ao contexto do pedido para poder usar `?` nos handlers.
pub trait ResultExt<T> {
    fn or_envelope(self, context: &RequestContext, message: &'static str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for AppResult<T> {
    fn or_envelope(self, context: &RequestContext, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|error| ApiError {
            error,
            context: context.clone(),
            message,
        })
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
