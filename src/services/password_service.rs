// src/services/password_service.rs
//! Hash de senhas de utilizador.
//!
//! O custo vem de `Config::bcrypt_cost` (já validado em
//! `MIN_BCRYPT_COST..=MAX_BCRYPT_COST` no arranque). Hashes gravados com outro
//! custo continuam verificáveis: o custo faz parte do próprio hash.

use crate::error::{AppError, AppResult};

// bcrypt é CPU-bound: corre fora do reactor do tokio
async fn run_bcrypt<T, F>(operation: &'static str, job: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| {
            tracing::error!(operation, "Task bcrypt interrompida: {:?}", e);
            AppError::InternalServerError
        })?
        .map_err(|e| {
            tracing::error!(operation, "Erro bcrypt: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Hash bcrypt (salt novo a cada chamada) da senha em claro.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_owned();
    tracing::debug!(cost, "Gerando hash de senha");
    run_bcrypt("hash", move || bcrypt::hash(password, cost)).await
}

/// `Ok(false)` para senha errada; erro apenas se `stored_hash` não for um hash bcrypt.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let (password, stored_hash) = (password.to_owned(), stored_hash.to_owned());
    run_bcrypt("verify", move || bcrypt::verify(password, &stored_hash)).await
}
