// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, str::FromStr};

/// Limites aceites pelo bcrypt para `BCRYPT_COST`.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Configuração da aplicação, lida uma única vez no arranque.
///
/// Nada no resto do código lê variáveis de ambiente diretamente: o `Config`
/// é guardado no `AppState` e passado a quem precisar.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// URL pública da API (usada em `meta_data.www.base_url`)
    pub app_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Custo do bcrypt (fixo durante a vida do processo)
    pub bcrypt_cost: u32,
}

impl Config {
    /// Monta a configuração a partir do ambiente.
    ///
    /// O `.env` já foi carregado pelo `main`.
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let app_url = env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT", 3000)?;
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;
        let bcrypt_cost = parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(AppError::InvalidConfig(format!(
                "BCRYPT_COST deve estar entre {} e {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }

        Ok(Self {
            database_url,
            app_url: app_url.trim_end_matches('/').to_string(),
            host,
            port,
            db_max_connections,
            bcrypt_cost,
        })
    }

    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::InvalidConfig(format!("Endereço inválido: {}", e)))
    }
}

// Lê uma variável opcional; presente mas inválida é erro de configuração.
fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidConfig(format!("{} inválida: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Único teste que mexe no ambiente do processo
    #[test]
    fn from_env_valida_bcrypt_cost() {
        env::set_var("DATABASE_URL", "sqlite::memory:");
        env::set_var("APP_URL", "http://api.local/");

        for invalid in ["3", "32", "abc"] {
            env::set_var("BCRYPT_COST", invalid);
            let result = Config::from_env();
            assert!(
                matches!(result, Err(AppError::InvalidConfig(_))),
                "BCRYPT_COST={invalid} deveria ser rejeitado"
            );
        }

        env::set_var("BCRYPT_COST", "4");
        let config = Config::from_env().unwrap();
        assert_eq!(config.bcrypt_cost, MIN_BCRYPT_COST);
        assert_eq!(config.app_url, "http://api.local");

        env::set_var("BCRYPT_COST", "31");
        assert_eq!(Config::from_env().unwrap().bcrypt_cost, MAX_BCRYPT_COST);

        env::remove_var("BCRYPT_COST");
        assert_eq!(Config::from_env().unwrap().bcrypt_cost, bcrypt::DEFAULT_COST);
    }
}
