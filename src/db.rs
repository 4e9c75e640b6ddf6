// src/db.rs
use crate::{config::Config, error::AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool(config: &Config) -> AppResult<SqlitePool> {
    tracing::info!("Ligando à base de dados: {}", config.database_url);

    // Criar se não existir, esperar até 5s por locks
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Executa os ficheiros SQL de `./migrations` no pool indicado.
pub async fn run_migrations(pool: &SqlitePool) -> AppResult {
    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrações concluídas.");
    Ok(())
}
