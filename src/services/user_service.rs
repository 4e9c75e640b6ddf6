// src/services/user_service.rs
//! Regras de negócio dos utilizadores.
//!
//! Os handlers nunca falam diretamente com a base de dados: passam sempre por
//! aqui. "Não encontrado" é um `Option`/`bool`, nunca um erro.

use crate::{
    error::AppResult,
    models::user::{ColumnInfo, NewUser, TableColumns, User, UserChanges, UserPage, USER_TABLE},
    services::password_service,
};
use chrono::{NaiveDateTime, SubsecRound, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub const DEFAULT_PAGE_SIZE: i64 = 15;
pub const MAX_PAGE_SIZE: i64 = 100;

// Colunas na ordem da tabela (SELECT explícito em vez de *)
const USER_COLUMNS: &str = "id, name, cpf, whatsapp, user, password, profile, mail, phone, \
     date_birth, zip_code, address, created_at, updated_at, deleted_at";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

/// Lista utilizadores ATIVOS, paginados. `limit` é forçado a 1..=100.
pub async fn get_all_users(db_pool: &SqlitePool, limit: i64, page: i64) -> AppResult<UserPage> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    tracing::debug!(limit, page, "Listando utilizadores ativos...");

    let total = count_active_users(db_pool).await?;
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM user_management
         WHERE deleted_at IS NULL
         ORDER BY id ASC
         LIMIT ?1 OFFSET ?2"
    ))
    .bind(limit)
    .bind((page - 1).saturating_mul(limit))
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("Encontrados {} utilizadores (total {}).", users.len(), total);
    Ok(UserPage::new(users, total, limit, page))
}

/// Busca um utilizador ativo (sem soft delete) pelo ID.
pub async fn get_user_by_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", id);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM user_management WHERE id = ?1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(db_pool)
    .await?;

    if user.is_none() {
        tracing::debug!("Utilizador {} não encontrado.", id);
    }
    Ok(user)
}

/// Igual a `get_user_by_id` mas inclui registos com soft delete.
pub async fn find_user_with_trashed(db_pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM user_management WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Cria um utilizador. A senha é guardada apenas como hash bcrypt.
pub async fn create_user(db_pool: &SqlitePool, data: NewUser, bcrypt_cost: u32) -> AppResult<User> {
    tracing::info!(user = %data.user, "Tentando criar utilizador...");

    match insert_user(db_pool, &data, bcrypt_cost).await {
        Ok(user) => {
            tracing::info!(
                user_id = user.id,
                user = ?user.user,
                mail = ?user.mail,
                "✅ Utilizador criado com sucesso"
            );
            Ok(user)
        }
        Err(e) => {
            if e.is_unique_violation() {
                tracing::warn!(data = ?data, "Falha ao criar utilizador: violação de unicidade");
            } else {
                tracing::error!(error = ?e, data = ?data, "Erro ao criar utilizador no service");
            }
            Err(e)
        }
    }
}

async fn insert_user(db_pool: &SqlitePool, data: &NewUser, bcrypt_cost: u32) -> AppResult<User> {
    // 1. Hash da senha antes de qualquer escrita
    let password_hash = password_service::hash_password(&data.password, bcrypt_cost).await?;
    let now = now();

    // 2. Insere e devolve a linha criada
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user_management
            (name, cpf, whatsapp, user, password, profile, mail, phone,
             date_birth, zip_code, address, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.cpf)
    .bind(&data.whatsapp)
    .bind(&data.user)
    .bind(&password_hash)
    .bind(&data.profile)
    .bind(&data.mail)
    .bind(&data.phone)
    .bind(data.date_birth)
    .bind(&data.zip_code)
    .bind(&data.address)
    .bind(now)
    .fetch_one(db_pool)
    .await?;

    Ok(user)
}

/// Atualiza os campos enviados. `None` quando não existe utilizador ativo com esse ID.
pub async fn update_user(
    db_pool: &SqlitePool,
    id: i64,
    changes: UserChanges,
    bcrypt_cost: u32,
) -> AppResult<Option<User>> {
    tracing::info!(user_id = id, "Atualizando dados do utilizador...");

    let result = apply_changes(db_pool, id, &changes, bcrypt_cost).await;
    match &result {
        Ok(Some(_)) => tracing::info!(
            user_id = id,
            updated_fields = ?changes.updated_fields(),
            password_changed = changes.has_password(),
            "✅ Utilizador atualizado com sucesso"
        ),
        Ok(None) => tracing::warn!("Falha ao atualizar: utilizador {} não encontrado.", id),
        Err(e) => tracing::error!(
            user_id = id,
            error = ?e,
            changes = ?changes,
            "Erro ao atualizar utilizador no service"
        ),
    }
    result
}

async fn apply_changes(
    db_pool: &SqlitePool,
    id: i64,
    changes: &UserChanges,
    bcrypt_cost: u32,
) -> AppResult<Option<User>> {
    if get_user_by_id(db_pool, id).await?.is_none() {
        return Ok(None);
    }

    // Senha vazia ou ausente: o hash guardado não é tocado
    let password_hash = match changes.password.as_deref() {
        Some(raw) if !raw.is_empty() => Some(password_service::hash_password(raw, bcrypt_cost).await?),
        _ => None,
    };

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE user_management SET ");
    {
        let mut set = query.separated(", ");
        for (column, value) in changes.text_columns() {
            set.push(format!("{} = ", column));
            set.push_bind_unseparated(value.map(str::to_string));
        }
        if let Some(date_birth) = changes.date_birth {
            set.push("date_birth = ");
            set.push_bind_unseparated(date_birth);
        }
        if let Some(hash) = password_hash {
            set.push("password = ");
            set.push_bind_unseparated(hash);
        }
        set.push("updated_at = ");
        set.push_bind_unseparated(now());
    }
    query.push(" WHERE id = ").push_bind(id).push(" AND deleted_at IS NULL");

    query.build().execute(db_pool).await?;

    // Recarrega para devolver o estado real pós-update
    get_user_by_id(db_pool, id).await
}

/// Soft delete: preenche `deleted_at`, o registo fica na tabela.
pub async fn delete_user(db_pool: &SqlitePool, id: i64) -> AppResult<bool> {
    let now = now();
    let rows_affected = sqlx::query(
        "UPDATE user_management SET deleted_at = ?1, updated_at = ?1
         WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(id)
    .execute(db_pool)
    .await
    .inspect_err(|e| tracing::error!(user_id = id, error = ?e, "Erro ao remover utilizador (soft delete)"))?
    .rows_affected();

    if rows_affected == 0 {
        tracing::debug!("Soft delete ignorado: utilizador {} não encontrado.", id);
        return Ok(false);
    }
    tracing::info!(user_id = id, deleted_at = %now, "Utilizador removido (soft delete)");
    Ok(true)
}

/// Hard delete: remove a linha de vez, incluindo registos já com soft delete.
pub async fn force_delete_user(db_pool: &SqlitePool, id: i64) -> AppResult<bool> {
    let Some(user) = find_user_with_trashed(db_pool, id).await? else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM user_management WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await
        .inspect_err(|e| tracing::error!(user_id = id, error = ?e, "Erro ao remover utilizador permanentemente"))?;

    tracing::warn!(
        user_id = id,
        user = ?user.user,
        mail = ?user.mail,
        "⚠️ Utilizador removido PERMANENTEMENTE (hard delete)"
    );
    Ok(true)
}

/// Remove de vez todos os registos com soft delete. Devolve quantos saíram.
pub async fn clear_deleted_users(db_pool: &SqlitePool) -> AppResult<u64> {
    if count_deleted_users(db_pool).await? == 0 {
        tracing::debug!("Nenhum utilizador pendente de limpeza.");
        return Ok(0);
    }

    let total_cleared = sqlx::query("DELETE FROM user_management WHERE deleted_at IS NOT NULL")
        .execute(db_pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Erro ao limpar utilizadores removidos"))?
        .rows_affected();

    tracing::warn!(total_cleared, "🧹 Limpeza de utilizadores soft deleted realizada");
    Ok(total_cleared)
}

/// Colunas da tabela com o tipo declarado.
pub async fn get_table_columns(db_pool: &SqlitePool) -> AppResult<TableColumns> {
    let columns: Vec<ColumnInfo> = sqlx::query_as::<_, ColumnInfo>(
        "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid",
    )
    .bind(USER_TABLE)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(|c| ColumnInfo {
        column_type: c.column_type.to_lowercase(),
        ..c
    })
    .collect();

    Ok(TableColumns {
        table: USER_TABLE.to_string(),
        total_columns: columns.len(),
        columns,
    })
}

pub async fn get_column_names(db_pool: &SqlitePool) -> AppResult<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .bind(USER_TABLE)
        .fetch_all(db_pool)
        .await?;
    Ok(names)
}

// --- Helpers (escopo: apenas ativos) ---

pub async fn user_exists(db_pool: &SqlitePool, id: i64) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM user_management WHERE id = ?1 AND deleted_at IS NULL)",
    )
    .bind(id)
    .fetch_one(db_pool)
    .await?;
    Ok(exists)
}

async fn find_active_by(db_pool: &SqlitePool, column: &'static str, value: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM user_management
         WHERE {column} = ?1 AND deleted_at IS NULL
         LIMIT 1"
    ))
    .bind(value)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

pub async fn find_by_cpf(db_pool: &SqlitePool, cpf: &str) -> AppResult<Option<User>> {
    find_active_by(db_pool, "cpf", cpf).await
}

pub async fn find_by_mail(db_pool: &SqlitePool, mail: &str) -> AppResult<Option<User>> {
    find_active_by(db_pool, "mail", mail).await
}

pub async fn find_by_username(db_pool: &SqlitePool, user: &str) -> AppResult<Option<User>> {
    find_active_by(db_pool, "user", user).await
}

pub async fn count_active_users(db_pool: &SqlitePool) -> AppResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_management WHERE deleted_at IS NULL")
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}

pub async fn count_deleted_users(db_pool: &SqlitePool) -> AppResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_management WHERE deleted_at IS NOT NULL")
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}
