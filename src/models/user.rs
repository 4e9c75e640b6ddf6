// src/models/user.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

pub const USER_TABLE: &str = "user_management";

// Representa uma linha da tabela 'user_management'
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub whatsapp: Option<String>,
    pub user: Option<String>,
    // Hash bcrypt, nunca sai na API
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub profile: Option<String>,
    pub mail: Option<String>,
    pub phone: Option<String>,
    pub date_birth: Option<NaiveDate>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Dados já validados para inserir um utilizador (password ainda em claro).
#[derive(Clone, Default)]
pub struct NewUser {
    pub name: Option<String>,
    pub cpf: String,
    pub whatsapp: Option<String>,
    pub user: String,
    pub password: String,
    pub profile: Option<String>,
    pub mail: String,
    pub phone: Option<String>,
    pub date_birth: Option<NaiveDate>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
}

// Debug manual para a password nunca ir parar aos logs
impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("cpf", &self.cpf)
            .field("whatsapp", &self.whatsapp)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("profile", &self.profile)
            .field("mail", &self.mail)
            .field("phone", &self.phone)
            .field("date_birth", &self.date_birth)
            .field("zip_code", &self.zip_code)
            .field("address", &self.address)
            .finish()
    }
}

/// Alteração parcial de um utilizador.
///
/// `None` = campo não enviado (fica como está); `Some(None)` = limpar a coluna.
/// A password só é alterada quando vem preenchida.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<Option<String>>,
    pub cpf: Option<Option<String>>,
    pub whatsapp: Option<Option<String>>,
    pub user: Option<Option<String>>,
    pub password: Option<String>,
    pub profile: Option<Option<String>>,
    pub mail: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub date_birth: Option<Option<NaiveDate>>,
    pub zip_code: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

impl UserChanges {
    /// Colunas de texto enviadas, pela ordem da tabela (sem password nem data).
    pub fn text_columns(&self) -> Vec<(&'static str, Option<&str>)> {
        [
            ("name", &self.name),
            ("cpf", &self.cpf),
            ("whatsapp", &self.whatsapp),
            ("user", &self.user),
            ("profile", &self.profile),
            ("mail", &self.mail),
            ("phone", &self.phone),
            ("zip_code", &self.zip_code),
            ("address", &self.address),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_ref().map(|v| (column, v.as_deref())))
        .collect()
    }

    /// Nomes dos campos alterados (para log), sem a password.
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self.text_columns().into_iter().map(|(c, _)| c).collect();
        if self.date_birth.is_some() {
            fields.push("date_birth");
        }
        fields
    }

    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserChanges")
            .field("fields", &self.updated_fields())
            .field("password", &self.has_password().then_some("[REDACTED]"))
            .finish()
    }
}

/// Página de utilizadores ativos.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub data: Vec<User>,
}

impl UserPage {
    pub fn new(data: Vec<User>, total: i64, per_page: i64, current_page: i64) -> Self {
        let last_page = ((total + per_page - 1) / per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (current_page - 1) * per_page + 1;
            (Some(from), Some(from + data.len() as i64 - 1))
        };
        Self {
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
            data,
        }
    }
}

/// Descrição de uma coluna da tabela.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableColumns {
    pub table: String,
    pub total_columns: usize,
    pub columns: Vec<ColumnInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_nunca_serializada() {
        let user = User {
            id: 1,
            name: Some("João".into()),
            cpf: None,
            whatsapp: None,
            user: Some("joao".into()),
            password: Some("$2b$04$hash".into()),
            profile: None,
            mail: Some("joao@example.com".into()),
            phone: None,
            date_birth: None,
            zip_code: None,
            address: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["user"], "joao");
    }

    #[test]
    fn debug_esconde_password() {
        let new_user = NewUser {
            password: "segredo123".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", new_user).contains("segredo123"));

        let changes = UserChanges {
            password: Some("outrasenha".into()),
            name: Some(Some("x".into())),
            ..Default::default()
        };
        let debug = format!("{:?}", changes);
        assert!(!debug.contains("outrasenha"));
        assert!(debug.contains("name"));
    }

    #[test]
    fn paginacao_calcula_limites() {
        let page = UserPage::new(vec![], 0, 15, 1);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);

        let page = UserPage::new(vec![], 31, 15, 3);
        assert_eq!(page.last_page, 3);
    }
}
