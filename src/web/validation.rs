// src/web/validation.rs
//! Validação dos pedidos de utilizador (criação, atualização e ID de rota).
//!
//! Fluxo: corpo recebido → sanitização → verificação de tipos → regras do
//! `validator` → unicidade na base de dados. Os erros de todos os campos são
//! juntados numa única resposta 422; nada é gravado se houver algum erro.

use crate::{
    error::{AppError, AppResult},
    helpers::sanitizer,
    models::user::{NewUser, User, UserChanges},
    services::user_service,
};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::{borrow::Cow, collections::BTreeMap, sync::LazyLock};
use validator::{Validate, ValidationError, ValidationErrors};

pub const MSG_STORE_INVALID: &str = "Dados inválidos para cadastro de usuário";
pub const MSG_UPDATE_INVALID: &str = "Dados inválidos para atualização de usuário";
pub const MSG_ID_INVALID: &str = "ID inválido. Deve ser um número inteiro positivo";

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

// Campos aceites e a mensagem quando o valor não é texto
const TEXT_FIELDS: &[(&str, &str)] = &[
    ("name", "O nome deve ser um texto"),
    ("cpf", "O CPF deve ser um texto"),
    ("whatsapp", "O WhatsApp deve ser um texto"),
    ("user", "O nome de usuário deve ser um texto"),
    ("password", "A senha deve ser um texto"),
    ("profile", "O perfil deve ser um texto"),
    ("mail", "O e-mail deve ser um endereço válido"),
    ("phone", "O telefone deve ser um texto"),
    ("date_birth", "A data de nascimento deve ser uma data válida"),
    ("zip_code", "O CEP deve ser um texto"),
    ("address", "O endereço deve ser um texto"),
];

const REQUIRED_ON_UPDATE: &[(&str, &str)] = &[
    ("cpf", "O CPF não pode ficar vazio"),
    ("user", "O nome de usuário não pode ficar vazio"),
    ("mail", "O e-mail não pode ficar vazio"),
];

/// Erros por campo: `{"mail": ["O e-mail é obrigatório"], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self.0).unwrap_or(Value::Null)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

// --- Regras ---

#[derive(Default, Deserialize, Validate)]
struct StoreUserRequest {
    #[validate(length(max = 150, message = "O nome não pode ter mais de 150 caracteres"))]
    name: Option<String>,

    #[validate(
        required(message = "O CPF é obrigatório"),
        length(max = 50, message = "O CPF não pode ter mais de 50 caracteres")
    )]
    cpf: Option<String>,

    #[validate(custom(function = "validate_date_birth"))]
    date_birth: Option<String>,

    #[validate(length(max = 50, message = "O WhatsApp não pode ter mais de 50 caracteres"))]
    whatsapp: Option<String>,

    #[validate(length(max = 50, message = "O telefone não pode ter mais de 50 caracteres"))]
    phone: Option<String>,

    #[validate(
        required(message = "O e-mail é obrigatório"),
        email(message = "O e-mail deve ser um endereço válido"),
        length(max = 150, message = "O e-mail não pode ter mais de 150 caracteres")
    )]
    mail: Option<String>,

    #[validate(length(max = 50, message = "O CEP não pode ter mais de 50 caracteres"))]
    zip_code: Option<String>,

    #[validate(length(max = 50, message = "O endereço não pode ter mais de 50 caracteres"))]
    address: Option<String>,

    #[validate(
        required(message = "O nome de usuário é obrigatório"),
        length(max = 50, message = "O nome de usuário não pode ter mais de 50 caracteres"),
        custom(function = "validate_username")
    )]
    user: Option<String>,

    #[validate(
        required(message = "A senha é obrigatória"),
        custom(function = "validate_password_length")
    )]
    password: Option<String>,

    #[validate(length(max = 200, message = "O perfil não pode ter mais de 200 caracteres"))]
    profile: Option<String>,
}

// Mesmos limites da criação, mas tudo opcional
#[derive(Default, Deserialize, Validate)]
struct UpdateUserRequest {
    #[validate(length(max = 150, message = "O nome não pode ter mais de 150 caracteres"))]
    name: Option<String>,

    #[validate(length(max = 50, message = "O CPF não pode ter mais de 50 caracteres"))]
    cpf: Option<String>,

    #[validate(custom(function = "validate_date_birth"))]
    date_birth: Option<String>,

    #[validate(length(max = 50, message = "O WhatsApp não pode ter mais de 50 caracteres"))]
    whatsapp: Option<String>,

    #[validate(length(max = 50, message = "O telefone não pode ter mais de 50 caracteres"))]
    phone: Option<String>,

    #[validate(
        email(message = "O e-mail deve ser um endereço válido"),
        length(max = 150, message = "O e-mail não pode ter mais de 150 caracteres")
    )]
    mail: Option<String>,

    #[validate(length(max = 50, message = "O CEP não pode ter mais de 50 caracteres"))]
    zip_code: Option<String>,

    #[validate(length(max = 50, message = "O endereço não pode ter mais de 50 caracteres"))]
    address: Option<String>,

    #[validate(
        length(max = 50, message = "O nome de usuário não pode ter mais de 50 caracteres"),
        custom(function = "validate_username")
    )]
    user: Option<String>,

    #[validate(custom(function = "validate_password_length"))]
    password: Option<String>,

    #[validate(length(max = 200, message = "O perfil não pode ter mais de 200 caracteres"))]
    profile: Option<String>,
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_username(user: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(user) {
        Ok(())
    } else {
        Err(rule_error(
            "regex",
            "O nome de usuário deve conter apenas letras, números e underscore",
        ))
    }
}

fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    match password.chars().count() {
        0..=5 => Err(rule_error("min", "A senha deve ter no mínimo 6 caracteres")),
        6..=200 => Ok(()),
        _ => Err(rule_error("max", "A senha não pode ter mais de 200 caracteres")),
    }
}

fn validate_date_birth(value: &str) -> Result<(), ValidationError> {
    let date = parse_date(value)
        .ok_or_else(|| rule_error("date", "A data de nascimento deve ser uma data válida"))?;
    if date < Utc::now().date_naive() {
        Ok(())
    } else {
        Err(rule_error("before", "A data de nascimento deve ser anterior a hoje"))
    }
}

/// Aceita `YYYY-MM-DD` e `DD/MM/YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

// --- Pipeline ---

/// Sanitiza o corpo e separa os campos com tipo errado.
///
/// Devolve o registo limpo (só com campos texto/null) e os erros de tipo.
fn sanitize_and_check_types(body: Value) -> (Map<String, Value>, FieldErrors) {
    let raw = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let mut record = sanitizer::full_sanitize(&raw);
    let mut errors = FieldErrors::default();

    for (field, message) in TEXT_FIELDS {
        if matches!(record.get(*field), Some(v) if !v.is_string() && !v.is_null()) {
            errors.add(field, *message);
            record.remove(*field);
        }
    }
    // Só os campos conhecidos seguem em frente
    record.retain(|key, _| TEXT_FIELDS.iter().any(|(field, _)| *field == key.as_str()));
    (record, errors)
}

fn check_rules<T>(record: &Map<String, Value>, errors: &mut FieldErrors) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_value(Value::Object(record.clone())).map_err(|e| {
        tracing::error!("Falha inesperada ao ler o pedido já sanitizado: {}", e);
        AppError::InternalServerError
    })?;
    if let Err(validation_errors) = request.validate() {
        errors.merge(validation_errors.into());
    }
    Ok(request)
}

// Valor já usado por outro utilizador ativo?
fn taken_by_other(found: Option<User>, ignore_id: Option<i64>) -> bool {
    found.is_some_and(|user| Some(user.id) != ignore_id)
}

async fn check_unique(
    db_pool: &SqlitePool,
    cpf: Option<&str>,
    mail: Option<&str>,
    user: Option<&str>,
    ignore_id: Option<i64>,
    messages: [&'static str; 3],
    errors: &mut FieldErrors,
) -> AppResult<()> {
    let [cpf_msg, mail_msg, user_msg] = messages;

    if let Some(cpf) = cpf {
        if taken_by_other(user_service::find_by_cpf(db_pool, cpf).await?, ignore_id) {
            errors.add("cpf", cpf_msg);
        }
    }
    if let Some(mail) = mail {
        if taken_by_other(user_service::find_by_mail(db_pool, mail).await?, ignore_id) {
            errors.add("mail", mail_msg);
        }
    }
    if let Some(user) = user {
        if taken_by_other(user_service::find_by_username(db_pool, user).await?, ignore_id) {
            errors.add("user", user_msg);
        }
    }
    Ok(())
}

/// Regras de criação (`POST /api/v1/users`).
pub async fn validate_store(db_pool: &SqlitePool, body: Value) -> AppResult<NewUser> {
    let (record, mut errors) = sanitize_and_check_types(body);
    let request: StoreUserRequest = check_rules(&record, &mut errors)?;

    check_unique(
        db_pool,
        request.cpf.as_deref(),
        request.mail.as_deref(),
        request.user.as_deref(),
        None,
        [
            "Este CPF já está cadastrado no sistema",
            "Este e-mail já está cadastrado no sistema",
            "Este nome de usuário já está em uso",
        ],
        &mut errors,
    )
    .await?;

    if !errors.is_empty() {
        return Err(AppError::validation(MSG_STORE_INVALID, errors));
    }

    Ok(NewUser {
        name: request.name,
        cpf: request.cpf.unwrap_or_default(),
        whatsapp: request.whatsapp,
        user: request.user.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
        profile: request.profile,
        mail: request.mail.unwrap_or_default(),
        phone: request.phone,
        date_birth: request.date_birth.as_deref().and_then(parse_date),
        zip_code: request.zip_code,
        address: request.address,
    })
}

/// Regras de atualização (`PUT|PATCH /api/v1/users/{id}`).
///
/// Os erros do ID da rota vão no mesmo envelope que os dos campos.
pub async fn validate_update(
    db_pool: &SqlitePool,
    raw_id: &str,
    body: Value,
) -> AppResult<(i64, UserChanges)> {
    let (record, mut errors) = sanitize_and_check_types(body);

    let id = match check_id(raw_id) {
        Ok(id) => Some(id),
        Err(id_errors) => {
            errors.merge(id_errors);
            None
        }
    };

    // Obrigatórios na criação: podem mudar, mas não ficar vazios
    for (field, message) in REQUIRED_ON_UPDATE {
        if matches!(record.get(*field), Some(Value::Null)) {
            errors.add(field, *message);
        }
    }

    let request: UpdateUserRequest = check_rules(&record, &mut errors)?;

    check_unique(
        db_pool,
        request.cpf.as_deref(),
        request.mail.as_deref(),
        request.user.as_deref(),
        id,
        [
            "Este CPF já está cadastrado em outro usuário",
            "Este e-mail já está cadastrado em outro usuário",
            "Este nome de usuário já está em uso por outro usuário",
        ],
        &mut errors,
    )
    .await?;

    match id {
        Some(id) if errors.is_empty() => Ok((id, changes_from(&record))),
        _ => Err(AppError::validation(MSG_UPDATE_INVALID, errors)),
    }
}

// Campo presente no corpo → `Some(valor ou None)`; ausente → `None`
fn present(record: &Map<String, Value>, field: &str) -> Option<Option<String>> {
    record.get(field).map(|v| v.as_str().map(str::to_string))
}

fn changes_from(record: &Map<String, Value>) -> UserChanges {
    UserChanges {
        name: present(record, "name"),
        cpf: present(record, "cpf"),
        whatsapp: present(record, "whatsapp"),
        user: present(record, "user"),
        password: present(record, "password").flatten(),
        profile: present(record, "profile"),
        mail: present(record, "mail"),
        phone: present(record, "phone"),
        date_birth: present(record, "date_birth").map(|d| d.as_deref().and_then(parse_date)),
        zip_code: present(record, "zip_code"),
        address: present(record, "address"),
    }
}

fn check_id(raw_id: &str) -> Result<i64, FieldErrors> {
    let mut errors = FieldErrors::default();
    let raw_id = raw_id.trim();

    if raw_id.is_empty() {
        errors.add("id", "O ID do usuário é obrigatório");
        return Err(errors);
    }
    match raw_id.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        Ok(_) => {
            errors.add("id", "O ID deve ser maior que zero");
            Err(errors)
        }
        Err(_) => {
            errors.add("id", "O ID deve ser um número inteiro");
            Err(errors)
        }
    }
}

/// Regras do ID de rota (show, delete, force delete).
pub fn validate_id(raw_id: &str) -> AppResult<i64> {
    check_id(raw_id).map_err(|errors| AppError::validation(MSG_ID_INVALID, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_errors(body: Value) -> FieldErrors {
        let (record, mut errors) = sanitize_and_check_types(body);
        let _: StoreUserRequest = check_rules(&record, &mut errors).unwrap();
        errors
    }

    fn valid_body() -> Value {
        json!({
            "name": "João Silva",
            "cpf": "123.456.789-00",
            "user": "joao_silva123",
            "password": "segredo",
            "mail": "joao@example.com",
            "date_birth": "1990-05-20"
        })
    }

    #[test]
    fn corpo_valido_nao_tem_erros() {
        assert!(store_errors(valid_body()).is_empty());
    }

    #[test]
    fn campos_obrigatorios_na_criacao() {
        let errors = store_errors(json!({}));
        assert_eq!(errors.get("cpf").unwrap(), ["O CPF é obrigatório"]);
        assert_eq!(errors.get("mail").unwrap(), ["O e-mail é obrigatório"]);
        assert_eq!(errors.get("user").unwrap(), ["O nome de usuário é obrigatório"]);
        assert_eq!(errors.get("password").unwrap(), ["A senha é obrigatória"]);
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn formato_do_nome_de_usuario() {
        assert!(validate_username("joao_silva123").is_ok());
        assert!(validate_username("joão-silva").is_err());

        let mut body = valid_body();
        body["user"] = json!("joão-silva");
        let errors = store_errors(body);
        assert_eq!(
            errors.get("user").unwrap(),
            ["O nome de usuário deve conter apenas letras, números e underscore"]
        );
    }

    #[test]
    fn tamanho_da_senha() {
        let mut body = valid_body();
        body["password"] = json!("12345");
        assert_eq!(
            store_errors(body).get("password").unwrap(),
            ["A senha deve ter no mínimo 6 caracteres"]
        );

        let mut body = valid_body();
        body["password"] = json!("123456");
        assert!(store_errors(body).is_empty());

        assert!(validate_password_length(&"x".repeat(201)).is_err());
    }

    #[test]
    fn data_de_nascimento_no_passado() {
        assert!(validate_date_birth("20/05/1990").is_ok());
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(
            validate_date_birth(&today).unwrap_err().code,
            "before"
        );
        assert_eq!(validate_date_birth("2020-13-40").unwrap_err().code, "date");
    }

    #[test]
    fn tipo_errado_e_varios_erros_juntos() {
        let errors = store_errors(json!({
            "name": 123,
            "cpf": "123",
            "user": "ok_user",
            "password": "123",
            "mail": "nao-e-email",
            "zip_code": "1".repeat(60)
        }));
        assert_eq!(errors.get("name").unwrap(), ["O nome deve ser um texto"]);
        assert!(errors.get("password").is_some());
        assert_eq!(errors.get("mail").unwrap(), ["O e-mail deve ser um endereço válido"]);
        assert_eq!(errors.get("zip_code").unwrap(), ["O CEP não pode ter mais de 50 caracteres"]);
        assert!(errors.get("cpf").is_none());
    }

    #[test]
    fn corpo_que_nao_e_objeto_conta_como_vazio() {
        let errors = store_errors(json!(["x"]));
        assert!(errors.get("mail").is_some());
    }

    #[test]
    fn sanitizacao_acontece_antes_das_regras() {
        let (record, errors) = sanitize_and_check_types(json!({
            "cpf": "123.456.789-00",
            "name": "  João   Silva ",
            "extra": "ignorado"
        }));
        assert!(errors.is_empty());
        assert_eq!(record["cpf"], "12345678900");
        assert_eq!(record["name"], "João Silva");
        assert!(record.get("extra").is_none());
    }

    #[test]
    fn alteracoes_respeitam_campos_enviados() {
        let (record, _) = sanitize_and_check_types(json!({
            "name": "Novo Nome",
            "address": null,
            "password": "",
            "date_birth": "1990-01-02"
        }));
        let changes = changes_from(&record);

        assert_eq!(changes.name, Some(Some("Novo Nome".to_string())));
        assert_eq!(changes.address, Some(None));
        assert_eq!(changes.cpf, None);
        assert_eq!(changes.password, None);
        assert_eq!(changes.date_birth, Some(NaiveDate::from_ymd_opt(1990, 1, 2)));
    }

    #[test]
    fn validacao_do_id() {
        assert_eq!(validate_id("5").unwrap(), 5);
        assert_eq!(validate_id(" 123 ").unwrap(), 123);

        for (raw, message) in [
            ("0", "O ID deve ser maior que zero"),
            ("-3", "O ID deve ser maior que zero"),
            ("abc", "O ID deve ser um número inteiro"),
            ("1.5", "O ID deve ser um número inteiro"),
            ("", "O ID do usuário é obrigatório"),
        ] {
            match validate_id(raw) {
                Err(AppError::Validation { message: msg, errors }) => {
                    assert_eq!(msg, MSG_ID_INVALID);
                    assert_eq!(errors.get("id").unwrap(), [message], "id {:?}", raw);
                }
                other => panic!("esperava erro de validação para {:?}, veio {:?}", raw, other),
            }
        }
    }

    #[test]
    fn field_errors_serializa_como_mapa() {
        let mut errors = FieldErrors::default();
        errors.add("mail", "a");
        errors.add("mail", "b");
        assert_eq!(errors.into_value(), json!({"mail": ["a", "b"]}));
    }
}
