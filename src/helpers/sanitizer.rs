// src/helpers/sanitizer.rs
//! Limpeza dos dados de entrada antes da validação.
//!
//! Remove máscaras de formatação (CPF, telefone, CEP) e espaços redundantes.
//! Funções puras: nunca falham e nunca alteram o registo recebido.

use serde_json::{Map, Value};

/// Campos cujas máscaras são removidas por omissão.
pub const FIELDS_TO_SANITIZE: &[&str] = &["cpf", "whatsapp", "phone", "zip_code"];

/// Mantém apenas os dígitos.
///
/// `"123.456.789-00"` → `"12345678900"`, `"(11) 98888-7777"` → `"11988887777"`.
/// Valor ausente, vazio ou sem dígitos → `None`.
pub fn remove_mask(value: Option<&str>) -> Option<String> {
    let digits: String = value?.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// `trim` + espaços internos repetidos reduzidos a um só.
pub fn clean_string(value: Option<&str>) -> Option<String> {
    let cleaned = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Aplica `remove_mask` apenas aos campos indicados (quando presentes e texto).
pub fn sanitize_fields(record: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    let mut sanitized = record.clone();
    for field in fields {
        let clean = match sanitized.get(*field) {
            Some(Value::String(raw)) => remove_mask(Some(raw.as_str())),
            _ => continue,
        };
        sanitized.insert((*field).to_string(), clean.map(Value::String).unwrap_or(Value::Null));
    }
    sanitized
}

pub fn sanitize(record: &Map<String, Value>) -> Map<String, Value> {
    sanitize_fields(record, FIELDS_TO_SANITIZE)
}

pub fn clean_strings(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => clean_string(Some(s.as_str())).map(Value::String).unwrap_or(Value::Null),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Máscaras primeiro (trabalham sobre o texto original), depois espaços.
pub fn full_sanitize(record: &Map<String, Value>) -> Map<String, Value> {
    clean_strings(&sanitize(record))
}
