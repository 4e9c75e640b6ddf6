// src/services/mod.rs
pub mod password_service;
pub mod user_service;
