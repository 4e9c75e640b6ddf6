// src/web/mod.rs
pub mod contato_handlers;
pub mod health_handlers;
pub mod request_context;
pub mod response;
pub mod routes;
pub mod user_handlers;
pub mod validation;
