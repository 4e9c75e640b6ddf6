pub mod contato;
pub mod user;
