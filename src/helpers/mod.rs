// src/helpers/mod.rs
pub mod sanitizer;
