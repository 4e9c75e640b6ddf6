// src/lib.rs
pub mod config;
pub mod db;
pub mod error;
pub mod helpers;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
