// src/lib.rs

use std::sync::Arc;

use sqlx::PgPool;

pub mod compose;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use error::ErrorClassifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub classifier: Arc<ErrorClassifier>,
}
