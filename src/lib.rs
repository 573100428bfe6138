pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod use_cases;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::adapters::PostgresTransactionRepository;
use crate::ports::TransactionRepository;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self {
            transactions: Arc::new(PostgresTransactionRepository::new(db.clone())),
            db,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}
