// src/state.rs
use crate::config::AppConfig;
use crate::services::payments::PaymentClient;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
  pub payments: PaymentClient,
}
