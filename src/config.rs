// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  // Payment gateway (PayFast-style token endpoint)
  pub payment_gateway_base_url: String,
  pub payment_merchant_id: String,
  pub payment_merchant_name: String,
  pub payment_secured_key: String,
  /// Outbound timeout for the token request. Deliberately bounded and never
  /// retried: a retry could create a duplicate basket on the gateway side.
  pub payment_gateway_timeout_secs: u64,

  pub default_currency: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let payment_gateway_base_url = get_env("PAYMENT_GATEWAY_BASE_URL")
      .unwrap_or_else(|_| "https://ipguat.apps.net.pk/Ecommerce/api".to_string());
    let payment_merchant_id = get_env("PAYMENT_MERCHANT_ID")?;
    let payment_merchant_name = get_env("PAYMENT_MERCHANT_NAME").unwrap_or_else(|_| "Verdant Market".to_string());
    let payment_secured_key = get_env("PAYMENT_SECURED_KEY")?;
    let payment_gateway_timeout_secs = get_env("PAYMENT_GATEWAY_TIMEOUT_SECS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid PAYMENT_GATEWAY_TIMEOUT_SECS: {}", e)))?;

    let default_currency = get_env("DEFAULT_CURRENCY").unwrap_or_else(|_| "PKR".to_string());

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      payment_gateway_base_url,
      payment_merchant_id,
      payment_merchant_name,
      payment_secured_key,
      payment_gateway_timeout_secs,
      default_currency,
    })
  }
}
