// src/services/payments.rs

//! Payment gateway client. One outbound call per checkout: fetch a
//! short-lived access token for a basket before the record is persisted.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
  #[serde(rename = "ACCESS_TOKEN")]
  access_token: Option<String>,
}

/// Thin wrapper over the gateway's GetAccessToken endpoint. The request
/// carries a bounded timeout and is never retried: the gateway may have
/// created a basket record on its side even when our read of the response
/// fails, and a retry would duplicate it. If the local save that follows a
/// successful token fetch fails, the remote token is orphaned; there is no
/// reconciliation.
#[derive(Clone)]
pub struct PaymentClient {
  http: reqwest::Client,
  base_url: String,
  merchant_id: String,
  secured_key: String,
}

impl PaymentClient {
  pub fn from_config(config: &AppConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.payment_gateway_timeout_secs))
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build payment gateway HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url: config.payment_gateway_base_url.trim_end_matches('/').to_string(),
      merchant_id: config.payment_merchant_id.clone(),
      secured_key: config.payment_secured_key.clone(),
    })
  }

  fn token_url(&self) -> String {
    format!("{}/Transaction/GetAccessToken", self.base_url)
  }

  /// Requests an access token for the given basket (the purchasable record's
  /// id) and amount in minor currency units. Every failure mode — transport,
  /// non-2xx status, unparsable body, missing token — maps to
  /// `AppError::Upstream`; the caller aborts the purchase before persisting.
  #[instrument(name = "payments::access_token", skip(self), fields(%basket_id, amount))]
  pub async fn access_token(&self, basket_id: Uuid, amount: i64) -> Result<String> {
    let response = self
      .http
      .post(self.token_url())
      .query(&[
        ("MERCHANT_ID", self.merchant_id.as_str()),
        ("SECURED_KEY", self.secured_key.as_str()),
        ("BASKET_ID", &basket_id.to_string()),
        ("TXNAMT", &amount.to_string()),
      ])
      .send()
      .await
      .map_err(|e| {
        warn!(error = %e, "Payment gateway unreachable");
        AppError::Upstream("Payment gateway unreachable.".to_string())
      })?;

    if !response.status().is_success() {
      warn!(status = %response.status(), "Payment gateway rejected token request");
      return Err(AppError::Upstream(format!(
        "Payment gateway returned status {}.",
        response.status().as_u16()
      )));
    }

    let body: AccessTokenResponse = response
      .json()
      .await
      .map_err(|_| AppError::Upstream("Malformed payment gateway response.".to_string()))?;

    match body.access_token.filter(|t| !t.is_empty()) {
      Some(token) => {
        info!("Access token acquired for basket");
        Ok(token)
      }
      None => Err(AppError::Upstream(
        "Payment gateway response missing access token.".to_string(),
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_config() -> AppConfig {
    AppConfig {
      server_host: "127.0.0.1".into(),
      server_port: 8080,
      database_url: "postgres://localhost/test".into(),
      payment_gateway_base_url: "https://gateway.example.com/api/".into(),
      payment_merchant_id: "M123".into(),
      payment_merchant_name: "Verdant Market".into(),
      payment_secured_key: "sk".into(),
      payment_gateway_timeout_secs: 10,
      default_currency: "PKR".into(),
    }
  }

  #[test]
  fn token_url_drops_trailing_slash() {
    let client = PaymentClient::from_config(&test_config()).unwrap();
    assert_eq!(
      client.token_url(),
      "https://gateway.example.com/api/Transaction/GetAccessToken"
    );
  }

  #[test]
  fn empty_token_is_treated_as_missing() {
    let body: AccessTokenResponse = serde_json::from_str(r#"{"ACCESS_TOKEN": ""}"#).unwrap();
    assert!(body.access_token.filter(|t| !t.is_empty()).is_none());
  }

  #[test]
  fn token_field_is_parsed_from_gateway_casing() {
    let body: AccessTokenResponse = serde_json::from_str(r#"{"ACCESS_TOKEN": "tok_1"}"#).unwrap();
    assert_eq!(body.access_token.as_deref(), Some("tok_1"));
  }

  #[test]
  fn absent_token_field_parses_as_none() {
    let body: AccessTokenResponse = serde_json::from_str(r#"{"CODE": "00"}"#).unwrap();
    assert!(body.access_token.is_none());
  }
}
