use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{ChargeRequest, PaymentGateway},
};

/// Flutterwave v3 REST client for hosted checkout and verification.
#[derive(Clone)]
pub struct FlutterwaveClient {
    client: Client,
    base_url: String,
    secret_key: SecretString,
}

impl FlutterwaveClient {
    /// `client` should come from `http_client::try_build_client` so calls time out.
    pub fn new(client: Client, base_url: String, secret_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn charge_url(&self) -> String {
        format!("{}/payments", self.base_url)
    }

    fn verify_url(&self) -> String {
        format!("{}/transactions/verify_by_reference", self.base_url)
    }

    async fn handle_response(&self, response: reqwest::Response) -> AppResult<serde_json::Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| gateway_error("Failed to read gateway response", &e))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Flutterwave API error");
            return Err(AppError::PaymentGateway(format!(
                "Gateway responded with {}",
                status
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Flutterwave response");
            AppError::PaymentGateway("Unreadable gateway response".into())
        })
    }
}

fn gateway_error(context: &str, err: &reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "{} (timeout)", context);
        AppError::PaymentGateway("Payment gateway timed out".into())
    } else {
        tracing::error!(error = %err, "{}", context);
        AppError::PaymentGateway(context.to_string())
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveClient {
    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<serde_json::Value> {
        let response = self
            .client
            .post(self.charge_url())
            .bearer_auth(self.secret_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| gateway_error("Failed to initialize payment", &e))?;

        self.handle_response(response).await
    }

    async fn verify_by_reference(&self, tx_ref: &str) -> AppResult<serde_json::Value> {
        let response = self
            .client
            .get(self.verify_url())
            .query(&[("tx_ref", tx_ref)])
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| gateway_error("Failed to verify payment", &e))?;

        self.handle_response(response).await
    }
}
