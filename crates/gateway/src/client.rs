use std::time::Duration;

use config::GatewayConfig;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::{
    ChargeCreated, ChargeStatus, CreateChargeRequest, GatewayError,
    types::{parse_charge_created, parse_charge_status},
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

// The provider has served the create operation under both the singular and
// the plural resource path depending on the deployment; same for lookup.
const CREATE_PATHS: [&str; 2] = ["payment-transaction/create", "payment-transactions/create"];
const STATUS_PATHS: [&str; 3] = ["payment-transactions", "payment-transaction", "transactions"];

pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    public_key: String,
    secret_key: SecretString,
    webhook_url: Option<String>,
}

impl GatewayClient {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let (public_key, secret_key) = config.credentials().ok_or(GatewayError::Unconfigured)?;
        let http = reqwest::Client::builder()
            .user_agent("pix-checkout-relay/0.1")
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_key: public_key.to_string(),
            secret_key: secret_key.clone(),
            webhook_url: config.webhook_url.clone(),
        })
    }

    pub async fn create_charge(
        &self,
        request: &CreateChargeRequest,
    ) -> Result<ChargeCreated, GatewayError> {
        let payload = build_charge_payload(request, self.webhook_url.as_deref());
        let mut last_message: Option<String> = None;

        for path in CREATE_PATHS {
            let url = format!("{}/{}", self.base_url, path);
            let response = match self
                .http
                .post(&url)
                .basic_auth(&self.public_key, Some(self.secret_key.expose_secret()))
                .header("Accept", "application/json")
                .timeout(CREATE_TIMEOUT)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "charge creation request failed");
                    last_message = Some(err.to_string());
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let data: Value = match serde_json::from_str(&body) {
                Ok(data) => data,
                Err(_) => {
                    tracing::warn!(url = %url, %status, "gateway returned a non-JSON response");
                    continue;
                }
            };

            if status.is_success() {
                match parse_charge_created(&data) {
                    Some(created) => {
                        tracing::info!(
                            transaction_id = created.transaction_id.as_deref().unwrap_or(""),
                            "charge created"
                        );
                        return Ok(created);
                    }
                    None => {
                        tracing::warn!(url = %url, "gateway response carries no PIX code");
                        continue;
                    }
                }
            }

            last_message = data
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(last_message);
        }

        Err(GatewayError::ChargeRejected {
            message: last_message
                .unwrap_or_else(|| "Failed to reach the payment gateway".to_string()),
        })
    }

    pub async fn get_charge_status(&self, id: &str) -> Result<ChargeStatus, GatewayError> {
        for path in STATUS_PATHS {
            let url = format!("{}/{}/{}", self.base_url, path, id);
            let response = match self
                .http
                .get(&url)
                .basic_auth(&self.public_key, Some(self.secret_key.expose_secret()))
                .header("Accept", "application/json")
                .timeout(STATUS_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "status lookup failed");
                    continue;
                }
            };

            if response.status().is_success() {
                let data: Value = response.json().await?;
                return Ok(parse_charge_status(data));
            }

            tracing::debug!(url = %url, status = %response.status(), "status endpoint miss");
        }

        Err(GatewayError::NotFound)
    }
}

fn build_charge_payload(request: &CreateChargeRequest, webhook_url: Option<&str>) -> Value {
    json!({
        "amount": request.amount_cents,
        "payment_method": "pix",
        "postback_url": webhook_url,
        "metadata": {
            "order_id": request.order_id,
            "customer_name": request.customer.name,
        },
        "customer": {
            "name": truncate(&request.customer.name, 100),
            "email": truncate(&request.customer.email, 100),
            "phone": request.customer.phone,
            "document": {
                "type": "cpf",
                "number": request.customer.cpf,
            },
        },
        "items": [{
            "title": "Online order",
            "unit_price": request.amount_cents,
            "quantity": 1,
            "tangible": false,
        }],
    })
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
