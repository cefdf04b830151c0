//! Environment configuration, read once at process start.

use secrecy::SecretString;

pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://api2.anubispay.com.br/v1";

const GATEWAY_PUBLIC_KEY_ENV: &str = "GATEWAY_PUBLIC_KEY";
const GATEWAY_SECRET_KEY_ENV: &str = "GATEWAY_SECRET_KEY";
const GATEWAY_BASE_URL_ENV: &str = "GATEWAY_BASE_URL";
const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";
const WEBHOOK_SECRET_ENV: &str = "WEBHOOK_SECRET";

#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub public_key: Option<String>,
    pub secret_key: Option<SecretString>,
    /// Postback URL handed to the gateway when creating a charge.
    pub webhook_url: Option<String>,
}

impl GatewayConfig {
    /// Both API keys, when the deployment has them configured. Charge routes
    /// cannot operate without credentials; webhook ingestion can.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        match (self.public_key.as_deref(), self.secret_key.as_ref()) {
            (Some(public), Some(secret)) => Some((public, secret)),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    /// Shared secret for webhook signature verification. Optional: without
    /// it, incoming webhooks are accepted unverified.
    pub webhook_secret: Option<SecretString>,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Always returns a config; missing credentials are logged and surface
    /// later as errors on the routes that need them.
    pub fn from_env() -> Self {
        let public_key = non_empty_env(GATEWAY_PUBLIC_KEY_ENV);
        let secret_key = non_empty_env(GATEWAY_SECRET_KEY_ENV).map(SecretString::from);
        if public_key.is_none() || secret_key.is_none() {
            tracing::warn!(
                "gateway API keys not configured; charge creation and status polling will fail"
            );
        }

        let webhook_secret = non_empty_env(WEBHOOK_SECRET_ENV).map(SecretString::from);
        if webhook_secret.is_none() {
            tracing::info!("no webhook secret configured, signature verification disabled");
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(3000);

        Self {
            gateway: GatewayConfig {
                base_url: non_empty_env(GATEWAY_BASE_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_GATEWAY_BASE_URL.to_string()),
                public_key,
                secret_key,
                webhook_url: non_empty_env(WEBHOOK_URL_ENV),
            },
            webhook_secret,
            host,
            port,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_keys() {
        let mut gateway = GatewayConfig {
            base_url: DEFAULT_GATEWAY_BASE_URL.to_string(),
            public_key: Some("pk".to_string()),
            secret_key: None,
            webhook_url: None,
        };
        assert!(gateway.credentials().is_none());

        gateway.secret_key = Some(SecretString::from("sk"));
        let (public, _) = gateway.credentials().unwrap();
        assert_eq!(public, "pk");
    }
}
