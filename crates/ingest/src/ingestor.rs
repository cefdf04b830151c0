use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use crate::{DedupStore, PaymentHooks, StatusClass, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid webhook signature")]
    Unauthorized,
    #[error("malformed webhook body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First sighting of this event id; the matching hook ran.
    Processed { class: StatusClass },
    /// Event id already seen; no hook ran.
    Duplicate,
}

/// Receives payment-status notifications, verifies authenticity, deduplicates
/// by event id and dispatches exactly one hook per event.
///
/// HTTP concerns (method gating, response shaping) stay with the caller; this
/// type only sees the raw body and the presented signature.
pub struct Ingestor {
    secret: Option<SecretString>,
    store: Arc<dyn DedupStore>,
    hooks: Arc<dyn PaymentHooks>,
}

impl Ingestor {
    pub fn new(
        secret: Option<SecretString>,
        store: Arc<dyn DedupStore>,
        hooks: Arc<dyn PaymentHooks>,
    ) -> Self {
        Self {
            secret,
            store,
            hooks,
        }
    }

    pub async fn process(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<IngestOutcome, IngestError> {
        // A configured secret is only enforced when the provider actually
        // presents a signature. Events without one pass through unverified;
        // that matches the provider's observed delivery behavior and is
        // flagged in DESIGN.md rather than silently tightened.
        if let (Some(secret), Some(signature)) = (&self.secret, signature) {
            verify_signature(secret, signature, body)?;
        }

        let event = WebhookEvent::from_slice(body)?;

        match event.event_id.as_deref() {
            None | Some("") => {
                // Nothing to key deduplication on; process anyway so the
                // notification is not lost, and leave the cache untouched.
                tracing::warn!("webhook event carries no id, skipping deduplication");
            }
            Some(id) => {
                if !self.store.first_sighting(id) {
                    tracing::debug!(event_id = id, "webhook already processed, ignoring");
                    return Ok(IngestOutcome::Duplicate);
                }
            }
        }

        let class = event
            .status
            .as_deref()
            .map(StatusClass::classify)
            .unwrap_or(StatusClass::Unknown);

        tracing::info!(
            event_id = event.event_id.as_deref().unwrap_or("<missing>"),
            status = event.status.as_deref().unwrap_or("<missing>"),
            class = %class,
            amount_cents = event.amount_cents.unwrap_or(0),
            order_id = event.order_id().unwrap_or("unknown"),
            "webhook event received"
        );

        match class {
            StatusClass::Paid => self.hooks.on_paid(&event).await,
            StatusClass::Pending => self.hooks.on_pending(&event).await,
            StatusClass::Expired => self.hooks.on_expired(&event).await,
            StatusClass::Failed => self.hooks.on_failed(&event).await,
            StatusClass::Unknown => {
                self.hooks
                    .on_status_changed(event.status.as_deref(), &event)
                    .await
            }
        }

        Ok(IngestOutcome::Processed { class })
    }
}

fn verify_signature(
    secret: &SecretString,
    signature: &str,
    body: &[u8],
) -> Result<(), IngestError> {
    let presented = hex::decode(signature.trim()).map_err(|_| IngestError::Unauthorized)?;

    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| IngestError::Unauthorized)?;
    mac.update(body);

    // verify_slice is constant-time.
    mac.verify_slice(&presented)
        .map_err(|_| IngestError::Unauthorized)
}
