use std::sync::Mutex;

use async_trait::async_trait;

use crate::{StatusClass, WebhookEvent};

/// Side-effect hooks invoked once per deduplicated event, keyed by its
/// status classification. Implementations own the actual follow-up work
/// (mark the order paid, release reserved resources, notify the customer);
/// the ingestor only routes.
#[async_trait]
pub trait PaymentHooks: Send + Sync {
    async fn on_paid(&self, event: &WebhookEvent);
    async fn on_pending(&self, event: &WebhookEvent);
    async fn on_expired(&self, event: &WebhookEvent);
    async fn on_failed(&self, event: &WebhookEvent);
    /// Catch-all for statuses outside the known vocabulary, carrying the raw
    /// provider string so unexpected states stay observable.
    async fn on_status_changed(&self, raw_status: Option<&str>, event: &WebhookEvent);
}

/// Default hooks: structured log lines, no persistence.
pub struct LoggingHooks;

fn amount_display(event: &WebhookEvent) -> String {
    match event.amount_cents {
        Some(cents) => format!("R$ {:.2}", cents as f64 / 100.0),
        None => "N/A".to_string(),
    }
}

#[async_trait]
impl PaymentHooks for LoggingHooks {
    async fn on_paid(&self, event: &WebhookEvent) {
        tracing::info!(
            order_id = event.order_id().unwrap_or("unknown"),
            amount = %amount_display(event),
            paid_at = event.paid_at.as_deref().unwrap_or(""),
            "order paid"
        );
    }

    async fn on_pending(&self, event: &WebhookEvent) {
        tracing::info!(
            order_id = event.order_id().unwrap_or("unknown"),
            "payment pending"
        );
    }

    async fn on_expired(&self, event: &WebhookEvent) {
        tracing::info!(
            order_id = event.order_id().unwrap_or("unknown"),
            "charge expired, releasing reserved resources"
        );
    }

    async fn on_failed(&self, event: &WebhookEvent) {
        tracing::warn!(
            order_id = event.order_id().unwrap_or("unknown"),
            status = event.status.as_deref().unwrap_or(""),
            "payment failed"
        );
    }

    async fn on_status_changed(&self, raw_status: Option<&str>, event: &WebhookEvent) {
        tracing::info!(
            order_id = event.order_id().unwrap_or("unknown"),
            status = raw_status.unwrap_or("<missing>"),
            "order status changed"
        );
    }
}

/// Records every dispatch instead of acting on it. Test double for
/// asserting at-most-once delivery semantics.
#[derive(Default)]
pub struct RecordingHooks {
    dispatches: Mutex<Vec<(StatusClass, WebhookEvent)>>,
}

impl RecordingHooks {
    fn record(&self, class: StatusClass, event: &WebhookEvent) {
        self.dispatches
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push((class, event.clone()));
    }

    pub fn dispatches(&self) -> Vec<(StatusClass, WebhookEvent)> {
        self.dispatches
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }
}

#[async_trait]
impl PaymentHooks for RecordingHooks {
    async fn on_paid(&self, event: &WebhookEvent) {
        self.record(StatusClass::Paid, event);
    }

    async fn on_pending(&self, event: &WebhookEvent) {
        self.record(StatusClass::Pending, event);
    }

    async fn on_expired(&self, event: &WebhookEvent) {
        self.record(StatusClass::Expired, event);
    }

    async fn on_failed(&self, event: &WebhookEvent) {
        self.record(StatusClass::Failed, event);
    }

    async fn on_status_changed(&self, _raw_status: Option<&str>, event: &WebhookEvent) {
        self.record(StatusClass::Unknown, event);
    }
}
