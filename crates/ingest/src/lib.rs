//! Webhook ingestion for payment-status notifications.
//!
//! The gateway delivers events at-least-once; this crate guarantees at most
//! one side-effect dispatch per event id within a process instance.

pub mod classify;
pub mod dedup;
pub mod event;
pub mod hooks;
mod ingestor;

pub use classify::StatusClass;
pub use dedup::{BoundedDedupCache, DedupStore, DEFAULT_DEDUP_CAPACITY};
pub use event::WebhookEvent;
pub use hooks::{LoggingHooks, PaymentHooks, RecordingHooks};
pub use ingestor::{IngestError, IngestOutcome, Ingestor};
