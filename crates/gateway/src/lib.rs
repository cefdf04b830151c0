//! Outbound client for the PIX payment provider.
//!
//! The provider exposes the same operations under several endpoint paths
//! (singular vs plural resource names) and is inconsistent about response
//! field naming; the client tries the known paths in order and normalizes
//! whatever comes back.

mod client;
mod types;

use thiserror::Error;

pub use client::GatewayClient;
pub use types::{ChargeCreated, ChargeStatus, CreateChargeRequest, Customer};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway API keys are not configured")]
    Unconfigured,
    #[error("transaction not found or expired")]
    NotFound,
    #[error("{message}")]
    ChargeRejected { message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
