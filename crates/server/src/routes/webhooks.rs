use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

/// Header names the provider has used for the HMAC signature, in preference
/// order.
const SIGNATURE_HEADERS: [&str; 3] = ["x-anubis-signature", "x-signature", "signature"];

/// Acknowledgement the provider expects; a 200 with this body stops
/// redelivery, including for duplicates.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub processed: bool,
}

pub async fn receive_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok());

    state.ingestor.process(signature, &body).await?;

    Ok(Json(WebhookAck {
        received: true,
        processed: true,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/payments", post(receive_payment_webhook))
}
