use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gateway::GatewayError;
use ingest::IngestError;
use thiserror::Error;
use utils_core::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Ingest(err) => match err {
                IngestError::Unauthorized => (StatusCode::UNAUTHORIZED, "IngestError"),
                IngestError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "IngestError"),
            },
            ApiError::Gateway(err) => match err {
                GatewayError::Unconfigured => (StatusCode::INTERNAL_SERVER_ERROR, "GatewayError"),
                GatewayError::NotFound => (StatusCode::NOT_FOUND, "GatewayError"),
                GatewayError::ChargeRejected { .. } => (StatusCode::BAD_REQUEST, "GatewayError"),
                GatewayError::Http(_) => (StatusCode::INTERNAL_SERVER_ERROR, "GatewayError"),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::Ingest(IngestError::Unauthorized) => "Invalid webhook signature".to_string(),
            ApiError::Ingest(IngestError::MalformedBody(_)) => {
                "Malformed webhook body".to_string()
            }
            ApiError::Gateway(GatewayError::Unconfigured) => {
                "System configuration incomplete".to_string()
            }
            ApiError::Gateway(GatewayError::NotFound) => {
                "Transaction not found or expired".to_string()
            }
            ApiError::Gateway(GatewayError::ChargeRejected { message }) => message.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
