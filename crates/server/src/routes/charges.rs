use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use gateway::{CreateChargeRequest, Customer, GatewayError};
use ingest::StatusClass;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utils_core::{cpf, response::ApiResponse};

use crate::{error::ApiError, state::AppState};

const MIN_AMOUNT_CENTS: i64 = 100;
const CHARGE_EXPIRY_SECS: u64 = 1800;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeBody {
    pub amount: Option<Value>,
    pub customer: Option<CustomerBody>,
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChargeCreatedView {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    pub pix_copy_paste: String,
    pub qr_code_base64: Option<String>,
    pub expires_in: u64,
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChargeStatusView {
    pub paid: bool,
    pub pending: bool,
    pub expired: bool,
    pub failed: bool,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub paid_at: Option<String>,
}

pub async fn create_charge(
    State(state): State<AppState>,
    Json(body): Json<CreateChargeBody>,
) -> Result<ResponseJson<ApiResponse<ChargeCreatedView>>, ApiError> {
    let Some(gateway) = state.gateway.as_ref() else {
        return Err(GatewayError::Unconfigured.into());
    };

    let amount_cents = body
        .amount
        .as_ref()
        .and_then(amount_to_cents)
        .ok_or_else(|| ApiError::BadRequest("Invalid amount. Provide a valid number.".into()))?;
    if amount_cents < MIN_AMOUNT_CENTS {
        return Err(ApiError::BadRequest("Minimum amount is R$ 1.00".into()));
    }

    let customer = body.customer.as_ref();

    let phone = normalize_phone(customer.and_then(|c| c.phone.as_deref()).unwrap_or(""))
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Invalid phone. Use area code + number (e.g. 11999999999)".into(),
            )
        })?;

    let cpf_digits: String = customer
        .and_then(|c| c.cpf.as_deref())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if !cpf::is_valid(&cpf_digits) {
        return Err(ApiError::BadRequest(
            "Invalid CPF. Please provide a valid CPF.".into(),
        ));
    }

    let email = customer
        .and_then(|c| c.email.as_deref())
        .filter(|email| email_regex().is_match(email))
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid e-mail. Provide a valid e-mail address.".into())
        })?;

    let order_id = body
        .order_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("order_{}", unix_millis()));

    let request = CreateChargeRequest {
        amount_cents,
        order_id: order_id.clone(),
        customer: Customer {
            name: customer
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| "Customer".to_string()),
            email: email.to_string(),
            phone,
            cpf: cpf_digits,
        },
    };

    tracing::info!(
        amount_cents,
        order_id = %order_id,
        "creating PIX charge"
    );

    let created = gateway.create_charge(&request).await?;

    Ok(ResponseJson(ApiResponse::success(ChargeCreatedView {
        transaction_id: created.transaction_id,
        pix_copy_paste: created.pix_copy_paste,
        qr_code_base64: created.qr_code_base64,
        expires_in: CHARGE_EXPIRY_SECS,
        payment_url: created.payment_url,
    })))
}

pub async fn get_charge_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<ChargeStatusView>>, ApiError> {
    let Some(gateway) = state.gateway.as_ref() else {
        return Err(GatewayError::Unconfigured.into());
    };
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("Transaction id is missing".into()));
    }

    let status = gateway.get_charge_status(&id).await?;

    Ok(ResponseJson(ApiResponse::success(ChargeStatusView {
        paid: status.class == StatusClass::Paid,
        pending: status.class == StatusClass::Pending,
        expired: status.class == StatusClass::Expired,
        failed: status.class == StatusClass::Failed,
        status: status.status,
        amount: status.amount_cents,
        paid_at: status.paid_at,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/charges", post(create_charge))
        .route("/charges/{id}/status", get(get_charge_status))
}

fn amount_to_cents(value: &Value) -> Option<i64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

/// Strips formatting and the `55` country prefix; accepts national numbers
/// of 10 or 11 digits (area code + number).
fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix("55") {
        digits = rest.to_string();
    }
    if (10..=11).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
