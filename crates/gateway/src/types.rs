use ingest::{StatusClass, event::pick};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    /// National number, digits only, country code already stripped.
    pub phone: String,
    /// CPF digits, already checksum-validated by the caller.
    pub cpf: String,
}

#[derive(Debug, Clone)]
pub struct CreateChargeRequest {
    pub amount_cents: i64,
    pub order_id: String,
    pub customer: Customer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeCreated {
    pub transaction_id: Option<String>,
    pub pix_copy_paste: String,
    pub qr_code_base64: Option<String>,
    pub payment_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChargeStatus {
    pub status: Option<String>,
    pub class: StatusClass,
    pub amount_cents: Option<i64>,
    pub paid_at: Option<String>,
    /// Untouched provider response, for callers that want the full record.
    pub raw: Value,
}

/// Pulls the PIX payment data out of a create-charge response. The provider
/// has shipped at least five names for the copy-paste code and four for the
/// QR image; a response without any recognizable code is treated as a miss
/// so the caller can fall through to the next endpoint.
pub(crate) fn parse_charge_created(data: &Value) -> Option<ChargeCreated> {
    let map = data.as_object()?;
    let pix = map.get("pix").and_then(Value::as_object);

    let pix_copy_paste = pix
        .and_then(|p| p.get("qrcode_text"))
        .or_else(|| map.get("qrcode_text"))
        .or_else(|| map.get("pix_code"))
        .or_else(|| map.get("PixCopyPaste"))
        .or_else(|| map.get("copy_paste"))
        .and_then(Value::as_str)?
        .to_string();

    let qr_code_base64 = pix
        .and_then(|p| p.get("qrcode"))
        .or_else(|| map.get("qrcode"))
        .or_else(|| map.get("qrcode_base64"))
        .or_else(|| map.get("QRCodeBase64"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ChargeCreated {
        transaction_id: pick(map, "Id", "id").map(json_to_string),
        pix_copy_paste,
        qr_code_base64,
        payment_url: map
            .get("payment_url")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

pub(crate) fn parse_charge_status(data: Value) -> ChargeStatus {
    let (status, amount_cents, paid_at) = match data.as_object() {
        Some(map) => (
            pick(map, "Status", "status")
                .and_then(Value::as_str)
                .map(str::to_string),
            pick(map, "Amount", "amount").and_then(Value::as_i64),
            pick(map, "PaidAt", "paid_at")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        None => (None, None, None),
    };

    let class = status
        .as_deref()
        .map(StatusClass::classify)
        .unwrap_or(StatusClass::Unknown);

    ChargeStatus {
        status,
        class,
        amount_cents,
        paid_at,
        raw: data,
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
