use serde_json::{Map, Value};

/// Canonical form of a payment-status notification.
///
/// The provider is not consistent about field casing: the same field arrives
/// as `id` or `Id`, `paid_at` or `PaidAt`, depending on which of its backends
/// emitted the event. All tolerance for that lives here, at the boundary;
/// everything downstream sees one record shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub event_id: Option<String>,
    pub status: Option<String>,
    pub amount_cents: Option<i64>,
    pub paid_at: Option<String>,
    pub metadata: Map<String, Value>,
}

impl WebhookEvent {
    /// Parses a raw webhook body. Fails only when the body is not a JSON
    /// object; individual missing fields are represented as `None`.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        let map = value
            .as_object()
            .ok_or_else(|| serde::de::Error::custom("webhook body is not a JSON object"))?;
        Ok(Self::from_fields(map))
    }

    fn from_fields(map: &Map<String, Value>) -> Self {
        Self {
            event_id: pick(map, "Id", "id").and_then(string_field),
            status: pick(map, "Status", "status").and_then(string_field),
            amount_cents: pick(map, "Amount", "amount").and_then(integer_field),
            paid_at: pick(map, "PaidAt", "paid_at").and_then(string_field),
            metadata: pick(map, "Metadata", "metadata")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Merchant correlation id, when the checkout flow supplied one.
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get("order_id").and_then(Value::as_str)
    }
}

/// Reads a field that the provider may send in either casing convention.
/// When both are present the PascalCase value wins.
pub fn pick<'a>(map: &'a Map<String, Value>, pascal: &str, snake: &str) -> Option<&'a Value> {
    map.get(pascal).or_else(|| map.get(snake))
}

fn string_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
