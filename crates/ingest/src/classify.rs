use strum::Display;

/// Classification of a raw provider status string.
///
/// The provider's status vocabulary is matched case-sensitively; anything
/// outside the known set is `Unknown` so new provider states surface instead
/// of being silently dropped.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum StatusClass {
    Paid,
    Pending,
    Expired,
    Failed,
    Unknown,
}

impl StatusClass {
    pub fn classify(raw: &str) -> Self {
        match raw {
            "PAID" | "APPROVED" => Self::Paid,
            "PENDING" | "WAITING_PAYMENT" => Self::Pending,
            "EXPIRED" => Self::Expired,
            "REFUSED" | "ERROR" | "REFUNDED" | "CANCELLED" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}
