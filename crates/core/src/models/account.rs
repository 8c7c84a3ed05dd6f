use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A brokerage account that transactions are booked against.
///
/// `currency` is informational only: all figures are computed in a single
/// implicit currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,

    /// Display name (e.g., "Main Trading")
    pub name: String,

    /// Broker name (e.g., "Interactive Brokers")
    pub broker: String,

    /// ISO 4217 code, uppercased (e.g., "USD")
    pub currency: String,

    /// Soft-removed accounts are hidden from listings but keep their
    /// transactions.
    #[serde(default)]
    pub archived: bool,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        broker: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            broker: broker.into(),
            currency: currency.into().to_uppercase(),
            archived: false,
        }
    }
}
