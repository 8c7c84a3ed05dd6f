use serde::{Deserialize, Serialize};

/// Best-effort dividend metadata for one symbol.
///
/// Every field is free text as returned by the insight provider; nothing
/// here is parsed or trusted for computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendInfo {
    pub symbol: String,

    #[serde(default)]
    pub company_name: String,

    /// Yield as text, e.g. "0.5%" ("0%" for non-payers)
    #[serde(default, rename = "yield")]
    pub yield_text: String,

    #[serde(default)]
    pub pay_date: String,

    #[serde(default)]
    pub ex_date: String,

    #[serde(default, rename = "amountPerShare")]
    pub amount_per_share_text: String,
}

/// Outcome of a dividend insight lookup. Failure is a state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightStatus {
    Available(Vec<DividendInfo>),
    Unavailable { reason: String },
}

impl InsightStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, InsightStatus::Available(_))
    }

    /// The insights, or an empty slice when unavailable.
    pub fn insights(&self) -> &[DividendInfo] {
        match self {
            InsightStatus::Available(items) => items,
            InsightStatus::Unavailable { .. } => &[],
        }
    }
}
