use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which price source values holdings when no live quote is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceMode {
    /// Deterministic ±10% perturbation of the average cost
    Deterministic,
    /// Current price equals average cost (no unrealized P/L)
    CostBasis,
}

/// User-configurable settings, stored inside the ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Display currency label. No conversion is ever performed.
    pub base_currency: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name ("alphavantage", "gemini").
    pub api_keys: HashMap<String, String>,

    /// Fallback price source for holdings without a live quote.
    pub price_mode: PriceMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            api_keys: HashMap::new(),
            price_mode: PriceMode::Deterministic,
        }
    }
}
