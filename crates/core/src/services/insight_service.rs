use std::collections::HashSet;

use crate::models::dividend::InsightStatus;
use crate::models::transaction::{Transaction, TransactionType};
use crate::providers::traits::InsightProvider;

/// Wraps the optional dividend insight provider.
///
/// Never fails: a missing provider or a failed lookup becomes
/// `InsightStatus::Unavailable`, which the caller can show with a retry.
pub struct InsightService {
    provider: Option<Box<dyn InsightProvider>>,
}

impl InsightService {
    pub fn new(provider: Option<Box<dyn InsightProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Symbols ever bought, de-duplicated, in order of first purchase.
    pub fn dividend_symbols(transactions: &[Transaction]) -> Vec<String> {
        let mut seen = HashSet::new();
        transactions
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Buy)
            .filter_map(|t| t.symbol.as_ref())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }

    pub async fn fetch(&self, symbols: &[String]) -> InsightStatus {
        let Some(provider) = self.provider.as_ref() else {
            return InsightStatus::Unavailable {
                reason: "No insight provider configured (missing API key)".into(),
            };
        };
        if symbols.is_empty() {
            return InsightStatus::Available(Vec::new());
        }

        match provider.fetch_dividend_insights(symbols).await {
            Ok(items) => InsightStatus::Available(items),
            Err(e) => {
                log::warn!("{} dividend lookup failed: {e}", provider.name());
                InsightStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
