use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::dividend::DividendInfo;

/// Live quote source for equities.
///
/// Each API (Yahoo Finance, Alpha Vantage) implements this trait. The
/// derivation engine never calls it directly: quotes are fetched ahead of
/// time into a `QuoteBook` and read through a `PriceSource`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest price per share of `symbol`, in the instrument's own currency.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;
}

/// Best-effort dividend metadata lookup.
///
/// Implementations may fail for any reason (missing credential, quota,
/// malformed response); callers treat failure as "unavailable".
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait InsightProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_dividend_insights(
        &self,
        symbols: &[String],
    ) -> Result<Vec<DividendInfo>, CoreError>;
}
