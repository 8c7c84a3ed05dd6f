use crate::errors::CoreError;
use crate::pricing::QuoteBook;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches live quotes from the registered providers with fallback.
///
/// Tries providers in registration order. If the primary fails (API down,
/// rate limited, etc.), falls back to the next one. Symbols no provider can
/// quote are logged and left out of the resulting `QuoteBook`; their
/// holdings are then valued by the offline price source.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn has_providers(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Quote every symbol, skipping the ones that fail everywhere.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> QuoteBook {
        let mut book = QuoteBook::new();
        for symbol in symbols {
            match self.fetch_quote(symbol).await {
                Ok(price) => book.insert(symbol, price),
                Err(e) => log::warn!("No quote for {symbol}: {e}"),
            }
        }
        log::info!("Fetched {} of {} quotes", book.len(), symbols.len());
        book
    }

    /// Quote a single symbol with provider fallback.
    /// Rejects prices that are not finite and positive.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<f64, CoreError> {
        let mut last_error = None;

        for provider in self.registry.providers() {
            match provider.get_current_price(symbol).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {symbol}: {price} (must be finite and positive)"
                        ),
                    });
                }
                Err(e) => {
                    log::debug!("{} failed for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::Api {
            provider: "none".into(),
            message: "No quote provider registered".into(),
        }))
    }
}
