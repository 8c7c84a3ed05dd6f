use std::collections::HashMap;

use super::source::PriceSource;

/// Last known quote per symbol (uppercased).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBook {
    quotes: HashMap<String, f64>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote. Non-finite or non-positive prices are ignored.
    pub fn insert(&mut self, symbol: &str, price: f64) {
        if price.is_finite() && price > 0.0 {
            self.quotes.insert(symbol.to_uppercase(), price);
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.quotes.get(&symbol.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Overlay `other` on top of this book (newer quotes win).
    pub fn merge(&mut self, other: QuoteBook) {
        self.quotes.extend(other.quotes);
    }
}

/// Uses a fetched quote when one exists, otherwise defers to `fallback`.
pub struct QuotedPriceSource {
    quotes: QuoteBook,
    fallback: Box<dyn PriceSource>,
}

impl QuotedPriceSource {
    pub fn new(quotes: QuoteBook, fallback: Box<dyn PriceSource>) -> Self {
        Self { quotes, fallback }
    }

    pub fn quotes(&self) -> &QuoteBook {
        &self.quotes
    }
}

impl PriceSource for QuotedPriceSource {
    fn current_price(&self, symbol: &str, average_cost: f64) -> f64 {
        self.quotes
            .get(symbol)
            .unwrap_or_else(|| self.fallback.current_price(symbol, average_cost))
    }
}

