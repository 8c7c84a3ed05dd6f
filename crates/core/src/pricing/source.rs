use crate::models::settings::PriceMode;

/// Supplies the "current price" used to value an open position.
///
/// The derivation engine only ever asks this one question, so a live quote
/// feed and an offline estimate are interchangeable behind it.
pub trait PriceSource: Send + Sync {
    fn current_price(&self, symbol: &str, average_cost: f64) -> f64;
}

/// Offline estimate: the average cost nudged by a fixed per-symbol factor in
/// [0.90, 1.09], keyed off the code of the symbol's first character.
///
/// Repeated computations over the same ledger produce the same valuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicPriceSource;

impl DeterministicPriceSource {
    pub fn new() -> Self {
        Self
    }

    /// `1 + ((code % 20) − 10) / 100`; 1.0 for an empty symbol.
    ///
    /// `code` is the Unicode scalar value of the first `char`. It matches the
    /// first UTF-16 code unit for every ticker in the Basic Multilingual
    /// Plane; a leading astral character (e.g. an emoji) uses its full code
    /// point rather than the high surrogate.
    pub fn factor(symbol: &str) -> f64 {
        match symbol.chars().next() {
            Some(c) => {
                let offset = (c as u32 % 20) as f64 - 10.0;
                1.0 + offset / 100.0
            }
            None => 1.0,
        }
    }
}

impl PriceSource for DeterministicPriceSource {
    fn current_price(&self, symbol: &str, average_cost: f64) -> f64 {
        average_cost * Self::factor(symbol)
    }
}

/// Values every position at its average cost, so unrealized P/L is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostBasisPriceSource;

impl PriceSource for CostBasisPriceSource {
    fn current_price(&self, _symbol: &str, average_cost: f64) -> f64 {
        average_cost
    }
}

impl PriceMode {
    /// Build the offline price source this mode selects.
    pub fn price_source(&self) -> Box<dyn PriceSource> {
        match self {
            PriceMode::Deterministic => Box::new(DeterministicPriceSource),
            PriceMode::CostBasis => Box::new(CostBasisPriceSource),
        }
    }
}

