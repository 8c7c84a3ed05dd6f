use serde::{Deserialize, Serialize};

/// Running per-symbol state while folding over the ledger.
///
/// Lives only for the duration of one derivation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoldingState {
    /// Shares currently held (may go negative on an over-sell)
    pub quantity: f64,

    /// Weighted-average cost per share; only buys change it
    pub average_cost: f64,

    /// Accumulated realized profit/loss from sells
    pub realized_pl: f64,
}

/// A position with strictly positive quantity after all transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
    pub symbol: String,

    pub quantity: f64,

    /// Weighted-average cost per share
    pub average_cost: f64,

    /// Price supplied by the active `PriceSource`
    pub current_price: f64,

    /// quantity × current_price
    pub total_value: f64,

    /// (current_price − average_cost) × quantity
    pub unrealized_pl: f64,

    /// unrealized_pl ÷ cost basis × 100; 0 when the cost basis is 0
    pub unrealized_pl_percent: f64,

    /// Realized P/L accumulated by sells of this symbol
    pub realized_pl: f64,
}

/// Full derived portfolio state for one computation.
///
/// Never persisted, never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub cash_balance: f64,

    /// Open positions, in order of the symbol's first appearance
    pub holdings: Vec<StockHolding>,

    /// Σ holdings[].total_value
    pub holdings_value: f64,

    /// Realized P/L over every symbol, including fully liquidated ones
    pub total_realized_pl: f64,

    /// Σ holdings[].unrealized_pl
    pub total_unrealized_pl: f64,

    /// cash_balance + holdings_value
    pub total_equity: f64,
}

impl PortfolioSnapshot {
    /// Look up an open position by symbol (case-insensitive).
    pub fn holding(&self, symbol: &str) -> Option<&StockHolding> {
        let upper = symbol.trim().to_uppercase();
        self.holdings.iter().find(|h| h.symbol == upper)
    }
}
