use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::snapshot::{HoldingState, PortfolioSnapshot, StockHolding};
use crate::models::transaction::{Transaction, TransactionType};
use crate::pricing::PriceSource;

/// Derives portfolio state (cash, positions, P/L) from the transaction log.
///
/// Pure business logic with no I/O; it never fails. The full history
/// is folded from scratch on every call; nothing is cached between calls.
pub struct PortfolioService;

/// Per-symbol states in order of first appearance, keyed by the trimmed,
/// uppercased ticker.
#[derive(Debug, Default)]
pub struct HoldingBook {
    order: Vec<String>,
    states: HashMap<String, HoldingState>,
}

impl HoldingBook {
    fn entry(&mut self, symbol: &str) -> &mut HoldingState {
        let key = symbol.trim().to_uppercase();
        if !self.states.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.states.entry(key).or_default()
    }

    pub fn get(&self, symbol: &str) -> Option<&HoldingState> {
        self.states.get(&symbol.trim().to_uppercase())
    }

    /// Iterate `(symbol, state)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HoldingState)> {
        self.order
            .iter()
            .filter_map(|s| self.states.get(s).map(|state| (s.as_str(), state)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Fold `transactions` (any order) into a snapshot, valuing open
    /// positions with `prices`.
    pub fn derive(
        &self,
        transactions: &[Transaction],
        prices: &dyn PriceSource,
    ) -> PortfolioSnapshot {
        let (cash_balance, book) = self.fold(transactions);

        let mut holdings = Vec::new();
        let mut holdings_value = 0.0;
        let mut total_realized_pl = 0.0;
        let mut total_unrealized_pl = 0.0;

        for (symbol, state) in book.iter() {
            // Liquidated symbols still count towards realized P/L.
            total_realized_pl += state.realized_pl;
            if state.quantity <= 0.0 {
                continue;
            }

            let current_price = prices.current_price(symbol, state.average_cost);
            let total_value = state.quantity * current_price;
            let unrealized_pl = (current_price - state.average_cost) * state.quantity;
            let cost_basis = state.quantity * state.average_cost;
            let unrealized_pl_percent = if cost_basis != 0.0 {
                unrealized_pl / cost_basis * 100.0
            } else {
                0.0
            };

            holdings_value += total_value;
            total_unrealized_pl += unrealized_pl;
            holdings.push(StockHolding {
                symbol: symbol.to_string(),
                quantity: state.quantity,
                average_cost: state.average_cost,
                current_price,
                total_value,
                unrealized_pl,
                unrealized_pl_percent,
                realized_pl: state.realized_pl,
            });
        }

        PortfolioSnapshot {
            cash_balance,
            holdings,
            holdings_value,
            total_realized_pl,
            total_unrealized_pl,
            total_equity: cash_balance + holdings_value,
        }
    }

    /// Replay the ledger in date order and return `(cash, per-symbol state)`.
    ///
    /// Ties on date keep their relative input order (stable sort). Quantity
    /// is not clamped: an over-sell leaves a negative position.
    pub fn fold(&self, transactions: &[Transaction]) -> (f64, HoldingBook) {
        Self::fold_refs(transactions.iter().collect())
    }

    fn fold_refs(mut ordered: Vec<&Transaction>) -> (f64, HoldingBook) {
        ordered.sort_by_key(|t| t.date);

        let mut cash = 0.0;
        let mut book = HoldingBook::default();

        for tx in ordered {
            cash += tx.cash_effect();

            let symbol = match (&tx.symbol, tx.transaction_type.is_trade()) {
                (Some(symbol), true) => symbol,
                _ => continue,
            };
            let quantity = tx.quantity.unwrap_or(0.0);
            let state = book.entry(symbol);

            match tx.transaction_type {
                TransactionType::Buy => {
                    // Cost comes from the stored amount, not price × quantity.
                    let total_cost = state.quantity * state.average_cost + tx.amount;
                    let new_quantity = state.quantity + quantity;
                    state.average_cost = if new_quantity != 0.0 {
                        total_cost / new_quantity
                    } else {
                        0.0
                    };
                    state.quantity = new_quantity;
                }
                TransactionType::Sell => {
                    let price = tx.price_per_unit.unwrap_or(0.0);
                    state.realized_pl += (price - state.average_cost) * quantity;
                    state.quantity -= quantity;
                }
                TransactionType::Deposit | TransactionType::Withdraw => {}
            }
        }

        (cash, book)
    }

    /// Quantity of `symbol` held after every transaction dated on or before
    /// `date`.
    pub fn quantity_held(&self, transactions: &[Transaction], symbol: &str, date: NaiveDate) -> f64 {
        let upto = transactions.iter().filter(|t| t.date <= date).collect();
        let (_, book) = Self::fold_refs(upto);
        book.get(symbol)
            .map(|s| s.quantity)
            .unwrap_or(0.0)
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
