use crate::models::analytics::{AllocationSlice, CashflowSummary, CASH_LABEL};
use crate::models::snapshot::PortfolioSnapshot;
use crate::models::transaction::{Transaction, TransactionType};

/// Display projections over derived data: allocation breakdown and
/// cash-flow totals.
///
/// Works on an already-derived snapshot; never re-prices anything.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Allocation breakdown of a snapshot.
    ///
    /// One slice per open position plus a `"Cash"` slice when the cash
    /// balance is positive (negative cash is not an allocation). Sorted by
    /// value, largest first.
    pub fn allocation(&self, snapshot: &PortfolioSnapshot) -> Vec<AllocationSlice> {
        let mut slices: Vec<AllocationSlice> = snapshot
            .holdings
            .iter()
            .map(|h| AllocationSlice {
                label: h.symbol.clone(),
                value: h.total_value,
                allocation_pct: 0.0, // filled below
            })
            .collect();

        if snapshot.cash_balance > 0.0 {
            slices.push(AllocationSlice {
                label: CASH_LABEL.to_string(),
                value: snapshot.cash_balance,
                allocation_pct: 0.0,
            });
        }

        let total: f64 = slices.iter().map(|s| s.value).sum();
        for slice in &mut slices {
            slice.allocation_pct = if total > 0.0 {
                (slice.value / total) * 100.0
            } else {
                0.0
            };
        }

        slices.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        slices
    }

    /// Cash moved through the ledger, by transaction type.
    pub fn cashflow_summary(&self, transactions: &[Transaction]) -> CashflowSummary {
        let mut summary = CashflowSummary {
            transaction_count: transactions.len(),
            ..CashflowSummary::default()
        };

        for tx in transactions {
            match tx.transaction_type {
                TransactionType::Deposit => summary.total_deposited += tx.amount,
                TransactionType::Withdraw => summary.total_withdrawn += tx.amount,
                TransactionType::Buy => summary.total_bought += tx.amount,
                TransactionType::Sell => summary.total_sold += tx.amount,
            }
            summary.total_fees += tx.fees;
        }

        summary.net_contributions = summary.total_deposited - summary.total_withdrawn;
        summary
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
