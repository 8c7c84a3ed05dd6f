use serde::{Deserialize, Serialize};

/// Label used for the cash slice of the allocation breakdown.
pub const CASH_LABEL: &str = "Cash";

/// One slice of the allocation breakdown (a holding, or cash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    /// Symbol, or `"Cash"`
    pub label: String,

    /// Market value of the slice
    pub value: f64,

    /// value / Σ slice values × 100
    pub allocation_pct: f64,
}

/// Totals of cash moved through the ledger, grouped by transaction type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub total_deposited: f64,
    pub total_withdrawn: f64,

    /// Σ amount of buys (fees excluded)
    pub total_bought: f64,

    /// Σ amount of sells (fees excluded)
    pub total_sold: f64,

    /// Σ fees over every transaction type
    pub total_fees: f64,

    /// total_deposited − total_withdrawn
    pub net_contributions: f64,

    pub transaction_count: usize,
}
