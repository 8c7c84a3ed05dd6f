use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Buying shares of a symbol (cash out)
    Buy,
    /// Selling shares of a symbol (cash in)
    Sell,
    /// Adding cash to an account
    Deposit,
    /// Taking cash out of an account
    Withdraw,
}

impl TransactionType {
    /// Buy and Sell move shares; Deposit and Withdraw only move cash.
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionType::Buy | TransactionType::Sell)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "BUY"),
            TransactionType::Sell => write!(f, "SELL"),
            TransactionType::Deposit => write!(f, "DEPOSIT"),
            TransactionType::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

/// Sort order for transaction listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSortOrder {
    /// Newest date first (default for display)
    DateDesc,
    /// Oldest date first
    DateAsc,
    /// Largest cash amount first
    AmountDesc,
    /// Alphabetical by symbol; cash movements last
    SymbolAsc,
}

/// A single entry in the ledger.
///
/// Transactions are immutable once stored. `symbol`, `quantity` and
/// `price_per_unit` are present iff the type is Buy or Sell. `amount` is the
/// magnitude of the cash impact, which for trades equals
/// `quantity × price_per_unit`.
///
/// A nil `id` means "not yet assigned"; the repository hands out a fresh one
/// on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Uuid,

    /// Owning account (lookup only, the ledger owns accounts)
    pub account_id: Uuid,

    pub transaction_type: TransactionType,

    /// Calendar date, no time component
    pub date: NaiveDate,

    /// Ticker symbol, uppercased (trades only)
    pub symbol: Option<String>,

    /// Number of shares (trades only)
    pub quantity: Option<f64>,

    /// Price per share (trades only)
    pub price_per_unit: Option<f64>,

    /// Total cash impact magnitude
    pub amount: f64,

    /// Broker fees; always reduce cash
    pub fees: f64,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    fn cash(
        transaction_type: TransactionType,
        account_id: Uuid,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_type,
            date,
            symbol: None,
            quantity: None,
            price_per_unit: None,
            amount,
            fees: 0.0,
            notes: None,
        }
    }

    fn trade(
        transaction_type: TransactionType,
        account_id: Uuid,
        symbol: impl Into<String>,
        quantity: f64,
        price_per_unit: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_type,
            date,
            symbol: Some(symbol.into().trim().to_uppercase()),
            quantity: Some(quantity),
            price_per_unit: Some(price_per_unit),
            amount: quantity * price_per_unit,
            fees: 0.0,
            notes: None,
        }
    }

    pub fn deposit(account_id: Uuid, amount: f64, date: NaiveDate) -> Self {
        Self::cash(TransactionType::Deposit, account_id, amount, date)
    }

    pub fn withdraw(account_id: Uuid, amount: f64, date: NaiveDate) -> Self {
        Self::cash(TransactionType::Withdraw, account_id, amount, date)
    }

    /// Buy `quantity` shares at `price_per_unit`; `amount` is derived.
    pub fn buy(
        account_id: Uuid,
        symbol: impl Into<String>,
        quantity: f64,
        price_per_unit: f64,
        date: NaiveDate,
    ) -> Self {
        Self::trade(TransactionType::Buy, account_id, symbol, quantity, price_per_unit, date)
    }

    /// Sell `quantity` shares at `price_per_unit`; `amount` is derived.
    pub fn sell(
        account_id: Uuid,
        symbol: impl Into<String>,
        quantity: f64,
        price_per_unit: f64,
        date: NaiveDate,
    ) -> Self {
        Self::trade(TransactionType::Sell, account_id, symbol, quantity, price_per_unit, date)
    }

    #[must_use]
    pub fn with_fees(mut self, fees: f64) -> Self {
        self.fees = fees;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Signed effect of this transaction on the cash balance, fees included.
    pub fn cash_effect(&self) -> f64 {
        let gross = match self.transaction_type {
            TransactionType::Deposit | TransactionType::Sell => self.amount,
            TransactionType::Withdraw | TransactionType::Buy => -self.amount,
        };
        gross - self.fees
    }
}
