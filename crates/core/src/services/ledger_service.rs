use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::ledger::{Ledger, LEDGER_SCHEMA_VERSION};
use crate::models::transaction::{Transaction, TransactionType};
use crate::services::portfolio_service::PortfolioService;

/// Relative tolerance when checking `amount == quantity × price`.
const AMOUNT_TOLERANCE: f64 = 1e-6;

/// Relative tolerance when checking a sell against the shares held.
const QUANTITY_TOLERANCE: f64 = 1e-6;

/// Validates and applies mutations to a `Ledger`.
///
/// Every repository routes writes through here, so malformed transactions
/// never reach the derivation engine.
pub struct LedgerService {
    portfolio_service: PortfolioService,
}

impl LedgerService {
    pub fn new() -> Self {
        Self {
            portfolio_service: PortfolioService::new(),
        }
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validate and insert a transaction, keeping the ledger date-ordered.
    /// Assigns a fresh id when the transaction's id is nil.
    pub fn add_transaction(
        &self,
        ledger: &mut Ledger,
        mut tx: Transaction,
    ) -> Result<Uuid, CoreError> {
        if tx.id.is_nil() {
            tx.id = Uuid::new_v4();
        }
        if let Some(symbol) = tx.symbol.as_mut() {
            *symbol = symbol.trim().to_uppercase();
        }
        if ledger.find_transaction(tx.id).is_some() {
            return Err(CoreError::ValidationError(format!(
                "Duplicate transaction id {}",
                tx.id
            )));
        }

        Self::validate_fields(&tx)?;

        let account = ledger
            .find_account(tx.account_id)
            .ok_or_else(|| CoreError::AccountNotFound(tx.account_id.to_string()))?;
        if account.archived {
            return Err(CoreError::ValidationError(format!(
                "Account '{}' has been removed",
                account.name
            )));
        }

        if tx.transaction_type == TransactionType::Sell {
            self.check_sell_covered(ledger, &tx)?;
        }

        let id = tx.id;
        let is_sell = tx.transaction_type == TransactionType::Sell;
        log::debug!("Adding {} transaction {} dated {}", tx.transaction_type, id, tx.date);
        let pos = Self::insert_ordered(&mut ledger.transactions, tx);

        // A back-dated sell can starve a later one.
        if is_sell {
            if let Err(e) = self.validate_sells(&ledger.transactions) {
                ledger.transactions.remove(pos);
                return Err(e);
            }
        }
        Ok(id)
    }

    /// Remove a transaction by id and return it.
    ///
    /// Removing a buy is rolled back if a later sell would then exceed the
    /// shares held.
    pub fn remove_transaction(
        &self,
        ledger: &mut Ledger,
        id: Uuid,
    ) -> Result<Transaction, CoreError> {
        let idx = ledger
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        let removed = ledger.transactions.remove(idx);

        if removed.transaction_type == TransactionType::Buy {
            if let Err(e) = self.validate_sells(&ledger.transactions) {
                ledger.transactions.insert(idx, removed);
                return Err(e);
            }
        }

        log::debug!("Removed transaction {id}");
        Ok(removed)
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Insert a new account or replace the one with the same id.
    pub fn upsert_account(&self, ledger: &mut Ledger, mut account: Account) -> Result<(), CoreError> {
        if account.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Account name must not be empty".into()));
        }
        account.currency = account.currency.trim().to_uppercase();
        if account.currency.len() != 3 || !account.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{}' — expected 3 letters (e.g., USD)",
                account.currency
            )));
        }

        match ledger.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => ledger.accounts.push(account),
        }
        Ok(())
    }

    /// Soft-remove an account. Its transactions stay in the ledger.
    pub fn remove_account(&self, ledger: &mut Ledger, id: Uuid) -> Result<(), CoreError> {
        let account = ledger
            .accounts
            .iter_mut()
            .find(|a| a.id == id && !a.archived)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        account.archived = true;
        Ok(())
    }

    // ── Whole-ledger checks ─────────────────────────────────────────

    /// Re-validate a ledger read from storage: schema version, unique ids,
    /// every transaction's fields, account references, and sell coverage.
    pub fn validate_ledger(&self, ledger: &Ledger) -> Result<(), CoreError> {
        if ledger.schema_version != LEDGER_SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSchema(ledger.schema_version));
        }
        let mut seen = HashSet::with_capacity(ledger.transactions.len());
        for tx in &ledger.transactions {
            if !seen.insert(tx.id) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate transaction id {}",
                    tx.id
                )));
            }
            Self::validate_fields(tx)?;
            if ledger.find_account(tx.account_id).is_none() {
                return Err(CoreError::AccountNotFound(tx.account_id.to_string()));
            }
        }
        self.validate_sells(&ledger.transactions)
    }

    /// Field-level rules for a single transaction.
    ///
    /// - `fees` finite and ≥ 0, `amount` finite and > 0
    /// - Buy/Sell: symbol, quantity > 0, price > 0, amount = quantity × price
    /// - Deposit/Withdraw: no symbol, quantity or price
    pub fn validate_fields(tx: &Transaction) -> Result<(), CoreError> {
        if !tx.fees.is_finite() || tx.fees < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Fees must be non-negative, got {}",
                tx.fees
            )));
        }
        if !tx.amount.is_finite() || tx.amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Amount must be positive, got {}",
                tx.amount
            )));
        }

        if tx.transaction_type.is_trade() {
            let symbol = tx.symbol.as_deref().unwrap_or("");
            if symbol.trim().is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "{} transaction requires a symbol",
                    tx.transaction_type
                )));
            }
            let quantity = Self::require_positive(tx.quantity, "Quantity")?;
            let price = Self::require_positive(tx.price_per_unit, "Price per unit")?;

            let expected = quantity * price;
            if (tx.amount - expected).abs() > AMOUNT_TOLERANCE * tx.amount.abs().max(1.0) {
                return Err(CoreError::ValidationError(format!(
                    "Amount {} does not match {quantity} × {price} = {expected} for {symbol}",
                    tx.amount
                )));
            }
        } else if tx.symbol.is_some() || tx.quantity.is_some() || tx.price_per_unit.is_some() {
            return Err(CoreError::ValidationError(format!(
                "{} transaction must not carry symbol, quantity or price",
                tx.transaction_type
            )));
        }

        Ok(())
    }

    fn require_positive(value: Option<f64>, what: &str) -> Result<f64, CoreError> {
        match value {
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            Some(v) => Err(CoreError::ValidationError(format!(
                "{what} must be positive, got {v}"
            ))),
            None => Err(CoreError::ValidationError(format!("{what} is required"))),
        }
    }

    /// A sell may not exceed the shares held on its date. Rows already stored
    /// on the same date count, since the new row lands after them.
    fn check_sell_covered(&self, ledger: &Ledger, tx: &Transaction) -> Result<(), CoreError> {
        let symbol = tx.symbol.as_deref().unwrap_or("");
        let quantity = tx.quantity.unwrap_or(0.0);
        let held = self
            .portfolio_service
            .quantity_held(&ledger.transactions, symbol, tx.date);

        if Self::exceeds_holding(quantity, held) {
            return Err(CoreError::ValidationError(format!(
                "Cannot sell {quantity} {symbol} — you only hold {held} on {}",
                tx.date
            )));
        }
        Ok(())
    }

    /// Replay the ledger and fail on the first sell that over-sells.
    fn validate_sells(&self, transactions: &[Transaction]) -> Result<(), CoreError> {
        let mut held: HashMap<String, f64> = HashMap::new();

        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|t| t.date);

        for tx in ordered {
            let (Some(symbol), Some(quantity)) = (tx.symbol.as_deref(), tx.quantity) else {
                continue;
            };
            let amount = held.entry(symbol.trim().to_uppercase()).or_insert(0.0);
            match tx.transaction_type {
                TransactionType::Buy => *amount += quantity,
                TransactionType::Sell => {
                    if Self::exceeds_holding(quantity, *amount) {
                        return Err(CoreError::ValidationError(format!(
                            "Sell of {quantity} {symbol} on {} would exceed holdings \
                             (only {:.8} would be held)",
                            tx.date, *amount,
                        )));
                    }
                    *amount -= quantity;
                }
                TransactionType::Deposit | TransactionType::Withdraw => {}
            }
        }
        Ok(())
    }

    fn exceeds_holding(quantity: f64, held: f64) -> bool {
        held + QUANTITY_TOLERANCE * quantity.abs().max(1.0) < quantity
    }

    /// Insert after every row with the same or an earlier date.
    fn insert_ordered(transactions: &mut Vec<Transaction>, tx: Transaction) -> usize {
        let pos = transactions.partition_point(|t| t.date <= tx.date);
        transactions.insert(pos, tx);
        pos
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
