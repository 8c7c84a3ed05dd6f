use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::ledger::Ledger;
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;
use crate::services::ledger_service::LedgerService;

/// CRUD boundary over accounts, transactions and settings.
///
/// Writes take `&mut self`, so a repository has a single writer; reads hand
/// back owned copies, so callers always see a complete, consistent history.
pub trait LedgerRepository: Send + Sync {
    /// Accounts that have not been soft-removed.
    fn list_accounts(&self) -> Result<Vec<Account>, CoreError>;

    fn upsert_account(&mut self, account: Account) -> Result<(), CoreError>;

    /// Soft-remove: hides the account, keeps its transactions.
    fn remove_account(&mut self, id: Uuid) -> Result<(), CoreError>;

    /// Full history, date ascending, no pagination.
    fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError>;

    /// Validate and store; assigns a fresh id when the given one is nil.
    fn append_transaction(&mut self, tx: Transaction) -> Result<Uuid, CoreError>;

    fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError>;

    fn settings(&self) -> Result<Settings, CoreError>;

    fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError>;
}

/// Shared read paths for repositories backed by an in-memory `Ledger`.
pub(crate) fn visible_accounts(ledger: &Ledger) -> Vec<Account> {
    ledger
        .accounts
        .iter()
        .filter(|a| !a.archived)
        .cloned()
        .collect()
}

/// Non-durable repository, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    ledger: Ledger,
}

impl MemoryRepository {
    /// Empty ledger: no accounts, no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-filled with the demonstration dataset.
    pub fn seeded() -> Self {
        Self {
            ledger: Ledger::seeded(),
        }
    }

    /// Wrap an existing ledger after validating it.
    pub fn from_ledger(ledger: Ledger) -> Result<Self, CoreError> {
        LedgerService::new().validate_ledger(&ledger)?;
        Ok(Self { ledger })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl LedgerRepository for MemoryRepository {
    fn list_accounts(&self) -> Result<Vec<Account>, CoreError> {
        Ok(visible_accounts(&self.ledger))
    }

    fn upsert_account(&mut self, account: Account) -> Result<(), CoreError> {
        LedgerService::new().upsert_account(&mut self.ledger, account)
    }

    fn remove_account(&mut self, id: Uuid) -> Result<(), CoreError> {
        LedgerService::new().remove_account(&mut self.ledger, id)
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.ledger.transactions.clone())
    }

    fn append_transaction(&mut self, tx: Transaction) -> Result<Uuid, CoreError> {
        LedgerService::new().add_transaction(&mut self.ledger, tx)
    }

    fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        LedgerService::new().remove_transaction(&mut self.ledger, id)
    }

    fn settings(&self) -> Result<Settings, CoreError> {
        Ok(self.ledger.settings.clone())
    }

    fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        self.ledger.settings = settings;
        Ok(())
    }
}
