use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::ledger::Ledger;
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;
use crate::services::ledger_service::LedgerService;

use super::crypto::KdfParams;
use super::manager::StorageManager;
use super::repository::{visible_accounts, LedgerRepository};

/// Repository persisted to a password-encrypted `.stvk` file.
///
/// The whole ledger is kept in memory and rewritten after every successful
/// mutation. A failed write leaves the in-memory ledger unchanged.
pub struct EncryptedFileRepository {
    path: PathBuf,
    password: String,
    kdf_params: KdfParams,
    ledger: Ledger,
    service: LedgerService,
}

impl std::fmt::Debug for EncryptedFileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileRepository")
            .field("path", &self.path)
            .field("accounts", &self.ledger.accounts.len())
            .field("transactions", &self.ledger.transactions.len())
            .finish_non_exhaustive()
    }
}

impl EncryptedFileRepository {
    /// Open `path`, or create it with the demonstration dataset on first run.
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        Self::open_with(path, password, KdfParams::default())
    }

    /// `open` with explicit key-stretching costs for newly written files.
    pub fn open_with(
        path: impl AsRef<Path>,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();

        let ledger = if path.exists() {
            let ledger = StorageManager::load_from_file(&path, password)?;
            log::info!(
                "Loaded ledger from {} ({} transactions)",
                path.display(),
                ledger.transactions.len()
            );
            ledger
        } else {
            log::info!("No ledger at {}, seeding demonstration data", path.display());
            let ledger = Ledger::seeded();
            StorageManager::save_to_file(&ledger, &path, password, kdf_params)?;
            ledger
        };

        Ok(Self {
            path,
            password: password.to_string(),
            kdf_params,
            ledger,
            service: LedgerService::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-encrypt under a new password and rewrite the file.
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<(), CoreError> {
        if old_password != self.password {
            return Err(CoreError::Decryption);
        }
        if new_password.is_empty() {
            return Err(CoreError::ValidationError("New password must not be empty".into()));
        }
        StorageManager::save_to_file(&self.ledger, &self.path, new_password, self.kdf_params)?;
        self.password = new_password.to_string();
        Ok(())
    }

    /// Apply `change` to a copy of the ledger, persist it, then commit.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&LedgerService, &mut Ledger) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut next = self.ledger.clone();
        let out = change(&self.service, &mut next)?;
        StorageManager::save_to_file(&next, &self.path, &self.password, self.kdf_params)?;
        self.ledger = next;
        Ok(out)
    }
}

impl LedgerRepository for EncryptedFileRepository {
    fn list_accounts(&self) -> Result<Vec<Account>, CoreError> {
        Ok(visible_accounts(&self.ledger))
    }

    fn upsert_account(&mut self, account: Account) -> Result<(), CoreError> {
        self.mutate(|svc, ledger| svc.upsert_account(ledger, account))
    }

    fn remove_account(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.mutate(|svc, ledger| svc.remove_account(ledger, id))
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.ledger.transactions.clone())
    }

    fn append_transaction(&mut self, tx: Transaction) -> Result<Uuid, CoreError> {
        self.mutate(|svc, ledger| svc.add_transaction(ledger, tx))
    }

    fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        self.mutate(|svc, ledger| svc.remove_transaction(ledger, id))
    }

    fn settings(&self) -> Result<Settings, CoreError> {
        Ok(self.ledger.settings.clone())
    }

    fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        self.mutate(|_, ledger| {
            ledger.settings = settings;
            Ok(())
        })
    }
}
