#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::services::ledger_service::LedgerService;

use super::crypto::{self, KdfParams};
use super::format;

/// Save/load a ledger to/from encrypted bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Flow: Ledger → bincode → AES-256-GCM(Argon2id(password)) → STVK bytes
    pub fn save_to_bytes(ledger: &Ledger, password: &str) -> Result<Vec<u8>, CoreError> {
        Self::save_to_bytes_with(ledger, password, KdfParams::default())
    }

    /// Same as `save_to_bytes` with explicit key-stretching costs.
    pub fn save_to_bytes_with(
        ledger: &Ledger,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        let sealed = crypto::seal(&plaintext, password, kdf_params)?;
        Ok(format::encode(&sealed))
    }

    /// Flow: STVK bytes → header → decrypt → bincode → Ledger → validation.
    ///
    /// A ledger that decrypts but fails validation is rejected, so corrupt
    /// records never reach the derivation engine.
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<Ledger, CoreError> {
        let sealed = format::decode(data)?;
        let plaintext = crypto::open(&sealed, password)?;
        let ledger: Ledger = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))?;

        LedgerService::new().validate_ledger(&ledger)?;
        Ok(ledger)
    }

    /// Write atomically: a sibling temp file is written, then renamed over
    /// the target.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        ledger: &Ledger,
        path: &Path,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes_with(ledger, password, kdf_params)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        log::debug!("Ledger saved to {}", path.display());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &Path, password: &str) -> Result<Ledger, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
