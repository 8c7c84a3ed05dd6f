//! Binary container for an encrypted ledger.
//!
//! ```text
//! [STVK: 4B] [format version: 2B LE]
//! [memory_cost: 4B LE] [time_cost: 4B LE] [parallelism: 4B LE]
//! [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE] [ciphertext]
//! ```

use crate::errors::CoreError;

use super::crypto::{KdfParams, SealedData, NONCE_LEN, SALT_LEN};

/// Magic bytes identifying a Stevest ledger file.
pub const MAGIC: &[u8; 4] = b"STVK";

/// Current container version.
pub const CURRENT_VERSION: u16 = 1;

/// Bytes before the ciphertext.
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

pub fn encode(sealed: &SealedData) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&sealed.salt);
    buf.extend_from_slice(&sealed.nonce);
    buf.extend_from_slice(&(sealed.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&sealed.ciphertext);
    buf
}

/// Parse and sanity-check a container. Trailing bytes after the declared
/// ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<SealedData, CoreError> {
    if data.len() < HEADER_LEN {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a ledger file".into(),
        ));
    }

    let mut reader = Reader { data, offset: 0 };

    if reader.take::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not a ledger file".into(),
        ));
    }

    let version = u16::from_le_bytes(reader.take()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: u32::from_le_bytes(reader.take()?),
        time_cost: u32::from_le_bytes(reader.take()?),
        parallelism: u32::from_le_bytes(reader.take()?),
    };
    kdf_params.check_bounds()?;

    let salt = reader.take::<SALT_LEN>()?;
    let nonce = reader.take::<NONCE_LEN>()?;
    let declared = u64::from_le_bytes(reader.take()?);

    let remaining = data.len() - reader.offset;
    if declared > remaining as u64 {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: header declares {declared} bytes of ciphertext, {remaining} present"
        )));
    }
    let end = reader.offset + declared as usize;

    Ok(SealedData {
        kdf_params,
        salt,
        nonce,
        ciphertext: data[reader.offset..end].to_vec(),
    })
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let bytes = self
            .data
            .get(self.offset..self.offset + N)
            .ok_or_else(|| CoreError::InvalidFileFormat("Unexpected end of header".into()))?;
        self.offset += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
