//! Password credential records
//!
//! A credential record is stored as `<derived-key-hex>.<salt-hex>`. The key
//! is 64 bytes of scrypt output (N = 2^14, r = 8, p = 1) and the salt is 8
//! random bytes. The KDF is fed the ASCII hex form of the salt, which keeps
//! records written by earlier deployments verifiable.

use std::fmt;

use constant_time_eq::constant_time_eq;
use rand::{TryRngCore, rngs::OsRng};
use scrypt::{Params, scrypt};
use tracing::debug;

use crate::error::AuthError;

/// Separator between the key and salt fields
const DELIMITER: char = '.';
/// Derived key length in bytes
const KEY_LEN: usize = 64;
/// Salt length in bytes (before hex encoding)
const SALT_LEN: usize = 8;
/// scrypt cost parameters
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;

/// Stored password representation
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord(String);

impl CredentialRecord {
    /// Wrap a record read back from storage. No validation happens here;
    /// malformed records simply never verify.
    pub fn from_stored(record: impl Into<String>) -> Self {
        Self(record.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialRecord(..)")
    }
}

fn kdf(password: &[u8], salt_hex: &str) -> Result<[u8; KEY_LEN], AuthError> {
    let params = Params::new(LOG_N, R, P, KEY_LEN)
        .map_err(|e| AuthError::Derivation(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    scrypt(password, salt_hex.as_bytes(), &params, &mut key)
        .map_err(|e| AuthError::Derivation(e.to_string()))?;
    Ok(key)
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Derive a fresh credential record from a plaintext password.
///
/// Every call draws a new salt, so deriving the same password twice yields
/// two different records.
pub fn derive(password: &str) -> Result<CredentialRecord, AuthError> {
    if password.is_empty() {
        return Err(AuthError::Derivation("password is empty".to_string()));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| AuthError::Derivation(format!("salt generation failed: {}", e)))?;
    let salt_hex = hex::encode(salt);

    let key = kdf(password.as_bytes(), &salt_hex)?;

    Ok(CredentialRecord(format!(
        "{}{}{}",
        hex::encode(key),
        DELIMITER,
        salt_hex
    )))
}

/// Check a supplied password against a stored record.
///
/// Malformed records fail closed and return `false`.
pub fn verify(record: &CredentialRecord, supplied: &str) -> bool {
    let Some((key_hex, salt_hex)) = record.as_str().split_once(DELIMITER) else {
        debug!("Credential record has no delimiter");
        return false;
    };

    if key_hex.len() != KEY_LEN * 2 || !is_hex(key_hex) || !is_hex(salt_hex) {
        debug!("Credential record is malformed");
        return false;
    }

    match kdf(supplied.as_bytes(), salt_hex) {
        Ok(key) => constant_time_eq(hex::encode(key).as_bytes(), key_hex.as_bytes()),
        Err(e) => {
            debug!("Credential verification could not run: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record produced by the previous deployment for "hunter22"
    const LEGACY_RECORD: &str = "493d9d2fdd141e2ca6ebfdb01b23c3d39f6cd5e4e6e5b7a76d1da2207789490c3c276be46995b635dadc77ab630be1514a67b8b7c7146de6d7627c2bcb42a114.a1b2c3d4e5f60718";

    #[test]
    fn test_derive_and_verify() {
        let record = derive("hunter22").unwrap();

        let (key, salt) = record.as_str().split_once('.').unwrap();
        assert_eq!(key.len(), 128);
        assert_eq!(salt.len(), 16);
        assert!(is_hex(key));
        assert!(is_hex(salt));

        assert!(verify(&record, "hunter22"));
        assert!(!verify(&record, "hunter23"));
    }

    #[test]
    fn test_derive_uses_fresh_salt() {
        let first = derive("correct horse").unwrap();
        let second = derive("correct horse").unwrap();

        assert_ne!(first, second);
        assert!(verify(&first, "correct horse"));
        assert!(verify(&second, "correct horse"));
    }

    #[test]
    fn test_derive_rejects_empty_password() {
        assert!(matches!(derive(""), Err(AuthError::Derivation(_))));
    }

    #[test]
    fn test_verify_legacy_record() {
        let record = CredentialRecord::from_stored(LEGACY_RECORD);

        assert!(verify(&record, "hunter22"));
        assert!(!verify(&record, "hunter23"));
    }

    #[test]
    fn test_verify_malformed_records() {
        let key = "ab".repeat(64);

        for record in [
            "not-a-valid-record".to_string(),
            String::new(),
            ".".to_string(),
            format!("{}.", key),
            format!(".{}", "a1b2c3d4e5f60718"),
            format!("{}.a1b2.c3d4", key),
            format!("{}.zzzz", key),
            "abcd.a1b2c3d4e5f60718".to_string(),
        ] {
            assert!(!verify(&CredentialRecord::from_stored(record.clone()), "hunter22"), "{record}");
        }
    }

    #[test]
    fn test_record_debug_is_redacted() {
        let record = derive("hunter22").unwrap();
        assert_eq!(format!("{:?}", record), "CredentialRecord(..)");
    }
}
