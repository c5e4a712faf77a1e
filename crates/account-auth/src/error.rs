//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The key-derivation function could not run.
    #[error("Credential derivation failed: {0}")]
    Derivation(String),

    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Issue time plus the configured lifetime is not a representable date.
    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,
}
