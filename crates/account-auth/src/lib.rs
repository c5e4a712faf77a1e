//! Account Service Authentication
//!
//! This crate provides scrypt-based credential records and
//! HS256 session tokens for the account service.

pub mod error;
pub mod extract;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use extract::{AuthUser, session_token};
pub use password::{CredentialRecord, derive, verify};
pub use token::{Claims, Outcome, Secret, TokenSigner, TokenValidator, validate};
