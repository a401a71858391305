//! `tours-auth` — session authentication for the index page.
//!
//! This crate is intentionally decoupled from HTTP and storage: it issues and
//! checks session tokens and hashes passwords; the API decides where tokens
//! travel (cookie or bearer header) and where accounts live.

pub mod claims;
pub mod password;
pub mod principal;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use token::{Hs256SessionTokens, SessionValidator, TokenError};
