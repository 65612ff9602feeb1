//! Authentication for the funnel.
//!
//! Flow Overview:
//! 1) `authorize` checks email + password against the store and answers with a
//!    single uniform denial for every credential failure.
//! 2) `on_sign_in` runs after any successful authorize and provisions a user row
//!    (a lead, without password) when the email is new.
//! 3) A session token is issued; the browser keeps it in an `HttpOnly` cookie and
//!    the store keeps only its SHA-256 hash.
//! 4) `redirect_target` decides where the browser lands after sign-in.

use regex::Regex;
use thiserror::Error;

use crate::store::StoreError;

mod config;
pub mod credentials;
pub mod password;
pub mod session;
pub mod sign_in;

pub use config::AuthConfig;
pub use credentials::{Credentials, authorize};
pub use session::{SESSION_COOKIE_NAME, Session};
pub use sign_in::{RegisterOutcome, on_sign_in, redirect_target, register};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email, wrong password and malformed input all look the same.
    #[error("invalid credentials")]
    Denied,
    #[error("internal server error")]
    Internal,
}

impl From<StoreError> for AuthError {
    fn from(_: StoreError) -> Self {
        Self::Internal
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lightweight email sanity check, run before any store call.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
