//! Persistence boundary for users and sessions.
//!
//! Callers only ever see [`StoreError::Internal`] for driver failures; the
//! underlying error is logged once by the implementation and dropped.

use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgUserStore;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string, `None` while the user is only a captured lead.
    pub password: Option<String>,
}

/// Minimal data returned for a live session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint hit (e.g. two first sign-ins racing on one email).
    #[error("record already exists")]
    Conflict,
    #[error("internal server error")]
    Internal,
}

#[cfg_attr(test, mockall::automock)]
pub trait UserStore: Send + Sync {
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Insert a user; `password` is `None` for leads.
    fn create_user(
        &self,
        email: &str,
        password: Option<String>,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    fn set_password(
        &self,
        user_id: Uuid,
        password: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create_session(
        &self,
        user_id: Uuid,
        token_hash: Vec<u8>,
        ttl_seconds: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Resolve a non-expired session.
    fn find_session(
        &self,
        token_hash: Vec<u8>,
    ) -> impl Future<Output = Result<Option<SessionRecord>, StoreError>> + Send;

    fn delete_session(
        &self,
        token_hash: Vec<u8>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
