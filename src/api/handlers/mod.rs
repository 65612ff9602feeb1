//! HTTP handlers.
//!
//! Handlers are generic over the [`crate::store::UserStore`] so the same
//! router runs against `PostgreSQL` in production and an in-memory store in
//! tests.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod quiz;
pub mod root;
