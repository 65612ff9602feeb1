//! Post-authorize hooks: lead provisioning, progressive password upgrade and
//! the post-login redirect.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, instrument};

use super::{AuthError, normalize_email, password::hash_password, valid_email};
use crate::store::{StoreError, User, UserStore};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Make sure a user row exists for `email`, creating a lead (no password) if
/// needed. Never blocks sign-in; only store failures surface.
///
/// # Errors
/// Returns [`StoreError::Internal`] if the store fails.
#[instrument(skip(store))]
pub async fn on_sign_in<S: UserStore>(store: &S, email: &str) -> Result<(), StoreError> {
    let email = normalize_email(email);

    if store.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }

    match store.create_user(&email, None).await {
        Ok(user) => {
            info!(user_id = %user.id, "Provisioned new lead");
            Ok(())
        }
        // Lost a race with a concurrent first sign-in for the same email.
        Err(StoreError::Conflict) => {
            debug!("Lead already provisioned concurrently");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    /// A lead captured by the funnel got its first password.
    Upgraded,
    Conflict,
    InvalidEmail,
    WeakPassword,
}

/// Give `email` a password: create the user, or upgrade an existing lead.
///
/// # Errors
/// Returns [`AuthError::Internal`] if hashing or the store fails.
#[instrument(skip(store, password))]
pub async fn register<S: UserStore>(
    store: &S,
    email: &str,
    password: SecretString,
) -> Result<RegisterOutcome, AuthError> {
    let email = normalize_email(email);
    if !valid_email(&email) {
        return Ok(RegisterOutcome::InvalidEmail);
    }
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Ok(RegisterOutcome::WeakPassword);
    }

    let existing: Option<User> = store.find_user_by_email(&email).await?;
    if existing.as_ref().is_some_and(|user| user.password.is_some()) {
        return Ok(RegisterOutcome::Conflict);
    }

    let hash = hash_password(password).await.map_err(|e| {
        error!("Error hashing password: {e:#}");
        AuthError::Internal
    })?;

    match existing {
        Some(user) => {
            store.set_password(user.id, hash).await?;
            info!(user_id = %user.id, "Lead upgraded with a password");
            Ok(RegisterOutcome::Upgraded)
        }
        None => match store.create_user(&email, Some(hash)).await {
            Ok(user) => {
                info!(user_id = %user.id, "User created");
                Ok(RegisterOutcome::Created)
            }
            Err(StoreError::Conflict) => Ok(RegisterOutcome::Conflict),
            Err(e) => Err(e.into()),
        },
    }
}

/// Where to send the browser after signing in.
///
/// The bare site root goes to the landing page, relative paths are resolved
/// against `base_url`, anything else (other origins) falls back to `base_url`.
#[must_use]
pub fn redirect_target(url: &str, base_url: &str, landing_path: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if url.trim_end_matches('/') == base_url {
        return format!("{base_url}{landing_path}");
    }
    if url.starts_with('/') && !url.starts_with("//") {
        return format!("{base_url}{url}");
    }
    base_url.to_string()
}
