//! The credentials provider: `authorize(email, password)`.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::{AuthError, normalize_email, password::verify_password, valid_email};
use crate::store::{User, UserStore};

pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(email: &str, password: SecretString) -> Self {
        Self {
            email: normalize_email(email),
            password,
        }
    }

    /// Shape check only: a plausible email and a non-empty password.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        valid_email(&self.email) && !self.password.expose_secret().is_empty()
    }
}

/// Check credentials against the store.
///
/// Every failure other than a store error is the same [`AuthError::Denied`]:
/// callers cannot tell an unknown email from a wrong password.
///
/// # Errors
/// [`AuthError::Denied`] on malformed input, unknown user, user without a
/// password, or mismatch. [`AuthError::Internal`] if the store fails.
#[instrument(skip(store))]
pub async fn authorize<S: UserStore>(store: &S, credentials: Credentials) -> Result<User, AuthError> {
    if !credentials.is_well_formed() {
        debug!("Malformed credentials");
        return Err(AuthError::Denied);
    }

    let Some(user) = store.find_user_by_email(&credentials.email).await? else {
        debug!("Invalid credentials: unknown user");
        return Err(AuthError::Denied);
    };

    let Some(stored_hash) = user.password.clone() else {
        debug!("Invalid credentials: user has no password yet");
        return Err(AuthError::Denied);
    };

    let matches = verify_password(credentials.password, stored_hash)
        .await
        .map_err(|e| {
            error!("Error verifying password: {e:#}");
            AuthError::Internal
        })?;

    if matches {
        debug!("Login successful");
        Ok(user)
    } else {
        debug!("Invalid credentials: password mismatch");
        Err(AuthError::Denied)
    }
}
