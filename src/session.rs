//! Local login echo.
//!
//! The stored user record is compared field by field in plaintext and is
//! never checked against any server. This is not an authentication system
//! and must not be treated as one.

use crate::models::User;
use crate::storage::{SessionStore, StoreError};
use std::sync::Arc;
use tracing::{info, warn};

pub const LOGGED_IN_KEY: &str = "loggedIn";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Replaces any previously registered user. The logged-in flag is left alone.
    pub async fn register(&self, user: User) -> Result<(), AuthError> {
        let record = serde_json::to_string(&user).map_err(StoreError::from)?;
        self.store.set(USER_KEY, &record).await?;
        info!(email = %user.email, "registered local user");
        Ok(())
    }

    /// Fails without touching the store unless both fields match the stored record.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = match self.stored_user().await? {
            Some(user) if user.email == email && user.password == password => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        self.store.set(LOGGED_IN_KEY, "true").await?;
        info!(email = %user.email, "logged in");
        Ok(Session { user })
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(LOGGED_IN_KEY).await?;
        Ok(())
    }

    pub async fn current(&self) -> Result<Option<Session>, AuthError> {
        let logged_in = self.store.get(LOGGED_IN_KEY).await?.as_deref() == Some("true");
        if !logged_in {
            return Ok(None);
        }

        Ok(self.stored_user().await?.map(|user| Session { user }))
    }

    async fn stored_user(&self) -> Result<Option<User>, AuthError> {
        let Some(record) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&record) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!("ignoring unreadable user record: {err}");
                Ok(None)
            }
        }
    }
}
