//! The rotatable bearer credential.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

/// Shared handle to the bearer token attached to outbound calls.
///
/// Clones share one slot. `rotate` replaces the token in place; readers see
/// either the old or the new value, never a mix. Clients read the token on
/// every request, so a rotation takes effect on the next call.
#[derive(Clone)]
pub struct AuthToken {
    inner: Arc<RwLock<SecretString>>,
}

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SecretString::from(token.into()))),
        }
    }

    /// Replace the token. Last write wins.
    pub fn rotate(&self, token: impl Into<String>) {
        let token = SecretString::from(token.into());
        // A poisoned lock still holds a whole SecretString; overwrite it.
        let mut slot = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = token;
        info!("auth token rotated");
    }

    /// True when no token is configured.
    pub fn is_empty(&self) -> bool {
        self.with_secret(|token| token.trim().is_empty())
    }

    /// The `Authorization` header value, or `None` when no token is set.
    pub fn bearer(&self) -> Option<String> {
        self.with_secret(|token| {
            if token.trim().is_empty() {
                None
            } else {
                Some(format!("Bearer {token}"))
            }
        })
    }

    fn with_secret<T>(&self, f: impl FnOnce(&str) -> T) -> T {
        let slot = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(slot.expose_secret())
    }
}

impl Default for AuthToken {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}
