//! Auth token kept in `localStorage`.

use bridge_traits::{error::Result as BridgeResult, BridgeError, TokenStore};
use tracing::warn;

use crate::error::js_error;

/// Storage key shared with the rest of the web frontend.
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

/// [`TokenStore`] over `window.localStorage`.
///
/// Storage failures (quota, privacy mode) are logged and read as "no token".
#[derive(Clone)]
pub struct LocalStorageTokenStore {
    storage: web_sys::Storage,
    key: String,
}

impl LocalStorageTokenStore {
    /// Store under the default `auth_token` key.
    pub fn new() -> BridgeResult<Self> {
        Self::with_key(DEFAULT_TOKEN_KEY)
    }

    /// Store under a custom key.
    pub fn with_key(key: impl Into<String>) -> BridgeResult<Self> {
        let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|err| js_error("localStorage", err))?
            .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))?;

        Ok(Self {
            storage,
            key: key.into(),
        })
    }

    /// Persist a token, e.g. after sign-in.
    pub fn store(&self, token: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key, token)
            .map_err(|err| js_error("set_item", err))
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn read(&self) -> Option<String> {
        match self.storage.get_item(&self.key) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                warn!(error = %js_error("get_item", err), "Failed to read auth token");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(err) = self.storage.remove_item(&self.key) {
            warn!(error = %js_error("remove_item", err), "Failed to clear auth token");
        }
    }
}
