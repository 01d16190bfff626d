//! Auth token storage using the OS keychain

use bridge_traits::{
    error::{BridgeError, Result},
    TokenStore,
};
use keyring::Entry;
use tracing::{debug, warn};

pub const DEFAULT_SERVICE_NAME: &str = "katalog";
pub const TOKEN_ACCOUNT: &str = "auth_token";

/// Keyring-backed [`TokenStore`].
///
/// Uses platform-specific secure storage:
/// - iOS / macOS: Keychain
/// - Android: Keystore-backed credential store
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
///
/// Keychain failures on read are treated as "no token" so requests still go
/// out unauthenticated instead of failing.
pub struct KeyringTokenStore {
    service_name: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE_NAME)
    }

    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Persist a token, e.g. after sign-in.
    pub fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(Self::map_keyring_error)?;
        debug!(service = %self.service_name, "Stored auth token in keyring");
        Ok(())
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service_name, TOKEN_ACCOUNT).map_err(Self::map_keyring_error)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("Keyring error: {}", e))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn read(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keyring unavailable, continuing without token");
                return None;
            }
        };

        match entry.get_password() {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %Self::map_keyring_error(e), "Failed to read auth token");
                None
            }
        }
    }

    fn clear(&self) {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keyring unavailable, token not cleared");
                return;
            }
        };

        match entry.delete_credential() {
            Ok(()) => debug!(service = %self.service_name, "Cleared auth token"),
            Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!(error = %Self::map_keyring_error(e), "Failed to clear auth token"),
        }
    }
}

impl std::fmt::Debug for KeyringTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringTokenStore")
            .field("service_name", &self.service_name)
            .finish()
    }
}
