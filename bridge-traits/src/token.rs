//! Auth Token Store
//!
//! The bearer token lives outside the core. The HTTP client only reads it
//! before each call and asks for it to be cleared after a 401.

use std::sync::RwLock;

use crate::platform::PlatformSendSync;

/// External auth token store.
///
/// Implementations serialize their own reads and writes. Both calls are
/// synchronous so the outbound request stage never waits on I/O.
///
/// # Security
///
/// Implementations must never log the token value.
pub trait TokenStore: PlatformSendSync {
    /// Current token, if any
    fn read(&self) -> Option<String>;

    /// Forget the stored token
    fn clear(&self);
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replace the stored token, e.g. after sign-in
    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|token| !token.is_empty())
    }

    fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_token_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.read(), None);

        store.set("abc");
        assert_eq!(store.read(), Some("abc".to_string()));

        store.clear();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_empty_token_reads_as_missing() {
        let store = MemoryTokenStore::with_token("");
        assert_eq!(store.read(), None);
    }
}
