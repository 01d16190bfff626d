//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct every bridge the
//! runtime needs in the browser (or the Capacitor web view) without writing
//! repetitive glue code.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult, HttpTransport, NativeModuleLoader, NativeShell, TokenStore,
    WebHost,
};

use crate::{
    capacitor::{CapacitorModuleLoader, CapacitorShell},
    http::FetchTransport,
    token_store::{LocalStorageTokenStore, DEFAULT_TOKEN_KEY},
    web_host::WebSysHost,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// `localStorage` key holding the auth token.
    pub token_key: String,
}

impl WasmBridgeConfig {
    /// Override the token storage key.
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self {
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// Platform probe over the `Capacitor` global.
    pub shell: Arc<dyn NativeShell>,
    /// Capacitor plugin loader.
    pub loader: Arc<dyn NativeModuleLoader>,
    /// `window` / `navigator` signals.
    pub web: Arc<dyn WebHost>,
    /// HTTP transport powered by browser `fetch`.
    pub transport: Arc<dyn HttpTransport>,
    /// Auth token in `localStorage`.
    pub tokens: Arc<dyn TokenStore>,
}

/// Build the default wasm bridge stack.
///
/// Fails with `NotAvailable` outside a browser window.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    Ok(WasmBridgeSet {
        shell: Arc::new(CapacitorShell),
        loader: Arc::new(CapacitorModuleLoader),
        web: Arc::new(WebSysHost::new()?),
        transport: Arc::new(FetchTransport::new()?),
        tokens: Arc::new(LocalStorageTokenStore::with_key(config.token_key)?),
    })
}
