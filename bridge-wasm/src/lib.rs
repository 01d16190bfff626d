//! WebAssembly Bridge Implementations
//!
//! This crate provides WebAssembly-compatible implementations of the bridge traits
//! defined in `bridge-traits`. These implementations use browser APIs through
//! `web-sys` and `wasm-bindgen`, and the Capacitor plugin objects when the
//! build runs inside the packaged mobile shell.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `FetchTransport`: `fetch` with `AbortController` timeouts
//! - `WebSysHost`: online flag, window events, CSS custom properties
//! - `LocalStorageTokenStore`: auth token under `localStorage["auth_token"]`
//! - `CapacitorShell` / `CapacitorModuleLoader`: native shell probe and plugins
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default())?;
//! let online = bridges.web.is_online();
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod capacitor;
pub mod error;
pub mod http;
pub mod token_store;
pub mod web_host;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use capacitor::{CapacitorModuleLoader, CapacitorShell};
pub use error::{WasmError, WasmResult};
pub use http::FetchTransport;
pub use token_store::LocalStorageTokenStore;
pub use web_host::WebSysHost;
