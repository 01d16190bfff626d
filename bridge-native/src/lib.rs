//! # Native Bridge Implementations
//!
//! Default implementations of the host-independent bridge traits for the
//! native side of the application (the packaged iOS/Android shell and
//! headless hosts such as integration test runners).
//!
//! ## Overview
//!
//! - `HttpTransport` using `reqwest` ([`ReqwestTransport`])
//! - `TokenStore` using the OS keychain via `keyring` ([`KeyringTokenStore`])
//! - `WebHost` for hosts without a browser ([`HeadlessWebHost`])
//!
//! Native modules (status bar, keyboard, haptics, app lifecycle, network)
//! are supplied by the shell itself through `NativeModuleLoader`.
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_native::{HeadlessWebHost, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new()?;
//! let web = HeadlessWebHost::new();
//! ```

mod transport;
mod web_host;

#[cfg(feature = "secure-store")]
mod token_store;

pub use transport::ReqwestTransport;
pub use web_host::HeadlessWebHost;

#[cfg(feature = "secure-store")]
pub use token_store::KeyringTokenStore;
