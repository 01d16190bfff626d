//! Workspace umbrella crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `katalog-workspace`,
//! pick `native-shims` or `wasm`, and reach the runtime through the
//! re-exported `core_service`.

#[cfg(feature = "native-shims")]
pub use core_service;

#[cfg(all(feature = "wasm", not(feature = "native-shims")))]
pub use core_service;
