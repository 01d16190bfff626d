//! Catalog runtime façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (native shell probe,
//! module loader, web host, HTTP transport, token store) into the shared
//! platform and HTTP layers. Native hosts typically enable the `native-shims`
//! feature (which depends on `bridge-native`), whereas WebAssembly builds
//! enable the `wasm` feature and rely on the adapters from `bridge-wasm`.
//!
//! ```ignore
//! use core_service::CatalogRuntime;
//!
//! let runtime = CatalogRuntime::builder()
//!     .native_shell(shell)
//!     .module_loader(loader)
//!     .start()
//!     .await?;
//!
//! let items: Vec<Item> = runtime.api().get_json("/items").await?;
//! let snapshot = runtime.mobile().snapshot();
//! ```

pub mod error;
pub mod runtime;

pub use error::{Result, ServiceError};
pub use runtime::{CatalogRuntime, CatalogRuntimeBuilder};
