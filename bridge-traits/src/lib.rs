//! # Host Bridge Traits
//!
//! Contract between the catalog runtime and the platform it runs on.
//!
//! ## Overview
//!
//! The same application code runs in a browser and inside a packaged mobile
//! shell. Everything that differs between the two is expressed here as a
//! trait, and each host supplies implementations:
//!
//! ### Platform identity
//! - [`NativeShell`](platform::NativeShell) - "am I inside the native shell" probe
//! - [`PlatformFacts`](platform::PlatformFacts) - resolved, immutable platform description
//!
//! ### Native modules (shell only)
//! - [`NativeModuleLoader`](loader::NativeModuleLoader) - lazy, fallible module loading
//! - [`StatusBarModule`](device::StatusBarModule), [`HapticsModule`](device::HapticsModule)
//! - [`KeyboardModule`](keyboard::KeyboardModule)
//! - [`AppModule`](lifecycle::AppModule) - lifecycle and back button events
//! - [`NetworkModule`](network::NetworkModule)
//!
//! ### Web signals (every platform)
//! - [`WebHost`](web::WebHost) - online flag, window events, CSS custom properties
//!
//! ### Networking
//! - [`HttpTransport`](http::HttpTransport) - single-shot HTTP exchange
//! - [`TokenStore`](token::TokenStore) - external bearer token storage
//!
//! ### Utilities
//! - [`LoggerSink`](time::LoggerSink) - forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Native modules |
//! |----------|----------------------|----------------|
//! | iOS / Android | `bridge-native` + shell FFI | loaded through `NativeModuleLoader` |
//! | Web      | `bridge-wasm`        | none |
//!
//! ## Error Handling
//!
//! Bridge calls report [`BridgeError`](error::BridgeError); transports report
//! [`TransportError`](error::TransportError) when no response was received.
//!
//! ## Thread Safety
//!
//! On native targets every bridge trait requires `Send + Sync`; on `wasm32`
//! those bounds are lifted (see [`platform`]).

pub mod device;
pub mod error;
pub mod http;
pub mod keyboard;
pub mod lifecycle;
pub mod listener;
pub mod loader;
pub mod network;
pub mod platform;
pub mod time;
pub mod token;
pub mod web;

pub use error::{BridgeError, TransportError};

// Re-export commonly used types
pub use device::{HapticsModule, ImpactStyle, NotificationKind, StatusBarModule, StatusBarStyle};
pub use http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartFile, MultipartForm,
    ProgressCallback, RequestBody, UploadProgress,
};
pub use keyboard::{KeyboardEvent, KeyboardModule};
pub use lifecycle::{AppModule, AppState, BackButtonEvent};
pub use listener::{CallbackHandle, ListenerHandle};
pub use loader::{Capability, NativeModuleLoader};
pub use network::{ConnectionType, NetworkModule, NetworkStatus};
pub use platform::{
    EventCallback, NativeShell, OperatingSystem, PlatformFacts, PlatformSend, PlatformSendSync,
};
pub use time::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use token::{MemoryTokenStore, TokenStore};
pub use web::{WebHost, WindowEvent};
