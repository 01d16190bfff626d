//! Network Status Bridge
//!
//! Connectivity information reported by the native network module.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    listener::ListenerHandle,
    platform::{EventCallback, PlatformSendSync},
};

/// Kind of connection the device currently uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    None,
    /// Reported on the web, where the browser does not expose the link type
    #[default]
    Unknown,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Wifi => "wifi",
            ConnectionType::Cellular => "cellular",
            ConnectionType::None => "none",
            ConnectionType::Unknown => "unknown",
        }
    }
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub connected: bool,
    pub connection_type: ConnectionType,
}

impl NetworkStatus {
    pub fn online(connection_type: ConnectionType) -> Self {
        Self {
            connected: true,
            connection_type,
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            connection_type: ConnectionType::None,
        }
    }
}

impl Default for NetworkStatus {
    /// Assume connectivity until the first probe says otherwise.
    fn default() -> Self {
        Self::online(ConnectionType::Unknown)
    }
}

/// Native network module.
///
/// # Platform Support
///
/// - **iOS**: Network framework path monitor
/// - **Android**: ConnectivityManager callbacks
///
/// The web has no module; the network observer falls back to the web host's
/// online flag and `online`/`offline` events instead.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NetworkModule: PlatformSendSync {
    /// One-shot read of the current status
    async fn get_status(&self) -> Result<NetworkStatus>;

    /// Register for `networkStatusChange` events
    fn add_status_listener(
        &self,
        callback: EventCallback<NetworkStatus>,
    ) -> Result<Box<dyn ListenerHandle>>;
}
