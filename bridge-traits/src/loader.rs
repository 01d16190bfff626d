//! Native Module Loading
//!
//! The native shell exposes one bridge module per device capability. Modules
//! are loaded lazily and may be missing entirely (a web build ships none), so
//! every loader is fallible.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    device::{HapticsModule, StatusBarModule},
    error::Result,
    keyboard::KeyboardModule,
    lifecycle::AppModule,
    network::NetworkModule,
    platform::PlatformSendSync,
};

/// Device capabilities offered by the native shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    StatusBar,
    Keyboard,
    Haptics,
    Lifecycle,
    Network,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::StatusBar,
        Capability::Keyboard,
        Capability::Haptics,
        Capability::Lifecycle,
        Capability::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::StatusBar => "status-bar",
            Capability::Keyboard => "keyboard",
            Capability::Haptics => "haptics",
            Capability::Lifecycle => "lifecycle",
            Capability::Network => "network",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loader for the native shell's bridge modules.
///
/// Implemented by the host shell (FFI glue on iOS/Android). Each call either
/// yields a ready module or an error describing why it could not be bound;
/// callers degrade to "capability absent" on error.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NativeModuleLoader: PlatformSendSync {
    async fn load_status_bar(&self) -> Result<Arc<dyn StatusBarModule>>;

    async fn load_keyboard(&self) -> Result<Arc<dyn KeyboardModule>>;

    async fn load_haptics(&self) -> Result<Arc<dyn HapticsModule>>;

    async fn load_app(&self) -> Result<Arc<dyn AppModule>>;

    async fn load_network(&self) -> Result<Arc<dyn NetworkModule>>;
}
