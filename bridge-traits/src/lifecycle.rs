//! App Lifecycle Bridge
//!
//! Foreground/background transitions and the Android hardware back button,
//! both delivered by the native app module.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    listener::ListenerHandle,
    platform::{EventCallback, PlatformSendSync},
};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// Application is in the foreground and active
    #[default]
    Active,
    /// Application is in the background
    Background,
}

impl AppState {
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            AppState::Active
        } else {
            AppState::Background
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AppState::Active)
    }
}

/// Hardware back button press (Android only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackButtonEvent {
    /// Whether the embedded web view has history to go back to
    pub can_go_back: bool,
}

/// Native app module.
///
/// # Platform Support
///
/// - **iOS**: UIApplication lifecycle notifications
/// - **Android**: Activity lifecycle callbacks and `onBackPressed`
pub trait AppModule: PlatformSendSync {
    /// Register for `appStateChange` events
    fn add_state_listener(&self, callback: EventCallback<AppState>)
        -> Result<Box<dyn ListenerHandle>>;

    /// Register for `backButton` events
    fn add_back_button_listener(
        &self,
        callback: EventCallback<BackButtonEvent>,
    ) -> Result<Box<dyn ListenerHandle>>;
}
