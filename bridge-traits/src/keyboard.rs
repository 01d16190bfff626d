//! Software Keyboard Bridge

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    listener::ListenerHandle,
    platform::{EventCallback, PlatformSendSync},
};

/// Keyboard visibility change reported by the native keyboard module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardEvent {
    /// `keyboardWillShow`, carrying the keyboard height in pixels
    WillShow { keyboard_height: u32 },
    /// `keyboardWillHide`
    WillHide,
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait KeyboardModule: PlatformSendSync {
    /// Register for show/hide events
    fn add_listener(&self, callback: EventCallback<KeyboardEvent>)
        -> Result<Box<dyn ListenerHandle>>;

    /// Dismiss the keyboard
    async fn hide(&self) -> Result<()>;
}
