//! Listener registration handles.
//!
//! Every `add_listener` style call on a native module or web host returns a
//! [`ListenerHandle`]. Removing the handle detaches the callback; dropping it
//! without calling [`ListenerHandle::remove`] leaves the listener installed,
//! mirroring the behaviour of the underlying platforms.

use crate::platform::PlatformSend;

/// Handle for an installed event listener.
pub trait ListenerHandle: PlatformSend {
    /// Detach the listener. No further callbacks are delivered afterwards.
    fn remove(self: Box<Self>);
}

/// Listener handle backed by a closure that performs the removal.
pub struct CallbackHandle {
    on_remove: Option<Box<dyn FnOnce() + Send>>,
}

impl CallbackHandle {
    pub fn new(on_remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_remove: Some(Box::new(on_remove)),
        }
    }

    /// Handle whose removal does nothing, for sources that never emit.
    pub fn noop() -> Self {
        Self { on_remove: None }
    }
}

impl ListenerHandle for CallbackHandle {
    fn remove(mut self: Box<Self>) {
        if let Some(on_remove) = self.on_remove.take() {
            on_remove();
        }
    }
}

impl std::fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("armed", &self.on_remove.is_some())
            .finish()
    }
}
