//! Web host for native processes without a browser

use std::sync::atomic::{AtomicBool, Ordering};

use bridge_traits::{
    error::Result, CallbackHandle, EventCallback, ListenerHandle, WebHost, WindowEvent,
};
use tracing::trace;

/// [`WebHost`] with no window behind it.
///
/// Reports online unless told otherwise, has no CSS custom properties and
/// never fires window events. Safe-area insets therefore read as zero.
#[derive(Debug)]
pub struct HeadlessWebHost {
    online: AtomicBool,
}

impl HeadlessWebHost {
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    /// Override the online flag returned to the next probe.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for HeadlessWebHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WebHost for HeadlessWebHost {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn css_custom_property(&self, _name: &str) -> Option<String> {
        None
    }

    fn add_window_listener(
        &self,
        event: WindowEvent,
        _callback: EventCallback<()>,
    ) -> Result<Box<dyn ListenerHandle>> {
        trace!(event = %event, "Headless host ignores window listener");
        Ok(Box::new(CallbackHandle::noop()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_headless_defaults() {
        let host = HeadlessWebHost::new();
        assert!(host.is_online());
        assert_eq!(host.css_custom_property("--safe-area-inset-top"), None);

        host.set_online(false);
        assert!(!host.is_online());
    }

    #[test]
    fn test_listener_handle_is_removable() {
        let host = HeadlessWebHost::new();
        let handle = host
            .add_window_listener(WindowEvent::Resize, Arc::new(|_| {}))
            .unwrap();
        handle.remove();
    }
}
