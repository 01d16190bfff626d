//! Web Host Abstraction
//!
//! Browser signals used when no native module is available: the online flag,
//! window events and computed CSS custom properties. In a packaged app the
//! shell embeds a web view, so the web host is present on every platform.

use std::fmt;

use crate::{
    error::Result,
    listener::ListenerHandle,
    platform::{EventCallback, PlatformSendSync},
};

/// Window events the runtime listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    Online,
    Offline,
    /// Viewport resize, including orientation changes
    Resize,
}

impl WindowEvent {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowEvent::Online => "online",
            WindowEvent::Offline => "offline",
            WindowEvent::Resize => "resize",
        }
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser-side environment signals.
///
/// # Platform Support
///
/// - **Web / web view**: `navigator.onLine`, `window.addEventListener`,
///   `getComputedStyle(document.documentElement)`
/// - **Headless hosts**: always online, no CSS, no events
pub trait WebHost: PlatformSendSync {
    /// Value of `navigator.onLine`
    fn is_online(&self) -> bool;

    /// Raw value of a CSS custom property on the root element, e.g.
    /// `--safe-area-inset-top`. `None` when unset or empty.
    fn css_custom_property(&self, name: &str) -> Option<String>;

    /// Register a window event listener
    fn add_window_listener(
        &self,
        event: WindowEvent,
        callback: EventCallback<()>,
    ) -> Result<Box<dyn ListenerHandle>>;
}
