//! Browser implementation of the `WebHost` bridge trait.

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    EventCallback, ListenerHandle, WebHost, WindowEvent,
};
use tracing::trace;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

use crate::error::js_error;

/// [`WebHost`] over `window`, `navigator` and the root element's computed
/// style.
pub struct WebSysHost {
    window: Window,
}

impl WebSysHost {
    /// Bind to the current browser window.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }
}

impl WebHost for WebSysHost {
    fn is_online(&self) -> bool {
        self.window.navigator().on_line()
    }

    fn css_custom_property(&self, name: &str) -> Option<String> {
        let root = self.window.document()?.document_element()?;
        let style = self.window.get_computed_style(&root).ok().flatten()?;
        let value = style.get_property_value(name).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn add_window_listener(
        &self,
        event: WindowEvent,
        callback: EventCallback<()>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        let closure = Closure::<dyn FnMut()>::new(move || callback(()));
        self.window
            .add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())
            .map_err(|err| js_error("addEventListener", err))?;
        trace!(event = %event, "Window listener added");

        Ok(Box::new(WindowListener {
            window: self.window.clone(),
            event,
            closure,
        }))
    }
}

/// Keeps the JS closure alive until the listener is removed.
struct WindowListener {
    window: Window,
    event: WindowEvent,
    closure: Closure<dyn FnMut()>,
}

impl ListenerHandle for WindowListener {
    fn remove(self: Box<Self>) {
        let _ = self.window.remove_event_listener_with_callback(
            self.event.as_str(),
            self.closure.as_ref().unchecked_ref(),
        );
        trace!(event = %self.event, "Window listener removed");
    }
}
