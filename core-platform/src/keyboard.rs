//! Soft keyboard observer. Native only.

use std::sync::Arc;

use bridge_traits::{EventCallback, KeyboardEvent, KeyboardModule, ListenerHandle};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capability::{CapabilityBindings, CapabilityHandle};
use crate::observer::{Emitter, Observer, ObserverSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyboardState {
    pub visible: bool,
    pub height_px: u32,
}

impl From<KeyboardEvent> for KeyboardState {
    fn from(event: KeyboardEvent) -> Self {
        match event {
            KeyboardEvent::WillShow { keyboard_height } => KeyboardState {
                visible: true,
                height_px: keyboard_height,
            },
            KeyboardEvent::WillHide => KeyboardState::default(),
        }
    }
}

pub struct KeyboardSource {
    keyboard: CapabilityHandle<Arc<dyn KeyboardModule>>,
}

impl KeyboardSource {
    pub fn new(keyboard: CapabilityHandle<Arc<dyn KeyboardModule>>) -> Self {
        Self { keyboard }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ObserverSource for KeyboardSource {
    type Value = KeyboardState;

    fn name(&self) -> &'static str {
        "keyboard"
    }

    fn initial(&self) -> KeyboardState {
        KeyboardState::default()
    }

    async fn probe(&self) -> Option<KeyboardState> {
        None
    }

    fn attach(&self, emitter: Emitter<KeyboardState>) -> Vec<Box<dyn ListenerHandle>> {
        let Some(keyboard) = self.keyboard.present() else {
            return Vec::new();
        };

        let callback: EventCallback<KeyboardEvent> =
            Arc::new(move |event| emitter.emit(KeyboardState::from(event)));
        match keyboard.add_listener(callback) {
            Ok(handle) => vec![handle],
            Err(e) => {
                warn!(error = %e, "Registering keyboard listener failed");
                Vec::new()
            }
        }
    }
}

pub type KeyboardObserver = Observer<KeyboardSource>;

impl Observer<KeyboardSource> {
    pub fn from_bindings(bindings: &CapabilityBindings) -> Self {
        Observer::new(KeyboardSource::new(bindings.keyboard.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeKeyboard;
    use bridge_traits::PlatformFacts;

    #[tokio::test]
    async fn test_show_then_hide() {
        let keyboard = Arc::new(FakeKeyboard::default());
        let mut bindings = CapabilityBindings::absent(PlatformFacts::ANDROID);
        bindings.keyboard = CapabilityHandle::Present(keyboard.clone());

        let observer = KeyboardObserver::from_bindings(&bindings);
        let _sub = observer.subscribe(|_| {}).await;

        keyboard.listeners.fire(KeyboardEvent::WillShow {
            keyboard_height: 280,
        });
        assert_eq!(
            observer.current(),
            KeyboardState {
                visible: true,
                height_px: 280
            }
        );

        keyboard.listeners.fire(KeyboardEvent::WillHide);
        assert_eq!(
            observer.current(),
            KeyboardState {
                visible: false,
                height_px: 0
            }
        );
    }

    #[tokio::test]
    async fn test_absent_keyboard_stays_hidden() {
        let observer =
            KeyboardObserver::from_bindings(&CapabilityBindings::absent(PlatformFacts::WEB));
        let _sub = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current(), KeyboardState::default());
    }

    #[tokio::test]
    async fn test_detach_removes_native_listener() {
        let keyboard = Arc::new(FakeKeyboard::default());
        let mut bindings = CapabilityBindings::absent(PlatformFacts::IOS);
        bindings.keyboard = CapabilityHandle::Present(keyboard.clone());

        let observer = KeyboardObserver::from_bindings(&bindings);
        let sub = observer.subscribe(|_| {}).await;
        assert_eq!(keyboard.listeners.len(), 1);

        drop(sub);
        assert_eq!(keyboard.listeners.len(), 0);
        assert_eq!(keyboard.listeners.removed(), 1);
    }
}
