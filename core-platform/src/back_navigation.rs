//! Hardware back button relay (Android shell only).
//!
//! Unlike the other observers there is no value to read: every back press is
//! handed to the subscribed handlers and nothing else.

use std::sync::Arc;

use bridge_traits::{
    AppModule, BackButtonEvent, EventCallback, ListenerHandle, PlatformFacts, PlatformSendSync,
};
use tracing::warn;

use crate::capability::{CapabilityBindings, CapabilityHandle};
use crate::observer::{Emitter, Observer, ObserverPhase, ObserverSource, Subscription};

pub struct BackSource {
    app: Option<Arc<dyn AppModule>>,
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ObserverSource for BackSource {
    type Value = BackButtonEvent;

    fn name(&self) -> &'static str {
        "back-navigation"
    }

    fn initial(&self) -> BackButtonEvent {
        BackButtonEvent { can_go_back: false }
    }

    async fn probe(&self) -> Option<BackButtonEvent> {
        None
    }

    fn attach(&self, emitter: Emitter<BackButtonEvent>) -> Vec<Box<dyn ListenerHandle>> {
        let Some(app) = self.app.as_ref() else {
            return Vec::new();
        };

        let callback: EventCallback<BackButtonEvent> = Arc::new(move |event| emitter.emit(event));
        match app.add_back_button_listener(callback) {
            Ok(handle) => vec![handle],
            Err(e) => {
                warn!(error = %e, "Registering back button listener failed");
                Vec::new()
            }
        }
    }
}

/// Back button relay.
#[derive(Clone)]
pub struct BackNavigation {
    observer: Observer<BackSource>,
}

impl BackNavigation {
    pub fn new(facts: PlatformFacts, app: CapabilityHandle<Arc<dyn AppModule>>) -> Self {
        // Only Android has a hardware back button.
        let app = if facts.is_android() {
            app.present().cloned()
        } else {
            None
        };
        Self {
            observer: Observer::new(BackSource { app }),
        }
    }

    pub fn from_bindings(bindings: &CapabilityBindings) -> Self {
        Self::new(bindings.facts(), bindings.app.clone())
    }

    /// Whether back presses can be delivered at all.
    pub fn is_supported(&self) -> bool {
        self.observer.source().app.is_some()
    }

    /// Register a handler for every back press.
    pub async fn subscribe<F>(&self, handler: F) -> Subscription<BackButtonEvent>
    where
        F: Fn(BackButtonEvent) + PlatformSendSync + 'static,
    {
        self.observer.subscribe(handler).await
    }

    pub fn phase(&self) -> ObserverPhase {
        self.observer.phase()
    }
}

impl std::fmt::Debug for BackNavigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackNavigation")
            .field("supported", &self.is_supported())
            .field("phase", &self.phase())
            .finish()
    }
}
