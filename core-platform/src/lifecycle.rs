//! App lifecycle observer. Native only; on the web the app stays `Active`.

use std::sync::Arc;

use bridge_traits::{AppModule, AppState, EventCallback, ListenerHandle};
use tracing::warn;

use crate::capability::{CapabilityBindings, CapabilityHandle};
use crate::observer::{Emitter, Observer, ObserverSource};

pub struct LifecycleSource {
    app: CapabilityHandle<Arc<dyn AppModule>>,
}

impl LifecycleSource {
    pub fn new(app: CapabilityHandle<Arc<dyn AppModule>>) -> Self {
        Self { app }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ObserverSource for LifecycleSource {
    type Value = AppState;

    fn name(&self) -> &'static str {
        "lifecycle"
    }

    fn initial(&self) -> AppState {
        AppState::Active
    }

    async fn probe(&self) -> Option<AppState> {
        None
    }

    fn attach(&self, emitter: Emitter<AppState>) -> Vec<Box<dyn ListenerHandle>> {
        let Some(app) = self.app.present() else {
            return Vec::new();
        };

        let callback: EventCallback<AppState> = Arc::new(move |state| emitter.emit(state));
        match app.add_state_listener(callback) {
            Ok(handle) => vec![handle],
            Err(e) => {
                warn!(error = %e, "Registering app state listener failed");
                Vec::new()
            }
        }
    }
}

/// Foreground/background observer.
pub type LifecycleObserver = Observer<LifecycleSource>;

impl Observer<LifecycleSource> {
    pub fn from_bindings(bindings: &CapabilityBindings) -> Self {
        Observer::new(LifecycleSource::new(bindings.app.clone()))
    }

    pub fn is_active(&self) -> bool {
        self.current().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApp;
    use bridge_traits::PlatformFacts;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_every_transition_reaches_callback() {
        let app = Arc::new(FakeApp::default());
        let mut bindings = CapabilityBindings::absent(PlatformFacts::IOS);
        bindings.app = CapabilityHandle::Present(app.clone());

        let observer = LifecycleObserver::from_bindings(&bindings);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let _sub = observer
            .subscribe(move |state: AppState| log.lock().push(state))
            .await;

        assert!(observer.is_active());
        app.state.fire(AppState::Background);
        app.state.fire(AppState::Background);
        app.state.fire(AppState::Active);

        assert_eq!(
            *seen.lock(),
            vec![AppState::Background, AppState::Background, AppState::Active]
        );
    }

    #[tokio::test]
    async fn test_web_stays_active_without_listeners() {
        let observer =
            LifecycleObserver::from_bindings(&CapabilityBindings::absent(PlatformFacts::WEB));
        let _sub = observer.subscribe(|_| {}).await;

        assert!(observer.is_active());
    }
}
