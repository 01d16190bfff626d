//! Hand-written bridge fakes that record listeners and let tests fire events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bridge_traits::{
    error::Result, AppModule, AppState, BackButtonEvent, BridgeError, CallbackHandle,
    EventCallback, KeyboardEvent, KeyboardModule, ListenerHandle, NetworkModule, NetworkStatus,
    WebHost, WindowEvent,
};
use parking_lot::Mutex;

/// Listener list with removal tracking.
pub struct Registry<E> {
    entries: Arc<Mutex<Vec<(u64, EventCallback<E>)>>>,
    next: AtomicU64,
    removed: Arc<AtomicUsize>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next: AtomicU64::new(0),
            removed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<E: Clone + 'static> Registry<E> {
    pub fn add(&self, callback: EventCallback<E>) -> Box<dyn ListenerHandle> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().push((id, callback));

        let entries = Arc::clone(&self.entries);
        let removed = Arc::clone(&self.removed);
        Box::new(CallbackHandle::new(move || {
            entries.lock().retain(|(entry, _)| *entry != id);
            removed.fetch_add(1, Ordering::SeqCst);
        }))
    }

    pub fn fire(&self, event: E) {
        let callbacks: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeWebHost {
    pub offline: AtomicBool,
    pub css: Mutex<HashMap<String, String>>,
    pub online: Registry<()>,
    pub offline_events: Registry<()>,
    pub resize: Registry<()>,
}

impl FakeWebHost {
    pub fn set_css(&self, name: &str, value: &str) {
        self.css.lock().insert(name.to_string(), value.to_string());
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
        self.offline_events.fire(());
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
        self.online.fire(());
    }

    fn registry(&self, event: WindowEvent) -> &Registry<()> {
        match event {
            WindowEvent::Online => &self.online,
            WindowEvent::Offline => &self.offline_events,
            WindowEvent::Resize => &self.resize,
        }
    }
}

impl WebHost for FakeWebHost {
    fn is_online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    fn css_custom_property(&self, name: &str) -> Option<String> {
        self.css.lock().get(name).cloned()
    }

    fn add_window_listener(
        &self,
        event: WindowEvent,
        callback: EventCallback<()>,
    ) -> Result<Box<dyn ListenerHandle>> {
        Ok(self.registry(event).add(callback))
    }
}

pub struct FakeNetworkModule {
    pub status: Mutex<Option<NetworkStatus>>,
    pub listeners: Registry<NetworkStatus>,
}

impl FakeNetworkModule {
    pub fn new(status: Option<NetworkStatus>) -> Self {
        Self {
            status: Mutex::new(status),
            listeners: Registry::default(),
        }
    }
}

#[async_trait::async_trait]
impl NetworkModule for FakeNetworkModule {
    async fn get_status(&self) -> Result<NetworkStatus> {
        let status = *self.status.lock();
        status.ok_or_else(|| BridgeError::OperationFailed("status unavailable".to_string()))
    }

    fn add_status_listener(
        &self,
        callback: EventCallback<NetworkStatus>,
    ) -> Result<Box<dyn ListenerHandle>> {
        Ok(self.listeners.add(callback))
    }
}

#[derive(Default)]
pub struct FakeKeyboard {
    pub listeners: Registry<KeyboardEvent>,
    pub hidden: AtomicUsize,
}

#[async_trait::async_trait]
impl KeyboardModule for FakeKeyboard {
    fn add_listener(
        &self,
        callback: EventCallback<KeyboardEvent>,
    ) -> Result<Box<dyn ListenerHandle>> {
        Ok(self.listeners.add(callback))
    }

    async fn hide(&self) -> Result<()> {
        self.hidden.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeApp {
    pub state: Registry<AppState>,
    pub back: Registry<BackButtonEvent>,
}

impl AppModule for FakeApp {
    fn add_state_listener(
        &self,
        callback: EventCallback<AppState>,
    ) -> Result<Box<dyn ListenerHandle>> {
        Ok(self.state.add(callback))
    }

    fn add_back_button_listener(
        &self,
        callback: EventCallback<BackButtonEvent>,
    ) -> Result<Box<dyn ListenerHandle>> {
        Ok(self.back.add(callback))
    }
}
