//! Connectivity observer.
//!
//! Inside the shell the native network module supplies status and change
//! events. Everywhere else the browser's online flag and `online`/`offline`
//! window events stand in, with the connection type left `unknown`.

use std::sync::Arc;

use bridge_traits::{
    ConnectionType, EventCallback, ListenerHandle, NetworkModule, NetworkStatus, WebHost,
    WindowEvent,
};
use tracing::warn;

use crate::capability::{CapabilityBindings, CapabilityHandle};
use crate::observer::{Emitter, Observer, ObserverSource};

pub struct NetworkSource {
    module: CapabilityHandle<Arc<dyn NetworkModule>>,
    web: Arc<dyn WebHost>,
}

impl NetworkSource {
    pub fn new(module: CapabilityHandle<Arc<dyn NetworkModule>>, web: Arc<dyn WebHost>) -> Self {
        Self { module, web }
    }

    fn web_status(connected: bool) -> NetworkStatus {
        NetworkStatus {
            connected,
            connection_type: ConnectionType::Unknown,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ObserverSource for NetworkSource {
    type Value = NetworkStatus;

    fn name(&self) -> &'static str {
        "network"
    }

    fn initial(&self) -> NetworkStatus {
        NetworkStatus::default()
    }

    async fn probe(&self) -> Option<NetworkStatus> {
        match self.module.present() {
            Some(module) => match module.get_status().await {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(error = %e, "Reading network status failed");
                    None
                }
            },
            None => Some(Self::web_status(self.web.is_online())),
        }
    }

    fn attach(&self, emitter: Emitter<NetworkStatus>) -> Vec<Box<dyn ListenerHandle>> {
        if let Some(module) = self.module.present() {
            let callback: EventCallback<NetworkStatus> =
                Arc::new(move |status| emitter.emit(status));
            return match module.add_status_listener(callback) {
                Ok(handle) => vec![handle],
                Err(e) => {
                    warn!(error = %e, "Registering network listener failed");
                    Vec::new()
                }
            };
        }

        [(WindowEvent::Online, true), (WindowEvent::Offline, false)]
            .into_iter()
            .filter_map(|(event, connected)| {
                let emitter = emitter.clone();
                let callback: EventCallback<()> =
                    Arc::new(move |()| emitter.emit(Self::web_status(connected)));
                self.web
                    .add_window_listener(event, callback)
                    .map_err(|e| warn!(event = %event, error = %e, "Registering window listener failed"))
                    .ok()
            })
            .collect()
    }
}

/// Network status observer.
pub type NetworkObserver = Observer<NetworkSource>;

impl Observer<NetworkSource> {
    pub fn from_bindings(bindings: &CapabilityBindings, web: Arc<dyn WebHost>) -> Self {
        Observer::new(NetworkSource::new(bindings.network.clone(), web))
    }

    pub fn is_connected(&self) -> bool {
        self.current().connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNetworkModule, FakeWebHost};
    use bridge_traits::PlatformFacts;
    use parking_lot::Mutex;
    use std::sync::atomic::Ordering;

    fn web_observer(host: Arc<FakeWebHost>) -> NetworkObserver {
        NetworkObserver::from_bindings(&CapabilityBindings::absent(PlatformFacts::WEB), host)
    }

    #[tokio::test]
    async fn test_web_online_offline_sequence() {
        let host = Arc::new(FakeWebHost::default());
        let observer = web_observer(host.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        let _sub = observer
            .subscribe(move |status: NetworkStatus| log.lock().push(status.connected))
            .await;
        assert!(observer.is_connected());

        host.go_offline();
        assert!(!observer.is_connected());
        host.go_online();
        assert!(observer.is_connected());

        assert_eq!(*seen.lock(), vec![false, true]);
        assert_eq!(observer.current().connection_type, ConnectionType::Unknown);
    }

    #[tokio::test]
    async fn test_web_probe_reads_online_flag() {
        let host = Arc::new(FakeWebHost::default());
        host.offline.store(true, Ordering::SeqCst);
        let observer = web_observer(host);

        let _sub = observer.subscribe(|_| {}).await;
        assert!(!observer.is_connected());
    }

    #[tokio::test]
    async fn test_native_module_takes_precedence() {
        let host = Arc::new(FakeWebHost::default());
        let module = Arc::new(FakeNetworkModule::new(Some(NetworkStatus::online(
            ConnectionType::Wifi,
        ))));
        let mut bindings = CapabilityBindings::absent(PlatformFacts::ANDROID);
        bindings.network = CapabilityHandle::Present(module.clone());

        let observer = NetworkObserver::from_bindings(&bindings, host.clone());
        let _sub = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current().connection_type, ConnectionType::Wifi);
        assert_eq!(host.online.len(), 0);

        module.listeners.fire(NetworkStatus::offline());
        assert_eq!(observer.current(), NetworkStatus::offline());
    }

    #[tokio::test]
    async fn test_native_probe_failure_keeps_default() {
        let module = Arc::new(FakeNetworkModule::new(None));
        let mut bindings = CapabilityBindings::absent(PlatformFacts::IOS);
        bindings.network = CapabilityHandle::Present(module);

        let observer =
            NetworkObserver::from_bindings(&bindings, Arc::new(FakeWebHost::default()));
        let _sub = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current(), NetworkStatus::default());
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_window_listeners() {
        let host = Arc::new(FakeWebHost::default());
        let observer = web_observer(host.clone());

        let sub = observer.subscribe(|_| {}).await;
        assert_eq!(host.online.len(), 1);
        assert_eq!(host.offline_events.len(), 1);

        sub.unsubscribe();
        assert_eq!(host.online.len(), 0);
        assert_eq!(host.offline_events.len(), 0);
    }
}
