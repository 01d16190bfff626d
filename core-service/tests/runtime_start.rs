//! Runtime start-up against fake host bridges.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    error::Result as BridgeResult, AppModule, BridgeError, CallbackHandle, ConnectionType,
    EventCallback, HapticsModule, HttpRequest, HttpResponse, HttpTransport, KeyboardModule,
    ListenerHandle, MemoryTokenStore, NativeModuleLoader, NativeShell, NetworkModule,
    NetworkStatus, ProgressCallback, StatusBarModule, StatusBarStyle, TransportError, WebHost,
    WindowEvent,
};
use core_runtime::config::AppConfig;
use core_runtime::events::{CapabilityEvent, NetworkEvent, RuntimeEvent};
use core_service::CatalogRuntime;
use parking_lot::Mutex;

fn empty_ok() -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: HashMap::new(),
        body: Default::default(),
    }
}

struct Shell(&'static str);

impl NativeShell for Shell {
    fn is_native_platform(&self) -> BridgeResult<bool> {
        Ok(self.0 != "web")
    }

    fn platform_name(&self) -> BridgeResult<String> {
        Ok(self.0.to_string())
    }
}

#[derive(Default)]
struct StatusBar {
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl StatusBarModule for StatusBar {
    async fn set_style(&self, style: StatusBarStyle) -> BridgeResult<()> {
        self.calls.lock().push(format!("style:{:?}", style));
        Ok(())
    }

    async fn set_background_color(&self, color: &str) -> BridgeResult<()> {
        self.calls.lock().push(format!("color:{}", color));
        Ok(())
    }
}

#[derive(Default)]
struct Network {
    listeners: Mutex<Vec<EventCallback<NetworkStatus>>>,
}

impl Network {
    fn fire(&self, status: NetworkStatus) {
        let listeners: Vec<_> = self.listeners.lock().clone();
        for listener in listeners {
            listener(status);
        }
    }
}

#[async_trait::async_trait]
impl NetworkModule for Network {
    async fn get_status(&self) -> BridgeResult<NetworkStatus> {
        Ok(NetworkStatus::online(ConnectionType::Wifi))
    }

    fn add_status_listener(
        &self,
        callback: EventCallback<NetworkStatus>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        self.listeners.lock().push(callback);
        Ok(Box::new(CallbackHandle::noop()))
    }
}

/// Provides status bar and network; everything else is missing.
#[derive(Default)]
struct Loader {
    status_bar: Arc<StatusBar>,
    network: Arc<Network>,
    loads: AtomicUsize,
}

#[async_trait::async_trait]
impl NativeModuleLoader for Loader {
    async fn load_status_bar(&self) -> BridgeResult<Arc<dyn StatusBarModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.status_bar.clone())
    }

    async fn load_keyboard(&self) -> BridgeResult<Arc<dyn KeyboardModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(BridgeError::NotAvailable("Keyboard".to_string()))
    }

    async fn load_haptics(&self) -> BridgeResult<Arc<dyn HapticsModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(BridgeError::NotAvailable("Haptics".to_string()))
    }

    async fn load_app(&self) -> BridgeResult<Arc<dyn AppModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(BridgeError::NotAvailable("App".to_string()))
    }

    async fn load_network(&self) -> BridgeResult<Arc<dyn NetworkModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.network.clone())
    }
}

struct OfflineWeb;

impl WebHost for OfflineWeb {
    fn is_online(&self) -> bool {
        false
    }

    fn css_custom_property(&self, _name: &str) -> Option<String> {
        None
    }

    fn add_window_listener(
        &self,
        _event: WindowEvent,
        _callback: EventCallback<()>,
    ) -> BridgeResult<Box<dyn ListenerHandle>> {
        Ok(Box::new(CallbackHandle::noop()))
    }
}

#[derive(Default)]
struct RecordingTransport {
    seen: Mutex<Vec<HttpRequest>>,
}

#[async_trait::async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().push(request);
        Ok(empty_ok())
    }

    async fn send_with_progress(
        &self,
        request: HttpRequest,
        _progress: ProgressCallback,
    ) -> Result<HttpResponse, TransportError> {
        self.send(request).await
    }
}

fn config() -> core_runtime::config::AppConfigBuilder {
    AppConfig::builder().ignore_environment()
}

#[tokio::test]
async fn android_start_binds_capabilities_and_applies_chrome() {
    let loader = Arc::new(Loader::default());
    let transport = Arc::new(RecordingTransport::default());

    let runtime = CatalogRuntime::builder()
        .native_shell(Arc::new(Shell("android")))
        .module_loader(loader.clone())
        .web_host(Arc::new(OfflineWeb))
        .transport(transport.clone())
        .token_store(Arc::new(MemoryTokenStore::with_token("tok")))
        .config(config().status_bar_color("#112233"))
        .start()
        .await
        .unwrap();

    assert!(runtime.facts().is_android());
    assert_eq!(loader.loads.load(Ordering::SeqCst), 5);
    assert_eq!(
        *loader.status_bar.calls.lock(),
        vec!["style:Light".to_string(), "color:#112233".to_string()]
    );

    let snapshot = runtime.mobile().snapshot();
    assert!(snapshot.is_native);
    assert!(snapshot.is_android);
    // Network comes from the native module, not the offline web host.
    assert_eq!(snapshot.network, NetworkStatus::online(ConnectionType::Wifi));

    runtime.api().get("/items").await.unwrap();
    let request = &transport.seen.lock()[0];
    assert_eq!(request.url, "https://your-server-domain.com/api/items");
    assert_eq!(request.header_value("X-Platform"), Some("mobile"));
    assert_eq!(request.header_value("Authorization"), Some("Bearer tok"));
    assert_eq!(request.timeout, Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn capability_outcomes_and_network_changes_reach_the_bus() {
    let loader = Arc::new(Loader::default());
    let events = core_runtime::events::EventBus::new(32);
    let mut rx = events.subscribe();

    let runtime = CatalogRuntime::builder()
        .native_shell(Arc::new(Shell("ios")))
        .module_loader(loader.clone())
        .web_host(Arc::new(OfflineWeb))
        .transport(Arc::new(RecordingTransport::default()))
        .token_store(Arc::new(MemoryTokenStore::new()))
        .config(config())
        .event_bus(events.clone())
        .start()
        .await
        .unwrap();

    let mut acquired = 0;
    let mut unavailable = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            RuntimeEvent::Capability(CapabilityEvent::Acquired { .. }) => acquired += 1,
            RuntimeEvent::Capability(CapabilityEvent::Unavailable { .. }) => unavailable += 1,
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!((acquired, unavailable), (2, 3));

    // iOS never gets the background colour.
    assert_eq!(*loader.status_bar.calls.lock(), vec!["style:Light".to_string()]);

    loader.network.fire(NetworkStatus::offline());
    assert_eq!(
        rx.try_recv().unwrap(),
        RuntimeEvent::Network(NetworkEvent::StatusChanged {
            connected: false,
            connection_type: ConnectionType::None,
        })
    );
    assert!(!runtime.mobile().network.is_connected());

    runtime.shutdown();
    loader.network.fire(NetworkStatus::online(ConnectionType::Cellular));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn web_start_never_touches_the_loader() {
    let loader = Arc::new(Loader::default());
    let transport = Arc::new(RecordingTransport::default());

    let runtime = CatalogRuntime::builder()
        .native_shell(Arc::new(Shell("web")))
        .module_loader(loader.clone())
        .web_host(Arc::new(OfflineWeb))
        .transport(transport.clone())
        .token_store(Arc::new(MemoryTokenStore::new()))
        .config(config())
        .start()
        .await
        .unwrap();

    assert!(runtime.facts().is_web());
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    assert!(runtime.mobile().capabilities.available().is_empty());
    assert!(!runtime.mobile().snapshot().network.connected);

    runtime.api().get("items").await.unwrap();
    let request = &transport.seen.lock()[0];
    assert_eq!(request.url, "http://localhost:8000/api/items");
    assert_eq!(request.header_value("X-Platform"), Some("web"));
    assert_eq!(request.header_value("Authorization"), None);
}

#[tokio::test]
async fn invalid_config_fails_start() {
    let err = CatalogRuntime::builder()
        .web_host(Arc::new(OfflineWeb))
        .transport(Arc::new(RecordingTransport::default()))
        .token_store(Arc::new(MemoryTokenStore::new()))
        .config(config().request_timeout(Duration::ZERO))
        .start()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        core_service::ServiceError::Runtime(core_runtime::Error::Config(_))
    ));
}

#[cfg(not(feature = "native-shims"))]
#[tokio::test]
async fn missing_transport_is_reported() {
    let err = CatalogRuntime::builder()
        .web_host(Arc::new(OfflineWeb))
        .token_store(Arc::new(MemoryTokenStore::new()))
        .config(config())
        .start()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        core_service::ServiceError::Runtime(core_runtime::Error::CapabilityMissing { .. })
    ));
}
