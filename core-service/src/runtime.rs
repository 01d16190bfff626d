//! Runtime assembly.
//!
//! [`CatalogRuntime::builder`] collects the host bridges, and
//! [`CatalogRuntimeBuilder::start`] brings the layers up in dependency order:
//! platform, configuration, native capabilities, status bar chrome, observers
//! and finally the API client.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{
    HttpTransport, NativeModuleLoader, NativeShell, NetworkStatus, PlatformFacts, TokenStore,
    WebHost,
};
use core_http::{ApiClient, UserMessages};
use core_platform::{CapabilityBindings, MobileUtils, NetworkObserver, Subscription};
use core_runtime::config::{AppConfig, AppConfigBuilder};
use core_runtime::events::{EventBus, NetworkEvent, RuntimeEvent};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::PlatformInfo;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Host-supplied pieces plus configuration overrides.
pub struct CatalogRuntimeBuilder {
    shell: Option<Arc<dyn NativeShell>>,
    loader: Option<Arc<dyn NativeModuleLoader>>,
    web: Option<Arc<dyn WebHost>>,
    transport: Option<Arc<dyn HttpTransport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    config: AppConfigBuilder,
    messages: Option<UserMessages>,
    events: Option<EventBus>,
    logging: Option<LoggingConfig>,
    forward_network: bool,
}

impl Default for CatalogRuntimeBuilder {
    fn default() -> Self {
        Self {
            shell: None,
            loader: None,
            web: None,
            transport: None,
            tokens: None,
            config: AppConfigBuilder::default(),
            messages: None,
            events: None,
            logging: None,
            forward_network: true,
        }
    }
}

impl CatalogRuntimeBuilder {
    pub fn native_shell(mut self, shell: Arc<dyn NativeShell>) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn module_loader(mut self, loader: Arc<dyn NativeModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn web_host(mut self, web: Arc<dyn WebHost>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Configuration overrides, applied on top of the platform defaults.
    pub fn config(mut self, config: AppConfigBuilder) -> Self {
        self.config = config;
        self
    }

    pub fn messages(mut self, messages: UserMessages) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Install the global tracing subscriber during `start`.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Publish network observer changes as [`NetworkEvent`]s (default on).
    pub fn forward_network_events(mut self, enabled: bool) -> Self {
        self.forward_network = enabled;
        self
    }

    /// Bring the runtime up.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, logging cannot be installed,
    /// or a mandatory bridge (web host, transport, token store) was neither
    /// supplied nor provided by an enabled shim feature.
    pub async fn start(self) -> Result<CatalogRuntime> {
        if let Some(logging) = self.logging {
            init_logging(logging)?;
        }

        let shell = match self.shell {
            Some(shell) => Some(shell),
            None => shims::shell()?,
        };
        let platform = match shell {
            Some(shell) => PlatformInfo::new(shell),
            None => PlatformInfo::without_shell(),
        };
        let facts = platform.resolve();

        let config = self.config.build(facts)?;
        let events = self.events.unwrap_or_default();

        let loader = match self.loader {
            Some(loader) => Some(loader),
            None => shims::loader()?,
        };
        let bindings = match &loader {
            Some(loader) => {
                CapabilityBindings::acquire_all(facts, loader.as_ref(), Some(&events)).await
            }
            None => {
                if facts.is_native() {
                    warn!(
                        platform = facts.name(),
                        "Native platform without a module loader, capabilities disabled"
                    );
                }
                CapabilityBindings::absent(facts)
            }
        };
        bindings
            .apply_status_bar_chrome(&config.status_bar_color)
            .await;

        let web = require(self.web, shims::web, "WebHost", "Use .web_host() to set one.")?;
        let transport = require(
            self.transport,
            shims::transport,
            "HttpTransport",
            "Use .transport() to set one.",
        )?;
        let tokens = require(
            self.tokens,
            shims::tokens,
            "TokenStore",
            "Use .token_store() to set one.",
        )?;

        let mobile = MobileUtils::new(bindings, web);

        let mut api = ApiClient::builder()
            .transport(transport)
            .token_store(tokens)
            .facts(facts)
            .config(&config)
            .events(events.clone());
        if let Some(messages) = self.messages {
            api = api.messages(messages);
        }
        let api = api.build()?;

        let network_forwarder = if self.forward_network {
            Some(forward_network(&mobile.network, events.clone()).await)
        } else {
            None
        };

        info!(
            platform = facts.name(),
            api_base_url = %config.api_base_url,
            "Catalog runtime started"
        );

        Ok(CatalogRuntime {
            platform,
            config,
            events,
            mobile,
            api,
            network_forwarder,
        })
    }
}

/// The assembled runtime.
pub struct CatalogRuntime {
    platform: PlatformInfo,
    config: AppConfig,
    events: EventBus,
    mobile: MobileUtils,
    api: ApiClient,
    network_forwarder: Option<Subscription<NetworkStatus>>,
}

impl CatalogRuntime {
    pub fn builder() -> CatalogRuntimeBuilder {
        CatalogRuntimeBuilder::default()
    }

    pub fn facts(&self) -> PlatformFacts {
        self.platform.resolve()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn mobile(&self) -> &MobileUtils {
        &self.mobile
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Detach the runtime's own observer subscriptions.
    pub fn shutdown(mut self) {
        if let Some(forwarder) = self.network_forwarder.take() {
            forwarder.unsubscribe();
        }
        debug!("Catalog runtime shut down");
    }
}

impl fmt::Debug for CatalogRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRuntime")
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("mobile", &self.mobile)
            .field("api", &self.api)
            .finish()
    }
}

async fn forward_network(
    observer: &NetworkObserver,
    events: EventBus,
) -> Subscription<NetworkStatus> {
    observer
        .subscribe(move |status: NetworkStatus| {
            debug!(
                connected = status.connected,
                connection_type = status.connection_type.as_str(),
                "Network status changed"
            );
            let _ = events.emit(RuntimeEvent::Network(NetworkEvent::StatusChanged {
                connected: status.connected,
                connection_type: status.connection_type,
            }));
        })
        .await
}

fn require<T: ?Sized>(
    provided: Option<Arc<T>>,
    fallback: fn() -> Result<Option<Arc<T>>>,
    capability: &str,
    hint: &str,
) -> Result<Arc<T>> {
    if let Some(provided) = provided {
        return Ok(provided);
    }
    fallback()?.ok_or_else(|| {
        core_runtime::Error::CapabilityMissing {
            capability: capability.to_string(),
            message: format!("No {} provided. {}", capability, hint),
        }
        .into()
    })
}

/// Bridges used when the host does not supply its own.
#[cfg(all(feature = "native-shims", not(target_arch = "wasm32")))]
mod shims {
    use super::*;
    use bridge_native::{HeadlessWebHost, KeyringTokenStore, ReqwestTransport};

    // The shell probe and module loader come from the app shell itself.
    pub fn shell() -> Result<Option<Arc<dyn NativeShell>>> {
        Ok(None)
    }

    pub fn loader() -> Result<Option<Arc<dyn NativeModuleLoader>>> {
        Ok(None)
    }

    pub fn web() -> Result<Option<Arc<dyn WebHost>>> {
        Ok(Some(Arc::new(HeadlessWebHost::new())))
    }

    pub fn transport() -> Result<Option<Arc<dyn HttpTransport>>> {
        Ok(Some(Arc::new(ReqwestTransport::new()?)))
    }

    pub fn tokens() -> Result<Option<Arc<dyn TokenStore>>> {
        Ok(Some(Arc::new(KeyringTokenStore::new())))
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod shims {
    use super::*;
    use bridge_wasm::{
        CapacitorModuleLoader, CapacitorShell, FetchTransport, LocalStorageTokenStore, WebSysHost,
    };

    pub fn shell() -> Result<Option<Arc<dyn NativeShell>>> {
        Ok(Some(Arc::new(CapacitorShell)))
    }

    pub fn loader() -> Result<Option<Arc<dyn NativeModuleLoader>>> {
        Ok(Some(Arc::new(CapacitorModuleLoader)))
    }

    pub fn web() -> Result<Option<Arc<dyn WebHost>>> {
        Ok(Some(Arc::new(WebSysHost::new()?)))
    }

    pub fn transport() -> Result<Option<Arc<dyn HttpTransport>>> {
        Ok(Some(Arc::new(FetchTransport::new()?)))
    }

    pub fn tokens() -> Result<Option<Arc<dyn TokenStore>>> {
        Ok(Some(Arc::new(LocalStorageTokenStore::new()?)))
    }
}

#[cfg(not(any(
    all(feature = "native-shims", not(target_arch = "wasm32")),
    all(feature = "wasm", target_arch = "wasm32")
)))]
mod shims {
    use super::*;

    pub fn shell() -> Result<Option<Arc<dyn NativeShell>>> {
        Ok(None)
    }

    pub fn loader() -> Result<Option<Arc<dyn NativeModuleLoader>>> {
        Ok(None)
    }

    pub fn web() -> Result<Option<Arc<dyn WebHost>>> {
        Ok(None)
    }

    pub fn transport() -> Result<Option<Arc<dyn HttpTransport>>> {
        Ok(None)
    }

    pub fn tokens() -> Result<Option<Arc<dyn TokenStore>>> {
        Ok(None)
    }
}
