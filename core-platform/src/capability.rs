//! Native capability bindings.
//!
//! A capability is bound at most once per process. On the web no native
//! loader is ever touched; inside the shell a module that fails to load is
//! logged and recorded as [`CapabilityHandle::Absent`] for good.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult, AppModule, Capability, HapticsModule, ImpactStyle,
    KeyboardModule, NativeModuleLoader, NetworkModule, NotificationKind, PlatformFacts,
    StatusBarModule, StatusBarStyle,
};
use core_runtime::events::{CapabilityEvent, EventBus, RuntimeEvent};
use tracing::{debug, info, warn};

/// Availability of a native capability.
#[derive(Clone)]
pub enum CapabilityHandle<T> {
    Present(T),
    Absent,
}

impl<T> CapabilityHandle<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, CapabilityHandle::Present(_))
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            CapabilityHandle::Present(value) => Some(value),
            CapabilityHandle::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for CapabilityHandle<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CapabilityHandle::Present(value),
            None => CapabilityHandle::Absent,
        }
    }
}

impl<T> Default for CapabilityHandle<T> {
    fn default() -> Self {
        CapabilityHandle::Absent
    }
}

impl<T> fmt::Debug for CapabilityHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityHandle::Present(_) => f.write_str("Present(..)"),
            CapabilityHandle::Absent => f.write_str("Absent"),
        }
    }
}

/// Bind a single capability.
///
/// `load` is never invoked on the web. A load error is logged at `warn` and
/// yields `Absent`.
pub async fn acquire<T, F, Fut>(
    facts: PlatformFacts,
    capability: Capability,
    load: F,
) -> CapabilityHandle<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = BridgeResult<T>>,
{
    load_capability(facts, capability, load).await.0
}

async fn load_capability<T, F, Fut>(
    facts: PlatformFacts,
    capability: Capability,
    load: F,
) -> (CapabilityHandle<T>, Option<CapabilityEvent>)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = BridgeResult<T>>,
{
    if !facts.is_native() {
        return (CapabilityHandle::Absent, None);
    }

    match load().await {
        Ok(module) => {
            debug!(capability = %capability, "Native capability bound");
            (
                CapabilityHandle::Present(module),
                Some(CapabilityEvent::Acquired { capability }),
            )
        }
        Err(e) => {
            warn!(capability = %capability, error = %e, "Native capability unavailable");
            (
                CapabilityHandle::Absent,
                Some(CapabilityEvent::Unavailable {
                    capability,
                    reason: e.to_string(),
                }),
            )
        }
    }
}

/// The full set of native capabilities, bound once at startup.
#[derive(Clone)]
pub struct CapabilityBindings {
    facts: PlatformFacts,
    pub status_bar: CapabilityHandle<Arc<dyn StatusBarModule>>,
    pub keyboard: CapabilityHandle<Arc<dyn KeyboardModule>>,
    pub haptics: CapabilityHandle<Arc<dyn HapticsModule>>,
    pub app: CapabilityHandle<Arc<dyn AppModule>>,
    pub network: CapabilityHandle<Arc<dyn NetworkModule>>,
}

impl CapabilityBindings {
    /// Bindings with every capability absent.
    pub fn absent(facts: PlatformFacts) -> Self {
        Self {
            facts,
            status_bar: CapabilityHandle::Absent,
            keyboard: CapabilityHandle::Absent,
            haptics: CapabilityHandle::Absent,
            app: CapabilityHandle::Absent,
            network: CapabilityHandle::Absent,
        }
    }

    /// Bind all capabilities through `loader`.
    ///
    /// Each outcome is published on `events` when a bus is supplied.
    pub async fn acquire_all(
        facts: PlatformFacts,
        loader: &dyn NativeModuleLoader,
        events: Option<&EventBus>,
    ) -> Self {
        if !facts.is_native() {
            debug!("Web platform, skipping native capability loading");
            return Self::absent(facts);
        }

        let mut outcomes = Vec::with_capacity(Capability::ALL.len());

        let (status_bar, event) =
            load_capability(facts, Capability::StatusBar, || loader.load_status_bar()).await;
        outcomes.extend(event);
        let (keyboard, event) =
            load_capability(facts, Capability::Keyboard, || loader.load_keyboard()).await;
        outcomes.extend(event);
        let (haptics, event) =
            load_capability(facts, Capability::Haptics, || loader.load_haptics()).await;
        outcomes.extend(event);
        let (app, event) =
            load_capability(facts, Capability::Lifecycle, || loader.load_app()).await;
        outcomes.extend(event);
        let (network, event) =
            load_capability(facts, Capability::Network, || loader.load_network()).await;
        outcomes.extend(event);

        if let Some(bus) = events {
            for outcome in outcomes {
                // No subscribers is fine.
                let _ = bus.emit(RuntimeEvent::Capability(outcome));
            }
        }

        let bindings = Self {
            facts,
            status_bar,
            keyboard,
            haptics,
            app,
            network,
        };
        info!(
            platform = facts.name(),
            available = ?bindings.available(),
            "Native capabilities bound"
        );
        bindings
    }

    pub fn facts(&self) -> PlatformFacts {
        self.facts
    }

    /// Capabilities that are present, in [`Capability::ALL`] order.
    pub fn available(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.is_present(*capability))
            .collect()
    }

    pub fn is_present(&self, capability: Capability) -> bool {
        match capability {
            Capability::StatusBar => self.status_bar.is_present(),
            Capability::Keyboard => self.keyboard.is_present(),
            Capability::Haptics => self.haptics.is_present(),
            Capability::Lifecycle => self.app.is_present(),
            Capability::Network => self.network.is_present(),
        }
    }

    /// Impact feedback. No-op without haptics.
    pub async fn impact(&self, style: ImpactStyle) {
        let Some(haptics) = self.haptics.present() else {
            return;
        };
        if let Err(e) = haptics.impact(style).await {
            warn!(?style, error = %e, "Haptic impact failed");
        }
    }

    /// Notification feedback. No-op without haptics.
    pub async fn notification(&self, kind: NotificationKind) {
        let Some(haptics) = self.haptics.present() else {
            return;
        };
        if let Err(e) = haptics.notification(kind).await {
            warn!(?kind, error = %e, "Haptic notification failed");
        }
    }

    /// Dismiss the soft keyboard. No-op without the keyboard module.
    pub async fn hide_keyboard(&self) {
        let Some(keyboard) = self.keyboard.present() else {
            return;
        };
        if let Err(e) = keyboard.hide().await {
            warn!(error = %e, "Hiding keyboard failed");
        }
    }

    /// Startup chrome: [`StatusBarStyle::Light`], plus the background colour
    /// on Android.
    pub async fn apply_status_bar_chrome(&self, background_color: &str) {
        let Some(status_bar) = self.status_bar.present() else {
            return;
        };

        if let Err(e) = status_bar.set_style(StatusBarStyle::Light).await {
            warn!(error = %e, "Setting status bar style failed");
        }

        if self.facts.is_android() {
            if let Err(e) = status_bar.set_background_color(background_color).await {
                warn!(color = background_color, error = %e, "Setting status bar color failed");
            }
        }
    }
}

impl fmt::Debug for CapabilityBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityBindings")
            .field("facts", &self.facts)
            .field("available", &self.available())
            .finish()
    }
}
