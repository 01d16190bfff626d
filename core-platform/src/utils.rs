//! Aggregate view for UI code: platform facts, the common observers and the
//! fire-and-forget device helpers behind one handle.

use std::sync::Arc;

use bridge_traits::{
    ImpactStyle, NetworkStatus, NotificationKind, OperatingSystem, PlatformFacts, WebHost,
};
use serde::{Deserialize, Serialize};

use crate::back_navigation::BackNavigation;
use crate::capability::CapabilityBindings;
use crate::keyboard::{KeyboardObserver, KeyboardState};
use crate::lifecycle::LifecycleObserver;
use crate::network::NetworkObserver;
use crate::safe_area::{SafeAreaInsets, SafeAreaObserver};

/// Point-in-time copy of everything [`MobileUtils`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileUtilsSnapshot {
    pub is_native: bool,
    pub is_ios: bool,
    pub is_android: bool,
    pub platform: OperatingSystem,
    pub keyboard: KeyboardState,
    pub network: NetworkStatus,
    pub safe_area: SafeAreaInsets,
}

#[derive(Clone)]
pub struct MobileUtils {
    pub capabilities: CapabilityBindings,
    pub network: NetworkObserver,
    pub keyboard: KeyboardObserver,
    pub lifecycle: LifecycleObserver,
    pub safe_area: SafeAreaObserver,
    pub back_navigation: BackNavigation,
}

impl MobileUtils {
    /// Build every observer over the given bindings. Nothing is probed until
    /// the first subscription.
    pub fn new(capabilities: CapabilityBindings, web: Arc<dyn WebHost>) -> Self {
        Self {
            network: NetworkObserver::from_bindings(&capabilities, Arc::clone(&web)),
            keyboard: KeyboardObserver::from_bindings(&capabilities),
            lifecycle: LifecycleObserver::from_bindings(&capabilities),
            safe_area: SafeAreaObserver::from_web(web),
            back_navigation: BackNavigation::from_bindings(&capabilities),
            capabilities,
        }
    }

    pub fn facts(&self) -> PlatformFacts {
        self.capabilities.facts()
    }

    pub fn snapshot(&self) -> MobileUtilsSnapshot {
        let facts = self.facts();
        MobileUtilsSnapshot {
            is_native: facts.is_native(),
            is_ios: facts.is_ios(),
            is_android: facts.is_android(),
            platform: facts.os(),
            keyboard: self.keyboard.current(),
            network: self.network.current(),
            safe_area: self.safe_area.current(),
        }
    }

    pub async fn impact(&self, style: ImpactStyle) {
        self.capabilities.impact(style).await;
    }

    pub async fn notification(&self, kind: NotificationKind) {
        self.capabilities.notification(kind).await;
    }

    pub async fn hide_keyboard(&self) {
        self.capabilities.hide_keyboard().await;
    }
}

impl std::fmt::Debug for MobileUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileUtils")
            .field("capabilities", &self.capabilities)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityHandle;
    use crate::safe_area::INSET_TOP;
    use crate::testing::{FakeKeyboard, FakeWebHost};
    use bridge_traits::KeyboardEvent;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_web_snapshot() {
        let host = Arc::new(FakeWebHost::default());
        host.set_css(INSET_TOP, "20px");
        let utils = MobileUtils::new(CapabilityBindings::absent(PlatformFacts::WEB), host);

        let _network = utils.network.subscribe(|_| {}).await;
        let _insets = utils.safe_area.subscribe(|_| {}).await;

        let snapshot = utils.snapshot();
        assert!(!snapshot.is_native);
        assert_eq!(snapshot.platform, OperatingSystem::Web);
        assert!(snapshot.network.connected);
        assert_eq!(snapshot.safe_area.top, 20);
        assert_eq!(snapshot.keyboard, KeyboardState::default());
    }

    #[tokio::test]
    async fn test_native_snapshot_tracks_keyboard() {
        let keyboard = Arc::new(FakeKeyboard::default());
        let mut bindings = CapabilityBindings::absent(PlatformFacts::IOS);
        bindings.keyboard = CapabilityHandle::Present(keyboard.clone());
        let utils = MobileUtils::new(bindings, Arc::new(FakeWebHost::default()));

        let _sub = utils.keyboard.subscribe(|_| {}).await;
        keyboard.listeners.fire(KeyboardEvent::WillShow {
            keyboard_height: 300,
        });

        let snapshot = utils.snapshot();
        assert!(snapshot.is_ios);
        assert_eq!(snapshot.keyboard.height_px, 300);

        utils.hide_keyboard().await;
        assert_eq!(keyboard.hidden.load(Ordering::SeqCst), 1);
    }
}
