//! Safe-area insets observer.
//!
//! Insets come from the `--safe-area-inset-*` CSS custom properties the page
//! defines from `env(safe-area-inset-*)`. They are read on the first
//! subscription and again after every viewport resize, on every platform.

use std::sync::Arc;

use bridge_traits::{EventCallback, ListenerHandle, WebHost, WindowEvent};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::observer::{Emitter, Observer, ObserverSource};

pub const INSET_TOP: &str = "--safe-area-inset-top";
pub const INSET_BOTTOM: &str = "--safe-area-inset-bottom";
pub const INSET_LEFT: &str = "--safe-area-inset-left";
pub const INSET_RIGHT: &str = "--safe-area-inset-right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafeAreaInsets {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl SafeAreaInsets {
    /// Read all four insets; missing or unparsable sides are 0.
    pub fn read(web: &dyn WebHost) -> Self {
        let side = |name: &str| parse_css_px(web.css_custom_property(name).as_deref());
        Self {
            top: side(INSET_TOP),
            bottom: side(INSET_BOTTOM),
            left: side(INSET_LEFT),
            right: side(INSET_RIGHT),
        }
    }
}

/// Integer prefix of a CSS length: `" 44px"` is 44, `"12.5px"` is 12 and
/// anything without leading digits is 0.
pub fn parse_css_px(value: Option<&str>) -> i32 {
    let Some(value) = value else {
        return 0;
    };

    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i32::from(digit - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

pub struct SafeAreaSource {
    web: Arc<dyn WebHost>,
}

impl SafeAreaSource {
    pub fn new(web: Arc<dyn WebHost>) -> Self {
        Self { web }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ObserverSource for SafeAreaSource {
    type Value = SafeAreaInsets;

    fn name(&self) -> &'static str {
        "safe-area"
    }

    fn initial(&self) -> SafeAreaInsets {
        SafeAreaInsets::default()
    }

    async fn probe(&self) -> Option<SafeAreaInsets> {
        Some(SafeAreaInsets::read(self.web.as_ref()))
    }

    fn attach(&self, emitter: Emitter<SafeAreaInsets>) -> Vec<Box<dyn ListenerHandle>> {
        let web = Arc::clone(&self.web);
        let callback: EventCallback<()> =
            Arc::new(move |()| emitter.emit(SafeAreaInsets::read(web.as_ref())));

        match self.web.add_window_listener(WindowEvent::Resize, callback) {
            Ok(handle) => vec![handle],
            Err(e) => {
                warn!(error = %e, "Registering resize listener failed");
                Vec::new()
            }
        }
    }
}

pub type SafeAreaObserver = Observer<SafeAreaSource>;

impl Observer<SafeAreaSource> {
    pub fn from_web(web: Arc<dyn WebHost>) -> Self {
        Observer::new(SafeAreaSource::new(web))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWebHost;

    #[test]
    fn test_parse_css_px() {
        assert_eq!(parse_css_px(None), 0);
        assert_eq!(parse_css_px(Some("")), 0);
        assert_eq!(parse_css_px(Some("44")), 44);
        assert_eq!(parse_css_px(Some(" 44px")), 44);
        assert_eq!(parse_css_px(Some("12.5px")), 12);
        assert_eq!(parse_css_px(Some("-3px")), -3);
        assert_eq!(parse_css_px(Some("+8")), 8);
        assert_eq!(parse_css_px(Some("abc")), 0);
        assert_eq!(parse_css_px(Some("px44")), 0);
    }

    #[tokio::test]
    async fn test_unset_properties_are_zero() {
        let observer = SafeAreaObserver::from_web(Arc::new(FakeWebHost::default()));
        let _sub = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current(), SafeAreaInsets::default());
    }

    #[tokio::test]
    async fn test_probe_and_resize() {
        let host = Arc::new(FakeWebHost::default());
        host.set_css(INSET_TOP, "44");
        let observer = SafeAreaObserver::from_web(host.clone());
        let _sub = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current().top, 44);
        assert_eq!(observer.current().bottom, 0);

        host.set_css(INSET_BOTTOM, "34px");
        host.resize.fire(());

        assert_eq!(
            observer.current(),
            SafeAreaInsets {
                top: 44,
                bottom: 34,
                left: 0,
                right: 0
            }
        );
    }
}
