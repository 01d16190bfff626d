//! # Platform Capability Layer
//!
//! One surface over the browser and the packaged mobile shell, so
//! application code never branches on the platform at the call site.
//!
//! ## Overview
//!
//! - [`capability`] - lazy, fallible native bindings (`Present` / `Absent`)
//! - [`observer`] - shared subscribe/probe/detach machinery
//! - [`network`], [`lifecycle`], [`keyboard`], [`back_navigation`],
//!   [`safe_area`] - the concrete observers
//! - [`utils`] - aggregate snapshot for UI code
//!
//! Capability failures never surface as errors. A module that cannot be bound
//! is logged once and stays [`CapabilityHandle::Absent`]; observers fall back
//! to their web substitutes.

pub mod back_navigation;
pub mod capability;
pub mod keyboard;
pub mod lifecycle;
pub mod network;
pub mod observer;
pub mod safe_area;
pub mod utils;

#[cfg(test)]
mod testing;

pub use back_navigation::BackNavigation;
pub use capability::{acquire, CapabilityBindings, CapabilityHandle};
pub use keyboard::{KeyboardObserver, KeyboardState};
pub use lifecycle::LifecycleObserver;
pub use network::NetworkObserver;
pub use observer::{Emitter, Observer, ObserverPhase, ObserverSource, Subscription};
pub use safe_area::{parse_css_px, SafeAreaInsets, SafeAreaObserver};
pub use utils::{MobileUtils, MobileUtilsSnapshot};
