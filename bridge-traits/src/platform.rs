//! Platform identity and the thread-safety helpers shared by every bridge.
//!
//! Native targets require `Send + Sync` so bridge implementations can be
//! shared across async tasks. WebAssembly builds run on the browser's single
//! thread where `web_sys` handles are neither, so the marker traits below make
//! those bounds conditional without duplicating each trait definition.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Marker trait equivalent to `Send` on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSend for T where T: Send {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSend {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSend for T {}

/// Callback signature used for every event delivered by a bridge.
#[cfg(not(target_arch = "wasm32"))]
pub type DynCallback<E> = dyn Fn(E) + Send + Sync;

#[cfg(target_arch = "wasm32")]
pub type DynCallback<E> = dyn Fn(E);

/// Shared event callback handed to native modules and web hosts.
pub type EventCallback<E> = Arc<DynCallback<E>>;

/// Operating system the application shell runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Ios,
    Android,
    Web,
}

impl OperatingSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Ios => "ios",
            OperatingSystem::Android => "android",
            OperatingSystem::Web => "web",
        }
    }

    /// Parse the platform name reported by a native shell.
    pub fn from_platform_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ios" => Some(OperatingSystem::Ios),
            "android" => Some(OperatingSystem::Android),
            "web" => Some(OperatingSystem::Web),
            _ => None,
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of the runtime environment.
///
/// `is_native` is derived from `os`, so a value can never claim to be a native
/// shell while reporting the web platform (or the reverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformFacts {
    is_native: bool,
    os: OperatingSystem,
}

impl PlatformFacts {
    pub const WEB: PlatformFacts = PlatformFacts {
        is_native: false,
        os: OperatingSystem::Web,
    };

    pub const IOS: PlatformFacts = PlatformFacts {
        is_native: true,
        os: OperatingSystem::Ios,
    };

    pub const ANDROID: PlatformFacts = PlatformFacts {
        is_native: true,
        os: OperatingSystem::Android,
    };

    pub fn from_os(os: OperatingSystem) -> Self {
        match os {
            OperatingSystem::Ios => Self::IOS,
            OperatingSystem::Android => Self::ANDROID,
            OperatingSystem::Web => Self::WEB,
        }
    }

    pub fn is_native(&self) -> bool {
        self.is_native
    }

    pub fn os(&self) -> OperatingSystem {
        self.os
    }

    pub fn is_ios(&self) -> bool {
        self.os == OperatingSystem::Ios
    }

    pub fn is_android(&self) -> bool {
        self.os == OperatingSystem::Android
    }

    pub fn is_web(&self) -> bool {
        self.os == OperatingSystem::Web
    }

    /// Platform name as reported to the backend and in logs.
    pub fn name(&self) -> &'static str {
        self.os.as_str()
    }

    /// Value of the `X-Platform` request header.
    pub fn platform_header(&self) -> &'static str {
        if self.is_native {
            "mobile"
        } else {
            "web"
        }
    }
}

impl Default for PlatformFacts {
    fn default() -> Self {
        Self::WEB
    }
}

/// Probe into the host environment telling whether the code runs inside the
/// packaged native shell.
///
/// Both queries may fail, for example when the shell's bridge module is not
/// installed in a pure web build. Callers treat failure as "web".
pub trait NativeShell: PlatformSendSync {
    /// Whether the application runs inside the native shell.
    fn is_native_platform(&self) -> Result<bool>;

    /// Platform name reported by the shell (`ios`, `android` or `web`).
    fn platform_name(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_derive_native_flag_from_os() {
        assert!(!PlatformFacts::from_os(OperatingSystem::Web).is_native());
        assert!(PlatformFacts::from_os(OperatingSystem::Ios).is_native());
        assert!(PlatformFacts::from_os(OperatingSystem::Android).is_android());
        assert_eq!(PlatformFacts::default(), PlatformFacts::WEB);
    }

    #[test]
    fn test_platform_header() {
        assert_eq!(PlatformFacts::IOS.platform_header(), "mobile");
        assert_eq!(PlatformFacts::ANDROID.platform_header(), "mobile");
        assert_eq!(PlatformFacts::WEB.platform_header(), "web");
    }

    #[test]
    fn test_parse_platform_name() {
        assert_eq!(
            OperatingSystem::from_platform_name("Android"),
            Some(OperatingSystem::Android)
        );
        assert_eq!(
            OperatingSystem::from_platform_name(" ios "),
            Some(OperatingSystem::Ios)
        );
        assert_eq!(OperatingSystem::from_platform_name("electron"), None);
    }

    #[test]
    fn test_facts_serialize() {
        let json = serde_json::to_string(&PlatformFacts::ANDROID).unwrap();
        assert_eq!(json, r#"{"is_native":true,"os":"android"}"#);
    }
}
