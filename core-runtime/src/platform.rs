//! Platform resolution.
//!
//! The runtime asks the host once whether it runs inside the native shell and
//! caches the answer for the lifetime of the [`PlatformInfo`]. A missing shell
//! or a failing probe is the normal shape of a pure web build, so both resolve
//! to [`PlatformFacts::WEB`] instead of an error.

use std::sync::{Arc, OnceLock};

use bridge_traits::{NativeShell, OperatingSystem, PlatformFacts};
use tracing::{debug, info, warn};

/// Resolve-once platform facts.
pub struct PlatformInfo {
    shell: Option<Arc<dyn NativeShell>>,
    facts: OnceLock<PlatformFacts>,
}

impl PlatformInfo {
    /// Resolve against the given native shell probe.
    pub fn new(shell: Arc<dyn NativeShell>) -> Self {
        Self {
            shell: Some(shell),
            facts: OnceLock::new(),
        }
    }

    /// Platform info for a build without any native shell bridge.
    pub fn without_shell() -> Self {
        Self {
            shell: None,
            facts: OnceLock::new(),
        }
    }

    /// Platform facts, probing the shell on the first call only.
    pub fn resolve(&self) -> PlatformFacts {
        *self.facts.get_or_init(|| {
            let facts = detect(self.shell.as_deref());
            info!(
                platform = facts.name(),
                is_native = facts.is_native(),
                "Platform resolved"
            );
            facts
        })
    }
}

impl std::fmt::Debug for PlatformInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformInfo")
            .field("shell", &self.shell.as_ref().map(|_| "NativeShell { ... }"))
            .field("facts", &self.facts.get())
            .finish()
    }
}

/// One-shot platform detection. Never fails.
pub fn detect(shell: Option<&dyn NativeShell>) -> PlatformFacts {
    let Some(shell) = shell else {
        debug!("No native shell bridge installed, assuming web");
        return PlatformFacts::WEB;
    };

    match shell.is_native_platform() {
        Ok(true) => {}
        Ok(false) => return PlatformFacts::WEB,
        Err(e) => {
            debug!(error = %e, "Native shell probe failed, assuming web");
            return PlatformFacts::WEB;
        }
    }

    match shell.platform_name() {
        Ok(name) => match OperatingSystem::from_platform_name(&name) {
            Some(OperatingSystem::Web) | None => {
                warn!(platform = %name, "Native shell reported an unsupported platform, assuming web");
                PlatformFacts::WEB
            }
            Some(os) => PlatformFacts::from_os(os),
        },
        Err(e) => {
            warn!(error = %e, "Native shell did not report a platform name, assuming web");
            PlatformFacts::WEB
        }
    }
}
