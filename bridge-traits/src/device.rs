//! Device Feedback and Chrome Bridges
//!
//! Haptic feedback and status bar control. Both are fire-and-forget calls
//! into the native shell.

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Strength of an impact vibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactStyle {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl ImpactStyle {
    /// Parse a style name, falling back to `Medium` for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => ImpactStyle::Light,
            "heavy" => ImpactStyle::Heavy,
            _ => ImpactStyle::Medium,
        }
    }
}

/// Notification-style vibration pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Parse a kind name, falling back to `Success` for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "warning" => NotificationKind::Warning,
            "error" => NotificationKind::Error,
            _ => NotificationKind::Success,
        }
    }
}

/// Status bar style, named after the background it suits as the shell does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    /// Dark text for light backgrounds
    #[default]
    Light,
    /// Light text for dark backgrounds
    Dark,
}

impl StatusBarStyle {
    /// Name understood by the shell's status bar plugin.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBarStyle::Light => "LIGHT",
            StatusBarStyle::Dark => "DARK",
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait HapticsModule: PlatformSendSync {
    async fn impact(&self, style: ImpactStyle) -> Result<()>;

    async fn notification(&self, kind: NotificationKind) -> Result<()>;
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait StatusBarModule: PlatformSendSync {
    async fn set_style(&self, style: StatusBarStyle) -> Result<()>;

    /// Set the bar background colour (Android only), e.g. `#000000`
    async fn set_background_color(&self, color: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_style_fallback() {
        assert_eq!(ImpactStyle::from_name("light"), ImpactStyle::Light);
        assert_eq!(ImpactStyle::from_name("heavy"), ImpactStyle::Heavy);
        assert_eq!(ImpactStyle::from_name("bogus"), ImpactStyle::Medium);
    }

    #[test]
    fn test_status_bar_style_wire_names() {
        assert_eq!(StatusBarStyle::default().as_str(), "LIGHT");
        assert_eq!(StatusBarStyle::Dark.as_str(), "DARK");
    }

    #[test]
    fn test_notification_kind_fallback() {
        assert_eq!(NotificationKind::from_name("error"), NotificationKind::Error);
        assert_eq!(
            NotificationKind::from_name("unknown"),
            NotificationKind::Success
        );
    }
}
