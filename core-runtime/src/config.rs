//! # Application Configuration
//!
//! Platform-dependent settings for the catalog client.
//!
//! ## Overview
//!
//! [`AppConfig`] is assembled by [`AppConfigBuilder`] from three layers, in
//! increasing precedence:
//!
//! 1. Platform defaults derived from the resolved [`PlatformFacts`]
//! 2. The `CATALOG_API_URL` environment variable (API base URL only)
//! 3. Values set explicitly on the builder
//!
//! Validation runs in [`AppConfigBuilder::build`] and fails fast with
//! [`Error::Config`].
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::PlatformFacts;
//! use core_runtime::config::AppConfig;
//! use std::time::Duration;
//!
//! let config = AppConfig::builder()
//!     .api_base_url("https://catalog.example.com/api")
//!     .request_timeout(Duration::from_secs(15))
//!     .build(PlatformFacts::ANDROID)
//!     .expect("valid configuration");
//!
//! assert_eq!(config.items_per_page, 20);
//! ```

use std::time::Duration;

use bridge_traits::PlatformFacts;
use url::Url;

use crate::error::{Error, Result};

/// API base URL used inside the native shell.
pub const NATIVE_API_BASE_URL: &str = "https://your-server-domain.com/api";

/// API base URL used by the web build during development.
pub const WEB_API_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CATALOG_API_URL";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_STATUS_BAR_COLOR: &str = "#000000";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL relative request paths are joined onto
    pub api_base_url: String,

    /// Fixed per-request timeout
    pub request_timeout: Duration,

    /// Page size for catalog listings
    pub items_per_page: u32,

    /// Whether UI animations are enabled
    pub enable_animations: bool,

    /// Image quality in percent (1-100)
    pub image_quality: u8,

    /// Lifetime of cached listing data
    pub cache_ttl: Duration,

    /// Android status bar background colour (`#RRGGBB`)
    pub status_bar_color: String,

    pub features: FeatureFlags,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Platform defaults without any environment or builder overrides.
    pub fn defaults_for(facts: PlatformFacts) -> Self {
        let native = facts.is_native();
        Self {
            api_base_url: if native {
                NATIVE_API_BASE_URL
            } else {
                WEB_API_BASE_URL
            }
            .to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            items_per_page: if native { 20 } else { 50 },
            enable_animations: !native,
            image_quality: if native { 75 } else { 90 },
            cache_ttl: DEFAULT_CACHE_TTL,
            status_bar_color: DEFAULT_STATUS_BAR_COLOR.to_string(),
            features: FeatureFlags::for_platform(facts),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.items_per_page == 0 {
            return Err(Error::Config(
                "Items per page must be greater than zero".to_string(),
            ));
        }

        if !(1..=100).contains(&self.image_quality) {
            return Err(Error::Config(format!(
                "Image quality must be between 1 and 100, got {}",
                self.image_quality
            )));
        }

        if !is_hex_color(&self.status_bar_color) {
            return Err(Error::Config(format!(
                "Status bar color must be a #RRGGBB value, got '{}'",
                self.status_bar_color
            )));
        }

        Ok(())
    }
}

/// Features that only make sense inside the native shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub camera: bool,
    pub push_notifications: bool,
    pub offline_mode: bool,
    pub file_system: bool,
}

impl FeatureFlags {
    /// All features on inside the native shell, all off on the web.
    pub fn for_platform(facts: PlatformFacts) -> Self {
        let native = facts.is_native();
        Self {
            camera: native,
            push_notifications: native,
            offline_mode: native,
            file_system: native,
        }
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Default, Clone)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    items_per_page: Option<u32>,
    enable_animations: Option<bool>,
    image_quality: Option<u8>,
    cache_ttl: Option<Duration>,
    status_bar_color: Option<String>,
    features: Option<FeatureFlags>,
    ignore_environment: bool,
}

impl AppConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = Some(items);
        self
    }

    pub fn enable_animations(mut self, enabled: bool) -> Self {
        self.enable_animations = Some(enabled);
        self
    }

    pub fn image_quality(mut self, quality: u8) -> Self {
        self.image_quality = Some(quality);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn status_bar_color(mut self, color: impl Into<String>) -> Self {
        self.status_bar_color = Some(color.into());
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = Some(features);
        self
    }

    /// Skip the `CATALOG_API_URL` lookup. Tests use this to stay independent
    /// of the process environment.
    pub fn ignore_environment(mut self) -> Self {
        self.ignore_environment = true;
        self
    }

    /// Build and validate the configuration for the given platform.
    pub fn build(self, facts: PlatformFacts) -> Result<AppConfig> {
        let mut config = AppConfig::defaults_for(facts);

        if !self.ignore_environment {
            if let Some(url) = env_api_url() {
                config.api_base_url = url;
            }
        }

        if let Some(url) = self.api_base_url {
            config.api_base_url = url;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(items) = self.items_per_page {
            config.items_per_page = items;
        }
        if let Some(enabled) = self.enable_animations {
            config.enable_animations = enabled;
        }
        if let Some(quality) = self.image_quality {
            config.image_quality = quality;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl = ttl;
        }
        if let Some(color) = self.status_bar_color {
            config.status_bar_color = color;
        }
        if let Some(features) = self.features {
            config.features = features;
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_api_url() -> Option<String> {
    std::env::var(API_URL_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
