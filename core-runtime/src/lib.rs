//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the catalog client:
//! - Platform resolution ([`platform::PlatformInfo`])
//! - Configuration management
//! - Event bus
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! Every other crate receives the resolved [`bridge_traits::PlatformFacts`]
//! and the [`config::AppConfig`] from here instead of re-deriving platform
//! flags on its own.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod platform;

pub use error::{Error, Result};
pub use platform::PlatformInfo;
