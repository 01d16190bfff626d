//! Integration tests for the logging helpers

use bridge_traits::time::LogLevel;
use core_runtime::logging::{redact_if_sensitive, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_credentials_are_redacted() {
    assert_eq!(redact_if_sensitive("auth_token", "abc.def"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("value", "bearer abc"),
        "Bearer [REDACTED]"
    );
}

#[test]
fn test_emails_are_partially_redacted() {
    let redacted = redact_if_sensitive("email", "ayse@example.com");
    assert!(redacted.starts_with('a'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_plain_values_pass_through() {
    assert_eq!(redact_if_sensitive("item_id", "12345"), "12345");
    assert_eq!(redact_if_sensitive("platform", "android"), "android");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/storage/emulated/0/DCIM/photo.jpg"), "photo.jpg");
    assert_eq!(strip_path("D:\\uploads\\photo.jpg"), "photo.jpg");
    assert_eq!(strip_path("photo.jpg"), "photo.jpg");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    let config = LoggingConfig::default();
    if cfg!(debug_assertions) {
        assert_eq!(config.format, LogFormat::Pretty);
    } else {
        assert_eq!(config.format, LogFormat::Json);
    }
}
