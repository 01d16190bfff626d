//! # Logging & Tracing Infrastructure
//!
//! Structured logging on top of `tracing`:
//! - pretty, JSON and compact output formats
//! - per-crate filtering through `EnvFilter`
//! - redaction of credential-like fields
//! - mirroring of events into a host [`LoggerSink`]
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(LogLevel::Debug)
//!     .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! tracing::info!("Catalog runtime starting");
//! ```
//!
//! On `wasm32` [`init_logging`] is a no-op; the browser build relies on the
//! host console.

use std::sync::Arc;

use bridge_traits::time::{LogLevel, LoggerSink};

#[cfg(target_arch = "wasm32")]
use crate::error::Result;

#[cfg(not(target_arch = "wasm32"))]
pub use native::init_logging;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One JSON object per event
    Json,
    /// Single-line output
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Logging configuration
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Minimum level for the workspace crates
    pub level: LogLevel,
    /// Redact credential-like fields before they reach the host sink
    pub redact_pii: bool,
    /// Custom filter directive, replacing the default per-crate filter
    pub filter: Option<String>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    pub enable_spans: bool,
    pub display_target: bool,
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            redact_pii: true,
            filter: None,
            logger_sink: None,
            enable_spans: true,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl std::fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("redact_pii", &self.redact_pii)
            .field("filter", &self.filter)
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("enable_spans", &self.enable_spans)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_pii_redaction(mut self, redact: bool) -> Self {
        self.redact_pii = redact;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialize logging for the browser build.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(_config: LoggingConfig) -> Result<()> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::HashMap;
    use std::fmt;
    use std::io;
    use std::sync::Arc;

    use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::{
        filter::EnvFilter,
        fmt::format::FmtSpan,
        layer::{Context, SubscriberExt},
        registry::LookupSpan,
        util::SubscriberInitExt,
        Layer, Registry,
    };

    use super::{redact_if_sensitive, LogFormat, LoggingConfig};
    use crate::error::{Error, Result};

    const WORKSPACE_CRATES: &[&str] = &[
        "bridge_traits",
        "bridge_native",
        "core_runtime",
        "core_platform",
        "core_http",
        "core_service",
    ];

    /// Initialize the global subscriber.
    ///
    /// Call once at startup; a second call fails with [`Error::Config`].
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        let filter = build_filter(&config)?;
        let fmt_layer = build_fmt_layer(&config);
        let sink_layer = LoggerSinkLayer::new(config.logger_sink.clone(), config.redact_pii);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter)
            .with(sink_layer)
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
    }

    pub(super) fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
        let filter_string = match &config.filter {
            Some(custom) => custom.clone(),
            None => {
                let level = config.level.as_str();
                let mut directives: Vec<String> = WORKSPACE_CRATES
                    .iter()
                    .map(|name| format!("{}={}", name, level))
                    .collect();
                directives.extend(
                    ["h2=warn", "hyper=warn", "reqwest=warn", "rustls=warn"]
                        .iter()
                        .map(|d| d.to_string()),
                );
                directives.join(",")
            }
        };

        EnvFilter::try_new(filter_string)
            .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
    }

    fn build_fmt_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = tracing_subscriber::fmt::layer()
            .with_target(config.display_target)
            .with_thread_ids(config.display_thread_info)
            .with_thread_names(config.display_thread_info)
            .with_writer(io::stdout);

        match config.format {
            LogFormat::Pretty => base
                .pretty()
                .with_span_events(if config.enable_spans {
                    FmtSpan::ACTIVE
                } else {
                    FmtSpan::NONE
                })
                .boxed(),
            LogFormat::Json => base
                .json()
                .flatten_event(true)
                .with_current_span(config.enable_spans)
                .with_span_list(config.enable_spans)
                .boxed(),
            LogFormat::Compact => base.compact().boxed(),
        }
    }

    /// Layer mirroring events into a host [`LoggerSink`].
    pub(super) struct LoggerSinkLayer {
        sink: Option<Arc<dyn LoggerSink>>,
        redact: bool,
    }

    impl LoggerSinkLayer {
        pub(super) fn new(sink: Option<Arc<dyn LoggerSink>>, redact: bool) -> Self {
            Self { sink, redact }
        }
    }

    impl<S> Layer<S> for LoggerSinkLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let Some(sink) = self.sink.as_ref() else {
                return;
            };

            let metadata = event.metadata();
            let level = tracing_level_to_log_level(*metadata.level());
            if level < sink.min_level() {
                return;
            }

            let mut visitor = SinkVisitor::default();
            event.record(&mut visitor);

            let message = visitor
                .message
                .unwrap_or_else(|| metadata.name().to_string());
            let mut entry = LogEntry::new(level, metadata.target(), message);

            for (key, value) in visitor.fields {
                let value = if self.redact {
                    redact_if_sensitive(&key, &value)
                } else {
                    value
                };
                entry = entry.with_field(key, value);
            }

            if let Some(span) = ctx.lookup_current() {
                entry = entry.with_span(span.name());
            }

            let sink = Arc::clone(sink);
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(err) = sink.log(entry).await {
                        eprintln!("LoggerSink error: {}", err);
                    }
                });
                return;
            }

            if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                eprintln!("LoggerSink error: {}", err);
            }
        }
    }

    #[derive(Default)]
    struct SinkVisitor {
        message: Option<String>,
        fields: HashMap<String, String>,
    }

    impl SinkVisitor {
        fn record_value(&mut self, field: &Field, value: String) {
            if field.name() == "message" {
                self.message = Some(value);
            } else {
                self.fields.insert(field.name().to_string(), value);
            }
        }
    }

    impl Visit for SinkVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.record_value(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.record_value(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.record_value(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.record_value(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.record_value(field, value.to_string());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.record_value(field, value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.record_value(field, format!("{:?}", value));
        }
    }

    fn tracing_level_to_log_level(level: tracing::Level) -> LogLevel {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// Redact a field value when its name or shape looks like a credential.
///
/// ```ignore
/// use core_runtime::logging::redact_if_sensitive;
///
/// tracing::debug!(authorization = %redact_if_sensitive("authorization", header), "Sending");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SENSITIVE_FIELDS: &[&str] = &[
        "token",
        "password",
        "secret",
        "api_key",
        "authorization",
        "bearer",
        "cookie",
    ];

    let field_lower = field_name.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|&f| field_lower.contains(f)) {
        return "[REDACTED]".to_string();
    }

    if value
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "))
    {
        return "Bearer [REDACTED]".to_string();
    }

    match value.find('@') {
        Some(at_pos) if value[at_pos..].contains('.') => {
            format!("{}***@[REDACTED]", &value[..1.min(at_pos)])
        }
        _ => value.to_string(),
    }
}

/// Reduce a file path to its base name.
///
/// Used when logging upload file names so local directory layouts stay out
/// of the logs.
pub fn strip_path(path: &str) -> &str {
    let unix = path.rsplit('/').next().unwrap_or(path);
    unix.rsplit('\\').next().unwrap_or(unix)
}
