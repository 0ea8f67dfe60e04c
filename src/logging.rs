//! Logging setup for autowire
//!
//! Every event the container emits uses the `autowire` target: `debug` for
//! registrations, container creation, singleton caching and failed
//! resolutions, `trace` for each resolution step.
//!
//! The helpers here install a `tracing-subscriber` for applications that
//! don't already have one.
//!
//! # Features
//!
//! - `logging` - Emit events (default)
//! - `logging-json` - JSON structured output
//! - `logging-pretty` - Multi-line human-readable output
//!
//! # Example
//!
//! ```rust,ignore
//! use autowire::logging;
//!
//! logging::init();
//!
//! logging::builder()
//!     .trace()
//!     .autowire_only()
//!     .pretty()
//!     .init();
//! ```
//!
//! Initialization happens at most once per process; later calls return
//! `false` and leave the installed subscriber alone.

use tracing::Level;

#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
use once_cell::sync::OnceCell;

/// Target used by every event this crate emits.
pub const TARGET: &str = "autowire";

#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
static INSTALLED: OnceCell<()> = OnceCell::new();

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON, one object per line
    #[default]
    Json,
    /// Multi-line, colored
    Pretty,
    /// Single line
    Compact,
}

/// Builder for a subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::default(),
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level to record
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Only record events from `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only record this crate's events
    pub fn autowire_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// `EnvFilter` directive for the configured level and target.
    fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber as the global default.
    ///
    /// Returns `true` if this call installed it; `false` if this module
    /// already did, or another global subscriber was already set.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) -> bool {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

        let mut installed = false;
        INSTALLED.get_or_init(|| {
            let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
                #[cfg(feature = "logging-json")]
                LogFormat::Json => fmt::layer()
                    .json()
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
                    .with_thread_ids(self.with_thread_ids)
                    .boxed(),
                #[cfg(not(feature = "logging-json"))]
                LogFormat::Json => fmt::layer()
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
                    .with_thread_ids(self.with_thread_ids)
                    .boxed(),
                LogFormat::Pretty => fmt::layer()
                    .pretty()
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
                    .with_thread_ids(self.with_thread_ids)
                    .boxed(),
                LogFormat::Compact => fmt::layer()
                    .compact()
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
                    .with_thread_ids(self.with_thread_ids)
                    .boxed(),
            };

            installed = tracing_subscriber::registry()
                .with(layer)
                .with(EnvFilter::new(self.directive()))
                .try_init()
                .is_ok();
        });
        installed
    }

    /// No subscriber backend compiled in.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) -> bool {
        false
    }
}

pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// JSON when `logging-json` is on, otherwise pretty.
pub fn init() -> bool {
    if cfg!(feature = "logging-json") {
        init_json()
    } else {
        init_pretty()
    }
}

pub fn init_json() -> bool {
    builder().json().init()
}

pub fn init_pretty() -> bool {
    builder().pretty().init()
}

/// Record only this crate's events, at trace level.
pub fn init_autowire_only() -> bool {
    builder().autowire_only().trace().init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert!(builder.target.is_none());
        assert_eq!(builder.directive(), "DEBUG");
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::new()
            .trace()
            .pretty()
            .with_file()
            .with_line_number()
            .autowire_only();

        assert_eq!(builder.level, Level::TRACE);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert!(builder.with_file);
        assert!(builder.with_line_number);
        assert_eq!(builder.target, Some(TARGET));
        assert_eq!(builder.directive(), "autowire=TRACE");
    }

    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    #[test]
    fn test_init_is_idempotent() {
        builder().compact().init();
        assert!(!builder().json().init());
        assert!(!init());
    }

    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    #[test]
    fn test_init_without_backend() {
        assert!(!init());
    }
}
