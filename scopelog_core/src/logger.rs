//! The logger handle and its field-carrying scopes.
//!
//! A [`Logger`] owns the wired destination and the base service fields.
//! It is built once by the process entry point and shared by cloning;
//! clones write to the same sinks. A [`ScopedLogger`] pairs a logger with
//! the fields accumulated for one logical context (trace id, function
//! name, custom payload) and is what gets bound into a [`crate::Context`].

use crate::config::LoggerConfig;
use crate::fields::FieldSet;
use crate::record::{self, Level};
use crate::router::{Destination, Route};
use crate::sink::{ConsoleSink, LogSink};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// Shared handle to one configured output destination
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: LoggerConfig,
    fields: FieldSet,
    destination: Destination,
}

impl Logger {
    /// Build a logger writing to standard output and/or the rotating file
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Console logger for the synthesized "unknown" service
    pub(crate) fn fallback() -> Self {
        let config = LoggerConfig::unknown_service();
        let destination = Destination::console(Arc::new(ConsoleSink), config.console_color);
        let fields = FieldSet::service(&config.service_name, &config.service_version);

        Logger {
            inner: Arc::new(Inner {
                config,
                fields,
                destination,
            }),
        }
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            console: None,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    pub fn destination(&self) -> &Destination {
        &self.inner.destination
    }

    /// Service name and version
    pub fn base_fields(&self) -> &FieldSet {
        &self.inner.fields
    }

    /// A scope carrying only the base fields
    pub fn scoped(&self) -> ScopedLogger {
        ScopedLogger {
            logger: self.clone(),
            fields: self.inner.fields.clone(),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.config.level
    }

    /// True when both handles share one destination
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render and write one record; failures are reported, not returned
    fn emit(&self, level: Level, message: &str, fields: &FieldSet) {
        if !self.enabled(level) {
            return;
        }

        let line = match record::render(level, message, fields) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to render log record: {}", e);
                return;
            }
        };

        if let Err(e) = self.inner.destination.write(level, &line) {
            tracing::warn!(
                "Failed to write log record for {}: {}",
                self.inner.config.service_name,
                e
            );
        }
    }
}

/// Builder for [`Logger`] allowing the console sink to be replaced
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<Arc<dyn LogSink>>,
}

impl LoggerBuilder {
    /// Send console-routed records to `sink` instead of standard output
    pub fn console(mut self, sink: impl LogSink + 'static) -> Self {
        self.console = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;

        let route = Route::for_environment(self.config.environment);
        let console = self
            .console
            .unwrap_or_else(|| Arc::new(ConsoleSink) as Arc<dyn LogSink>);
        let destination = Destination::open(
            route,
            &self.config.rotation,
            console,
            self.config.console_color,
        )?;
        let fields = FieldSet::service(&self.config.service_name, &self.config.service_version);

        tracing::debug!(
            "Built logger for {} {} routed to {:?}",
            self.config.service_name,
            self.config.service_version,
            route
        );

        Ok(Logger {
            inner: Arc::new(Inner {
                config: self.config,
                fields,
                destination,
            }),
        })
    }
}

/// A logger together with the fields of one logical context
#[derive(Clone, Debug)]
pub struct ScopedLogger {
    logger: Logger,
    fields: FieldSet,
}

impl ScopedLogger {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            logger: self.logger.clone(),
            fields: self.fields.with_field(key, value),
        }
    }

    pub fn with_fields<K, V, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            logger: self.logger.clone(),
            fields: self.fields.with_fields(fields),
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        self.logger.emit(level, message, &self.fields);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::sink::MemorySink;
    use crate::Error;

    fn local_logger(console: &MemorySink) -> Logger {
        let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Local);
        Logger::builder(config).console(console.clone()).build().unwrap()
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_scoped_record_carries_fields() {
        let console = MemorySink::new();
        let logger = local_logger(&console);

        logger.scoped().with_field("trace_id", "T1").info("hello");

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        let record = parse(&lines[0]);
        assert_eq!(record["service_name"], "svc");
        assert_eq!(record["service_version"], "1.0.0");
        assert_eq!(record["trace_id"], "T1");
        assert_eq!(record["message"], "hello");
        assert_eq!(record["level"], "info");
    }

    #[test]
    fn test_scopes_do_not_leak_into_each_other() {
        let console = MemorySink::new();
        let logger = local_logger(&console);
        let base = logger.scoped();

        let a = base.with_field("a", 1);
        let b = base.with_field("b", 2);
        a.info("from a");
        b.info("from b");
        base.info("from base");

        let records: Vec<Value> = console.lines().iter().map(|l| parse(l)).collect();
        assert_eq!(records[0]["a"], 1);
        assert!(records[0].get("b").is_none());
        assert_eq!(records[1]["b"], 2);
        assert!(records[1].get("a").is_none());
        assert!(records[2].get("a").is_none() && records[2].get("b").is_none());
    }

    #[test]
    fn test_level_threshold_drops_debug_by_default() {
        let console = MemorySink::new();
        let logger = local_logger(&console);

        logger.scoped().debug("hidden");
        assert!(console.is_empty());

        let config = LoggerConfig::new("svc", "1.0.0")
            .with_environment(Environment::Local)
            .with_level(Level::Debug);
        let verbose = Logger::builder(config).console(console.clone()).build().unwrap();
        verbose.scoped().debug("shown");
        assert_eq!(parse(&console.lines()[0])["level"], "debug");
    }

    #[test]
    fn test_console_colors_by_level() {
        let console = MemorySink::new();
        let logger = local_logger(&console);

        logger.scoped().warn("careful");
        logger.scoped().error("broken");

        let lines = console.lines();
        assert!(lines[0].starts_with("\x1b[33m{") && lines[0].ends_with("}\x1b[0m"));
        assert!(lines[1].starts_with("\x1b[31m{") && lines[1].ends_with("}\x1b[0m"));
    }

    #[test]
    fn test_build_propagates_invalid_config() {
        let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Production);
        let result = Logger::new(config);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_clones_share_destination() {
        let console = MemorySink::new();
        let logger = local_logger(&console);
        let clone = logger.clone();
        assert!(logger.ptr_eq(&clone));
        assert!(!logger.ptr_eq(&local_logger(&console)));
    }
}
