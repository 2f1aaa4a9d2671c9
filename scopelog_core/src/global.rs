//! Process-wide logger slot.
//!
//! Prefer building a [`Logger`] in `main` and binding it into the root
//! [`crate::Context`] with [`crate::Context::with_logger`]. The slot here
//! backs the convenience paths: [`init`] for callers that configure once
//! at startup, and the degraded mode in which a context with no bound
//! logger resolves to a synthesized "unknown" service logger.
//!
//! The slot is filled at most once. Concurrent initializers block until
//! the winner has finished building, then observe its logger.

use crate::config::LoggerConfig;
use crate::logger::Logger;
use crate::Result;
use once_cell::sync::OnceCell;

static GLOBAL: LoggerCell = LoggerCell::new();

/// A slot that accepts exactly one logger
#[derive(Debug, Default)]
pub struct LoggerCell {
    slot: OnceCell<Logger>,
}

impl LoggerCell {
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Build and store a logger from `config` unless one is already stored
    ///
    /// Returns `Ok(true)` only for the call that filled the slot. A
    /// missing configuration is reported as an error record through a
    /// throwaway default logger and returns `Ok(false)`, leaving the slot
    /// empty. A destination that cannot be opened is returned as an error
    /// and also leaves the slot empty.
    pub fn init(&self, config: impl Into<Option<LoggerConfig>>) -> Result<bool> {
        let Some(config) = config.into() else {
            Logger::fallback().scoped().error("Invalid logger config");
            return Ok(false);
        };

        self.init_with(|| Logger::new(config))
    }

    /// Store an already built logger unless one is already stored
    pub fn install(&self, logger: Logger) -> bool {
        let installed = self.slot.set(logger).is_ok();
        if !installed {
            tracing::debug!("Logger already initialized; ignoring installed logger");
        }
        installed
    }

    fn init_with(&self, build: impl FnOnce() -> Result<Logger>) -> Result<bool> {
        let mut constructed = false;
        self.slot.get_or_try_init(|| {
            constructed = true;
            build()
        })?;

        if !constructed {
            tracing::debug!("Logger already initialized; ignoring configuration");
        }
        Ok(constructed)
    }

    pub fn get(&self) -> Option<&Logger> {
        self.slot.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The stored logger, synthesizing the "unknown" service logger if empty
    pub fn get_or_init_default(&self) -> &Logger {
        self.slot.get_or_init(|| {
            tracing::debug!("No logger configured; using unknown service defaults");
            Logger::fallback()
        })
    }
}

/// Initialize the process-wide logger; see [`LoggerCell::init`]
pub fn init(config: impl Into<Option<LoggerConfig>>) -> Result<bool> {
    GLOBAL.init(config)
}

/// Install a pre-built logger process-wide; see [`LoggerCell::install`]
pub fn install(logger: Logger) -> bool {
    GLOBAL.install(logger)
}

/// The process-wide logger, if one has been set
pub fn global() -> Option<&'static Logger> {
    GLOBAL.get()
}

pub(crate) fn global_or_default() -> &'static Logger {
    GLOBAL.get_or_init_default()
}
