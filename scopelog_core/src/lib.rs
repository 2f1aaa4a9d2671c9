#![forbid(unsafe_code)]

//! Context-scoped structured logging.
//!
//! This crate provides:
//! - A logger handle writing one JSON record per line
//! - Environment-based routing to standard output and/or a rotating file
//! - Request-scoped contexts carrying trace id, function name and other fields
//! - A process-wide slot with a lazily synthesized default logger
//!
//! ```
//! use scopelog_core::{context, Context, Environment, LoggerConfig};
//!
//! let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Local);
//! scopelog_core::init(config).unwrap();
//!
//! let ctx = context::with_trace_id(&Context::background(), "T1");
//! let ctx = context::with_function_name(&ctx, "F1");
//! scopelog_core::info!(&ctx, "hello");
//! scopelog_core::infof!(&ctx, "{} items", 3);
//! ```

pub mod error;
pub mod config;
pub mod diagnostics;
pub mod fields;
pub mod record;
pub mod sink;
pub mod rotation;
pub mod router;
pub mod logger;
pub mod global;
pub mod context;
pub mod emit;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::{Environment, LoggerConfig, RotationConfig};
pub use fields::FieldSet;
pub use record::Level;
pub use sink::{ConsoleSink, LogSink, MemorySink};
pub use rotation::{RotatingFile, RotationPolicy};
pub use router::{Destination, Route};
pub use logger::{Logger, LoggerBuilder, ScopedLogger};
pub use global::{global, init, install, LoggerCell};
pub use context::{resolve, with_function_name, with_trace_id, Context};
pub use emit::with_custom_payload;
