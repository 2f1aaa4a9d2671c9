//! Request-scoped context carrying the active logger.
//!
//! A [`Context`] is an immutable value: every `with_*` call returns a new
//! context and leaves the original as it was. Values are keyed by their
//! type. The logger lives under a type private to this module, so only
//! the functions here can bind or read it.
//!
//! ```
//! use scopelog_core::{context, Context, Environment, Logger, LoggerConfig};
//!
//! let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Local);
//! let logger = Logger::new(config).unwrap();
//!
//! let ctx = Context::background().with_logger(&logger);
//! let ctx = context::with_trace_id(&ctx, "T1");
//! let ctx = context::with_function_name(&ctx, "handle_order");
//! scopelog_core::info!(&ctx, "order ", 42, " accepted");
//! ```

use crate::fields::{FUNCTION, TRACE_ID};
use crate::global;
use crate::logger::{Logger, ScopedLogger};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Immutable carrier for request-scoped values
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

/// Key under which the logger is bound
#[derive(Clone)]
struct BoundLogger(ScopedLogger);

impl Context {
    /// The empty context
    pub fn background() -> Self {
        Self::default()
    }

    /// Copy of this context holding `value`, replacing any value of the same type
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        let mut values = (*self.values).clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Bind an explicitly built logger, bypassing the process-wide slot
    pub fn with_logger(&self, logger: &Logger) -> Self {
        bind(self, logger.scoped())
    }

    pub fn has_logger(&self) -> bool {
        self.value::<BoundLogger>().is_some()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("logger", &self.value::<BoundLogger>().map(|b| b.0.fields()))
            .finish()
    }
}

/// New context with `logger` bound
pub fn bind(ctx: &Context, logger: ScopedLogger) -> Context {
    ctx.with_value(BoundLogger(logger))
}

/// The logger bound to `ctx`, or the process-wide one
///
/// `None` is treated as an empty context. When nothing is bound, the
/// process-wide logger is used, synthesized with the "unknown" service
/// identity if nobody initialized it. The fallback is not bound back
/// into `ctx`; capture the context returned by [`with_trace_id`] or
/// [`with_function_name`] to keep it.
pub fn resolve<'a>(ctx: impl Into<Option<&'a Context>>) -> ScopedLogger {
    match ctx.into().and_then(|c| c.value::<BoundLogger>()) {
        Some(bound) => bound.0.clone(),
        None => global::global_or_default().scoped(),
    }
}

/// New context whose logger carries `key = value`
pub fn with_field<'a>(
    ctx: impl Into<Option<&'a Context>>,
    key: impl Into<String>,
    value: impl Into<Value>,
) -> Context {
    let ctx = ctx.into();
    let logger = resolve(ctx).with_field(key, value);
    match ctx {
        Some(ctx) => bind(ctx, logger),
        None => bind(&Context::background(), logger),
    }
}

pub fn with_trace_id<'a>(
    ctx: impl Into<Option<&'a Context>>,
    trace_id: impl Into<String>,
) -> Context {
    with_field(ctx, TRACE_ID, trace_id.into())
}

pub fn with_function_name<'a>(
    ctx: impl Into<Option<&'a Context>>,
    function_name: impl Into<String>,
) -> Context {
    with_field(ctx, FUNCTION, function_name.into())
}

/// Bind a freshly generated trace id, returning it with the new context
pub fn with_new_trace_id<'a>(ctx: impl Into<Option<&'a Context>>) -> (Context, String) {
    let trace_id = Uuid::new_v4().to_string();
    (with_trace_id(ctx, trace_id.clone()), trace_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, LoggerConfig};
    use crate::sink::MemorySink;
    use serde_json::json;

    fn bound_context(console: &MemorySink) -> Context {
        let config = LoggerConfig::new("svc", "1.0.0").with_environment(Environment::Local);
        let logger = Logger::builder(config)
            .console(console.clone())
            .build()
            .unwrap();
        Context::background().with_logger(&logger)
    }

    #[test]
    fn test_values_are_keyed_by_type() {
        #[derive(Debug, PartialEq)]
        struct RequestId(u64);

        let ctx = Context::background().with_value(RequestId(7));
        assert_eq!(ctx.value::<RequestId>(), Some(&RequestId(7)));
        assert_eq!(ctx.value::<String>(), None);
        assert!(!ctx.has_logger());
    }

    #[test]
    fn test_with_value_leaves_parent_untouched() {
        let parent = Context::background().with_value(1u32);
        let child = parent.with_value(2u32);
        assert_eq!(parent.value::<u32>(), Some(&1));
        assert_eq!(child.value::<u32>(), Some(&2));
    }

    #[test]
    fn test_resolve_returns_bound_logger() {
        let console = MemorySink::new();
        let ctx = bound_context(&console);
        let ctx = with_trace_id(&ctx, "T1");

        let logger = resolve(&ctx);
        assert_eq!(logger.fields().get(TRACE_ID), Some(&json!("T1")));
        assert_eq!(logger.fields().get("service_name"), Some(&json!("svc")));
    }

    #[test]
    fn test_sibling_contexts_see_only_their_own_field() {
        let console = MemorySink::new();
        let parent = bound_context(&console);

        let left = with_trace_id(&parent, "left");
        let right = with_function_name(&parent, "right");

        assert_eq!(resolve(&left).fields().get(TRACE_ID), Some(&json!("left")));
        assert!(resolve(&left).fields().get(FUNCTION).is_none());
        assert_eq!(resolve(&right).fields().get(FUNCTION), Some(&json!("right")));
        assert!(resolve(&right).fields().get(TRACE_ID).is_none());
        assert!(resolve(&parent).fields().get(TRACE_ID).is_none());
    }

    #[test]
    fn test_unrelated_values_keep_the_logger() {
        let console = MemorySink::new();
        let ctx = with_trace_id(&bound_context(&console), "T1");
        let ctx = ctx.with_value("unrelated".to_string());

        assert!(ctx.has_logger());
        assert_eq!(resolve(&ctx).fields().get(TRACE_ID), Some(&json!("T1")));
    }

    #[test]
    fn test_unbound_resolution_does_not_bind() {
        let ctx = Context::background();
        let logger = resolve(&ctx);
        assert!(logger.fields().contains_key("service_name"));
        assert!(!ctx.has_logger());

        let none_ctx: Option<&Context> = None;
        let logger = resolve(none_ctx);
        assert!(logger.fields().contains_key("service_version"));
    }

    #[test]
    fn test_with_trace_id_on_unbound_context_binds_fallback() {
        let ctx = with_trace_id(None, "T9");
        assert!(ctx.has_logger());
        assert_eq!(resolve(&ctx).fields().get(TRACE_ID), Some(&json!("T9")));
    }

    #[test]
    fn test_with_new_trace_id() {
        let console = MemorySink::new();
        let (ctx, trace_id) = with_new_trace_id(&bound_context(&console));

        assert!(Uuid::parse_str(&trace_id).is_ok());
        assert_eq!(resolve(&ctx).fields().get(TRACE_ID), Some(&json!(trace_id)));
    }
}
