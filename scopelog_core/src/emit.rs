//! Level entry points.
//!
//! Every call resolves the logger from the context (see
//! [`crate::context::resolve`]) and writes exactly one record. Nothing is
//! returned; a record that cannot be written is dropped and reported
//! through the internal diagnostics.
//!
//! The unformatted variants concatenate their values without separators.
//! The `*f` variants take a template with arguments, checked by the
//! compiler; use them through the [`crate::infof!`] family of macros.

use crate::context::{resolve, Context};
use crate::record::Level;
use serde_json::Value;
use std::fmt::{self, Display, Write};

/// Concatenate values into one message
///
/// No separator is inserted between values, numeric or not.
pub fn concat(values: &[&dyn Display]) -> String {
    let mut message = String::new();
    for value in values {
        // writing into a String cannot fail
        let _ = write!(message, "{}", value);
    }
    message
}

pub fn log<'a>(ctx: impl Into<Option<&'a Context>>, level: Level, message: &str) {
    resolve(ctx).log(level, message);
}

pub fn debug<'a>(ctx: impl Into<Option<&'a Context>>, values: &[&dyn Display]) {
    log(ctx, Level::Debug, &concat(values));
}

pub fn info<'a>(ctx: impl Into<Option<&'a Context>>, values: &[&dyn Display]) {
    log(ctx, Level::Info, &concat(values));
}

pub fn warn<'a>(ctx: impl Into<Option<&'a Context>>, values: &[&dyn Display]) {
    log(ctx, Level::Warn, &concat(values));
}

pub fn error<'a>(ctx: impl Into<Option<&'a Context>>, values: &[&dyn Display]) {
    log(ctx, Level::Error, &concat(values));
}

pub fn debugf<'a>(ctx: impl Into<Option<&'a Context>>, args: fmt::Arguments<'_>) {
    log(ctx, Level::Debug, &args.to_string());
}

pub fn infof<'a>(ctx: impl Into<Option<&'a Context>>, args: fmt::Arguments<'_>) {
    log(ctx, Level::Info, &args.to_string());
}

pub fn warnf<'a>(ctx: impl Into<Option<&'a Context>>, args: fmt::Arguments<'_>) {
    log(ctx, Level::Warn, &args.to_string());
}

pub fn errorf<'a>(ctx: impl Into<Option<&'a Context>>, args: fmt::Arguments<'_>) {
    log(ctx, Level::Error, &args.to_string());
}

/// Emit one info record titled `title` with every payload entry as a field
pub fn with_custom_payload<'a, K, V, I>(ctx: impl Into<Option<&'a Context>>, title: &str, payload: I)
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    resolve(ctx).with_fields(payload).info(title);
}

/// Emit a debug record built from concatenated values
#[macro_export]
macro_rules! debug {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $crate::emit::debug($ctx, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
}

/// Emit an info record built from concatenated values
#[macro_export]
macro_rules! info {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $crate::emit::info($ctx, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
}

/// Emit a warning record built from concatenated values
#[macro_export]
macro_rules! warn {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $crate::emit::warn($ctx, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
}

/// Emit an error record built from concatenated values
#[macro_export]
macro_rules! error {
    ($ctx:expr $(, $value:expr)* $(,)?) => {
        $crate::emit::error($ctx, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
}

/// Emit a debug record from a format template
#[macro_export]
macro_rules! debugf {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::emit::debugf($ctx, ::std::format_args!($($arg)+))
    };
}

/// Emit an info record from a format template
#[macro_export]
macro_rules! infof {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::emit::infof($ctx, ::std::format_args!($($arg)+))
    };
}

/// Emit a warning record from a format template
#[macro_export]
macro_rules! warnf {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::emit::warnf($ctx, ::std::format_args!($($arg)+))
    };
}

/// Emit an error record from a format template
#[macro_export]
macro_rules! errorf {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::emit::errorf($ctx, ::std::format_args!($($arg)+))
    };
}
