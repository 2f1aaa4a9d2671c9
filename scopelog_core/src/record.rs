//! Record levels and the JSON line format.
//!
//! Each record is one JSON object per line with sorted keys:
//!
//! ```text
//! {"function":"F1","level":"info","message":"hello","service_name":"svc","service_version":"1.0.0","time":"2026-10-16T09:15:02.123456Z","trace_id":"T1"}
//! ```

use crate::fields::FieldSet;
use crate::Result;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "message";

const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Record severity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl Level {
    /// Name written into the `level` key
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render one record stamped with the current local time
pub fn render(level: Level, message: &str, fields: &FieldSet) -> Result<String> {
    render_at(level, message, fields, Local::now().fixed_offset())
}

/// Render one record as a single JSON line, without the trailing newline
///
/// Fields named like a built-in key are kept under `fields.<key>` instead
/// of overwriting it.
pub fn render_at(
    level: Level,
    message: &str,
    fields: &FieldSet,
    time: DateTime<FixedOffset>,
) -> Result<String> {
    let mut object = Map::new();
    for (key, value) in fields.iter() {
        let key = match key {
            TIME_KEY | LEVEL_KEY | MESSAGE_KEY => format!("fields.{}", key),
            _ => key.to_string(),
        };
        object.insert(key, value.clone());
    }

    object.insert(
        TIME_KEY.into(),
        Value::String(time.to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    object.insert(LEVEL_KEY.into(), Value::String(level.as_str().into()));
    object.insert(MESSAGE_KEY.into(), Value::String(message.into()));

    Ok(serde_json::to_string(&Value::Object(object))?)
}

/// Terminal color convention: yellow warnings, red errors
pub fn colorize(level: Level, line: &str) -> Cow<'_, str> {
    match level {
        Level::Warn => Cow::Owned(format!("{}{}{}", YELLOW, line, RESET)),
        Level::Error => Cow::Owned(format!("{}{}{}", RED, line, RESET)),
        Level::Debug | Level::Info => Cow::Borrowed(line),
    }
}
