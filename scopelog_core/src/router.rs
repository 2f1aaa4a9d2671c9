//! Output routing by environment.
//!
//! | environment  | destination             |
//! |--------------|-------------------------|
//! | local        | standard output         |
//! | staging      | standard output + file  |
//! | production   | file                    |
//! | anything else| standard output + file  |

use crate::config::{Environment, RotationConfig};
use crate::record::{colorize, Level};
use crate::rotation;
use crate::sink::LogSink;
use crate::Result;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Which destinations receive records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Console,
    ConsoleAndFile,
    File,
}

impl Route {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Local => Route::Console,
            Environment::Staging => Route::ConsoleAndFile,
            Environment::Production => Route::File,
            Environment::Unspecified => Route::ConsoleAndFile,
        }
    }

    pub fn writes_console(&self) -> bool {
        matches!(self, Route::Console | Route::ConsoleAndFile)
    }

    pub fn writes_file(&self) -> bool {
        matches!(self, Route::File | Route::ConsoleAndFile)
    }
}

/// The wired sinks for one logger
pub struct Destination {
    route: Route,
    console: Option<Arc<dyn LogSink>>,
    file: Option<Arc<dyn LogSink>>,
    console_color: bool,
}

impl Destination {
    /// Wire the sinks `route` asks for
    ///
    /// The rotating file is only opened when the route writes to a file;
    /// failing to open it is returned, never papered over.
    pub fn open(
        route: Route,
        rotation: &RotationConfig,
        console: Arc<dyn LogSink>,
        console_color: bool,
    ) -> Result<Self> {
        let file: Option<Arc<dyn LogSink>> = if route.writes_file() {
            Some(Arc::new(rotation::open_sink(rotation)?))
        } else {
            None
        };

        Ok(Self {
            route,
            console: route.writes_console().then_some(console),
            file,
            console_color,
        })
    }

    /// Console-only wiring; cannot fail since no file is involved
    pub fn console(console: Arc<dyn LogSink>, console_color: bool) -> Self {
        Self {
            route: Route::Console,
            console: Some(console),
            file: None,
            console_color,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn routes_to_console(&self) -> bool {
        self.console.is_some()
    }

    pub fn routes_to_file(&self) -> bool {
        self.file.is_some()
    }

    /// Write one rendered record to every sink
    ///
    /// All sinks are attempted; the first failure is returned.
    pub fn write(&self, level: Level, line: &str) -> io::Result<()> {
        let mut result = Ok(());

        if let Some(console) = &self.console {
            let line = if self.console_color {
                colorize(level, line)
            } else {
                line.into()
            };
            result = console.write_line(&line);
        }

        if let Some(file) = &self.file {
            let written = file.write_line(line);
            if result.is_ok() {
                result = written;
            }
        }

        result
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("route", &self.route)
            .field("console", &self.routes_to_console())
            .field("file", &self.routes_to_file())
            .field("console_color", &self.console_color)
            .finish()
    }
}
