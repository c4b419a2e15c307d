/// Log level enumeration for diagnostic events
///
/// Levels are ordered from most verbose (Trace) to most severe (Error).
///
/// # Examples
///
/// ```
/// use cellvec::domain::ports::Level;
///
/// assert!(Level::Error > Level::Info);
/// assert!(Level::Trace < Level::Debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Most verbose level - detailed trace information
    Trace,
    /// Debug information useful during development
    Debug,
    /// Informational messages about normal operations
    Info,
    /// Warning messages for potentially problematic situations
    Warn,
    /// Error messages for failure conditions
    Error,
}

impl Level {
    /// Returns the string representation of the log level
    ///
    /// ```
    /// use cellvec::domain::ports::Level;
    ///
    /// assert_eq!(Level::Info.as_str(), "INFO");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Port for the engine's diagnostic events (batch dispatch, retry, failure
/// budget trip).
///
/// Sinks are purely observational: nothing a logger does may affect control
/// flow. Calls happen on runtime worker threads, so implementations must not
/// block.
///
/// # Examples
///
/// ```
/// use cellvec::domain::ports::{Level, Logger};
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn log(&self, level: Level, message: &str) {
///         eprintln!("[{}] {}", level.as_str(), message);
///     }
/// }
///
/// Stderr.warn("batch 3 failed, retrying");
/// ```
pub trait Logger: Send + Sync {
    /// Log a message at the given level
    fn log(&self, level: Level, message: &str);

    /// Log a debug-level message
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Log an info-level message
    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Log a warning-level message
    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Log an error-level message
    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}
