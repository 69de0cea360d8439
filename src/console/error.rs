//! Console error types
//!
//! None of these are fatal. By the time one is returned the console has
//! already printed the user-facing diagnostic and is ready for the next line.

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Unknown command letter
    UnknownCommand,
    /// E02: Command needs a numeric argument
    MissingArg,
    /// E03: Line longer than the device buffer
    LineTooLong,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::MissingArg => "E02",
            Self::LineTooLong => "E03",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::MissingArg => "missing argument",
            Self::LineTooLong => "line too long",
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
