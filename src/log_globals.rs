//! Global log stream instances.

use crate::logging::LogStream;

/// Console log stream.
///
/// Single producer (the context that calls `Console::feed_byte`),
/// single consumer (the UART1 drain on the device, stderr on host).
pub static CONSOLE_LOG_STREAM: LogStream = LogStream::new();
