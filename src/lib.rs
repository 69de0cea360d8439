//! # RustSerialDelay
//!
//! Serial command console for an embedded audio device.
//!
//! ## Architecture
//!
//! Bytes from the serial transport go into a [`Console`], one at a time.
//! Completed lines are parsed into a letter plus optional number and
//! dispatched to a [`DeviceControl`] collaborator:
//!
//! ```text
//! UART ─▶ feed_byte ─▶ LineBuffer ─▶ parse_line ─▶ COMMANDS ─▶ DeviceControl
//! ```
//!
//! The console never blocks and never allocates. Malformed input is reported
//! on the output channel and the console is ready again for the next line.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod device;
pub mod diagnostics;
pub mod log_globals;
pub mod logging;
pub mod uart_logger;

pub use config::{ConsoleConfig, DeviceConfig};
pub use console::{Console, ConsoleError, LineBuffer, ParsedCommand};
pub use device::{DeviceControl, DeviceSettings};
pub use log_globals::CONSOLE_LOG_STREAM;
pub use logging::{LogLevel, LogStream};
