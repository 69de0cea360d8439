//! Byte-fed console state machine
//!
//! ```text
//!   other byte
//!   ┌────────┐        '\n'
//!   ▼        │  ──────────────▶
//! Accumulating                  Dispatching
//!               ◀──────────────
//!               buffer cleared
//! ```
//!
//! `\r` is dropped on arrival. An overlong line is discarded whole, together
//! with the byte that overflowed it.

use core::fmt::Write;

use super::{commands, parse_line, ConsoleError, LineBuffer};
use crate::device::DeviceControl;
use crate::logging::LogStream;
use crate::{log_debug, log_info, log_warn};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Printed when a line outgrows the buffer.
pub const OVERFLOW_MESSAGE: &str = "Command too long. Buffer cleared.";

/// Line command interpreter
pub struct Console<'a, D: DeviceControl> {
    line: LineBuffer,
    device: D,
    log: &'a LogStream,
}

impl<'a, D: DeviceControl> Console<'a, D> {
    /// Create a console driving `device`, logging to `log`.
    pub fn new(device: D, log: &'a LogStream) -> Self {
        Self {
            line: LineBuffer::new(),
            device,
            log,
        }
    }

    /// Process a single input byte
    ///
    /// Returns `None` while a line is still accumulating or when a blank line
    /// was ignored, `Some(result)` once a line was dispatched or discarded.
    /// Any diagnostic has already been written to `out`.
    pub fn feed_byte(&mut self, byte: u8, out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        match byte {
            b'\r' => None,

            b'\n' => {
                let result = self.dispatch(out);
                self.line.clear();
                result
            }

            _ => match self.line.push(byte) {
                Ok(()) => None,
                Err(err) => {
                    self.line.clear();
                    let _ = writeln!(out, "{}", OVERFLOW_MESSAGE);
                    log_warn!(self.log, "{}: dropped line at byte 0x{:02x}", err, byte);
                    Some(Err(err))
                }
            },
        }
    }

    /// Feed every byte of `input`, returning the last completed result.
    pub fn feed(&mut self, input: &[u8], out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        input
            .iter()
            .fold(None, |last, &b| self.feed_byte(b, out).or(last))
    }

    fn dispatch(&mut self, out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        let cmd = parse_line(self.line.as_bytes())?;

        match cmd.arg {
            Some(arg) => log_debug!(self.log, "cmd '{}' arg {}", cmd.echo(), arg),
            None => log_debug!(self.log, "cmd '{}'", cmd.echo()),
        }

        let result = commands::execute(&cmd, &mut self.device, out);
        match result {
            Err(ConsoleError::UnknownCommand) => {
                log_warn!(self.log, "unknown command '{}'", cmd.echo())
            }
            Err(err) => log_info!(self.log, "'{}': {}", cmd.echo(), err),
            Ok(()) => {}
        }
        Some(result)
    }

    /// Print the command listing
    pub fn print_help(&self, out: &mut dyn Write) {
        commands::print_help(out);
    }

    /// Print version and help, as sent once at boot
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "{}", VERSION);
        self.print_help(out);
    }

    /// Bytes of the line accumulated so far
    pub fn pending_line(&self) -> &[u8] {
        self.line.as_bytes()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

}
