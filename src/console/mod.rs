//! Serial console for gain/delay control
//!
//! Polled one byte at a time, no dedicated task.
//! Zero heap allocation - all fixed buffers.

pub mod commands;
pub mod error;
pub mod interpreter;
pub mod line_buffer;
pub mod parser;
pub mod request;

pub use commands::{execute, find_command, print_help, COMMANDS};
pub use error::ConsoleError;
pub use interpreter::{Console, OVERFLOW_MESSAGE, VERSION};
pub use line_buffer::{LineBuffer, LINE_CAPACITY, MAX_LINE_LEN};
pub use parser::{parse_float_prefix, parse_line, EchoByte, ParsedCommand};
