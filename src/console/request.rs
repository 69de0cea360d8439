//! Outgoing command lines, for hosts talking to the device.
//!
//! The device executes on `\n` and ignores `\r`, and drops any line longer
//! than [`MAX_LINE_LEN`]. These helpers refuse such lines up front instead of
//! letting the device print "Command too long".

use core::fmt::Write;

use super::line_buffer::MAX_LINE_LEN;
use super::parser::is_space;
use super::ConsoleError;
use crate::logging::BufWriter;

/// Encode `line` as one device command into `buf`.
///
/// Surrounding whitespace is trimmed and exactly one `\n` appended.
/// Returns the number of bytes written.
pub fn encode_line(line: &str, buf: &mut [u8]) -> Result<usize, ConsoleError> {
    let bytes = trim(line.as_bytes());

    if bytes.len() > MAX_LINE_LEN || bytes.len() + 1 > buf.len() {
        return Err(ConsoleError::LineTooLong);
    }

    buf[..bytes.len()].copy_from_slice(bytes);
    buf[bytes.len()] = b'\n';
    Ok(bytes.len() + 1)
}

/// Encode a `d <ms>` request.
pub fn encode_set_delay(delay_ms: f32, buf: &mut [u8]) -> Result<usize, ConsoleError> {
    encode_formatted(buf, format_args!("d {}", delay_ms))
}

/// Encode a `k <dB>` request.
pub fn encode_set_gain(gain_db: f32, buf: &mut [u8]) -> Result<usize, ConsoleError> {
    encode_formatted(buf, format_args!("k {}", gain_db))
}

fn encode_formatted(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> Result<usize, ConsoleError> {
    // One spare byte so an overlong line is detected rather than cut short
    let mut scratch = [0u8; MAX_LINE_LEN + 2];
    let mut writer = BufWriter { buf: &mut scratch, pos: 0 };
    let _ = writer.write_fmt(args);
    let len = writer.pos;

    let line = core::str::from_utf8(&scratch[..len]).map_err(|_| ConsoleError::LineTooLong)?;
    encode_line(line, buf)
}

fn trim(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| !is_space(b)).unwrap_or(s.len());
    let end = s.iter().rposition(|&b| !is_space(b)).map_or(start, |i| i + 1);
    &s[start..end]
}
