//! Command line parser
//!
//! Grammar: `<ws>* <letter> <ws>* [<number>] <anything>`.
//!
//! The number is read the way C `strtof` reads it: the longest valid prefix
//! wins and whatever follows is ignored, so `k 10abc` means `k 10`.

/// Parsed command: one letter plus an optional numeric argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCommand {
    /// The command letter as received (not case-folded)
    pub command: u8,
    /// Argument, present only if the number parser consumed something
    pub arg: Option<f32>,
}

impl ParsedCommand {
    /// Command letter as a `char`
    pub fn letter(&self) -> char {
        char::from(self.command)
    }

    /// Command byte formatted for echoing back on a text channel
    pub fn echo(&self) -> EchoByte {
        EchoByte(self.command)
    }
}

/// Displays printable ASCII as-is and any other byte as `\xNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoByte(pub u8);

impl core::fmt::Display for EchoByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            b' '..=b'~' => write!(f, "{}", char::from(self.0)),
            b => write!(f, "\\x{:02x}", b),
        }
    }
}

/// Whitespace as C `isspace` sees it in the "C" locale.
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

fn skip_space(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| !is_space(b)).unwrap_or(s.len());
    &s[start..]
}

/// Parse a completed line.
///
/// Content ends at the first NUL byte. Returns `None` for a blank line.
pub fn parse_line(line: &[u8]) -> Option<ParsedCommand> {
    let end = line.iter().position(|&b| b == 0).unwrap_or(line.len());
    let line = skip_space(&line[..end]);

    let (&command, rest) = line.split_first()?;
    let rest = skip_space(rest);

    let arg = if rest.is_empty() {
        None
    } else {
        parse_float_prefix(rest).map(|(value, _)| value)
    };

    Some(ParsedCommand { command, arg })
}

/// Parse the longest float prefix of `s`.
///
/// Accepts an optional sign followed by `inf`, `infinity`, `nan`
/// (any case), a hexadecimal float (`0x1.8p3`), or a decimal float with
/// optional fraction and exponent. Returns the value and the number of bytes
/// consumed, or `None` if no prefix is a number. Unlike `strtof`, leading
/// whitespace is not skipped.
pub fn parse_float_prefix(s: &[u8]) -> Option<(f32, usize)> {
    let (negative, sign_len) = match s.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let body = &s[sign_len..];

    let (magnitude, used) = parse_special(body)
        .or_else(|| parse_hex(body))
        .or_else(|| parse_decimal(body))?;

    let value = if negative { -magnitude } else { magnitude };
    Some((value, sign_len + used))
}

fn starts_with_ignore_case(s: &[u8], word: &[u8]) -> bool {
    s.len() >= word.len() && s[..word.len()].eq_ignore_ascii_case(word)
}

fn parse_special(s: &[u8]) -> Option<(f32, usize)> {
    if starts_with_ignore_case(s, b"infinity") {
        Some((f32::INFINITY, 8))
    } else if starts_with_ignore_case(s, b"inf") {
        Some((f32::INFINITY, 3))
    } else if starts_with_ignore_case(s, b"nan") {
        Some((f32::NAN, 3))
    } else {
        None
    }
}

fn count_while(s: &[u8], pred: impl Fn(u8) -> bool) -> usize {
    s.iter().take_while(|&&b| pred(b)).count()
}

/// Digits `[.digits]` followed by an exponent that only counts if it has digits.
fn parse_decimal(s: &[u8]) -> Option<(f32, usize)> {
    let int_digits = count_while(s, |b| b.is_ascii_digit());
    let mut end = int_digits;
    let mut frac_digits = 0;

    if s.get(end) == Some(&b'.') {
        frac_digits = count_while(&s[end + 1..], |b| b.is_ascii_digit());
        end += 1 + frac_digits;
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    end += exponent_len(&s[end..], |b| b == b'e' || b == b'E');

    let text = core::str::from_utf8(&s[..end]).ok()?;
    let value = text.parse::<f32>().ok()?;
    Some((value, end))
}

/// Length of `[eEpP][+-]digits` at the start of `s`, 0 if incomplete.
fn exponent_len(s: &[u8], is_marker: impl Fn(u8) -> bool) -> usize {
    match s.first() {
        Some(&m) if is_marker(m) => {}
        _ => return 0,
    }
    let sign = matches!(s.get(1), Some(b'+') | Some(b'-')) as usize;
    let digits = count_while(&s[1 + sign..], |b| b.is_ascii_digit());
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

fn hex_value(b: u8) -> Option<u32> {
    char::from(b).to_digit(16)
}

/// `0x` hexdigits `[.hexdigits]` `[p[+-]digits]`
fn parse_hex(s: &[u8]) -> Option<(f32, usize)> {
    if s.len() < 2 || s[0] != b'0' || !(s[1] == b'x' || s[1] == b'X') {
        return None;
    }

    let mut mantissa = 0.0f64;
    let mut end = 2;
    let mut digits = 0;

    while let Some(d) = s.get(end).and_then(|&b| hex_value(b)) {
        mantissa = mantissa * 16.0 + d as f64;
        end += 1;
        digits += 1;
    }

    if s.get(end) == Some(&b'.') {
        let mut scale = 1.0f64 / 16.0;
        let mut i = end + 1;
        while let Some(d) = s.get(i).and_then(|&b| hex_value(b)) {
            mantissa += d as f64 * scale;
            scale /= 16.0;
            i += 1;
            digits += 1;
        }
        if digits > 0 {
            end = i;
        }
    }

    // "0x" with no digits: strtof reads just the "0"
    if digits == 0 {
        return None;
    }

    let exp_len = exponent_len(&s[end..], |b| b == b'p' || b == b'P');
    let mut value = mantissa;
    if exp_len > 0 {
        let exp_text = core::str::from_utf8(&s[end + 1..end + exp_len]).ok()?;
        // Anything past ±400 already saturates an f32 to inf or 0.
        let exp = exp_text.parse::<i32>().unwrap_or(if exp_text.starts_with('-') { -400 } else { 400 });
        value = scale_by_pow2(value, exp.clamp(-400, 400));
        end += exp_len;
    }

    Some((value as f32, end))
}

fn scale_by_pow2(mut value: f64, exp: i32) -> f64 {
    if exp >= 0 {
        for _ in 0..exp {
            value *= 2.0;
        }
    } else {
        for _ in 0..-exp {
            value *= 0.5;
        }
    }
    value
}
