//! Byte-level console tests

use core::fmt::Write;

use rust_serial_delay::console::{Console, ConsoleError, MAX_LINE_LEN, OVERFLOW_MESSAGE, VERSION};
use rust_serial_delay::device::{DeviceControl, DeviceSettings};
use rust_serial_delay::logging::{LogLevel, LogStream};

fn run(console: &mut Console<'_, &mut FakeDevice>, input: &[u8]) -> String {
    let mut out = String::new();
    console.feed(input, &mut out);
    out
}

#[test]
fn test_set_gain() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let out = run(&mut console, b"k 10\n");

    assert!(out.is_empty());
    assert_eq!(device.gain_db, 10.0);
}

#[test]
fn test_gain_usage_leaves_gain_unchanged() {
    let log = LogStream::new();
    let mut device = FakeDevice { gain_db: 4.0, ..Default::default() };
    let mut console = Console::new(&mut device, &log);

    let out = run(&mut console, b"k\n");

    assert_eq!(out, "Usage: k <dB>   (current = 4.0 dB)\n");
    assert!(device.calls.is_empty());
    assert_eq!(device.gain_db, 4.0);
}

#[test]
fn test_delay_case_insensitive() {
    let log = LogStream::new();

    let mut lower = FakeDevice::default();
    let mut console = Console::new(&mut lower, &log);
    let out_lower = run(&mut console, b"d 25\n");

    let mut upper = FakeDevice::default();
    let mut console = Console::new(&mut upper, &log);
    let out_upper = run(&mut console, b"D 25\n");

    assert_eq!(out_lower, out_upper);
    assert_eq!(lower.calls, vec![Call::SetDelay(25.0)]);
    assert_eq!(upper.calls, lower.calls);
}

#[test]
fn test_whitespace_line_is_silent() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    assert_eq!(console.feed(b"   \n", &mut out), None);
    assert_eq!(console.feed(b"\n", &mut out), None);

    assert!(out.is_empty());
    assert_eq!(log.pending(), 0);
    assert!(device.calls.is_empty());
}

#[test]
fn test_unknown_command() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    let result = console.feed(b"x\n", &mut out);

    assert_eq!(result, Some(Err(ConsoleError::UnknownCommand)));
    assert!(out.contains("Unknown command: x"));
    assert!(out.contains("Type 'h' for help."));
    assert!(device.calls.is_empty());

    let entry = drain_last(&log);
    assert_eq!(entry.0, LogLevel::Warn);
    assert!(entry.1.contains("'x'"));
}

#[test]
fn test_unknown_utf8_lead_byte_is_escaped() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    // "é" arrives as 0xC3 0xA9; only the first byte is the command
    let mut out = String::new();
    let result = console.feed("é\n".as_bytes(), &mut out);

    assert_eq!(result, Some(Err(ConsoleError::UnknownCommand)));
    assert_eq!(out, "Unknown command: \\xc3\nType 'h' for help.\n");
    assert!(!out.contains('Ã'));

    let entry = drain_last(&log);
    assert_eq!(entry.0, LogLevel::Warn);
    assert!(entry.1.contains("'\\xc3'"));
}

#[test]
fn test_trailing_text_after_number_ignored() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    assert_eq!(console.feed(b"k 10abc\n", &mut out), Some(Ok(())));

    assert!(out.is_empty());
    assert_eq!(device.calls, vec![Call::SetGain(10.0)]);
}

#[test]
fn test_status_is_repeatable() {
    let log = LogStream::new();
    let mut device = FakeDevice { gain_db: 2.0, delay_ms: 8.0, ..Default::default() };
    let mut console = Console::new(&mut device, &log);

    let first = run(&mut console, b"g\n");
    for _ in 0..5 {
        assert_eq!(run(&mut console, b"g\n"), first);
    }
    assert_eq!(first, "fake gain 2.0\nDelay = 8.00 ms\n");
}

#[test]
fn test_short_line_reaches_parser_intact() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    for &b in b"d  12.5 trailing" {
        assert_eq!(console.feed_byte(b, &mut out), None);
    }
    assert_eq!(console.pending_line(), b"d  12.5 trailing");

    console.feed_byte(b'\n', &mut out);
    assert!(console.pending_line().is_empty());
    drop(console);
    assert_eq!(device.calls, vec![Call::SetDelay(12.5)]);
}

#[test]
fn test_max_length_line_dispatches() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    // "k" + spaces + "7" = 63 bytes
    let mut line = vec![b'k'];
    line.resize(MAX_LINE_LEN - 1, b' ');
    line.push(b'7');
    assert_eq!(line.len(), 63);

    let mut out = String::new();
    console.feed(&line, &mut out);
    assert_eq!(console.feed_byte(b'\n', &mut out), Some(Ok(())));

    assert!(!out.contains(OVERFLOW_MESSAGE));
    drop(console);
    assert_eq!(device.calls, vec![Call::SetGain(7.0)]);
}

#[test]
fn test_overflow_resets_buffer() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    for _ in 0..MAX_LINE_LEN {
        assert_eq!(console.feed_byte(b'a', &mut out), None);
    }
    assert_eq!(console.feed_byte(b'b', &mut out), Some(Err(ConsoleError::LineTooLong)));

    assert_eq!(out, format!("{}\n", OVERFLOW_MESSAGE));
    assert!(console.pending_line().is_empty());

    let entry = drain_last(&log);
    assert_eq!(entry.0, LogLevel::Warn);
    assert!(entry.1.contains("0x62"));

    // The offending byte is dropped; the tail of the long line becomes a new line
    out.clear();
    console.feed(b"k 3\n", &mut out);
    assert!(out.is_empty());
    drop(console);
    assert_eq!(device.calls, vec![Call::SetGain(3.0)]);
}

#[test]
fn test_overflow_then_newline_is_blank() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    console.feed(&[b'z'; 64], &mut out);
    out.clear();

    assert_eq!(console.feed_byte(b'\n', &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn test_carriage_returns_not_stored_or_counted() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    console.feed(b"k\r 1\r2", &mut out);
    assert_eq!(console.pending_line(), b"k 12");

    // 63 payload bytes with a CR after each still fit
    console.feed(b"\n", &mut out);
    let mut line = Vec::new();
    line.extend_from_slice(b"d\r");
    for _ in 0..MAX_LINE_LEN - 2 {
        line.extend_from_slice(b" \r");
    }
    line.extend_from_slice(b"5\r\r\n");
    console.feed(&line, &mut out);

    assert!(!out.contains(OVERFLOW_MESSAGE));
    drop(console);
    assert_eq!(device.calls, vec![Call::SetGain(12.0), Call::SetDelay(5.0)]);
}

#[test]
fn test_toggle_diagnostics() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let out = run(&mut console, b"c\nC\nc\n");

    assert_eq!(out.matches("Command Received").count(), 3);
    drop(console);
    assert!(device.diagnostics);
}

#[test]
fn test_arbitrary_bytes_never_panic() {
    let log = LogStream::new();
    let mut device = FakeDevice::default();
    let mut console = Console::new(&mut device, &log);

    let mut out = String::new();
    for round in 0..3u8 {
        for b in 0..=255u8 {
            console.feed_byte(b.wrapping_add(round), &mut out);
        }
    }
    console.feed_byte(b'\n', &mut out);

    out.clear();
    console.feed(b"g\n", &mut out);
    assert!(out.contains("Delay = "));
}

#[test]
fn test_with_device_settings() {
    let log = LogStream::new();
    let mut console = Console::new(DeviceSettings::default(), &log);

    let mut out = String::new();
    console.feed(b"k -6\nd 25\ng\n", &mut out);

    assert_eq!(out, "Gain = -6.0 dB\nDelay = 25.00 ms\n");
    assert_eq!(console.device().gain_db(), -6.0);

    out.clear();
    console.feed(b"C\n", &mut out);
    assert!(console.device().diagnostics_enabled());
}

#[test]
fn test_banner() {
    let log = LogStream::new();
    let console = Console::new(DeviceSettings::default(), &log);

    let mut out = String::new();
    console.print_banner(&mut out);

    assert!(out.starts_with(VERSION));
    assert!(out.contains("Available Commands"));
}

fn drain_last(log: &LogStream) -> (LogLevel, String) {
    let mut last = None;
    while let Some(entry) = log.drain() {
        last = Some((entry.level, entry.message().to_string()));
    }
    last.expect("console should have logged")
}

// Recording collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    SetGain(f32),
    SetDelay(f32),
    ToggleDiagnostics,
}

#[derive(Default)]
struct FakeDevice {
    gain_db: f32,
    delay_ms: f32,
    diagnostics: bool,
    calls: Vec<Call>,
}

impl DeviceControl for FakeDevice {
    fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db;
        self.calls.push(Call::SetGain(gain_db));
    }

    fn gain_db(&self) -> f32 {
        self.gain_db
    }

    fn print_gain_settings(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "fake gain {:.1}", self.gain_db);
    }

    fn toggle_diagnostics(&mut self) {
        self.diagnostics = !self.diagnostics;
        self.calls.push(Call::ToggleDiagnostics);
    }

    fn set_delay_ms(&mut self, delay_ms: f32) {
        self.delay_ms = delay_ms;
        self.calls.push(Call::SetDelay(delay_ms));
    }

    fn delay_ms(&self) -> f32 {
        self.delay_ms
    }
}
