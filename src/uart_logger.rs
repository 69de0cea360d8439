//! Log output for the console log stream.
//!
//! On the device, entries go out on UART1 TX (GPIO6) so they never mix with
//! the command replies on UART0. Requires external USB-UART adapter.
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! On host, [`drain_to`] writes the same lines to any `fmt::Write`.

use core::fmt::Write;

use crate::logging::{BufWriter, LogEntry, LogStream};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
        }
    }
}

/// Format log entry to bytes.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };

    let _ = writeln!(
        writer,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    );

    writer.pos
}

/// Drain every pending entry of `stream` into `out`.
///
/// Reports and resets the dropped counter once the ring is empty.
/// Returns the number of entries written.
pub fn drain_to<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut format_buf = [0u8; 160];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut format_buf);
        if let Ok(line) = core::str::from_utf8(&format_buf[..len]) {
            let _ = out.write_str(line);
        }
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = writeln!(out, "[WARN] Dropped log entries: {}", dropped);
        stream.reset_dropped();
    }

    count
}

/// Initialize UART1 TX-only for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// `fmt::Write` adapter over the log UART.
#[cfg(target_os = "espidf")]
pub struct UartLogWriter<'a, 'd>(pub &'a mut UartTxDriver<'d>);

#[cfg(target_os = "espidf")]
impl Write for UartLogWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MAX_MSG_LEN};

    fn entry(timestamp_us: i64, level: LogLevel, text: &[u8]) -> LogEntry {
        let mut msg = [0u8; MAX_MSG_LEN];
        msg[..text.len()].copy_from_slice(text);
        LogEntry { timestamp_us, level, len: text.len() as u8, msg }
    }

    #[test]
    fn test_format_log_entry() {
        let entry = entry(1234567, LogLevel::Warn, b"Command too long");

        let mut buf = [0u8; 160];
        let len = format_log_entry(&entry, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(formatted, "[   1234567] WARN: Command too long\n");
    }

    #[test]
    fn test_format_respects_entry_len() {
        let mut e = entry(999, LogLevel::Error, b"TEST12345X");
        e.len = 5;

        let mut buf = [0u8; 160];
        let len = format_log_entry(&e, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("TEST1"));
        assert!(!formatted.contains("X"));
    }

    #[test]
    fn test_default_config_is_baud_only() {
        // Pin selection belongs to init_uart_logger's peripheral argument
        let config = UartLoggerConfig::default();
        let UartLoggerConfig { baud_rate } = config;
        assert_eq!(baud_rate, 115200);
    }

    #[test]
    fn test_drain_to_reports_dropped() {
        let stream = LogStream::<2>::new();
        stream.push(1, LogLevel::Info, b"a");
        stream.push(2, LogLevel::Info, b"b");
        stream.push(3, LogLevel::Info, b"c");

        let mut out = String::new();
        assert_eq!(drain_to(&stream, &mut out), 2);

        assert!(out.contains("INFO: a"));
        assert!(out.contains("INFO: b"));
        assert!(!out.contains("INFO: c"));
        assert!(out.contains("Dropped log entries: 1"));
        assert_eq!(stream.dropped(), 0);
    }
}
