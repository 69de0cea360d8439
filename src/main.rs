//! RustSerialDelay - Main entry point
//!
//! On the device:
//! 1. Bring up UART0 (commands) and UART1 (log output)
//! 2. Print banner and help
//! 3. Poll UART0, feed every byte to the console
//! 4. Drain the console log, print CPU/memory diagnostics while enabled
//!
//! On any other target the same console runs on stdin/stdout as a simulator.

use rust_serial_delay::{
    config::{ConsoleConfig, DeviceConfig},
    console::Console,
    device::DeviceSettings,
    uart_logger::drain_to,
    CONSOLE_LOG_STREAM,
};

#[cfg(target_os = "espidf")]
fn main() -> Result<(), esp_idf_svc::sys::EspError> {
    firmware::run(ConsoleConfig::default(), DeviceConfig::default())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> std::io::Result<()> {
    host::run(ConsoleConfig::default(), DeviceConfig::default())
}

#[cfg(target_os = "espidf")]
mod firmware {
    use core::fmt::Write;

    use esp_idf_svc::hal::delay::{FreeRtos, NON_BLOCK};
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use rust_serial_delay::diagnostics::{heap_stats, BusyMeter, DiagnosticsReport};
    use rust_serial_delay::logging::timestamp_us;
    use rust_serial_delay::uart_logger::{init_uart_logger, UartLogWriter, UartLoggerConfig};

    use super::*;

    /// Console replies go back out on UART0.
    struct UartWriter<'a, 'd>(&'a UartDriver<'d>);

    impl Write for UartWriter<'_, '_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }

    pub fn run(console_config: ConsoleConfig, device_config: DeviceConfig) -> Result<(), EspError> {
        esp_idf_svc::sys::link_patches();

        let peripherals = Peripherals::take()?;

        let uart_config = Config::default().baudrate(Hertz(console_config.baud_rate));
        let uart = UartDriver::new(
            peripherals.uart0,
            peripherals.pins.gpio43, // TX
            peripherals.pins.gpio44, // RX
            Option::<gpio::AnyIOPin>::None,
            Option::<gpio::AnyIOPin>::None,
            &uart_config,
        )?;

        let mut log_uart = init_uart_logger(
            peripherals.uart1,
            peripherals.pins.gpio6,
            &UartLoggerConfig::default(),
        )?;

        let mut console = Console::new(DeviceSettings::new(device_config), &CONSOLE_LOG_STREAM);
        let mut out = UartWriter(&uart);
        console.print_banner(&mut out);

        let report_interval_us = i64::from(console_config.diagnostics_interval_ms) * 1000;
        let mut meter = BusyMeter::new(timestamp_us());
        let mut last_report = timestamp_us();
        let mut rx = [0u8; 64];

        loop {
            let busy_start = timestamp_us();

            // A failed read is treated as "nothing arrived"
            let n = uart.read(&mut rx, NON_BLOCK).unwrap_or(0);
            for &byte in &rx[..n] {
                let _ = console.feed_byte(byte, &mut out);
            }

            drain_to(&CONSOLE_LOG_STREAM, &mut UartLogWriter(&mut log_uart));

            let now = timestamp_us();
            meter.record(busy_start, now);

            if now - last_report >= report_interval_us {
                // Windows roll every interval, printed or not
                let (free, min) = heap_stats();
                let report = DiagnosticsReport::sample(&mut meter, now, free, min);
                if console.device().diagnostics_enabled() {
                    let _ = writeln!(out, "{}", report);
                }
                last_report = now;
            }

            if n == 0 {
                FreeRtos::delay_ms(console_config.poll_interval_ms);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{self, Read, Write};

    use super::*;

    /// `fmt::Write` over an `io::Write`.
    struct StdWriter<W: Write>(W);

    impl<W: Write> core::fmt::Write for StdWriter<W> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
        }
    }

    pub fn run(_console_config: ConsoleConfig, device_config: DeviceConfig) -> io::Result<()> {
        let mut console = Console::new(DeviceSettings::new(device_config), &CONSOLE_LOG_STREAM);
        let mut out = StdWriter(io::stdout().lock());
        let mut err = StdWriter(io::stderr().lock());
        console.print_banner(&mut out);
        out.0.flush()?;

        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 256];

        loop {
            let n = stdin.read(&mut buf)?;
            if n == 0 {
                break;
            }

            for &byte in &buf[..n] {
                if console.feed_byte(byte, &mut out).is_some() {
                    drain_to(&CONSOLE_LOG_STREAM, &mut err);
                }
            }
            out.0.flush()?;
        }

        drain_to(&CONSOLE_LOG_STREAM, &mut err);
        Ok(())
    }
}
