//! Module: config
//!
//! Purpose: Static configuration for the console firmware and the reference
//! device collaborator. Plain structs with defaults; nothing is persisted.

/// Serial console configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsoleConfig {
    /// UART0 baud rate for commands and replies.
    pub baud_rate: u32,
    /// Receive poll period when no byte is waiting.
    pub poll_interval_ms: u32,
    /// Period of the CPU/memory report while diagnostics printing is on.
    pub diagnostics_interval_ms: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            poll_interval_ms: 10,
            diagnostics_interval_ms: 3000,
        }
    }
}

/// Limits and power-on values for [`DeviceSettings`](crate::device::DeviceSettings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfig {
    pub initial_gain_db: f32,
    pub initial_delay_ms: f32,
    pub min_gain_db: f32,
    pub max_gain_db: f32,
    /// Delay line length in ms. Requests beyond it are clamped.
    pub max_delay_ms: f32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            initial_gain_db: 0.0,
            initial_delay_ms: 0.0,
            min_gain_db: -60.0,
            max_gain_db: 40.0,
            max_delay_ms: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_defaults() {
        let ConsoleConfig { baud_rate, poll_interval_ms, diagnostics_interval_ms } =
            ConsoleConfig::default();
        assert_eq!(baud_rate, 115200);
        assert_eq!(poll_interval_ms, 10);
        assert_eq!(diagnostics_interval_ms, 3000);
    }

    #[test]
    fn test_device_defaults_span_zero() {
        let config = DeviceConfig::default();
        assert!(config.min_gain_db < 0.0 && config.max_gain_db > 0.0);
        assert!((0.0..=config.max_delay_ms).contains(&config.initial_delay_ms));
        assert!((config.min_gain_db..=config.max_gain_db).contains(&config.initial_gain_db));
    }
}
