//! CPU and memory report printed while diagnostics are enabled.
//!
//! CPU load is the share of wall time the console loop spent working
//! (reading, dispatching, draining logs) rather than sleeping between polls.
//! The firmware measures each busy stretch with [`timestamp_us`] and feeds it
//! to a [`BusyMeter`]; heap figures come from ESP-IDF.
//!
//! [`timestamp_us`]: crate::logging::timestamp_us

use core::fmt;

/// Busy-time accumulator over a reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusyMeter {
    window_start_us: i64,
    busy_us: i64,
    peak_percent: f32,
}

impl BusyMeter {
    pub const fn new(now_us: i64) -> Self {
        Self {
            window_start_us: now_us,
            busy_us: 0,
            peak_percent: 0.0,
        }
    }

    /// Account one busy stretch `[start_us, end_us)`.
    ///
    /// Stretches that end before they start are ignored.
    pub fn record(&mut self, start_us: i64, end_us: i64) {
        if end_us > start_us {
            self.busy_us += end_us - start_us;
        }
    }

    /// Busy share of the window so far, 0..=100.
    ///
    /// An empty window reads as idle.
    pub fn percent(&self, now_us: i64) -> f32 {
        let elapsed = now_us - self.window_start_us;
        if elapsed <= 0 {
            return 0.0;
        }
        (self.busy_us as f32 * 100.0 / elapsed as f32).clamp(0.0, 100.0)
    }

    /// Highest window percentage seen by [`close_window`](Self::close_window).
    #[inline]
    pub fn peak_percent(&self) -> f32 {
        self.peak_percent
    }

    /// Close the current window, returning its percentage, and start a new one.
    pub fn close_window(&mut self, now_us: i64) -> f32 {
        let percent = self.percent(now_us);
        if percent > self.peak_percent {
            self.peak_percent = percent;
        }
        self.window_start_us = now_us;
        self.busy_us = 0;
        percent
    }
}

/// One diagnostics line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticsReport {
    pub cpu_percent: f32,
    pub cpu_peak_percent: f32,
    pub free_heap: u32,
    pub min_free_heap: u32,
}

impl DiagnosticsReport {
    /// Close `meter`'s window at `now_us` and pair it with heap figures.
    pub fn sample(meter: &mut BusyMeter, now_us: i64, free_heap: u32, min_free_heap: u32) -> Self {
        let cpu_percent = meter.close_window(now_us);
        Self {
            cpu_percent,
            cpu_peak_percent: meter.peak_percent(),
            free_heap,
            min_free_heap,
        }
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU Cur/Peak: {:.1}%/{:.1}%, Memory: free {} bytes, min {} bytes",
            self.cpu_percent, self.cpu_peak_percent, self.free_heap, self.min_free_heap
        )
    }
}

/// Free and minimum-ever-free heap in bytes.
#[cfg(target_os = "espidf")]
pub fn heap_stats() -> (u32, u32) {
    // SAFETY: heap statistics have no preconditions
    unsafe {
        (
            esp_idf_svc::sys::esp_get_free_heap_size(),
            esp_idf_svc::sys::esp_get_minimum_free_heap_size(),
        )
    }
}
