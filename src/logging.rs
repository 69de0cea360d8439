//! RT-safe logging for the serial console.
//!
//! # Architecture
//!
//! ```text
//! Console context        LogStream            Log drain
//! ───────────────        ─────────            ─────────
//!
//! log_warn!() ─────────▶ [L0][L1][L2] ──────▶ UART1 / stderr
//! non-blocking            lock-free           blocking ok
//!                         ring buffer
//! ```
//!
//! # Rules
//!
//! - `feed_byte` may run from a byte-ready callback, so it never blocks on I/O
//!   for logging. It pushes into a [`LogStream`] instead.
//! - Any number of producers and drains may share a stream.
//! - Messages are dropped (and counted) when the ring is full.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a placeholder if truncation split a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One ring slot: the entry plus the sequence number that owns it.
///
/// For ring position `pos` mapping to this slot, `seq == pos` means free for
/// the producer that reserved `pos`, `seq == pos + 1` means published and
/// ready for the consumer that reserved `pos`.
struct Slot {
    seq: AtomicU32,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    const EMPTY: Self = Self {
        seq: AtomicU32::new(0),
        entry: UnsafeCell::new(LogEntry::EMPTY),
    };
}

/// Lock-free bounded log ring (multiple producers, multiple consumers).
///
/// - Producers and drains reserve positions with a CAS, never a lock
/// - Push never blocks (drops message if full)
/// - Drain runs wherever blocking output is allowed
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    enqueue_pos: AtomicU32,
    dequeue_pos: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a slot's entry is written only by the producer whose CAS on
// enqueue_pos won that position, and read only by the drain whose CAS on
// dequeue_pos won it. The slot's seq hands ownership between them with
// Release/Acquire, so no entry is ever accessed by two threads at once.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");
        assert!(N <= (1 << 30), "Log buffer size must leave room for seq distance");

        let mut slots = [Slot::EMPTY; N];
        let mut i = 0;
        while i < N {
            slots[i].seq = AtomicU32::new(i as u32);
            i += 1;
        }

        Self {
            slots,
            enqueue_pos: AtomicU32::new(0),
            dequeue_pos: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    /// Messages longer than [`MAX_MSG_LEN`] are truncated.
    /// Safe for concurrent producers.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots[(pos as usize) & Self::MASK];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos) as i32;

            if diff == 0 {
                match self.enqueue_pos.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        let len = msg.len().min(MAX_MSG_LEN);

                        // SAFETY: the CAS above made this producer the only
                        // owner of the slot until seq is published below.
                        unsafe {
                            let entry = &mut *slot.entry.get();
                            entry.timestamp_us = timestamp_us;
                            entry.level = level;
                            entry.len = len as u8;
                            entry.msg[..len].copy_from_slice(&msg[..len]);
                        }

                        slot.seq.store(pos.wrapping_add(1), Ordering::Release);
                        return true;
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                // Slot still holds an undrained entry from one lap ago
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            } else {
                pos = self.enqueue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available.
    pub fn drain(&self) -> Option<LogEntry> {
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots[(pos as usize) & Self::MASK];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos.wrapping_add(1)) as i32;

            if diff == 0 {
                match self.dequeue_pos.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS above made this drain the only
                        // owner of the published slot.
                        let entry = unsafe { *slot.entry.get() };
                        slot.seq.store(pos.wrapping_add(N as u32), Ordering::Release);
                        return Some(entry);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.dequeue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Number of positions reserved but not yet drained.
    ///
    /// Includes entries a producer is still writing.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.dequeue_pos.load(Ordering::Relaxed);
        let write = self.enqueue_pos.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the end of `buf`.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Truncating `fmt::Write` over a byte slice.
pub(crate) struct BufWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time has no preconditions
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Host builds have no hardware timer; entries are stamped with 0.
#[cfg(not(target_os = "espidf"))]
#[inline]
pub fn timestamp_us() -> i64 {
    0
}

/// Non-blocking log macro.
///
/// # Example
///
/// ```ignore
/// log_event!(LogLevel::Info, stream, "delay set to {} ms", ms);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:expr, $stream:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($crate::logging::timestamp_us(), $level, &buf[..len]);
    }};
}

/// Non-blocking error log.
#[macro_export]
macro_rules! log_error {
    ($stream:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Error, $stream, $($arg)*)
    };
}

/// Non-blocking warning log.
#[macro_export]
macro_rules! log_warn {
    ($stream:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Warn, $stream, $($arg)*)
    };
}

/// Non-blocking info log.
#[macro_export]
macro_rules! log_info {
    ($stream:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Info, $stream, $($arg)*)
    };
}

/// Non-blocking debug log.
#[macro_export]
macro_rules! log_debug {
    ($stream:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Debug, $stream, $($arg)*)
    };
}
