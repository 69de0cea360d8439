//! Device-control collaborator.
//!
//! The console never touches gain or delay directly. Everything goes through
//! [`DeviceControl`], which the firmware implements with [`DeviceSettings`]
//! and tests implement with a recording fake.

use core::fmt::Write;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::DeviceConfig;

/// Operations the console needs from the audio device.
pub trait DeviceControl {
    /// Apply a new gain setting in dB.
    fn set_gain_db(&mut self, gain_db: f32);

    /// Current gain in dB.
    fn gain_db(&self) -> f32;

    /// Print the gain status line.
    fn print_gain_settings(&self, out: &mut dyn Write);

    /// Flip the CPU/memory report flag.
    fn toggle_diagnostics(&mut self);

    /// Apply a new delay setting in ms.
    fn set_delay_ms(&mut self, delay_ms: f32);

    /// Current delay in ms.
    fn delay_ms(&self) -> f32;
}

impl<T: DeviceControl + ?Sized> DeviceControl for &mut T {
    fn set_gain_db(&mut self, gain_db: f32) {
        (**self).set_gain_db(gain_db)
    }

    fn gain_db(&self) -> f32 {
        (**self).gain_db()
    }

    fn print_gain_settings(&self, out: &mut dyn Write) {
        (**self).print_gain_settings(out)
    }

    fn toggle_diagnostics(&mut self) {
        (**self).toggle_diagnostics()
    }

    fn set_delay_ms(&mut self, delay_ms: f32) {
        (**self).set_delay_ms(delay_ms)
    }

    fn delay_ms(&self) -> f32 {
        (**self).delay_ms()
    }
}

/// Lock-free gain/delay state.
///
/// Values are stored as `f32` bits so the audio task can read them while the
/// console writes. Out-of-range requests are clamped; NaN is ignored.
pub struct DeviceSettings {
    gain_bits: AtomicU32,
    delay_bits: AtomicU32,
    print_diagnostics: AtomicBool,
    config: DeviceConfig,
}

impl DeviceSettings {
    pub fn new(config: DeviceConfig) -> Self {
        let settings = Self {
            gain_bits: AtomicU32::new(0.0f32.to_bits()),
            delay_bits: AtomicU32::new(0.0f32.to_bits()),
            print_diagnostics: AtomicBool::new(false),
            config,
        };
        settings.store_gain(config.initial_gain_db);
        settings.store_delay(config.initial_delay_ms);
        settings
    }

    #[inline]
    pub fn gain_db(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn delay_ms(&self) -> f32 {
        f32::from_bits(self.delay_bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn diagnostics_enabled(&self) -> bool {
        self.print_diagnostics.load(Ordering::Relaxed)
    }

    /// Store a clamped gain. Returns `false` if the request was NaN.
    pub fn store_gain(&self, gain_db: f32) -> bool {
        if gain_db.is_nan() {
            return false;
        }
        let clamped = gain_db.clamp(self.config.min_gain_db, self.config.max_gain_db);
        self.gain_bits.store(clamped.to_bits(), Ordering::Relaxed);
        true
    }

    /// Store a clamped delay. Returns `false` if the request was NaN.
    pub fn store_delay(&self, delay_ms: f32) -> bool {
        if delay_ms.is_nan() {
            return false;
        }
        let clamped = delay_ms.clamp(0.0, self.config.max_delay_ms);
        self.delay_bits.store(clamped.to_bits(), Ordering::Relaxed);
        true
    }

    /// Flip the diagnostics flag, returning the new state.
    pub fn toggle(&self) -> bool {
        !self.print_diagnostics.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl DeviceControl for DeviceSettings {
    fn set_gain_db(&mut self, gain_db: f32) {
        self.store_gain(gain_db);
    }

    fn gain_db(&self) -> f32 {
        DeviceSettings::gain_db(self)
    }

    fn print_gain_settings(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "Gain = {:.1} dB", DeviceSettings::gain_db(self));
    }

    fn toggle_diagnostics(&mut self) {
        self.toggle();
    }

    fn set_delay_ms(&mut self, delay_ms: f32) {
        self.store_delay(delay_ms);
    }

    fn delay_ms(&self) -> f32 {
        DeviceSettings::delay_ms(self)
    }
}
