//! CPU frequency cache and retry policy.

use spin::Once;

use crate::calibrate::quick_pit_calibrate;
use crate::hw::{Console, CycleCounter, PitChannel};

/// Calibration attempts before giving up on the PIT.
const CALIBRATION_RETRIES: u32 = 100;

/// Frequency assumed when every attempt fails, in kHz. Untrusted but
/// safe: elapsed-time results degrade, nothing crashes.
const DEFAULT_CPU_KHZ: u64 = 2_500_000;

/// Write-once cache of the calibrated CPU frequency.
///
/// The first successful attempt is cached for the lifetime of the
/// process and never recomputed. `spin::Once` doubles as the guard
/// against a duplicate-calibration race when several cores reach
/// [`get`](Self::get) at the same time.
pub struct CpuFrequency {
    hz: Once<u64>,
}

impl CpuFrequency {
    pub const fn new() -> Self {
        Self { hz: Once::new() }
    }

    /// The calibrated frequency in Hz, calibrating on first use.
    ///
    /// Repeat calls are pure cache hits with no hardware access. When
    /// every attempt fails, the fixed default is cached instead and a
    /// single notice goes to the console; the
    /// notice cannot repeat because it is emitted inside the one-time
    /// initializer.
    pub fn get(
        &self,
        pit: &mut impl PitChannel,
        counter: &impl CycleCounter,
        console: &mut impl Console,
    ) -> u64 {
        *self.hz.call_once(|| {
            for _ in 0..CALIBRATION_RETRIES {
                if let Some(khz) = quick_pit_calibrate(pit, counter) {
                    log::debug!("TSC calibrated against the PIT: {khz} kHz");
                    return khz * 1000;
                }
            }
            log::warn!(
                "PIT calibration failed {CALIBRATION_RETRIES} times, assuming {DEFAULT_CPU_KHZ} kHz"
            );
            console.line(format_args!(
                "Can't calibrate pit timer. Using default frequency"
            ));
            DEFAULT_CPU_KHZ * 1000
        })
    }

    /// The cached value, if calibration has run.
    pub fn cached(&self) -> Option<u64> {
        self.hz.get().copied()
    }
}

impl Default for CpuFrequency {
    fn default() -> Self {
        Self::new()
    }
}
