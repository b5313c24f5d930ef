//! Hardware collaborators of the timekeeping subsystem.
//!
//! All hardware access goes through these three traits so the
//! calibration loop and the stopwatch can be driven on the build host
//! by the deterministic stand-ins in [`crate::sim`]. The real x86_64
//! backends live in [`x86`].

use core::fmt;

/// The monotonic free-running cycle counter.
///
/// Reads must be cheap; the calibration loop timestamps between two
/// port reads and any hidden work inflates the jitter bound.
pub trait CycleCounter {
    /// Current counter value. Unitless until calibrated.
    fn read(&self) -> u64;
}

/// The reference oscillator: one PIT channel in one-shot binary mode.
///
/// Implementations must have exclusive use of the channel for as long
/// as a calibration attempt runs; a concurrent access corrupts the
/// measurement (single-core, non-preemptive polling is assumed).
pub trait PitChannel {
    /// Program the channel for a gated one-shot binary countdown with
    /// the speaker output disabled.
    fn setup_oneshot(&mut self);

    /// Load the reload register, low byte then high byte. The countdown
    /// starts on the next oscillator edge.
    fn write_reload(&mut self, low: u8, high: u8);

    /// Read one byte of the live counting element. Consecutive reads
    /// alternate low byte, high byte.
    fn read_count(&mut self) -> u8;
}

/// Console output collaborator.
///
/// Carries result lines and error notices to whoever is watching the
/// kernel console. The exact formatting is not contractual.
pub trait Console {
    /// Emit one line.
    fn line(&mut self, args: fmt::Arguments);
}

/// Production backends for x86_64.
#[cfg(target_arch = "x86_64")]
pub mod x86 {
    use core::fmt;

    use super::{Console, CycleCounter, PitChannel};

    /// The CPU time stamp counter.
    #[derive(Debug, Default)]
    pub struct Tsc;

    impl CycleCounter for Tsc {
        #[inline]
        fn read(&self) -> u64 {
            khal::cpu::read_tsc()
        }
    }

    /// PIT channel 2 behind ports 0x42/0x43/0x61.
    #[derive(Debug)]
    pub struct PitPorts {
        _exclusive: (),
    }

    impl PitPorts {
        /// # Safety
        ///
        /// The caller must guarantee exclusive access to PIT channel 2
        /// and the port 0x61 gate bits for the lifetime of the value.
        pub const unsafe fn new() -> Self {
            Self { _exclusive: () }
        }
    }

    impl PitChannel for PitPorts {
        fn setup_oneshot(&mut self) {
            // SAFETY: exclusivity guaranteed by the `new` contract.
            unsafe { khal::pit::init_channel2_oneshot() }
        }

        fn write_reload(&mut self, low: u8, high: u8) {
            // SAFETY: as above.
            unsafe { khal::pit::load_channel2(low, high) }
        }

        fn read_count(&mut self) -> u8 {
            // SAFETY: as above.
            unsafe { khal::pit::read_channel2() }
        }
    }

    /// Console that writes through the COM1 transmitter.
    #[derive(Debug, Default)]
    pub struct SerialConsole;

    impl Console for SerialConsole {
        fn line(&mut self, args: fmt::Arguments) {
            khal::serial::write_fmt(format_args!("{args}\n"));
        }
    }
}
