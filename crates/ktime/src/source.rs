//! Timer source registry.
//!
//! A closed set of named frequency providers. Adding a source means
//! adding a variant; every dispatch site is an exhaustive match, so the
//! compiler flags the new arm.

use core::fmt;

/// Identity of a timer source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// The reference oscillator. Its frequency is the calibrated CPU
    /// frequency (the PIT is what the TSC is calibrated against).
    Pit,
    /// High precision event timer, block 0.
    Hpet0,
    /// High precision event timer, block 1.
    Hpet1,
    /// ACPI power management timer. Recognized, not implemented.
    AcpiPm,
}

impl TimerId {
    /// Parse a timer name. Case-sensitive exact match.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pit" => Some(Self::Pit),
            "hpet0" => Some(Self::Hpet0),
            "hpet1" => Some(Self::Hpet1),
            "pm" => Some(Self::AcpiPm),
            _ => None,
        }
    }

    /// The stable lookup name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pit => "pit",
            Self::Hpet0 => "hpet0",
            Self::Hpet1 => "hpet1",
            Self::AcpiPm => "pm",
        }
    }

    /// Parse a name and require a usable source behind it.
    ///
    /// Distinguishes a name nobody registered from a registered name
    /// whose implementation is deliberately absent.
    pub fn resolve(name: &str) -> Result<Self, TimerError> {
        match Self::from_name(name) {
            None => Err(TimerError::UnknownTimer),
            Some(Self::AcpiPm) => Err(TimerError::Unsupported),
            Some(id) => Ok(id),
        }
    }
}

/// Registry lookup failures. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The name matches no registered source.
    UnknownTimer,
    /// The name is registered but the source is not implemented.
    Unsupported,
}

impl TimerError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTimer => "no such timer",
            Self::Unsupported => "unsupported timer",
        }
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one HPET block.
///
/// Descriptor parsing lives elsewhere; by the time a handle exists its
/// counter frequency is known and fixed.
#[derive(Debug, Clone, Copy)]
pub struct Hpet {
    hz: u64,
}

impl Hpet {
    pub const fn new(hz: u64) -> Self {
        Self { hz }
    }

    /// Counter frequency in Hz.
    pub const fn frequency(self) -> u64 {
        self.hz
    }
}
