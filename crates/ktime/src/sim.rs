//! Deterministic hardware stand-ins.
//!
//! A [`SimClock`] models the one physical fact the calibration depends
//! on: TSC cycles and PIT ticks advance in a fixed ratio, and every
//! port read costs bus time. Unit tests drive the whole subsystem
//! against it with reproducible results, including fault injection (a
//! dead counter) and read instrumentation.

use core::cell::Cell;

use crate::calibrate::PIT_TICK_RATE;
use crate::hw::{CycleCounter, PitChannel};

/// Shared simulated time base.
pub struct SimClock {
    /// Current simulated TSC value.
    now: Cell<u64>,
    /// Total PIT data port reads, across all derived devices.
    port_reads: Cell<u64>,
    /// Simulated TSC rate in kHz.
    tsc_khz: u64,
    /// TSC cycles consumed by one port read.
    cycles_per_port_read: u64,
}

impl SimClock {
    pub fn new(tsc_khz: u64, cycles_per_port_read: u64) -> Self {
        Self {
            now: Cell::new(0),
            port_reads: Cell::new(0),
            tsc_khz,
            cycles_per_port_read,
        }
    }

    /// Current simulated TSC value.
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Advance simulated time by `cycles`.
    pub fn advance(&self, cycles: u64) {
        self.now.set(self.now.get() + cycles);
    }

    /// PIT data port reads observed so far.
    pub fn port_reads(&self) -> u64 {
        self.port_reads.get()
    }

    /// A cycle counter view of this clock. Reads are free, like a real
    /// register read next to port I/O.
    pub fn counter(&self) -> SimCounter<'_> {
        SimCounter { clock: self }
    }

    /// A healthy PIT channel driven by this clock.
    pub fn pit(&self) -> SimPit<'_> {
        SimPit {
            clock: self,
            dead: false,
            reload: 0,
            started_at: None,
            read_low_next: true,
        }
    }

    /// A PIT channel whose counter never moves and reads as zero, as
    /// absent or broken hardware would.
    pub fn dead_pit(&self) -> SimPit<'_> {
        SimPit {
            clock: self,
            dead: true,
            reload: 0,
            started_at: None,
            read_low_next: true,
        }
    }
}

/// [`CycleCounter`] backed by a [`SimClock`].
pub struct SimCounter<'a> {
    clock: &'a SimClock,
}

impl CycleCounter for SimCounter<'_> {
    fn read(&self) -> u64 {
        self.clock.now()
    }
}

/// Simulated one-shot PIT channel.
pub struct SimPit<'a> {
    clock: &'a SimClock,
    dead: bool,
    reload: u16,
    started_at: Option<u64>,
    read_low_next: bool,
}

impl SimPit<'_> {
    fn current_count(&self) -> u16 {
        if self.dead {
            return 0;
        }
        match self.started_at {
            None => self.reload,
            Some(t0) => {
                let cycles = self.clock.now().saturating_sub(t0);
                let ticks = cycles * PIT_TICK_RATE / (self.clock.tsc_khz * 1000);
                self.reload.saturating_sub(ticks.min(u64::from(u16::MAX)) as u16)
            }
        }
    }
}

impl PitChannel for SimPit<'_> {
    fn setup_oneshot(&mut self) {
        // A command write resets the lobyte/hibyte access flip-flop.
        self.read_low_next = true;
    }

    fn write_reload(&mut self, low: u8, high: u8) {
        if self.dead {
            return;
        }
        self.reload = u16::from_le_bytes([low, high]);
        self.started_at = Some(self.clock.now());
    }

    fn read_count(&mut self) -> u8 {
        self.clock.advance(self.clock.cycles_per_port_read);
        self.clock.port_reads.set(self.clock.port_reads.get() + 1);
        let count = self.current_count();
        let byte = if self.read_low_next {
            count as u8
        } else {
            (count >> 8) as u8
        };
        self.read_low_next = !self.read_low_next;
        byte
    }
}
