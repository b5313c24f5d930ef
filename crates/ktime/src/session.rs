//! Elapsed-time stopwatch over the timer sources.

use crate::freq::CpuFrequency;
use crate::hw::{Console, CycleCounter, PitChannel};
use crate::source::{Hpet, TimerError, TimerId};

/// Stopwatch state. `Idle` carries nothing, so a snapshot can only be
/// read while a session is actually running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Idle,
    Running {
        /// Source selected at start time.
        source: TimerId,
        /// Cycle counter snapshot taken at start time.
        start: u64,
    },
}

/// The timekeeping subsystem as one owned state object.
///
/// Owns the hardware collaborators, the calibration cache, the HPET
/// handles and the stopwatch state. There is no interior locking: a
/// multi-core kernel wraps the whole value in a `spin::Mutex` so that a
/// start/stop pair cannot interleave with another core's.
pub struct Timekeeper<P, C, W> {
    pit: P,
    counter: C,
    console: W,
    cpu: CpuFrequency,
    hpet0: Hpet,
    hpet1: Hpet,
    session: Session,
}

impl<P, C, W> Timekeeper<P, C, W>
where
    P: PitChannel,
    C: CycleCounter,
    W: Console,
{
    pub fn new(pit: P, counter: C, console: W, hpet0: Hpet, hpet1: Hpet) -> Self {
        Self {
            pit,
            counter,
            console,
            cpu: CpuFrequency::new(),
            hpet0,
            hpet1,
            session: Session::Idle,
        }
    }

    /// The calibrated CPU frequency in Hz (calibrating on first call).
    pub fn cpu_frequency(&mut self) -> u64 {
        self.cpu.get(&mut self.pit, &self.counter, &mut self.console)
    }

    /// Frequency of a source in Hz.
    pub fn frequency(&mut self, id: TimerId) -> Result<u64, TimerError> {
        match id {
            TimerId::Pit => Ok(self.cpu.get(&mut self.pit, &self.counter, &mut self.console)),
            TimerId::Hpet0 => Ok(self.hpet0.frequency()),
            TimerId::Hpet1 => Ok(self.hpet1.frequency()),
            TimerId::AcpiPm => Err(TimerError::Unsupported),
        }
    }

    /// Start a session against the named source.
    ///
    /// A bad name is reported and leaves the stopwatch idle. Starting
    /// while already running is rejected and the in-flight session is
    /// left untouched.
    pub fn start(&mut self, name: &str) {
        let id = match TimerId::resolve(name) {
            Ok(id) => id,
            Err(err) => {
                self.console
                    .line(format_args!("timer_start: {err} {name}"));
                return;
            }
        };
        if let Session::Running { .. } = self.session {
            self.console
                .line(format_args!("timer_start: timer already running"));
            return;
        }
        self.session = Session::Running {
            source: id,
            start: self.counter.read(),
        };
    }

    /// Stop the running session and report whole elapsed seconds.
    ///
    /// Sub-second durations truncate to zero. Stopping without a
    /// matching start reports a timer error and changes nothing.
    pub fn stop(&mut self) {
        let Session::Running { source, start } = self.session else {
            self.console.line(format_args!("Timer Error"));
            return;
        };
        let elapsed = self.counter.read().wrapping_sub(start);
        self.session = Session::Idle;
        match self.frequency(source) {
            Ok(hz) => self.console.line(format_args!("{}", elapsed / hz)),
            Err(_) => self.console.line(format_args!("Timer Error")),
        }
    }

    /// Report the named source's frequency. Independent of, and without
    /// effect on, the session state.
    pub fn query_frequency(&mut self, name: &str) {
        match TimerId::resolve(name).and_then(|id| self.frequency(id)) {
            Ok(hz) => self.console.line(format_args!("{hz}")),
            Err(err) => self
                .console
                .line(format_args!("timer_cpu_frequency: {err} {name}")),
        }
    }

    /// Current stopwatch state.
    pub fn session(&self) -> Session {
        self.session
    }

    /// Cached CPU frequency, if calibration has run.
    pub fn cached_cpu_frequency(&self) -> Option<u64> {
        self.cpu.cached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimClock, SimCounter, SimPit};
    use crate::testutil::Capture;
    use core::cell::RefCell;
    use std::string::String;
    use std::vec::Vec;

    fn timekeeper<'a>(
        clock: &'a SimClock,
        lines: &'a RefCell<Vec<String>>,
    ) -> Timekeeper<SimPit<'a>, SimCounter<'a>, Capture<'a>> {
        Timekeeper::new(
            clock.pit(),
            clock.counter(),
            Capture(lines),
            Hpet::new(14_318_180),
            Hpet::new(100_000_000),
        )
    }

    #[test]
    fn start_with_bad_name_stays_idle() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        tk.start("bogus");
        assert_eq!(tk.session(), Session::Idle);
        assert_eq!(lines.borrow()[0], "timer_start: no such timer bogus");

        tk.stop();
        assert_eq!(lines.borrow()[1], "Timer Error");
    }

    #[test]
    fn stop_without_start_reports_and_leaves_cache_alone() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        tk.stop();
        assert_eq!(lines.borrow().as_slice(), ["Timer Error"]);
        assert_eq!(tk.cached_cpu_frequency(), None);
        assert_eq!(clock.port_reads(), 0);
    }

    #[test]
    fn immediate_stop_reports_zero_seconds_and_is_repeatable() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        for round in 0..2 {
            tk.start("pit");
            tk.stop();
            assert_eq!(lines.borrow()[round], "0");
            assert_eq!(tk.session(), Session::Idle);
        }
    }

    #[test]
    fn elapsed_seconds_truncate() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        // Calibrate first so the advance below is the whole measurement.
        let hz = tk.cpu_frequency();
        lines.borrow_mut().clear();

        tk.start("hpet0");
        clock.advance(3 * 14_318_180 + 14_318_179);
        tk.stop();
        assert_eq!(lines.borrow()[0], "3");

        tk.start("pit");
        clock.advance(2 * hz + hz / 2);
        tk.stop();
        assert_eq!(lines.borrow()[1], "2");
    }

    #[test]
    fn reentrant_start_is_rejected_and_session_survives() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        tk.start("hpet1");
        let running = tk.session();
        tk.start("pit");
        assert_eq!(lines.borrow()[0], "timer_start: timer already running");
        assert_eq!(tk.session(), running);

        clock.advance(100_000_000);
        tk.stop();
        assert_eq!(lines.borrow()[1], "1");
    }

    #[test]
    fn start_pm_is_rejected_as_unsupported() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        tk.start("pm");
        assert_eq!(tk.session(), Session::Idle);
        assert_eq!(lines.borrow()[0], "timer_start: unsupported timer pm");
    }

    #[test]
    fn query_frequency_does_not_touch_the_session() {
        let clock = SimClock::new(2_000_000, 2_000);
        let lines = RefCell::new(Vec::new());
        let mut tk = timekeeper(&clock, &lines);

        tk.start("hpet0");
        let running = tk.session();
        tk.query_frequency("hpet1");
        assert_eq!(lines.borrow()[0], "100000000");
        assert_eq!(tk.session(), running);
    }
}
