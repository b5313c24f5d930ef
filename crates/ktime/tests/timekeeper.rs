//! End-to-end checks of the timekeeping subsystem against simulated
//! hardware.

use core::cell::RefCell;
use core::fmt;

use ktime::sim::{SimClock, SimCounter, SimPit};
use ktime::{Console, Hpet, Timekeeper};

struct Capture<'a>(&'a RefCell<Vec<String>>);

impl Console for Capture<'_> {
    fn line(&mut self, args: fmt::Arguments) {
        self.0.borrow_mut().push(format!("{args}"));
    }
}

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
fn every_implemented_source_reports_a_positive_frequency() {
    let clock = SimClock::new(2_000_000, 2_000);
    let lines = RefCell::new(Vec::new());
    let mut tk = timekeeper(&clock, &lines);

    for name in ["pit", "hpet0", "hpet1"] {
        tk.query_frequency(name);
    }
    for line in lines.borrow().iter() {
        let hz: u64 = line.parse().expect("frequency report should be a number");
        assert!(hz > 0, "{hz}");
    }
}

#[test]
fn pm_is_reported_unsupported_not_defaulted() {
    let clock = SimClock::new(2_000_000, 2_000);
    let lines = RefCell::new(Vec::new());
    let mut tk = timekeeper(&clock, &lines);

    tk.query_frequency("pm");
    assert_eq!(
        lines.borrow().as_slice(),
        ["timer_cpu_frequency: unsupported timer pm"]
    );
    // Nothing was calibrated or cached on the way to that answer.
    assert_eq!(tk.cached_cpu_frequency(), None);
    assert_eq!(clock.port_reads(), 0);
}

#[test]
fn pit_query_calibrates_once_and_then_serves_the_cache() {
    let clock = SimClock::new(2_000_000, 2_000);
    let lines = RefCell::new(Vec::new());
    let mut tk = timekeeper(&clock, &lines);

    tk.query_frequency("pit");
    let reads = clock.port_reads();
    assert!(reads > 0);

    tk.query_frequency("pit");
    assert_eq!(clock.port_reads(), reads);
    assert_eq!(lines.borrow()[0], lines.borrow()[1]);
}

#[test]
fn calibration_failure_degrades_to_the_default_once() {
    let clock = SimClock::new(2_000_000, 2_000);
    let lines = RefCell::new(Vec::new());
    let mut tk = Timekeeper::new(
        clock.dead_pit(),
        clock.counter(),
        Capture(&lines),
        Hpet::new(14_318_180),
        Hpet::new(100_000_000),
    );

    assert_eq!(tk.cpu_frequency(), 2_500_000_000);
    assert_eq!(tk.cpu_frequency(), 2_500_000_000);
    let notices = lines
        .borrow()
        .iter()
        .filter(|l| l.contains("default frequency"))
        .count();
    assert_eq!(notices, 1);
}

#[test]
fn stopwatch_round_trip() {
    let clock = SimClock::new(2_000_000, 2_000);
    let lines = RefCell::new(Vec::new());
    let mut tk = timekeeper(&clock, &lines);

    // Misuse first: stop with no start.
    tk.stop();
    assert_eq!(lines.borrow()[0], "Timer Error");

    // Immediate start/stop truncates to zero seconds.
    tk.start("pit");
    tk.stop();
    assert_eq!(lines.borrow()[1], "0");

    // A second pair behaves identically.
    tk.start("pit");
    tk.stop();
    assert_eq!(lines.borrow()[2], "0");

    // A measured interval against a fixed-rate source.
    tk.start("hpet0");
    clock.advance(5 * 14_318_180);
    tk.stop();
    assert_eq!(lines.borrow()[3], "5");
}
