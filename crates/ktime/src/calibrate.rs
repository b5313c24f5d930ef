//! Quick TSC calibration against the PIT.
//!
//! The PIT input clock is the one precisely known frequency on the
//! board, so the TSC rate is recovered by counting TSC cycles across a
//! known number of PIT ticks. The countdown register is only observable
//! through byte-wide port reads, so the anchor event is the transition
//! of the most significant count byte: it moves once every 256 ticks
//! (about 214 us), slow enough to confirm with repeated reads and sharp
//! enough to timestamp.
//!
//! Each anchored transition also carries an error bound: the TSC delta
//! between the last read that still saw the old value and the read
//! after it. The sampling loop runs until the sum of the two bounds
//! drops below delta/2048 of the measured interval, roughly 488 ppm,
//! and gives up after a 25 ms budget.

use crate::hw::{CycleCounter, PitChannel};

/// Input clock of the i8253/i8254 PIT, in Hz.
pub const PIT_TICK_RATE: u64 = 1_193_182;

/// Ceiling on confirmation reads for a single MSB value. Reached only
/// when the counter is stuck, e.g. absent or badly emulated hardware.
const MAX_MSB_POLLS: u32 = 50_000;

/// An MSB value must survive more than this many confirmations to be
/// trusted. Each confirmation costs two port reads (about 2 us on real
/// hardware against a 214 us MSB period), so a healthy machine sees on
/// the order of a hundred. Fewer means the CPU or the PIT is too slow
/// for this method, or the value was already gone when we arrived.
const MIN_MSB_POLLS: u32 = 6;

/// Wall-clock budget for one calibration attempt.
const MAX_QUICK_PIT_MS: u64 = 25;

/// MSB steps observable within the budget (one step per 256 PIT ticks).
const MAX_QUICK_PIT_ITERATIONS: u64 = MAX_QUICK_PIT_MS * PIT_TICK_RATE / 1000 / 256;

/// One anchored MSB transition.
struct MsbSample {
    /// TSC value at the last read that still saw the expected MSB.
    tsc: u64,
    /// Upper bound on the read latency around the transition.
    jitter: u64,
}

/// Two ordered reads of the countdown register: throw away the low
/// byte, compare the most significant byte against `expected`.
fn pit_verify_msb(pit: &mut impl PitChannel, expected: u8) -> bool {
    pit.read_count();
    pit.read_count() == expected
}

/// Poll until the countdown MSB moves past `expected`, anchoring a TSC
/// timestamp to the last confirmation.
///
/// `None` means the value did not persist long enough to trust (or, at
/// the poll ceiling, that the counter is stuck; the next expected value
/// then fails instead).
fn pit_expect_msb(
    pit: &mut impl PitChannel,
    counter: &impl CycleCounter,
    expected: u8,
) -> Option<MsbSample> {
    let mut tsc = 0u64;
    let mut polls = 0u32;
    while polls < MAX_MSB_POLLS {
        polls += 1;
        if !pit_verify_msb(pit, expected) {
            break;
        }
        tsc = counter.read();
    }
    let jitter = counter.read().wrapping_sub(tsc);
    (polls > MIN_MSB_POLLS).then_some(MsbSample { tsc, jitter })
}

/// One quick calibration attempt.
///
/// Returns the TSC frequency in kHz, or `None` when no sample chain
/// reached the error threshold within the budget. Callers retry; see
/// [`crate::freq::CpuFrequency`].
pub fn quick_pit_calibrate(
    pit: &mut impl PitChannel,
    counter: &impl CycleCounter,
) -> Option<u64> {
    pit.setup_oneshot();

    // Start the countdown from the top.
    pit.write_reload(0xFF, 0xFF);

    // Counting begins on the next oscillator edge. One throwaway read
    // pair is comfortably longer than that edge delay.
    pit_verify_msb(pit, 0);

    let baseline = pit_expect_msb(pit, counter, 0xFF)?;

    for i in 1..=MAX_QUICK_PIT_ITERATIONS {
        let sample = pit_expect_msb(pit, counter, 0xFF - i as u8)?;
        let delta = sample.tsc.wrapping_sub(baseline.tsc);

        // Keep sampling until the error bounds shrink below ~488 ppm
        // of the measured interval.
        if baseline.jitter + sample.jitter >= delta >> 11 {
            continue;
        }

        // One more independent check that the counter is where the
        // accepted sample says it should be. A transition that cannot
        // be re-confirmed was seen by luck, not measured.
        if !pit_verify_msb(pit, 0xFE - i as u8) {
            return None;
        }

        // Centre the interval inside its error bars, then:
        //   kHz = cycles / seconds / 1000
        //       = delta / (i * 256 / PIT_TICK_RATE) / 1000
        //       = delta * PIT_TICK_RATE / (i * 256 * 1000)
        let centre = (sample.jitter as i64 - baseline.jitter as i64) / 2;
        let delta = delta.wrapping_add(centre as u64);
        return Some(delta * PIT_TICK_RATE / (i * 256 * 1000));
    }

    None
}
