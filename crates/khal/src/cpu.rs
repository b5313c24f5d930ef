//! CPU cycle counter access.

/// Read the Time Stamp Counter.
///
/// The TSC is a 64-bit free-running counter that increments at a fixed
/// rate from reset. The rate is not architecturally defined; `ktime`
/// derives it by calibrating against the PIT.
///
/// The read itself is non-serializing. That is what the calibration
/// loop wants: the cheapest possible timestamp between two port reads.
#[inline]
pub fn read_tsc() -> u64 {
    let low: u32;
    let high: u32;
    // SAFETY: RDTSC is available on every x86_64 CPU and has no side
    // effects. It returns the 64-bit counter in EDX:EAX.
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") low,
            out("edx") high,
            options(nomem, nostack)
        );
    }
    ((high as u64) << 32) | (low as u64)
}
