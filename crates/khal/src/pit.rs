//! 8254 PIT channel 2 access.
//!
//! Channel 2 is the speaker channel. It is the only PIT channel with a
//! software-controlled gate (port 0x61 bit 0), which makes it the one
//! channel the kernel can use as a free countdown reference without
//! disturbing the IRQ0 path. The speaker output itself stays disabled.

use bitflags::bitflags;
use x86_64::instructions::port::Port;

/// Channel 2 count register (read) / reload register (write).
const PIT_CH2_DATA: u16 = 0x42;
/// Mode/command register (write only).
const PIT_COMMAND: u16 = 0x43;
/// NMI status and control register ("port B" on the original PC/AT).
const NMI_STATUS_CONTROL: u16 = 0x61;

/// Command byte: select channel 2.
const SELECT_CHANNEL_2: u8 = 0b10 << 6;
/// Command byte: access mode low byte then high byte.
const ACCESS_LOBYTE_HIBYTE: u8 = 0b11 << 4;
/// Command byte: mode 0 (interrupt on terminal count), binary counting.
///
/// Mode 0 is a plain one-shot decrement-by-one countdown. Mode 2 would
/// decrement by two per input clock, which ruins byte-level reads of the
/// counting element.
const MODE_0_BINARY: u8 = 0;

bitflags! {
    /// Port 0x61 bits relevant to channel 2.
    struct PortB: u8 {
        /// Channel 2 gate input. The counter only runs while this is set.
        const TIMER2_GATE = 1 << 0;
        /// Channel 2 output to the speaker. Kept clear; we never beep.
        const SPEAKER_DATA = 1 << 1;
    }
}

/// Program channel 2 for a one-shot binary countdown.
///
/// Raises the channel 2 gate, disconnects the speaker, and writes the
/// mode byte. The countdown itself does not start until a reload value
/// is written via [`load_channel2`].
///
/// # Safety
///
/// The caller must have exclusive access to the PIT. Concurrent use of
/// channel 2 (or a reprogram of the command register) corrupts the
/// countdown.
pub unsafe fn init_channel2_oneshot() {
    let mut port_b = Port::<u8>::new(NMI_STATUS_CONTROL);
    let mut command = Port::<u8>::new(PIT_COMMAND);

    let current = PortB::from_bits_retain(port_b.read());
    let gated = (current - PortB::SPEAKER_DATA) | PortB::TIMER2_GATE;
    port_b.write(gated.bits());

    command.write(SELECT_CHANNEL_2 | ACCESS_LOBYTE_HIBYTE | MODE_0_BINARY);
}

/// Load the channel 2 reload register, low byte then high byte.
///
/// In mode 0 the countdown starts on the input clock edge after the
/// high byte lands.
///
/// # Safety
///
/// Same exclusivity requirement as [`init_channel2_oneshot`].
pub unsafe fn load_channel2(low: u8, high: u8) {
    let mut data = Port::<u8>::new(PIT_CH2_DATA);
    data.write(low);
    data.write(high);
}

/// Read one byte of the channel 2 counting element.
///
/// With lobyte/hibyte access and no latch command, consecutive reads
/// alternate between the low and the high byte of the live counter.
/// Callers always read in pairs to keep the access flip-flop aligned.
///
/// # Safety
///
/// Same exclusivity requirement as [`init_channel2_oneshot`].
pub unsafe fn read_channel2() -> u8 {
    let mut data = Port::<u8>::new(PIT_CH2_DATA);
    data.read()
}
