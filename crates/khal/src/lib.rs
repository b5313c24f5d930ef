//! Hardware Abstraction Layer.
//!
//! Only the hardware the timekeeping path touches lives here: the CPU
//! cycle counter, PIT channel 2 (the calibration reference), and the
//! COM1 UART the logger writes to.
#![no_std]

pub mod cpu;
pub mod pit;
pub mod serial;
