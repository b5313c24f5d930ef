//! Hardware time reference.
//!
//! The TSC is the only counter cheap enough to timestamp with, but its
//! rate is unknown at boot. This crate derives that rate by calibrating
//! against the PIT, the one oscillator on the board with a precisely
//! known frequency, and then exposes a small set of named timer sources
//! plus a start/stop stopwatch that converts cycle deltas to seconds.
//!
//! Layering, bottom up:
//! - [`hw`] — traits for the cycle counter, the PIT channel and the
//!   console, with x86_64 backends;
//! - [`calibrate`] — MSB transition detection and the quick
//!   calibration loop;
//! - [`freq`] — retry policy and the write-once frequency cache;
//! - [`source`] — the closed registry of named timer sources;
//! - [`session`] — the [`Timekeeper`] owning all of the above.
//!
//! Everything is simulation-friendly: [`sim`] provides deterministic
//! hardware so the whole stack runs under ordinary host tests.
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod calibrate;
pub mod freq;
pub mod hw;
pub mod session;
pub mod sim;
pub mod source;

#[cfg(test)]
mod testutil;

pub use freq::CpuFrequency;
pub use hw::{Console, CycleCounter, PitChannel};
pub use session::{Session, Timekeeper};
pub use source::{Hpet, TimerError, TimerId};
