//! # cc112x-dbpsk
//!
//! A portable, no_std Rust driver for the DBPSK uplink and the 2-GFSK downlink
//! of TI CC112x transceivers (CC1120, CC1125), as used by ultra narrow band
//! LPWAN devices.
//!
//! The transceiver has no DBPSK modem. This crate produces the symbols in
//! software:
//! - a **bit-rate timer** ticks at 600 Hz (FCC) or 100 Hz (ETSI);
//! - on every tick the foreground loop takes the next bit, MSB first;
//! - a `0` bit ramps the PA down, shifts the synthesizer through `FREQOFF`
//!   long enough to accumulate a phase of pi, recentres it and ramps back up;
//!   a `1` bit leaves the carrier alone.
//!
//! After an uplink the device may listen for a fixed length downlink frame
//! inside a window bounded by a one second countdown.
//!
//! ## Crate features
//! | Feature   | Description |
//! |-----------|-------------|
//! | `std`     | Disables `#![no_std]` and enables the `std` parts of `thiserror` and `critical-section` |
//! | `defmt`   | Uses `defmt` logging and derives `defmt::Format` on public types |
//! | `log`     | Uses `log` logging |
//!
//! ## Layers
//!
//! - [`chip`]: register, FIFO and strobe access over `embedded_hal::spi::SpiDevice`
//! - [`config`], [`profile`], [`frequency`]: register tables, board and region
//!   profiles with their calibration data, synthesizer math
//! - [`radio`]: chip personalities, carrier ramps and the modulation primitive
//! - [`timer`]: the timer seam, the interrupt-shared [`RadioSignals`] and
//!   calibrated delays
//! - [`transmission`]: the bit-serial state machine
//! - [`downlink`]: frame reception and the downlink countdown
//! - [`session`]: [`RadioSession`], the single owner tying it all together
//!
//! ## Integration Notes
//!
//! - Only one [`RadioSignals`] should exist; declare it with
//!   [`declare_radio_signals!`] and call its `on_*` methods from the bit-rate
//!   timer, the one second timer and the sync-word GPIO interrupt handlers.
//! - Register tables and frequency programming must never run from interrupt
//!   context; the session owns the chip.
//! - Ramp, phase and timer preload values in [`profile::Calibration`] were tuned
//!   on the reference board. Re-tune rather than re-derive them on other MCUs.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;

pub mod chip;
pub mod config;
pub mod consts;
pub mod downlink;
pub mod error;
pub mod frequency;
pub mod profile;
pub mod radio;
pub mod session;
pub mod timer;
pub mod transmission;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use session::RadioSession;
pub use timer::RadioSignals;
