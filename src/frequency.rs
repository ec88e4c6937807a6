//! Frequency synthesizer register math.
//!
//! With the LO divider at 4 the CC112x synthesizes
//!
//! ```text
//! f_rf = (FREQ * f_xosc / 2^16 + FREQOFF * f_xosc / 2^18) / 4
//! ```
//!
//! which gives `FREQ = f_rf * 2^18 / f_xosc - FREQOFF / 4`. Both terms are
//! truncated toward zero; downlink reception depends on getting the exact same
//! register value for a given frequency, so the math stays in integers.

use crate::error::Error;
use crate::profile::{Crystal, FrequencyOffset};
use core::ops::RangeInclusive;

/// Band covered with `FS_CFG.FSD_BANDSELECT` at LO divider 4.
pub const SYNTHESIZER_BAND_HZ: RangeInclusive<u32> = 820_000_000..=960_000_000;

/// 24-bit `FREQ2:FREQ1:FREQ0` value for `freq_hz` with `offset` in `FREQOFF`.
///
/// # Errors
/// [`Error::FrequencyOutOfRange`] outside of [`SYNTHESIZER_BAND_HZ`].
pub fn frequency_register(
    freq_hz: u32,
    crystal: Crystal,
    offset: FrequencyOffset,
) -> Result<u32, Error> {
    if !SYNTHESIZER_BAND_HZ.contains(&freq_hz) {
        return Err(Error::FrequencyOutOfRange(freq_hz));
    }
    let main = ((freq_hz as u64) << 18) / crystal.hz() as u64;
    let correction = (offset.0 / 4) as u64;
    Ok((main - correction) as u32 & 0x00FF_FFFF)
}

/// Splits a frequency register value into `[FREQ2, FREQ1, FREQ0]`.
pub fn register_bytes(freq_reg: u32) -> [u8; 3] {
    [
        ((freq_reg >> 16) & 0xFF) as u8,
        ((freq_reg >> 8) & 0xFF) as u8,
        (freq_reg & 0xFF) as u8,
    ]
}

/// Carrier frequency in Hz produced by `freq_reg` and `offset`, rounding down.
pub fn frequency_hz(freq_reg: u32, crystal: Crystal, offset: FrequencyOffset) -> u32 {
    let quarter_steps = 4 * freq_reg as u64 + offset.0 as u64;
    ((quarter_steps * crystal.hz() as u64) >> 20) as u32
}

/// Synthesizer resolution of the main frequency register in Hz, rounded up.
pub fn frequency_step_hz(crystal: Crystal) -> u32 {
    crystal.hz().div_ceil(1 << 18)
}
