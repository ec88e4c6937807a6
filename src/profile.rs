//! Hardware and regulatory profiles.
//!
//! A [`Profile`] is selected once at startup and bundles everything that differs
//! between boards and regions: the crystal connected to the transceiver, the
//! regulatory region (bit rate, timer preloads, default frequencies) and the
//! empirically tuned [`Calibration`] data.
//!
//! Calibration values are opaque per-platform data. They were tuned on an
//! MSP430F5438A running the reference firmware and must be carried as they
//! are, never re-derived.

use crate::timer::TimerConfig;

/// Crystal oscillator connected to the transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Crystal {
    /// 32 MHz reference (CC1120 BoosterPack).
    Mhz32,
    /// 40 MHz reference (CC1125EM CAT1 868).
    Mhz40,
}

impl Crystal {
    /// Oscillator frequency in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            Crystal::Mhz32 => 32_000_000,
            Crystal::Mhz40 => 40_000_000,
        }
    }

    /// The three `FREQOFF` states used by the modulation primitive.
    pub const fn offsets(self) -> OffsetTable {
        match self {
            Crystal::Mhz32 => OffsetTable {
                neutral: FrequencyOffset::from_registers(0x02, 0x58),
                low: FrequencyOffset::from_registers(0x00, 0x64),
                high: FrequencyOffset::from_registers(0x04, 0x4C),
            },
            Crystal::Mhz40 => OffsetTable {
                neutral: FrequencyOffset::from_registers(0x02, 0x58),
                low: FrequencyOffset::from_registers(0x00, 0xC8),
                high: FrequencyOffset::from_registers(0x03, 0xE8),
            },
        }
    }
}

/// A value of the `FREQOFF1:FREQOFF0` register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyOffset(pub u16);

impl FrequencyOffset {
    /// Builds the offset from its high (`FREQOFF1`) and low (`FREQOFF0`) bytes.
    pub const fn from_registers(freqoff1: u8, freqoff0: u8) -> Self {
        FrequencyOffset(((freqoff1 as u16) << 8) | freqoff0 as u16)
    }

    /// `FREQOFF1` byte.
    pub const fn high_byte(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// `FREQOFF0` byte.
    pub const fn low_byte(self) -> u8 {
        self.0 as u8
    }
}

/// Centered, lowered and raised frequency offsets.
///
/// `low` and `high` sit the same number of synthesizer steps below and above
/// `neutral`, so alternating them keeps the accumulated phase centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OffsetTable {
    /// Offset written at rest and between symbols.
    pub neutral: FrequencyOffset,
    /// Offset used by every other modulated symbol.
    pub low: FrequencyOffset,
    /// Offset used by the symbols in between.
    pub high: FrequencyOffset,
}

/// Regulatory region, selecting bit rate and carrier frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// FCC style regions: 600 bit/s.
    Fcc,
    /// ETSI style regions: 100 bit/s.
    Etsi,
}

impl Region {
    /// Uplink bit rate in bits per second.
    pub const fn bit_rate(self) -> u32 {
        match self {
            Region::Fcc => 600,
            Region::Etsi => 100,
        }
    }

    /// Default uplink carrier frequency in Hz.
    pub const fn default_tx_frequency(self) -> u32 {
        match self {
            Region::Fcc => 902_200_000,
            Region::Etsi => 868_130_000,
        }
    }

    /// Default downlink carrier frequency in Hz.
    pub const fn default_rx_frequency(self) -> u32 {
        match self {
            Region::Fcc => 905_200_000,
            Region::Etsi => 869_525_000,
        }
    }

    /// Bit-rate timer preload for the reference MSP430 clock tree.
    ///
    /// FCC counts 39990 SMCLK cycles per bit, ETSI counts 29982 cycles of
    /// SMCLK/8. Both start 45 counts in to absorb the SPI latency of the first
    /// symbol.
    pub const fn bit_timer(self) -> TimerConfig {
        match self {
            Region::Fcc => TimerConfig {
                period_counts: 39_990,
                clock_divider: 1,
                initial_count: 45,
            },
            Region::Etsi => TimerConfig {
                period_counts: 29_982,
                clock_divider: 8,
                initial_count: 45,
            },
        }
    }

    /// Delay after each PA ramp step of the modulation primitive, in MCU cycles.
    pub const fn ramp_step_cycles(self) -> u32 {
        match self {
            Region::Fcc => 57,
            Region::Etsi => 1000,
        }
    }
}

/// `PA_CFG2` ramp, from full power down to off.
///
/// Ramp-down walks it front to back, ramp-up back to front.
pub const PA_RAMP: [u8; 16] = [
    0x3F, 0x3C, 0x38, 0x33, 0x2D, 0x27, 0x21, 0x1B, 0x16, 0x11, 0x0D, 0x09, 0x06, 0x03, 0x01,
    0x00,
];

/// Empirically tuned timing and PA data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// MCU core clock the cycle counts below refer to.
    pub mcu_clock_hz: u32,
    /// Delay after each PA ramp step inside a modulated symbol.
    pub ramp_step_cycles: u32,
    /// Hold time of the shifted offset, accumulating a phase of pi.
    pub phase_accumulation_cycles: u32,
    /// Delay after each PA step of a carrier ramp-up/ramp-down.
    pub carrier_step_cycles: u32,
    /// PA ramp table, full power first.
    pub pa_ramp: &'static [u8],
    /// Downlink timer preload for a one second tick.
    pub downlink_timer: TimerConfig,
}

impl Calibration {
    /// Reference calibration for the given region.
    pub const fn reference(region: Region) -> Self {
        Calibration {
            mcu_clock_hz: 20_000_000,
            ramp_step_cycles: region.ramp_step_cycles(),
            phase_accumulation_cycles: 320,
            carrier_step_cycles: 320,
            pa_ramp: &PA_RAMP,
            downlink_timer: TimerConfig {
                period_counts: 32_700,
                clock_divider: 1,
                initial_count: 0,
            },
        }
    }
}

/// Board + region selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Crystal of the transceiver.
    pub crystal: Crystal,
    /// Regulatory region.
    pub region: Region,
    /// Tuned timing data.
    pub calibration: Calibration,
}

impl Profile {
    /// CC1120 BoosterPack: 32 MHz crystal, CC1190 PA/LNA, FCC.
    pub const CC1120_BOOSTERPACK: Profile = Profile::new(Crystal::Mhz32, Region::Fcc);

    /// CC1125EM CAT1 868: 40 MHz crystal, ETSI.
    pub const CC1125EM_CAT1_868: Profile = Profile::new(Crystal::Mhz40, Region::Etsi);

    /// Profile with the reference calibration.
    pub const fn new(crystal: Crystal, region: Region) -> Self {
        Profile {
            crystal,
            region,
            calibration: Calibration::reference(region),
        }
    }

    /// Replaces the calibration data.
    pub const fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Duration of one symbol in nanoseconds.
    pub const fn bit_period_ns(&self) -> u64 {
        1_000_000_000 / self.region.bit_rate() as u64
    }

    /// Calibrated delay spent inside one modulated symbol, in nanoseconds.
    ///
    /// Two passes over the PA ramp plus the phase accumulation hold. SPI
    /// transfer time comes on top and is platform dependent.
    pub const fn modulation_budget_ns(&self) -> u64 {
        let cal = &self.calibration;
        let cycles = 2 * cal.pa_ramp.len() as u64 * cal.ramp_step_cycles as u64
            + cal.phase_accumulation_cycles as u64;
        cycles * 1_000_000_000 / cal.mcu_clock_hz as u64
    }
}
