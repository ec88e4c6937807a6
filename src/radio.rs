//! Radio configuration, frequency programming and the DBPSK symbol primitive.
//!
//! [`Radio`] owns the transceiver and programs one of two personalities into
//! it: TX for the uplink and RX for the downlink. In TX it produces RF through
//! the [`Modulator`] primitives:
//!
//! - **carrier ramp**: `PA_CFG2` is walked through the calibrated PA ramp so the
//!   burst starts and ends without spectral splatter;
//! - **modulate**: one `0` symbol. The PA is ramped down, the synthesizer is
//!   pushed off-centre through `FREQOFF` for the time it takes to accumulate a
//!   phase of pi, then recentred and the PA ramped back up. Successive symbols
//!   alternate between the low and the high offset so the carrier never drifts.
//!
//! Chip state machine:
//!
//! ```text
//! Uninitialized --init_chip--> TxReady | RxReady --close_chip--> Idle --init_chip--> ...
//! ```
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::spi::Mock as SpiMock;
//! use cc112x_dbpsk::profile::Profile;
//! use cc112x_dbpsk::radio::{ChipState, Radio};
//!
//! # let spi = SpiMock::new(&[]);
//! let radio = Radio::new(spi, NoopDelay::new(), Profile::CC1120_BOOSTERPACK);
//! assert_eq!(radio.state(), ChipState::Uninitialized);
//! # radio.release().0.done();
//! ```

use crate::chip::Chip;
use crate::config::{rx_settings, tx_settings};
use crate::consts::{
    FREQ0, FREQ1, FREQ2, FREQOFF0, FREQOFF1, PA_CFG2, PA_FULL_POWER, PA_OFF, SIDLE, SRES, STX,
};
use crate::error::Error;
use crate::frequency::{frequency_hz, frequency_register, register_bytes};
use crate::profile::{FrequencyOffset, Profile};
use crate::timer::CycleDelay;
use crate::transmission::Modulator;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

/// Personality programmed by [`Radio::init_chip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipMode {
    /// Uplink: custom frequency modulation, PA enabled.
    Tx,
    /// Downlink: 2-GFSK packet reception, LNA enabled.
    Rx,
}

/// Life cycle of the transceiver as seen by the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipState {
    /// Never initialised, or the last initialisation failed.
    #[default]
    Uninitialized,
    /// TX personality loaded.
    TxReady,
    /// RX personality loaded, packet interrupt enabled.
    RxReady,
    /// Idled by [`Radio::close_chip`].
    Idle,
}

/// The sync-word GPIO interrupt of the transceiver.
///
/// Its handler must call
/// [`RadioSignals::on_packet_detected`](crate::timer::RadioSignals::on_packet_detected).
pub trait PacketInterrupt {
    /// Clears any pending edge and unmasks the interrupt.
    fn enable(&mut self);
    /// Masks the interrupt.
    fn disable(&mut self);
}

/// No packet interrupt wired (TX-only boards).
impl PacketInterrupt for () {
    fn enable(&mut self) {}
    fn disable(&mut self) {}
}

/// External PA/LNA switched together with the chip personality.
pub trait FrontEnd {
    /// Drives the enable lines for `mode`.
    fn select(&mut self, mode: ChipMode) -> Result<(), Error>;
}

/// Board without an external front end.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFrontEnd;

impl FrontEnd for NoFrontEnd {
    fn select(&mut self, _mode: ChipMode) -> Result<(), Error> {
        Ok(())
    }
}

/// TI CC1190 range extender with separate PA and LNA enable lines.
#[derive(Debug)]
pub struct Cc1190<PA, LNA> {
    pa_en: PA,
    lna_en: LNA,
}

impl<PA, LNA> Cc1190<PA, LNA>
where
    PA: OutputPin,
    LNA: OutputPin,
{
    /// Wraps the two enable lines.
    pub fn new(pa_en: PA, lna_en: LNA) -> Self {
        Self { pa_en, lna_en }
    }

    /// Gives the pins back.
    pub fn release(self) -> (PA, LNA) {
        (self.pa_en, self.lna_en)
    }
}

impl<PA, LNA> FrontEnd for Cc1190<PA, LNA>
where
    PA: OutputPin,
    LNA: OutputPin,
{
    fn select(&mut self, mode: ChipMode) -> Result<(), Error> {
        match mode {
            ChipMode::Tx => {
                self.pa_en.set_high().map_err(Error::pin)?;
                self.lna_en.set_low().map_err(Error::pin)
            }
            ChipMode::Rx => {
                self.pa_en.set_low().map_err(Error::pin)?;
                self.lna_en.set_high().map_err(Error::pin)
            }
        }
    }
}

/// Radio configuration and frequency engine of a CC112x.
///
/// ## Type Parameters
///
/// - `SPI`: the [`SpiDevice`] the transceiver is on
/// - `D`: a [`DelayNs`] provider for the calibrated ramp and phase delays
/// - `FE`: the external [`FrontEnd`], [`NoFrontEnd`] by default
/// - `IRQ`: the sync-word [`PacketInterrupt`], `()` by default
#[derive(Debug)]
pub struct Radio<SPI, D, FE = NoFrontEnd, IRQ = ()> {
    chip: Chip<SPI>,
    delay: CycleDelay<D>,
    profile: Profile,
    state: ChipState,
    high_offset_next: bool,
    front_end: FE,
    irq: IRQ,
}

impl<SPI, D> Radio<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// A radio without front end or packet interrupt.
    pub fn new(spi: SPI, delay: D, profile: Profile) -> Self {
        Radio::with_peripherals(spi, delay, profile, NoFrontEnd, ())
    }
}

impl<SPI, D, FE, IRQ> Radio<SPI, D, FE, IRQ>
where
    SPI: SpiDevice,
    D: DelayNs,
    FE: FrontEnd,
    IRQ: PacketInterrupt,
{
    /// A radio with an external front end and a packet interrupt.
    pub fn with_peripherals(spi: SPI, delay: D, profile: Profile, front_end: FE, irq: IRQ) -> Self {
        Radio {
            chip: Chip::new(spi),
            delay: CycleDelay::new(delay, profile.calibration.mcu_clock_hz),
            profile,
            state: ChipState::Uninitialized,
            high_offset_next: false,
            front_end,
            irq,
        }
    }

    /// Current chip state.
    pub fn state(&self) -> ChipState {
        self.state
    }

    /// Active profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Register access to the transceiver.
    pub fn chip_mut(&mut self) -> &mut Chip<SPI> {
        &mut self.chip
    }

    /// The calibrated delay provider.
    pub fn delay_mut(&mut self) -> &mut CycleDelay<D> {
        &mut self.delay
    }

    /// Gives the SPI device and the delay provider back.
    pub fn release(self) -> (SPI, D) {
        (self.chip.release(), self.delay.release())
    }

    pub(crate) fn require(&self, expected: ChipState) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::WrongState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Resets the chip and programs the personality for `mode` on `freq_hz`.
    ///
    /// RX unmasks the packet interrupt, TX masks it. The front end follows the
    /// mode: PA on and LNA off for TX, the other way round for RX.
    ///
    /// # Errors
    /// [`Error::FrequencyOutOfRange`] before the chip is touched, or the first
    /// bus/pin failure.
    pub fn init_chip(&mut self, freq_hz: u32, mode: ChipMode) -> Result<(), Error> {
        let offset = self.profile.crystal.offsets().neutral;
        let _ = frequency_register(freq_hz, self.profile.crystal, offset)?;

        // the reset wipes the previous personality
        self.state = ChipState::Uninitialized;
        let _ = self.chip.strobe(SRES)?;
        let _ = self.chip.strobe(SIDLE)?;

        let table = match mode {
            ChipMode::Tx => tx_settings(),
            ChipMode::Rx => rx_settings(self.profile.crystal),
        };
        for setting in table {
            let _ = self.chip.write_byte(setting.addr, setting.data)?;
        }

        match mode {
            ChipMode::Tx => self.irq.disable(),
            ChipMode::Rx => self.irq.enable(),
        }

        self.set_frequency(freq_hz)?;
        self.front_end.select(mode)?;

        self.state = match mode {
            ChipMode::Tx => ChipState::TxReady,
            ChipMode::Rx => ChipState::RxReady,
        };
        info!("radio: {} registers, {} Hz, {:?}", table.len(), freq_hz, self.state);
        Ok(())
    }

    /// Idles the chip.
    pub fn close_chip(&mut self) -> Result<(), Error> {
        let _ = self.chip.strobe(SIDLE)?;
        self.state = ChipState::Idle;
        debug!("radio: closed");
        Ok(())
    }

    /// Programs the carrier to `freq_hz` with the neutral frequency offset.
    ///
    /// `FREQOFF0` and `FREQOFF1` go first, then `FREQ2`, `FREQ1` and `FREQ0`.
    pub fn set_frequency(&mut self, freq_hz: u32) -> Result<(), Error> {
        let neutral = self.profile.crystal.offsets().neutral;
        let freq_reg = frequency_register(freq_hz, self.profile.crystal, neutral)?;

        let _ = self.chip.write_byte(FREQOFF0, neutral.low_byte())?;
        let _ = self.chip.write_byte(FREQOFF1, neutral.high_byte())?;

        let [freq2, freq1, freq0] = register_bytes(freq_reg);
        let _ = self.chip.write_byte(FREQ2, freq2)?;
        let _ = self.chip.write_byte(FREQ1, freq1)?;
        let _ = self.chip.write_byte(FREQ0, freq0)?;
        trace!("radio: FREQ = {:x} for {} Hz", freq_reg, freq_hz);
        Ok(())
    }

    /// Reads the synthesizer back and returns the programmed carrier in Hz.
    pub fn read_frequency(&mut self) -> Result<u32, Error> {
        let mut freq = [0u8; 3];
        for (byte, addr) in freq.iter_mut().zip([FREQ2, FREQ1, FREQ0]) {
            *byte = self.chip.read_byte(addr)?;
        }
        let offset = FrequencyOffset::from_registers(
            self.chip.read_byte(FREQOFF1)?,
            self.chip.read_byte(FREQOFF0)?,
        );
        let freq_reg = u32::from_be_bytes([0, freq[0], freq[1], freq[2]]);
        Ok(frequency_hz(freq_reg, self.profile.crystal, offset))
    }

    fn write_offset(&mut self, offset: FrequencyOffset) -> Result<(), Error> {
        let _ = self.chip.write_byte(FREQOFF1, offset.high_byte())?;
        let _ = self.chip.write_byte(FREQOFF0, offset.low_byte())?;
        Ok(())
    }

    fn ramp_down(&mut self, step_cycles: u32) -> Result<(), Error> {
        for &level in self.profile.calibration.pa_ramp {
            let _ = self.chip.write_byte(PA_CFG2, level)?;
            self.delay.cycles(step_cycles);
        }
        Ok(())
    }

    fn ramp_up(&mut self, step_cycles: u32) -> Result<(), Error> {
        for &level in self.profile.calibration.pa_ramp.iter().rev() {
            let _ = self.chip.write_byte(PA_CFG2, level)?;
            self.delay.cycles(step_cycles);
        }
        Ok(())
    }

    /// Produces one DBPSK `0` symbol.
    ///
    /// The first call after power-up uses the low offset, then low and high
    /// alternate across calls.
    pub fn modulate(&mut self) -> Result<(), Error> {
        self.require(ChipState::TxReady)?;
        let offsets = self.profile.crystal.offsets();
        let shifted = if self.high_offset_next {
            offsets.high
        } else {
            offsets.low
        };
        self.high_offset_next = !self.high_offset_next;

        let cal = self.profile.calibration;
        self.ramp_down(cal.ramp_step_cycles)?;
        self.write_offset(shifted)?;
        self.delay.cycles(cal.phase_accumulation_cycles);
        self.write_offset(offsets.neutral)?;
        self.ramp_up(cal.ramp_step_cycles)
    }

    /// Enters TX and ramps the PA from off to full power.
    pub fn start_carrier(&mut self) -> Result<(), Error> {
        self.require(ChipState::TxReady)?;
        let _ = self.chip.write_byte(PA_CFG2, PA_OFF)?;
        let _ = self.chip.strobe(STX)?;
        let _ = self.chip.write_byte(PA_CFG2, PA_OFF)?;
        self.ramp_up(self.profile.calibration.carrier_step_cycles)?;
        let _ = self.chip.write_byte(PA_CFG2, PA_FULL_POWER)?;
        debug!("radio: carrier up");
        Ok(())
    }

    /// Ramps the PA from full power to off and leaves TX.
    pub fn stop_carrier(&mut self) -> Result<(), Error> {
        self.require(ChipState::TxReady)?;
        self.ramp_down(self.profile.calibration.carrier_step_cycles)?;
        let _ = self.chip.write_byte(PA_CFG2, PA_OFF)?;
        let _ = self.chip.strobe(SIDLE)?;
        let _ = self.chip.write_byte(PA_CFG2, PA_OFF)?;
        debug!("radio: carrier down");
        Ok(())
    }

    /// Unmodulated continuous wave on `freq_hz`, for RF test.
    pub fn start_cw(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.init_chip(freq_hz, ChipMode::Tx)?;
        self.start_carrier()
    }

    /// Ends the continuous wave and reloads the TX personality on `freq_hz`.
    pub fn stop_cw(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.stop_carrier()?;
        self.init_chip(freq_hz, ChipMode::Tx)
    }
}

impl<SPI, D, FE, IRQ> Modulator for Radio<SPI, D, FE, IRQ>
where
    SPI: SpiDevice,
    D: DelayNs,
    FE: FrontEnd,
    IRQ: PacketInterrupt,
{
    fn start_carrier(&mut self) -> Result<(), Error> {
        Radio::start_carrier(self)
    }

    fn stop_carrier(&mut self) -> Result<(), Error> {
        Radio::stop_carrier(self)
    }

    fn modulate(&mut self) -> Result<(), Error> {
        Radio::modulate(self)
    }
}
