//! The radio session: one owner for the transceiver, both timers and the
//! interrupt signals.
//!
//! [`RadioSession`] is the call surface of the crate. It keeps every piece of
//! state that the foreground loop needs (chip state, offset toggle, last
//! RSSI) in one value. The only state shared with interrupt handlers is the
//! borrowed [`RadioSignals`].
//!
//! ## Example
//!
//! ```rust,no_run
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::spi::Mock as SpiMock;
//! use cc112x_dbpsk::consts::{DOWNLINK_WAIT_SECONDS, DOWNLINK_WINDOW_SECONDS};
//! use cc112x_dbpsk::downlink::FrameStatus;
//! use cc112x_dbpsk::profile::Profile;
//! use cc112x_dbpsk::radio::{ChipMode, Radio};
//! use cc112x_dbpsk::session::RadioSession;
//! use cc112x_dbpsk::timer::{PeriodicTimer, Spin, TimerConfig};
//!
//! cc112x_dbpsk::declare_radio_signals!();
//!
//! struct BoardTimer;
//! impl PeriodicTimer for BoardTimer {
//!     fn start(&mut self, _config: &TimerConfig) {}
//!     fn stop(&mut self) {}
//! }
//!
//! # fn main() -> Result<(), cc112x_dbpsk::Error> {
//! # let spi = SpiMock::new(&[]);
//! let profile = Profile::CC1120_BOOSTERPACK;
//! let radio = Radio::new(spi, NoopDelay::new(), profile);
//! let mut session = RadioSession::new(radio, BoardTimer, BoardTimer, &RADIO_SIGNALS, Spin);
//!
//! session.init_chip(profile.region.default_tx_frequency(), ChipMode::Tx)?;
//! session.send(&[0xA5, 0x5A])?;
//! session.close_chip()?;
//!
//! session.start_wait_timeout(DOWNLINK_WAIT_SECONDS);
//! session.wait_for_timeout();
//! session.init_chip(profile.region.default_rx_frequency(), ChipMode::Rx)?;
//! session.start_rx_timeout(DOWNLINK_WINDOW_SECONDS);
//! let mut frame = [0u8; 16];
//! if let FrameStatus::Received { crc_ok: true } = session.wait_frame(&mut frame)? {
//!     session.stop_rx_timeout();
//! }
//! session.close_chip()?;
//! # Ok(())
//! # }
//! ```

use crate::consts::{RSSI_OFFSET, RX_FRAME_LEN};
use crate::downlink::{Downlink, FrameStatus};
use crate::error::Error;
use crate::radio::{ChipMode, ChipState, FrontEnd, NoFrontEnd, PacketInterrupt, Radio};
use crate::timer::{PeriodicTimer, RadioSignals, WaitHook};
use crate::transmission::{Transmission, TxReport};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// Pauses between consecutive frames of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DelayKind {
    /// Before listening again: 500 ms.
    Rx,
    /// Between uplink repetitions: 1 s.
    Tx,
    /// Before an out-of-band acknowledgement: 1.4 s.
    OutOfBand,
}

impl DelayKind {
    /// Length of the pause in milliseconds.
    pub const fn millis(self) -> u32 {
        match self {
            DelayKind::Rx => 500,
            DelayKind::Tx => 1_000,
            DelayKind::OutOfBand => 1_400,
        }
    }
}

/// Owned radio session.
///
/// ## Type Parameters
///
/// - `SPI`, `D`, `FE`, `IRQ`: see [`Radio`]
/// - `BT`: the bit-rate [`PeriodicTimer`]
/// - `DT`: the one second downlink [`PeriodicTimer`]
/// - `H`: the [`WaitHook`] spun by every blocking call
#[derive(Debug)]
pub struct RadioSession<'s, SPI, D, BT, DT, H, FE = NoFrontEnd, IRQ = ()> {
    radio: Radio<SPI, D, FE, IRQ>,
    bit_timer: BT,
    downlink: Downlink<'s, DT>,
    signals: &'s RadioSignals,
    hook: H,
    last_rssi: i8,
    missed_ticks: u32,
}

impl<'s, SPI, D, BT, DT, H, FE, IRQ> RadioSession<'s, SPI, D, BT, DT, H, FE, IRQ>
where
    SPI: SpiDevice,
    D: DelayNs,
    BT: PeriodicTimer,
    DT: PeriodicTimer,
    H: WaitHook,
    FE: FrontEnd,
    IRQ: PacketInterrupt,
{
    /// Builds a session. The downlink timer is programmed from the radio
    /// profile's calibration.
    pub fn new(
        radio: Radio<SPI, D, FE, IRQ>,
        bit_timer: BT,
        downlink_timer: DT,
        signals: &'s RadioSignals,
        hook: H,
    ) -> Self {
        let downlink_config = radio.profile().calibration.downlink_timer;
        RadioSession {
            radio,
            bit_timer,
            downlink: Downlink::new(signals, downlink_timer, downlink_config),
            signals,
            hook,
            last_rssi: 0,
            missed_ticks: 0,
        }
    }

    /// The radio engine.
    pub fn radio(&self) -> &Radio<SPI, D, FE, IRQ> {
        &self.radio
    }

    /// The radio engine, mutably.
    pub fn radio_mut(&mut self) -> &mut Radio<SPI, D, FE, IRQ> {
        &mut self.radio
    }

    /// Takes the session apart.
    pub fn release(self) -> (Radio<SPI, D, FE, IRQ>, BT, DT, H) {
        (self.radio, self.bit_timer, self.downlink.release(), self.hook)
    }

    /// See [`Radio::init_chip`].
    pub fn init_chip(&mut self, freq_hz: u32, mode: ChipMode) -> Result<(), Error> {
        self.radio.init_chip(freq_hz, mode)
    }

    /// See [`Radio::close_chip`].
    pub fn close_chip(&mut self) -> Result<(), Error> {
        self.radio.close_chip()
    }

    /// See [`Radio::set_frequency`].
    pub fn set_frequency(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.radio.set_frequency(freq_hz)
    }

    /// Transmits `buffer` MSB first at the region's bit rate and blocks until
    /// the carrier is down.
    ///
    /// # Errors
    /// [`Error::WrongState`] unless the TX personality is loaded, or the first
    /// bus failure during the burst.
    pub fn send(&mut self, buffer: &[u8]) -> Result<TxReport, Error> {
        self.radio.require(ChipState::TxReady)?;
        let bit_timer = self.radio.profile().region.bit_timer();
        let report = Transmission::new(
            self.signals,
            &mut self.radio,
            &mut self.bit_timer,
            &mut self.hook,
            bit_timer,
            buffer,
        )
        .run()?;

        if report.missed_ticks > 0 {
            warn!(
                "tx: {} bit ticks arrived while a bit was still being modulated",
                report.missed_ticks
            );
            self.missed_ticks = self.missed_ticks.saturating_add(u32::from(report.missed_ticks));
        }
        info!("tx: {} bits, {} symbols modulated", report.bits, report.modulations);
        Ok(report)
    }

    /// Arms the countdown before the downlink window.
    pub fn start_wait_timeout(&mut self, seconds: u16) {
        self.downlink.start_wait_timeout(seconds);
    }

    /// Blocks until the countdown armed by
    /// [`start_wait_timeout`](Self::start_wait_timeout) has elapsed.
    pub fn wait_for_timeout(&mut self) {
        self.downlink.wait_for_timeout(&mut self.hook);
    }

    /// Arms the downlink window.
    pub fn start_rx_timeout(&mut self, seconds: u16) {
        self.downlink.start_rx_timeout(seconds);
    }

    /// Disarms the downlink window.
    pub fn stop_rx_timeout(&mut self) {
        self.downlink.stop_rx_timeout();
    }

    /// Listens until a packet arrives or the window elapses.
    ///
    /// On [`FrameStatus::Received`] the first bytes of `frame` hold the
    /// frame. The RSSI is updated only for a full frame with a good CRC.
    pub fn wait_frame(&mut self, frame: &mut [u8; RX_FRAME_LEN]) -> Result<FrameStatus, Error> {
        self.radio.require(ChipState::RxReady)?;
        let reception = self
            .downlink
            .wait_frame(self.radio.chip_mut(), frame, &mut self.hook)?;
        if let Some(rssi) = reception.rssi {
            self.last_rssi = rssi;
        }
        info!("rx: {:?}", reception.status);
        Ok(reception.status)
    }

    /// See [`Radio::start_carrier`].
    pub fn start_carrier(&mut self) -> Result<(), Error> {
        self.radio.start_carrier()
    }

    /// See [`Radio::stop_carrier`].
    pub fn stop_carrier(&mut self) -> Result<(), Error> {
        self.radio.stop_carrier()
    }

    /// See [`Radio::start_cw`].
    pub fn start_cw(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.radio.start_cw(freq_hz)
    }

    /// See [`Radio::stop_cw`].
    pub fn stop_cw(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.radio.stop_cw(freq_hz)
    }

    /// Raw RSSI byte of the last good frame, 0 before the first one.
    pub fn last_rssi(&self) -> i8 {
        self.last_rssi
    }

    /// [`last_rssi`](Self::last_rssi) in dBm.
    pub fn last_rssi_dbm(&self) -> i16 {
        i16::from(self.last_rssi) - RSSI_OFFSET
    }

    /// Bit ticks missed over all transmissions of this session.
    pub fn missed_ticks(&self) -> u32 {
        self.missed_ticks
    }

    /// Sleeps between two frames.
    pub fn inter_frame_delay(&mut self, kind: DelayKind) {
        self.radio.delay_mut().ms(kind.millis());
    }
}
