//! Bit-serial DBPSK transmission.
//!
//! [`Transmission`] walks a byte buffer one bit per tick of the bit-rate timer,
//! most significant bit first. A `0` bit triggers one call to
//! [`Modulator::modulate`]; a `1` bit leaves the carrier untouched.
//!
//! The state register lives in [`RadioSignals`] because the bit-rate timer
//! interrupt is the only thing that moves `TxWaiting` to `TxProcessing`. Every
//! other transition is taken by the foreground loop in [`Transmission::step`]:
//!
//! ```text
//! TxStart -> TxWaiting -> (TxProcessing -> TxWaiting)* -> TxProcessing -> TxEnd -> Idle
//! ```
//!
//! An empty buffer goes from `TxStart` straight to `TxEnd`, so the carrier is
//! still ramped up and down once.

use crate::error::Error;
use crate::timer::{PeriodicTimer, RadioSignals, TimerConfig, WaitHook};

/// State register of the transmission loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    /// No transmission in progress.
    #[default]
    Idle,
    /// Carrier ramp-up and bit timer start.
    TxStart,
    /// Waiting for the next bit tick.
    TxWaiting,
    /// A tick arrived; the current bit has to be sent.
    TxProcessing,
    /// Last bit sent; bit timer stop and carrier ramp-down.
    TxEnd,
}

/// Read position inside the buffer being transmitted.
///
/// `bit_index` never exceeds `total_bits`; reaching it is the only terminal
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxCursor<'a> {
    buffer: &'a [u8],
    bit_index: usize,
    total_bits: usize,
}

impl<'a> TxCursor<'a> {
    /// Cursor at the first bit of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        TxCursor {
            buffer,
            bit_index: 0,
            total_bits: buffer.len() * 8,
        }
    }

    /// Rewinds to the first bit.
    pub fn reset(&mut self) {
        self.bit_index = 0;
    }

    /// Index of the next bit to send.
    pub fn bit_index(&self) -> usize {
        self.bit_index
    }

    /// Number of bits in the buffer.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Whether every bit has been sent.
    pub fn is_done(&self) -> bool {
        self.bit_index == self.total_bits
    }

    /// The bit under the cursor, MSB first within each byte.
    pub fn current_bit(&self) -> Option<bool> {
        if self.is_done() {
            return None;
        }
        let byte = self.buffer[self.bit_index / 8];
        Some(byte & (0x80 >> (self.bit_index % 8)) != 0)
    }

    /// Moves to the next bit, saturating at the end of the buffer.
    pub fn advance(&mut self) {
        if !self.is_done() {
            self.bit_index += 1;
        }
    }
}

/// The RF side of a transmission.
pub trait Modulator {
    /// Ramps the PA up to full power on the programmed carrier.
    fn start_carrier(&mut self) -> Result<(), Error>;

    /// Ramps the PA down and idles the chip.
    fn stop_carrier(&mut self) -> Result<(), Error>;

    /// Produces one `0` symbol.
    fn modulate(&mut self) -> Result<(), Error>;
}

/// Counters of a completed transmission.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxReport {
    /// Bits processed.
    pub bits: usize,
    /// `modulate` calls, equal to the number of `0` bits.
    pub modulations: usize,
    /// Bit ticks that found the previous bit still being processed.
    pub missed_ticks: u16,
}

/// One run of the transmission state machine over a borrowed buffer.
///
/// ## Type Parameters
///
/// - `M`: the [`Modulator`] producing RF
/// - `T`: the bit-rate [`PeriodicTimer`]
/// - `H`: the [`WaitHook`] called while waiting for a tick
#[derive(Debug)]
pub struct Transmission<'a, M, T, H> {
    signals: &'a RadioSignals,
    modulator: &'a mut M,
    timer: &'a mut T,
    hook: &'a mut H,
    bit_timer: TimerConfig,
    cursor: TxCursor<'a>,
    modulations: usize,
}

impl<'a, M, T, H> Transmission<'a, M, T, H>
where
    M: Modulator,
    T: PeriodicTimer,
    H: WaitHook,
{
    /// Prepares a transmission of `buffer`; nothing happens until [`run`](Self::run).
    pub fn new(
        signals: &'a RadioSignals,
        modulator: &'a mut M,
        timer: &'a mut T,
        hook: &'a mut H,
        bit_timer: TimerConfig,
        buffer: &'a [u8],
    ) -> Self {
        Transmission {
            signals,
            modulator,
            timer,
            hook,
            bit_timer,
            cursor: TxCursor::new(buffer),
            modulations: 0,
        }
    }

    /// Read position.
    pub fn cursor(&self) -> &TxCursor<'a> {
        &self.cursor
    }

    /// Runs the state found in the signals once and returns the next state.
    pub fn step(&mut self) -> Result<SystemState, Error> {
        let next = match self.signals.system_state() {
            SystemState::TxStart => {
                self.cursor.reset();
                self.modulations = 0;
                self.modulator.start_carrier()?;
                if self.cursor.is_done() {
                    SystemState::TxEnd
                } else {
                    // state first, so the first tick cannot be lost
                    self.signals.set_system_state(SystemState::TxWaiting);
                    self.timer.start(&self.bit_timer);
                    return Ok(SystemState::TxWaiting);
                }
            }
            SystemState::TxWaiting => {
                self.hook.on_wait(self.signals);
                return Ok(self.signals.system_state());
            }
            SystemState::TxProcessing => {
                if let Some(false) = self.cursor.current_bit() {
                    self.modulator.modulate()?;
                    self.modulations += 1;
                }
                self.cursor.advance();
                if self.cursor.is_done() {
                    SystemState::TxEnd
                } else {
                    SystemState::TxWaiting
                }
            }
            SystemState::TxEnd => {
                self.timer.stop();
                self.modulator.stop_carrier()?;
                SystemState::Idle
            }
            SystemState::Idle => SystemState::Idle,
        };
        self.signals.set_system_state(next);
        Ok(next)
    }

    /// Sends the whole buffer and blocks until the carrier is down again.
    ///
    /// # Errors
    /// The first [`Error`] of the modulator. The bit timer is stopped and the
    /// state returns to `Idle`; the carrier is left as it was.
    pub fn run(mut self) -> Result<TxReport, Error> {
        let _ = self.signals.take_missed_ticks();
        self.signals.set_system_state(SystemState::TxStart);
        debug!("tx: {} bits", self.cursor.total_bits());

        loop {
            match self.step() {
                Ok(SystemState::Idle) => break,
                Ok(_) => {}
                Err(err) => {
                    self.timer.stop();
                    self.signals.set_system_state(SystemState::Idle);
                    return Err(err);
                }
            }
        }

        Ok(TxReport {
            bits: self.cursor.bit_index(),
            modulations: self.modulations,
            missed_ticks: self.signals.take_missed_ticks(),
        })
    }
}
