//! Error taxonomy of the radio core.
//!
//! Bus and pin failures are reported with the `embedded-hal` error kind of the
//! failing peripheral so that [`Error`] stays a plain `Copy` type independent of
//! the HAL in use. Receive timeouts and FIFO errors are *not* errors: they are
//! outcomes reported through [`FrameStatus`](crate::downlink::FrameStatus).

use crate::radio::ChipState;
use embedded_hal::{digital, spi};

/// Errors returned by the radio core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An SPI transaction with the transceiver failed.
    #[error("SPI transaction with the transceiver failed: {0}")]
    Spi(spi::ErrorKind),
    /// Driving a PA/LNA enable line failed.
    #[error("front-end enable line failed: {0}")]
    Pin(digital::ErrorKind),
    /// The operation needs the chip in another state.
    #[error("chip is {actual:?}, operation requires {expected:?}")]
    WrongState {
        /// State the operation requires.
        expected: ChipState,
        /// State the chip is in.
        actual: ChipState,
    },
    /// The carrier frequency cannot be programmed into the synthesizer.
    #[error("carrier frequency {0} Hz is outside the 820-960 MHz synthesizer band")]
    FrequencyOutOfRange(u32),
}

impl Error {
    pub(crate) fn spi<E: spi::Error>(err: E) -> Self {
        Error::Spi(err.kind())
    }

    pub(crate) fn pin<E: digital::Error>(err: E) -> Self {
        Error::Pin(err.kind())
    }
}
