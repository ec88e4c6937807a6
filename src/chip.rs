//! Register, FIFO and command-strobe access to a CC112x over SPI.
//!
//! Every access is one SPI transaction: a header (one byte for the normal
//! register space, two bytes for the extended space) clocked in while the chip
//! shifts out its status byte, followed by the data phase. All operations block
//! until the transport completes. Nothing is retried here; a failed
//! transaction is returned to the caller as [`Error::Spi`].

use crate::consts::{
    BURST_RXFIFO, EXTENDED_ADDRESS, PARTNUMBER, RADIO_BURST_ACCESS, RADIO_READ_ACCESS,
    RADIO_WRITE_ACCESS,
};
use crate::error::Error;
use embedded_hal::spi::{Operation, SpiDevice};
use heapless::Vec;

/// Chip status byte returned during the header phase of every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte(pub u8);

impl StatusByte {
    /// `CHIP_RDYn`: `false` while the crystal is not yet running.
    pub fn chip_ready(self) -> bool {
        self.0 & 0x80 == 0
    }

    /// The 3-bit `STATE` field (0 = IDLE, 1 = RX, 2 = TX, 6 = RX FIFO error, ...).
    pub fn state(self) -> u8 {
        (self.0 >> 4) & 0x07
    }
}

/// Low-level access to the transceiver registers.
///
/// ## Type Parameters
///
/// - `SPI`: an [`embedded_hal::spi::SpiDevice`] owning the chip select line.
#[derive(Debug)]
pub struct Chip<SPI> {
    spi: SPI,
}

impl<SPI> Chip<SPI>
where
    SPI: SpiDevice,
{
    /// Wraps an SPI device connected to the transceiver.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Gives the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Mutable access to the underlying SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    fn header(access: u8, addr: u16) -> Vec<u8, 2> {
        let mut header = Vec::new();
        if (addr >> 8) as u8 == EXTENDED_ADDRESS {
            let _ = header.push(access | EXTENDED_ADDRESS);
            let _ = header.push(addr as u8);
        } else {
            let _ = header.push(access | (addr as u8 & 0x3F));
        }
        header
    }

    /// Writes `data` starting at `addr` (burst access; a single byte for one register).
    pub fn write_register(&mut self, addr: u16, data: &[u8]) -> Result<StatusByte, Error> {
        let mut header = Self::header(RADIO_BURST_ACCESS | RADIO_WRITE_ACCESS, addr);
        self.spi
            .transaction(&mut [
                Operation::TransferInPlace(&mut header),
                Operation::Write(data),
            ])
            .map_err(Error::spi)?;
        Ok(StatusByte(header[0]))
    }

    /// Writes one register.
    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<StatusByte, Error> {
        self.write_register(addr, &[value])
    }

    /// Reads `buf.len()` bytes starting at `addr`.
    pub fn read_register(&mut self, addr: u16, buf: &mut [u8]) -> Result<StatusByte, Error> {
        let mut header = Self::header(RADIO_BURST_ACCESS | RADIO_READ_ACCESS, addr);
        self.spi
            .transaction(&mut [Operation::TransferInPlace(&mut header), Operation::Read(buf)])
            .map_err(Error::spi)?;
        Ok(StatusByte(header[0]))
    }

    /// Reads one register.
    pub fn read_byte(&mut self, addr: u16) -> Result<u8, Error> {
        let mut value = [0u8; 1];
        let _ = self.read_register(addr, &mut value)?;
        Ok(value[0])
    }

    /// Issues a command strobe and returns the status byte clocked out with it.
    pub fn strobe(&mut self, command: u8) -> Result<StatusByte, Error> {
        let mut cmd = [command];
        self.spi.transfer_in_place(&mut cmd).map_err(Error::spi)?;
        Ok(StatusByte(cmd[0]))
    }

    /// Burst-reads `buf.len()` bytes out of the RX FIFO.
    pub fn read_rx_fifo(&mut self, buf: &mut [u8]) -> Result<StatusByte, Error> {
        let mut header = [BURST_RXFIFO];
        self.spi
            .transaction(&mut [Operation::TransferInPlace(&mut header), Operation::Read(buf)])
            .map_err(Error::spi)?;
        Ok(StatusByte(header[0]))
    }

    /// Reads `PARTNUMBER` (0x48 for CC1120, 0x58 for CC1125).
    pub fn part_number(&mut self) -> Result<u8, Error> {
        self.read_byte(PARTNUMBER)
    }
}
