//! Constants used across the CC112x DBPSK implementation.
//!
//! This module defines the register map of the CC112x family, the command
//! strobes, the SPI header bits and the framing constants of the downlink
//! receive path.
//!
//! ## Key Concepts
//!
//! - **Register addresses**: stored as `u16`. Addresses below `0x2F` live in the
//!   normal register space; addresses of the form `0x2Fxx` live in the extended
//!   register space and need a second address byte on the bus.
//! - **Strobes**: single-byte commands (`0x30..=0x3D`) that change the chip state.
//! - **Header bits**: the first byte of every SPI transaction carries the
//!   read/write and single/burst access bits on top of the 6-bit address.
//!
//! These values should be used wherever chip access is implemented so that the
//! register tables, the modulation primitive and the receive path agree.

/// Read access bit of the SPI header byte.
pub const RADIO_READ_ACCESS: u8 = 0x80;
/// Write access bit of the SPI header byte (all zero).
pub const RADIO_WRITE_ACCESS: u8 = 0x00;
/// Burst access bit of the SPI header byte.
pub const RADIO_BURST_ACCESS: u8 = 0x40;
/// Single access (burst bit cleared).
pub const RADIO_SINGLE_ACCESS: u8 = 0x00;

/// Address byte that selects the extended register space.
pub const EXTENDED_ADDRESS: u8 = 0x2F;
/// Address byte of the TX/RX FIFO.
pub const FIFO_ADDRESS: u8 = 0x3F;
/// Header byte for a burst read of the RX FIFO.
pub const BURST_RXFIFO: u8 = RADIO_READ_ACCESS | RADIO_BURST_ACCESS | FIFO_ADDRESS;

// Normal register space
/// GPIO3 pin configuration
pub const IOCFG3: u16 = 0x0000;
/// GPIO2 pin configuration
pub const IOCFG2: u16 = 0x0001;
/// GPIO1 pin configuration
pub const IOCFG1: u16 = 0x0002;
/// GPIO0 pin configuration
pub const IOCFG0: u16 = 0x0003;
/// Sync word, bits 31:24
pub const SYNC3: u16 = 0x0004;
/// Sync word, bits 23:16
pub const SYNC2: u16 = 0x0005;
/// Sync word, bits 15:8
pub const SYNC1: u16 = 0x0006;
/// Sync word, bits 7:0
pub const SYNC0: u16 = 0x0007;
/// Sync word detection configuration 1
pub const SYNC_CFG1: u16 = 0x0008;
/// Sync word detection configuration 0
pub const SYNC_CFG0: u16 = 0x0009;
/// Frequency deviation mantissa
pub const DEVIATION_M: u16 = 0x000A;
/// Modulation format and deviation exponent
pub const MODCFG_DEV_E: u16 = 0x000B;
/// Digital DC removal configuration
pub const DCFILT_CFG: u16 = 0x000C;
/// Preamble length configuration 1
pub const PREAMBLE_CFG1: u16 = 0x000D;
/// Preamble length configuration 0
pub const PREAMBLE_CFG0: u16 = 0x000E;
/// RX mixer frequency configuration
pub const FREQ_IF_CFG: u16 = 0x000F;
/// Channel filter configuration
pub const CHAN_BW: u16 = 0x0011;
/// General modem parameter configuration 1
pub const MDMCFG1: u16 = 0x0012;
/// General modem parameter configuration 0
pub const MDMCFG0: u16 = 0x0013;
/// Symbol rate configuration, exponent and mantissa 19:16
pub const SYMBOL_RATE2: u16 = 0x0014;
/// Symbol rate configuration, mantissa 15:8
pub const SYMBOL_RATE1: u16 = 0x0015;
/// Symbol rate configuration, mantissa 7:0
pub const SYMBOL_RATE0: u16 = 0x0016;
/// FIFO configuration
pub const FIFO_CFG: u16 = 0x001E;
/// Frequency synthesizer configuration
pub const FS_CFG: u16 = 0x0021;
/// Packet configuration 2
pub const PKT_CFG2: u16 = 0x0026;
/// Packet configuration 1
pub const PKT_CFG1: u16 = 0x0027;
/// Packet configuration 0
pub const PKT_CFG0: u16 = 0x0028;
/// RFEND configuration 1
pub const RFEND_CFG1: u16 = 0x0029;
/// RFEND configuration 0
pub const RFEND_CFG0: u16 = 0x002A;
/// Power amplifier configuration 2 (PA power ramp target level)
pub const PA_CFG2: u16 = 0x002B;
/// Power amplifier configuration 1
pub const PA_CFG1: u16 = 0x002C;
/// Power amplifier configuration 0
pub const PA_CFG0: u16 = 0x002D;
/// Packet length configuration
pub const PKT_LEN: u16 = 0x002E;

// Extended register space
/// Frequency offset correction configuration
pub const FREQOFF_CFG: u16 = 0x2F01;
/// Custom frequency modulation configuration
pub const CFM_DATA_CFG: u16 = 0x2F05;
/// External control configuration
pub const EXT_CTRL: u16 = 0x2F06;
/// Frequency offset, bits 15:8
pub const FREQOFF1: u16 = 0x2F0A;
/// Frequency offset, bits 7:0
pub const FREQOFF0: u16 = 0x2F0B;
/// Frequency configuration, bits 23:16
pub const FREQ2: u16 = 0x2F0C;
/// Frequency configuration, bits 15:8
pub const FREQ1: u16 = 0x2F0D;
/// Frequency configuration, bits 7:0
pub const FREQ0: u16 = 0x2F0E;
/// Frequency synthesizer digital configuration 1
pub const FS_DIG1: u16 = 0x2F12;
/// Frequency synthesizer digital configuration 0
pub const FS_DIG0: u16 = 0x2F13;
/// Frequency synthesizer calibration 3
pub const FS_CAL3: u16 = 0x2F14;
/// Frequency synthesizer calibration 2
pub const FS_CAL2: u16 = 0x2F15;
/// Frequency synthesizer calibration 1
pub const FS_CAL1: u16 = 0x2F16;
/// Frequency synthesizer calibration 0
pub const FS_CAL0: u16 = 0x2F17;
/// Frequency synthesizer divide by 2
pub const FS_DIVTWO: u16 = 0x2F19;
/// FS digital synthesizer module configuration 1
pub const FS_DSM1: u16 = 0x2F1A;
/// FS digital synthesizer module configuration 0
pub const FS_DSM0: u16 = 0x2F1B;
/// Frequency synthesizer divider chain configuration 1
pub const FS_DVC1: u16 = 0x2F1C;
/// Frequency synthesizer divider chain configuration 0
pub const FS_DVC0: u16 = 0x2F1D;
/// Frequency synthesizer phase frequency detector configuration
pub const FS_PFD: u16 = 0x2F1F;
/// Frequency synthesizer prescaler configuration
pub const FS_PRE: u16 = 0x2F20;
/// Frequency synthesizer divider regulator configuration
pub const FS_REG_DIV_CML: u16 = 0x2F21;
/// Frequency synthesizer spare
pub const FS_SPARE: u16 = 0x2F22;
/// FS voltage controlled oscillator configuration 0
pub const FS_VCO0: u16 = 0x2F27;
/// Low noise amplifier configuration
pub const LNA: u16 = 0x2F30;
/// Crystal oscillator configuration 5
pub const XOSC5: u16 = 0x2F32;
/// Crystal oscillator configuration 1
pub const XOSC1: u16 = 0x2F36;
/// Main radio control state machine state
pub const MARCSTATE: u16 = 0x2F73;
/// Part number
pub const PARTNUMBER: u16 = 0x2F8F;
/// Part revision
pub const PARTVERSION: u16 = 0x2F90;
/// Serial status
pub const SERIAL_STATUS: u16 = 0x2F91;
/// Pointer to the last entry in the RX FIFO
pub const RXLAST: u16 = 0x2FD4;
/// Number of bytes in the RX FIFO
pub const NUM_RXBYTES: u16 = 0x2FD7;

// Command strobes
/// Reset chip
pub const SRES: u8 = 0x30;
/// Enable and calibrate the frequency synthesizer
pub const SFSTXON: u8 = 0x31;
/// Enter XOFF state
pub const SXOFF: u8 = 0x32;
/// Calibrate the frequency synthesizer
pub const SCAL: u8 = 0x33;
/// Enable RX
pub const SRX: u8 = 0x34;
/// Enable TX
pub const STX: u8 = 0x35;
/// Exit RX/TX and turn off the frequency synthesizer
pub const SIDLE: u8 = 0x36;
/// Flush the RX FIFO
pub const SFRX: u8 = 0x3A;
/// Flush the TX FIFO
pub const SFTX: u8 = 0x3B;
/// No operation, returns the status byte
pub const SNOP: u8 = 0x3D;

/// Mask of the `MARC_STATE` field in `MARCSTATE`.
pub const MARC_STATE_MASK: u8 = 0x1F;
/// `MARC_STATE` value reported on RX FIFO overflow/underflow.
pub const MARC_RX_FIFO_ERROR: u8 = 0x11;

/// Length (in bytes) of a downlink frame buffer.
///
/// 15 bytes of ECC + data + HMAC + CRC followed by the appended RSSI byte.
/// The second appended status byte (`CRC_OK | LQI`) follows in the FIFO and
/// is read on its own.
pub const RX_FRAME_LEN: usize = 16;

/// Offset of the RSSI byte in a received downlink frame.
pub const RX_RSSI_INDEX: usize = 15;

/// CRC-ok bit of the `CRC_OK | LQI` status byte.
pub const RX_CRC_OK: u8 = 0x80;

/// Number of times `RXLAST` is read and OR-ed to get the received length.
pub const RXLAST_READS: usize = 3;

/// RSSI offset of the CC112x, subtracted from the raw RSSI to get dBm.
pub const RSSI_OFFSET: i16 = 102;

/// `PA_CFG2` value for full output power at the end of a carrier ramp-up.
pub const PA_FULL_POWER: u8 = 63;

/// `PA_CFG2` value with the power amplifier ramped fully down.
pub const PA_OFF: u8 = 0x00;

/// Waiting time between the uplink frame and the downlink window, in seconds.
pub const DOWNLINK_WAIT_SECONDS: u16 = 20;

/// Length of the downlink receive window, in seconds.
pub const DOWNLINK_WINDOW_SECONDS: u16 = 25;
