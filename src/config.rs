//! Register personalities of the transceiver.
//!
//! The uplink (TX) personality sets up custom frequency modulation so that the
//! modulation primitive can shape symbols through `PA_CFG2` and `FREQOFF`.
//! The downlink (RX) personality receives a fixed 15 byte 2-GFSK frame at
//! 600 symbols/s behind the `0xAAAAB227` sync word, with the status bytes
//! appended. The RX channel filter and symbol rate depend on the crystal.

use crate::consts::*;
use crate::profile::Crystal;

/// One `{ address, value }` pair of a register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterSetting {
    /// Register address (normal or extended space).
    pub addr: u16,
    /// Value to write.
    pub data: u8,
}

const fn reg(addr: u16, data: u8) -> RegisterSetting {
    RegisterSetting { addr, data }
}

/// High performance TX settings, shared by both crystals.
pub static TX_SETTINGS: [RegisterSetting; 27] = [
    reg(IOCFG2, 0x33),  // CC1190 LNA_EN
    reg(IOCFG1, 0xB0),
    reg(IOCFG0, 0xB0),  // CC1190 PA_EN
    reg(FS_DIG1, 0x00),
    reg(FS_DIG0, 0x5F), // FS loop bandwidth 170.8 kHz in RX and TX
    reg(FS_CAL2, 0x20), // VCDAC_START
    reg(FS_CAL1, 0x40),
    reg(FS_CAL0, 0x0E), // infinite out-of-lock average time
    reg(FS_CAL3, 0x08), // KVCO high resolution
    reg(FS_DIVTWO, 0x03),
    reg(FS_DSM1, 0x00),
    reg(FS_DSM0, 0x33),
    reg(FS_DVC1, 0xFF),
    reg(FS_DVC0, 0x17),
    reg(FS_PFD, 0x50),
    reg(FS_PRE, 0x6E),
    reg(FS_REG_DIV_CML, 0x14),
    reg(FS_SPARE, 0xAC),
    reg(FS_VCO0, 0xB4),
    reg(XOSC5, 0x0E),
    reg(XOSC1, 0x03),   // low phase noise differential buffer
    reg(EXT_CTRL, 0x00), // no burst address increment
    reg(PA_CFG2, 0x7F),
    reg(PA_CFG1, 0x56),
    reg(PA_CFG0, 0x1C),
    reg(CFM_DATA_CFG, 0x01), // custom frequency modulation
    reg(FREQOFF_CFG, 0x22),
];

/// High performance RX settings for a 32 MHz crystal.
pub static RX_SETTINGS_32MHZ: [RegisterSetting; 43] = [
    reg(IOCFG3, 0x30),
    reg(IOCFG2, 0x06), // PKT_SYNC_RXTX
    reg(IOCFG0, 0x30),
    reg(SYNC3, 0xAA),
    reg(SYNC2, 0xAA),
    reg(SYNC1, 0xB2),
    reg(SYNC0, 0x27),
    reg(SYNC_CFG1, 0x48),
    reg(SYNC_CFG0, 0x0B), // 16 bit sync word, no bit error check
    reg(DEVIATION_M, 0xD1),
    reg(MODCFG_DEV_E, 0x08), // 2-GFSK, 800 Hz deviation
    reg(PREAMBLE_CFG1, 0x01),
    reg(PREAMBLE_CFG0, 0x2A),
    reg(CHAN_BW, 0x19), // 8 kHz
    reg(SYMBOL_RATE2, 0x33),
    reg(SYMBOL_RATE1, 0xA9),
    reg(SYMBOL_RATE0, 0x2A), // 600 symbols/s
    reg(FIFO_CFG, 0x0E),     // RX threshold 15 bytes
    reg(FS_CFG, 0x12),       // 820-960 MHz, LO divider 4
    reg(PKT_CFG2, 0x04),
    reg(PKT_CFG1, 0x01), // CRC off, status appended
    reg(PKT_CFG0, 0x00), // fixed length
    reg(RFEND_CFG1, 0x0F),
    reg(RFEND_CFG0, 0x00),
    reg(PKT_LEN, 0x0F),
    reg(FS_DIG1, 0x00),
    reg(FS_DIG0, 0x5F),
    reg(FS_CAL2, 0x00),
    reg(FS_CAL1, 0x40),
    reg(FS_CAL0, 0x0E),
    reg(FS_DIVTWO, 0x03),
    reg(FS_DSM0, 0x33),
    reg(FS_DVC0, 0x17),
    reg(FS_PFD, 0x50),
    reg(FS_PRE, 0x6E),
    reg(FS_REG_DIV_CML, 0x14),
    reg(FS_SPARE, 0xAC),
    reg(FS_VCO0, 0xB4),
    reg(LNA, 0x03),
    reg(XOSC5, 0x0E),
    reg(XOSC1, 0x03),
    reg(SERIAL_STATUS, 0x08), // GPIO_STATUS readable
    reg(FREQOFF_CFG, 0x22),
];

/// High performance RX settings for a 40 MHz crystal.
pub static RX_SETTINGS_40MHZ: [RegisterSetting; 34] = [
    reg(IOCFG3, 0x30),
    reg(IOCFG2, 0x73), // CC1190 LNA_EN held high
    reg(IOCFG0, 0x06), // PKT_SYNC_RXTX
    reg(SYNC3, 0xAA),
    reg(SYNC2, 0xAA),
    reg(SYNC1, 0xB2),
    reg(SYNC0, 0x27),
    reg(SYNC_CFG1, 0x48),
    reg(SYNC_CFG0, 0x0B),
    reg(DEVIATION_M, 0xA7),
    reg(MODCFG_DEV_E, 0x08),
    reg(DCFILT_CFG, 0x1C),
    reg(PREAMBLE_CFG1, 0x01),
    reg(PREAMBLE_CFG0, 0x2A),
    reg(FREQ_IF_CFG, 0x33),
    reg(CHAN_BW, 0x61), // 4.7 kHz
    reg(MDMCFG1, 0x46),
    reg(MDMCFG0, 0x05), // viterbi detection
    reg(SYMBOL_RATE2, 0x2F),
    reg(SYMBOL_RATE1, 0x75),
    reg(SYMBOL_RATE0, 0x10),
    reg(FIFO_CFG, 0x0E),
    reg(FS_CFG, 0x12),
    reg(PKT_CFG2, 0x04),
    reg(PKT_CFG1, 0x01),
    reg(PKT_CFG0, 0x00),
    reg(RFEND_CFG1, 0x0F),
    reg(RFEND_CFG0, 0x00),
    reg(PKT_LEN, 0x0F),
    reg(FREQOFF_CFG, 0x22),
    reg(FS_DIG0, 0x5F),
    reg(FS_SPARE, 0xAC),
    reg(SERIAL_STATUS, 0x08),
    reg(XOSC1, 0x03),
];

/// Register table for the uplink personality.
pub fn tx_settings() -> &'static [RegisterSetting] {
    &TX_SETTINGS
}

/// Register table for the downlink personality of `crystal`.
pub fn rx_settings(crystal: Crystal) -> &'static [RegisterSetting] {
    match crystal {
        Crystal::Mhz32 => &RX_SETTINGS_32MHZ,
        Crystal::Mhz40 => &RX_SETTINGS_40MHZ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(table: &[RegisterSetting], addr: u16) -> Option<u8> {
        table.iter().rev().find(|s| s.addr == addr).map(|s| s.data)
    }

    #[test]
    fn test_rx_tables_share_sync_word_and_length() {
        for crystal in [Crystal::Mhz32, Crystal::Mhz40] {
            let table = rx_settings(crystal);
            assert_eq!(value_of(table, SYNC3), Some(0xAA));
            assert_eq!(value_of(table, SYNC0), Some(0x27));
            assert_eq!(value_of(table, PKT_LEN), Some(0x0F));
            assert_eq!(value_of(table, PKT_CFG1), Some(0x01));
        }
    }

    #[test]
    fn test_tx_table_enables_custom_frequency_modulation() {
        let table = tx_settings();
        assert_eq!(value_of(table, CFM_DATA_CFG), Some(0x01));
        assert_eq!(value_of(table, EXT_CTRL), Some(0x00));
        assert_eq!(table.last().map(|s| s.addr), Some(FREQOFF_CFG));
    }
}
