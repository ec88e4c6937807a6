//! Downlink reception and the one second countdown.
//!
//! One hardware timer ticking once per second serves two sequential uses:
//! the wait between the end of an uplink frame and the opening of the
//! downlink window ([`Downlink::start_wait_timeout`]), and the window itself
//! ([`Downlink::start_rx_timeout`]).
//!
//! Inside the window the sync-word interrupt and the countdown race. Whichever
//! is seen first decides the outcome of [`Downlink::poll_frame`]:
//!
//! - **packet**: the frame is pulled out of the RX FIFO, the FIFO flushed and
//!   RX re-armed. The result is [`FrameStatus::Received`] or
//!   [`FrameStatus::Error`].
//! - **countdown**: the timer is stopped and the result is
//!   [`FrameStatus::Timeout`].
//!
//! Nothing is retried; re-listening is up to the caller.

use crate::chip::Chip;
use crate::consts::{
    MARC_RX_FIFO_ERROR, MARC_STATE_MASK, MARCSTATE, RX_CRC_OK, RX_FRAME_LEN, RX_RSSI_INDEX,
    RXLAST, RXLAST_READS, SFRX, SRX,
};
use crate::error::Error;
use crate::timer::{PacketSemaphore, PeriodicTimer, RadioSignals, TimerConfig, WaitHook};
use core::convert::Infallible;
use embedded_hal::spi::SpiDevice;

/// Outcome of one downlink reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameStatus {
    /// A frame was read out of the FIFO. `crc_ok` is bit 7 of its
    /// `CRC_OK | LQI` status byte.
    Received {
        /// The chip's CRC check passed.
        crc_ok: bool,
    },
    /// The packet interrupt fired but the FIFO was empty or overflowed.
    Error,
    /// The window elapsed without a packet.
    Timeout,
}

/// A [`FrameStatus`] with the details of what was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reception {
    /// Outcome.
    pub status: FrameStatus,
    /// Bytes written to the frame buffer.
    pub len: usize,
    /// Raw RSSI byte, present for a full frame with a good CRC.
    pub rssi: Option<i8>,
}

impl Reception {
    const fn empty(status: FrameStatus) -> Self {
        Reception {
            status,
            len: 0,
            rssi: None,
        }
    }
}

/// Pulls the pending packet out of the RX FIFO into `frame`.
///
/// `RXLAST` is read three times and the values are OR-ed; a single read is
/// unreliable on this chip. `RXLAST` is the index of the last FIFO byte, the
/// `CRC_OK | LQI` status byte. Everything before it, capped at
/// [`RX_FRAME_LEN`] bytes, lands in `frame`; the status byte is then read on
/// its own. Anything left in the FIFO is flushed.
pub fn read_frame<SPI: SpiDevice>(
    chip: &mut Chip<SPI>,
    frame: &mut [u8; RX_FRAME_LEN],
) -> Result<Reception, Error> {
    let mut rx_last = 0u8;
    for _ in 0..RXLAST_READS {
        rx_last |= chip.read_byte(RXLAST)?;
    }
    if rx_last == 0 {
        debug!("rx: empty FIFO");
        return Ok(Reception::empty(FrameStatus::Error));
    }

    let marc_state = chip.read_byte(MARCSTATE)? & MARC_STATE_MASK;
    if marc_state == MARC_RX_FIFO_ERROR {
        warn!("rx: FIFO error, flushing");
        let _ = chip.strobe(SFRX)?;
        return Ok(Reception::empty(FrameStatus::Error));
    }

    let len = usize::from(rx_last).min(RX_FRAME_LEN);
    let mut status = [0u8; 1];
    let _ = chip.read_rx_fifo(&mut frame[..len])?;
    let _ = chip.read_rx_fifo(&mut status)?;
    let _ = chip.strobe(SFRX)?;

    let crc_ok = status[0] & RX_CRC_OK != 0;
    let rssi = (crc_ok && len == RX_FRAME_LEN).then(|| frame[RX_RSSI_INDEX] as i8);
    debug!("rx: {} bytes, crc ok: {}", len, crc_ok);
    Ok(Reception {
        status: FrameStatus::Received { crc_ok },
        len,
        rssi,
    })
}

/// Downlink countdown and frame reception.
///
/// ## Type Parameters
///
/// - `T`: the one second [`PeriodicTimer`]
#[derive(Debug)]
pub struct Downlink<'s, T> {
    signals: &'s RadioSignals,
    timer: T,
    config: TimerConfig,
}

impl<'s, T> Downlink<'s, T>
where
    T: PeriodicTimer,
{
    /// `config` programs `timer` for one tick per second.
    pub fn new(signals: &'s RadioSignals, timer: T, config: TimerConfig) -> Self {
        Downlink {
            signals,
            timer,
            config,
        }
    }

    /// Gives the timer back.
    pub fn release(self) -> T {
        self.timer
    }

    fn start_countdown(&mut self, seconds: u16) {
        self.signals.arm_countdown(seconds);
        self.timer.start(&self.config);
    }

    /// Arms the countdown that separates the uplink from the downlink window.
    pub fn start_wait_timeout(&mut self, seconds: u16) {
        debug!("downlink: waiting {} s", seconds);
        self.start_countdown(seconds);
    }

    /// Returns once the countdown has elapsed, clearing it and stopping the timer.
    pub fn poll_timeout(&mut self) -> nb::Result<(), Infallible> {
        if self.signals.timeout_elapsed() {
            self.signals.clear_timeout();
            self.timer.stop();
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Spins on [`poll_timeout`](Self::poll_timeout).
    pub fn wait_for_timeout<H: WaitHook>(&mut self, hook: &mut H) {
        while self.poll_timeout().is_err() {
            hook.on_wait(self.signals);
        }
    }

    /// Arms the downlink window.
    pub fn start_rx_timeout(&mut self, seconds: u16) {
        debug!("downlink: window of {} s", seconds);
        self.start_countdown(seconds);
    }

    /// Disarms the downlink window early.
    pub fn stop_rx_timeout(&mut self) {
        self.timer.stop();
        self.signals.clear_timeout();
    }

    /// Checks the packet semaphore, then the countdown.
    ///
    /// A pending packet wins over an elapsed countdown seen in the same poll.
    /// The countdown keeps running after a packet.
    pub fn poll_frame<SPI: SpiDevice>(
        &mut self,
        chip: &mut Chip<SPI>,
        frame: &mut [u8; RX_FRAME_LEN],
    ) -> nb::Result<Reception, Error> {
        if self.signals.packet() == PacketSemaphore::ActionRequired {
            let reception = read_frame(chip, frame)?;
            self.signals.clear_packet();
            let _ = chip.strobe(SRX)?;
            Ok(reception)
        } else if self.signals.timeout_elapsed() {
            self.signals.clear_timeout();
            self.timer.stop();
            debug!("downlink: window closed");
            Ok(Reception::empty(FrameStatus::Timeout))
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Enters RX and spins on [`poll_frame`](Self::poll_frame) until a packet or
    /// the end of the window.
    pub fn wait_frame<SPI: SpiDevice, H: WaitHook>(
        &mut self,
        chip: &mut Chip<SPI>,
        frame: &mut [u8; RX_FRAME_LEN],
        hook: &mut H,
    ) -> Result<Reception, Error> {
        let _ = chip.strobe(SRX)?;
        loop {
            match self.poll_frame(chip, frame) {
                Ok(reception) => return Ok(reception),
                Err(nb::Error::WouldBlock) => hook.on_wait(self.signals),
                Err(nb::Error::Other(err)) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Access, FakeChip, RecordingTimer, TimerEvent};

    const ONE_SECOND: TimerConfig = TimerConfig {
        period_counts: 32_700,
        clock_divider: 1,
        initial_count: 0,
    };

    // 15 payload bytes, RSSI, CRC_OK | LQI
    fn full_frame(rssi: u8, crc_lqi: u8) -> Vec<u8> {
        let mut bytes: Vec<u8> = (1..=15).collect();
        bytes.push(rssi);
        bytes.push(crc_lqi);
        bytes
    }

    #[test]
    fn test_rxlast_reads_are_ored() {
        let fake = FakeChip::new();
        {
            let mut model = fake.model();
            model.rxlast.extend([0x01, 0x04, 0x02]);
            model.fifo.extend(0..16u8);
        }
        let mut chip = Chip::new(fake.clone());
        let mut frame = [0u8; RX_FRAME_LEN];

        let reception = read_frame(&mut chip, &mut frame).unwrap();
        assert_eq!(reception.len, 7);
        assert_eq!(&frame[..7], &[0, 1, 2, 3, 4, 5, 6]);
        // byte 7 is the status byte
        assert_eq!(reception.status, FrameStatus::Received { crc_ok: false });
        let model = fake.model();
        assert_eq!(model.reads_of(RXLAST), 3);
        assert!(model.log.contains(&Access::FifoRead(7)));
        assert!(model.log.contains(&Access::FifoRead(1)));
        assert_eq!(model.strobes(), vec![SFRX]);
    }

    #[test]
    fn test_read_length_is_capped() {
        for rx_last in [16u8, 17, 0x3F, 0xFF] {
            let fake = FakeChip::new();
            {
                let mut model = fake.model();
                model.rxlast.extend([rx_last, 0, 0]);
                model.fifo.extend(0..40u8);
            }
            let mut chip = Chip::new(fake.clone());
            let mut frame = [0u8; RX_FRAME_LEN];

            let reception = read_frame(&mut chip, &mut frame).unwrap();
            assert_eq!(reception.len, RX_FRAME_LEN);
            let model = fake.model();
            assert!(model.log.contains(&Access::FifoRead(16)));
            assert!(model.log.contains(&Access::FifoRead(1)));
            assert_eq!(model.fifo.len(), 40 - 17);
            assert_eq!(model.strobes(), vec![SFRX]);
        }
    }

    #[test]
    fn test_fifo_error_flushes() {
        let fake = FakeChip::new();
        {
            let mut model = fake.model();
            model.rxlast.extend([0x10, 0x10, 0x10]);
            model.marcstate = 0x60 | MARC_RX_FIFO_ERROR;
        }
        let mut chip = Chip::new(fake.clone());
        let mut frame = [0u8; RX_FRAME_LEN];

        let reception = read_frame(&mut chip, &mut frame).unwrap();
        assert_eq!(reception.status, FrameStatus::Error);
        let model = fake.model();
        assert_eq!(model.strobes(), vec![SFRX]);
        assert!(!model.log.iter().any(|a| matches!(a, Access::FifoRead(_))));
    }

    #[test]
    fn test_empty_fifo_is_an_error() {
        let fake = FakeChip::new();
        let mut chip = Chip::new(fake.clone());
        let mut frame = [0u8; RX_FRAME_LEN];

        let reception = read_frame(&mut chip, &mut frame).unwrap();
        assert_eq!(reception, Reception::empty(FrameStatus::Error));
        assert!(fake.model().strobes().is_empty());
        assert_eq!(fake.model().reads_of(MARCSTATE), 0);
    }

    #[test]
    fn test_rssi_only_with_good_crc() {
        // the RSSI sign bit must not be mistaken for CRC_OK
        let cases = [(0x1Eu8, 0x80u8, true), (0xC4, 0x00, false), (0xC4, 0xA5, true)];
        for (rssi, crc_lqi, crc_ok) in cases {
            let fake = FakeChip::new();
            {
                let mut model = fake.model();
                model.rxlast.extend([16, 16, 16]);
                model.fifo.extend(full_frame(rssi, crc_lqi));
            }
            let mut chip = Chip::new(fake.clone());
            let mut frame = [0u8; RX_FRAME_LEN];

            let reception = read_frame(&mut chip, &mut frame).unwrap();
            assert_eq!(reception.status, FrameStatus::Received { crc_ok });
            assert_eq!(reception.len, RX_FRAME_LEN);
            assert_eq!(frame[RX_RSSI_INDEX], rssi);
            assert_eq!(reception.rssi, crc_ok.then_some(rssi as i8));
            assert!(fake.model().fifo.is_empty());
        }
    }

    #[test]
    fn test_short_frame_has_no_rssi() {
        let fake = FakeChip::new();
        {
            let mut model = fake.model();
            model.rxlast.extend([3, 3, 3]);
            model.fifo.extend([0xA1, 0xA2, 0xA3, 0x80]);
        }
        let mut chip = Chip::new(fake.clone());
        let mut frame = [0u8; RX_FRAME_LEN];

        let reception = read_frame(&mut chip, &mut frame).unwrap();
        assert_eq!(reception.status, FrameStatus::Received { crc_ok: true });
        assert_eq!(reception.len, 3);
        assert_eq!(reception.rssi, None);
        assert_eq!(&frame[..4], &[0xA1, 0xA2, 0xA3, 0x00]);
    }

    #[test]
    fn test_packet_before_timeout() {
        let signals = RadioSignals::new();
        let fake = FakeChip::new();
        {
            let mut model = fake.model();
            model.rxlast.extend([16, 16, 16]);
            model.fifo.extend(full_frame(0xC4, 0x80));
        }
        let mut chip = Chip::new(fake.clone());
        let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);
        let mut frame = [0u8; RX_FRAME_LEN];

        downlink.start_rx_timeout(5);
        let mut spins = 0;
        let mut hook = |s: &RadioSignals| {
            spins += 1;
            s.on_second_tick();
            if spins == 3 {
                s.on_packet_detected();
            }
        };
        let reception = downlink.wait_frame(&mut chip, &mut frame, &mut hook).unwrap();

        assert_eq!(reception.status, FrameStatus::Received { crc_ok: true });
        assert_eq!(signals.packet(), PacketSemaphore::Idle);
        assert_eq!(fake.model().strobes(), vec![SRX, SFRX, SRX]);
        let timer = downlink.release();
        assert!(timer.running());
    }

    #[test]
    fn test_timeout_without_packet() {
        let signals = RadioSignals::new();
        let fake = FakeChip::new();
        let mut chip = Chip::new(fake.clone());
        let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);
        let mut frame = [0u8; RX_FRAME_LEN];

        downlink.start_rx_timeout(4);
        let mut ticks = 0;
        let mut hook = |s: &RadioSignals| {
            ticks += 1;
            s.on_second_tick();
        };
        let reception = downlink.wait_frame(&mut chip, &mut frame, &mut hook).unwrap();

        assert_eq!(reception.status, FrameStatus::Timeout);
        assert_eq!(ticks, 4);
        assert!(!signals.timeout_elapsed());
        assert_eq!(fake.model().strobes(), vec![SRX]);
        assert_eq!(
            downlink.release().events,
            vec![TimerEvent::Start(ONE_SECOND), TimerEvent::Stop]
        );
    }

    #[test]
    fn test_outcomes_are_exclusive() {
        // packet at tick t, window of n ticks
        for (t, n) in [(1u16, 3u16), (2, 3), (3, 3), (5, 3), (9, 10)] {
            let signals = RadioSignals::new();
            let fake = FakeChip::new();
            {
                let mut model = fake.model();
                model.rxlast.extend([16, 16, 16]);
                model.fifo.extend(full_frame(0xC4, 0x80));
            }
            let mut chip = Chip::new(fake.clone());
            let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);
            let mut frame = [0u8; RX_FRAME_LEN];

            downlink.start_rx_timeout(n);
            let mut tick = 0u16;
            let mut hook = |s: &RadioSignals| {
                tick += 1;
                if tick == t {
                    s.on_packet_detected();
                }
                s.on_second_tick();
            };
            let reception = downlink.wait_frame(&mut chip, &mut frame, &mut hook).unwrap();

            if t <= n {
                assert_eq!(reception.status, FrameStatus::Received { crc_ok: true });
            } else {
                assert_eq!(reception.status, FrameStatus::Timeout);
                assert_eq!(fake.model().reads_of(RXLAST), 0);
            }
        }
    }

    #[test]
    fn test_wait_for_timeout_blocks_until_elapsed() {
        let signals = RadioSignals::new();
        let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);

        downlink.start_wait_timeout(20);
        assert!(downlink.poll_timeout().is_err());

        let mut ticks = 0;
        let mut hook = |s: &RadioSignals| {
            ticks += 1;
            s.on_second_tick();
        };
        downlink.wait_for_timeout(&mut hook);
        assert_eq!(ticks, 20);
        assert!(!signals.timeout_elapsed());
        assert!(!downlink.release().running());
    }

    #[test]
    fn test_zero_second_wait_returns_at_once() {
        let signals = RadioSignals::new();
        let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);
        downlink.start_wait_timeout(0);
        assert_eq!(downlink.poll_timeout(), Ok(()));
    }

    #[test]
    fn test_stop_rx_timeout_disarms() {
        let signals = RadioSignals::new();
        let mut downlink = Downlink::new(&signals, RecordingTimer::default(), ONE_SECOND);
        downlink.start_rx_timeout(1);
        downlink.stop_rx_timeout();
        signals.on_second_tick();
        assert!(!signals.timeout_elapsed());
        assert_eq!(downlink.release().events.last(), Some(&TimerEvent::Stop));
    }
}
