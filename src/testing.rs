//! Simulated CC112x and timers for unit tests.

use crate::consts::{BURST_RXFIFO, EXTENDED_ADDRESS, MARCSTATE, RXLAST};
use crate::timer::{PeriodicTimer, TimerConfig};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{self, ErrorType, Operation, SpiDevice};
use std::cell::{RefCell, RefMut};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// One observable access to the simulated chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Strobe(u8),
    Write(u16, u8),
    Read(u16),
    FifoRead(usize),
    Delay(u32),
}

#[derive(Debug, Default)]
pub(crate) struct ChipModel {
    pub registers: HashMap<u16, u8>,
    pub log: Vec<Access>,
    pub rxlast: VecDeque<u8>,
    pub fifo: VecDeque<u8>,
    pub marcstate: u8,
    pub fail: bool,
    /// Transactions to let through before every later one fails.
    pub fail_after: Option<usize>,
}

impl ChipModel {
    pub fn register(&self, addr: u16) -> u8 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    pub fn strobes(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::Strobe(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn writes_to(&self, addr: u16) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::Write(reg, value) if *reg == addr => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn reads_of(&self, addr: u16) -> usize {
        self.log.iter().filter(|a| **a == Access::Read(addr)).count()
    }

    fn read(&mut self, addr: u16) -> u8 {
        self.log.push(Access::Read(addr));
        match addr {
            RXLAST => self.rxlast.pop_front().unwrap_or(0),
            MARCSTATE => self.marcstate,
            _ => self.register(addr),
        }
    }
}

/// `SpiDevice` backed by a [`ChipModel`]. Clones share the model.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeChip {
    model: Rc<RefCell<ChipModel>>,
}

impl FakeChip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> RefMut<'_, ChipModel> {
        self.model.borrow_mut()
    }

    /// A delay provider logging into the same access log.
    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            model: Rc::clone(&self.model),
        }
    }
}

impl ErrorType for FakeChip {
    type Error = spi::ErrorKind;
}

impl SpiDevice for FakeChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut model = self.model.borrow_mut();
        match model.fail_after {
            Some(0) => model.fail = true,
            Some(n) => model.fail_after = Some(n - 1),
            None => {}
        }
        if model.fail {
            return Err(spi::ErrorKind::Other);
        }

        let (header, data) = match operations {
            [Operation::TransferInPlace(header)] => {
                let cmd = header[0];
                assert!((0x30..=0x3D).contains(&cmd), "not a strobe: {cmd:#04x}");
                model.log.push(Access::Strobe(cmd));
                header[0] = 0x00;
                return Ok(());
            }
            [Operation::TransferInPlace(header), data] => (header, data),
            _ => panic!("unexpected transaction shape"),
        };

        if header[0] == BURST_RXFIFO {
            header[0] = 0x00;
            let Operation::Read(buf) = data else {
                panic!("FIFO access must be a read");
            };
            model.log.push(Access::FifoRead(buf.len()));
            for byte in buf.iter_mut() {
                *byte = model.fifo.pop_front().unwrap_or(0);
            }
            return Ok(());
        }

        let read = header[0] & 0x80 != 0;
        let addr = if header[0] & 0x3F == EXTENDED_ADDRESS {
            assert_eq!(header.len(), 2);
            ((EXTENDED_ADDRESS as u16) << 8) | header[1] as u16
        } else {
            assert_eq!(header.len(), 1);
            (header[0] & 0x3F) as u16
        };
        header.fill(0x00);

        match data {
            Operation::Write(bytes) if !read => {
                for (i, value) in bytes.iter().enumerate() {
                    let reg = addr + i as u16;
                    model.log.push(Access::Write(reg, *value));
                    let _ = model.registers.insert(reg, *value);
                }
            }
            Operation::Read(buf) if read => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = model.read(addr + i as u16);
                }
            }
            _ => panic!("access bit does not match the data phase"),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct FakeDelay {
    model: Rc<RefCell<ChipModel>>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.model.borrow_mut().log.push(Access::Delay(ns));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    Start(TimerConfig),
    Stop,
}

/// Timer that only records what it was asked to do.
#[derive(Debug, Default)]
pub(crate) struct RecordingTimer {
    pub events: Vec<TimerEvent>,
}

impl RecordingTimer {
    pub fn running(&self) -> bool {
        matches!(self.events.last(), Some(TimerEvent::Start(_)))
    }
}

impl PeriodicTimer for RecordingTimer {
    fn start(&mut self, config: &TimerConfig) {
        self.events.push(TimerEvent::Start(*config));
    }

    fn stop(&mut self) {
        self.events.push(TimerEvent::Stop);
    }
}
