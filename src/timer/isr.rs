use crate::timer::Countdown;
use crate::transmission::SystemState;
use core::cell::Cell;
use critical_section::Mutex;

/// Packet-arrival semaphore set by the sync-word interrupt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketSemaphore {
    /// Nothing pending.
    #[default]
    Idle,
    /// A packet reached the RX FIFO and has to be read.
    ActionRequired,
}

#[derive(Debug, Clone, Copy)]
struct SignalState {
    system: SystemState,
    packet: PacketSemaphore,
    countdown: Countdown,
    missed_ticks: u16,
}

/// State shared between the interrupt handlers and the foreground loop.
///
/// Every access runs inside `critical_section::with`, so the read-and-clear
/// sequences of the foreground never interleave with an interrupt. Declare
/// one as a `static` (see [`declare_radio_signals!`](crate::declare_radio_signals))
/// and call the `on_*` methods from the matching interrupt handlers:
///
/// ```rust
/// use cc112x_dbpsk::timer::RadioSignals;
///
/// static SIGNALS: RadioSignals = RadioSignals::new();
///
/// // #[interrupt]
/// fn timer1_a0() {
///     SIGNALS.on_bit_tick();
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct RadioSignals {
    inner: Mutex<Cell<SignalState>>,
}

impl Default for RadioSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioSignals {
    /// Idle state: no transmission, no packet pending, countdown disarmed.
    pub const fn new() -> Self {
        RadioSignals {
            inner: Mutex::new(Cell::new(SignalState {
                system: SystemState::Idle,
                packet: PacketSemaphore::Idle,
                countdown: Countdown::new(),
                missed_ticks: 0,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SignalState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    /// Bit-rate timer interrupt: the next bit is due.
    ///
    /// Moves `TxWaiting` to `TxProcessing`. A tick that finds the previous bit
    /// still in `TxProcessing` is coalesced and counted as missed.
    pub fn on_bit_tick(&self) {
        self.with(|s| match s.system {
            SystemState::TxWaiting => s.system = SystemState::TxProcessing,
            SystemState::TxProcessing => s.missed_ticks = s.missed_ticks.saturating_add(1),
            _ => {}
        })
    }

    /// Sync-word (packet arrival) GPIO interrupt.
    pub fn on_packet_detected(&self) {
        self.with(|s| s.packet = PacketSemaphore::ActionRequired)
    }

    /// One second downlink timer interrupt.
    pub fn on_second_tick(&self) {
        self.with(|s| s.countdown.tick())
    }

    /// Current transmission state.
    pub fn system_state(&self) -> SystemState {
        self.with(|s| s.system)
    }

    pub(crate) fn set_system_state(&self, state: SystemState) {
        self.with(|s| s.system = state)
    }

    /// Current packet semaphore.
    pub fn packet(&self) -> PacketSemaphore {
        self.with(|s| s.packet)
    }

    pub(crate) fn clear_packet(&self) {
        self.with(|s| s.packet = PacketSemaphore::Idle)
    }

    pub(crate) fn arm_countdown(&self, seconds: u16) {
        self.with(|s| s.countdown.arm(seconds))
    }

    /// Whether the armed downlink countdown has elapsed.
    pub fn timeout_elapsed(&self) -> bool {
        self.with(|s| s.countdown.expired())
    }

    pub(crate) fn clear_timeout(&self) {
        self.with(|s| s.countdown.clear())
    }

    /// Returns and resets the number of coalesced bit ticks.
    pub fn take_missed_ticks(&self) -> u16 {
        self.with(|s| core::mem::take(&mut s.missed_ticks))
    }
}
