//! Timer and wait-loop utilities.
//!
//! Two hardware timers drive the radio core:
//! - the **bit-rate timer** ticks once per symbol (600 Hz or 100 Hz) and hands
//!   the next bit to the transmission state machine;
//! - the **downlink timer** ticks once per second and counts down the wait
//!   before the downlink window and the window itself.
//!
//! Both are reached through [`PeriodicTimer`]; their interrupt handlers only
//! touch [`RadioSignals`]. Busy-wait loops call a
//! [`WaitHook`] on every spin so that tests can play the part of the
//! interrupts.
//!
//! Contains helpers for timer preload computation:
//! - `period_counts`: runtime preload calculator
//! - `const_period_counts`: compile-time preload calculator
//!
//! | Clock      | Divider | Tick    | Period counts |
//! |------------|---------|---------|---------------|
//! | 24 MHz     |       1 | 600 Hz  |         40000 |
//! | 24 MHz     |       8 | 100 Hz  |         30000 |
//! | 32.768 kHz |       1 | 1 Hz    |         32768 |

use libm::roundf;

mod delay;
mod isr;
mod macros;

pub use delay::CycleDelay;
pub use isr::{PacketSemaphore, RadioSignals};

/// Preload of a periodic hardware timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Compare value: number of timer counts per tick.
    pub period_counts: u16,
    /// Input clock divider applied before counting.
    pub clock_divider: u8,
    /// Counter value loaded when the timer is started.
    pub initial_count: u16,
}

/// A periodic hardware timer whose interrupt is routed to [`RadioSignals`].
///
/// The interrupt handler itself is platform code; it must call
/// [`RadioSignals::on_bit_tick`] (bit-rate timer) or
/// [`RadioSignals::on_second_tick`] (downlink timer) and return.
pub trait PeriodicTimer {
    /// Programs `config`, seeds the counter with `config.initial_count` and
    /// enables the timer and its interrupt.
    fn start(&mut self, config: &TimerConfig);

    /// Disables the timer and clears its counter.
    fn stop(&mut self);
}

/// Called on every iteration of a busy-wait loop.
///
/// Firmware uses [`Spin`]. Test harnesses implement it to raise simulated
/// interrupts on the shared [`RadioSignals`].
pub trait WaitHook {
    /// One spin of a wait loop.
    fn on_wait(&mut self, signals: &RadioSignals);
}

/// Plain busy-wait: the interrupts update the signals on their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl WaitHook for Spin {
    fn on_wait(&mut self, _signals: &RadioSignals) {
        core::hint::spin_loop();
    }
}

impl<F> WaitHook for F
where
    F: FnMut(&RadioSignals),
{
    fn on_wait(&mut self, signals: &RadioSignals) {
        self(signals)
    }
}

/// Countdown driven by the one second downlink tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    elapsed: u16,
    target: u16,
    expired: bool,
}

impl Countdown {
    /// A disarmed countdown.
    pub const fn new() -> Self {
        Countdown {
            elapsed: 0,
            target: 0,
            expired: false,
        }
    }

    /// Arms the countdown for `seconds` ticks. Zero expires at once.
    pub fn arm(&mut self, seconds: u16) {
        self.elapsed = 0;
        self.target = seconds;
        self.expired = seconds == 0;
    }

    /// Counts one tick. Ticks of a disarmed countdown are ignored.
    pub fn tick(&mut self) {
        if self.target == 0 {
            return;
        }
        self.elapsed += 1;
        if self.elapsed == self.target {
            self.expired = true;
            self.elapsed = 0;
            self.target = 0;
        }
    }

    /// Whether the armed duration has elapsed.
    pub fn expired(&self) -> bool {
        self.expired
    }

    /// Clears the expired flag and disarms.
    pub fn clear(&mut self) {
        *self = Countdown::new();
    }
}

/// Computes a timer compare value.
///
/// # Arguments
/// - `clock_hz`: timer input clock in Hz
/// - `divider`: input divider (e.g., 1, 8)
/// - `tick_hz`: desired tick rate (e.g., 600.0)
///
/// # Returns
/// - Counts per tick, rounded to the nearest integer
pub fn period_counts(clock_hz: u32, divider: u8, tick_hz: f32) -> u16 {
    let counts_per_second = clock_hz as f32 / divider as f32;
    roundf(counts_per_second / tick_hz) as u16
}

/// Compile-time timer compare value calculator.
///
/// Truncates instead of rounding.
pub const fn const_period_counts(clock_hz: u32, divider: u8, tick_hz: u32) -> u16 {
    (clock_hz / divider as u32 / tick_hz) as u16
}
