use embedded_hal::delay::DelayNs;

/// Busy-wait delays expressed in MCU clock cycles.
///
/// Calibration data of the modulation primitive is given in cycles of the
/// reference MCU clock. `CycleDelay` turns those counts into nanoseconds for
/// an `embedded_hal::delay::DelayNs` provider, so the same calibration keeps
/// its wall-clock meaning on another core.
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::delay::NoopDelay;
/// use cc112x_dbpsk::timer::CycleDelay;
///
/// let mut delay = CycleDelay::new(NoopDelay::new(), 20_000_000);
/// delay.cycles(320); // 16 µs at 20 MHz
/// ```
#[derive(Debug)]
pub struct CycleDelay<D> {
    delay: D,
    mcu_clock_hz: u32,
}

impl<D: DelayNs> CycleDelay<D> {
    /// Wraps `delay`; cycle counts refer to `mcu_clock_hz`.
    pub fn new(delay: D, mcu_clock_hz: u32) -> Self {
        Self {
            delay,
            mcu_clock_hz,
        }
    }

    /// Converts a cycle count to nanoseconds, rounding down.
    pub fn cycles_to_ns(&self, cycles: u32) -> u32 {
        (cycles as u64 * 1_000_000_000 / self.mcu_clock_hz as u64) as u32
    }

    /// Waits for `cycles` reference clock cycles.
    pub fn cycles(&mut self, cycles: u32) {
        let ns = self.cycles_to_ns(cycles);
        self.delay.delay_ns(ns);
    }

    /// Waits for `ms` milliseconds.
    pub fn ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Gives the delay provider back.
    pub fn release(self) -> D {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<u32>);

    impl DelayNs for Recorder {
        fn delay_ns(&mut self, ns: u32) {
            self.0.push(ns);
        }
    }

    #[test]
    fn test_cycles_convert_with_reference_clock() {
        let mut delay = CycleDelay::new(Recorder::default(), 20_000_000);
        delay.cycles(320);
        delay.cycles(57);
        delay.cycles(1000);
        assert_eq!(delay.release().0, vec![16_000, 2_850, 50_000]);
    }

    #[test]
    fn test_cycles_on_a_faster_core() {
        let delay = CycleDelay::new(Recorder::default(), 64_000_000);
        assert_eq!(delay.cycles_to_ns(640), 10_000);
    }
}
