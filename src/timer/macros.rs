/// Declares a static `RADIO_SIGNALS` instance shared with the interrupt handlers.
///
/// This macro creates a `static` singleton suitable for interrupt-based
/// environments, where the foreground loop and the timer/GPIO interrupts need
/// to reach the same [`RadioSignals`](crate::timer::RadioSignals).
///
/// # Example
/// ```rust
/// cc112x_dbpsk::declare_radio_signals!();
///
/// // #[interrupt]
/// fn timer0_a0() {
///     RADIO_SIGNALS.on_second_tick();
/// }
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! declare_radio_signals {
    () => {
        pub static RADIO_SIGNALS: $crate::timer::RadioSignals = $crate::timer::RadioSignals::new();
    };
}
