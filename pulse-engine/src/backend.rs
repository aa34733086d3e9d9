//! Hardware back-end selection and the traits a platform driver implements.
//!
//! Modeled as a sum type with a common operations table rather than a
//! trait-object hierarchy, per the "inheritance over virtual dispatch"
//! design note: [`StepConsumer`](crate::consumer::StepConsumer) is generic
//! over `STEP`/`DIR`/`TIMER` and calls only through those traits — one
//! indirection, chosen at compile time by the firmware crate's Cargo
//! features, never a dynamic dispatch chain.

/// Identifies which concrete timer/PWM/pulse-counter peripheral backs a
/// [`StepConsumer`](crate::consumer::StepConsumer) instance. Carried mostly
/// for diagnostics (`defmt::info!`) — the actual behavior lives in the
/// `AtomicGpioPort`/`Timer` impls selected for that backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backend {
    /// AVR Timer1 in CTC mode, the original library's reference backend.
    Timer1Avr,
    /// A peripheral built from an MCPWM unit/timer pair plus a pulse counter.
    Mcpwm { unit: u8, timer: u8, pcnt: u8 },
    /// The in-memory backend used by host-side tests.
    Test,
}

/// A GPIO port that supports atomic set/clear, mapping to hardware features
/// like STM32's BSRR register for single-instruction, interrupt-safe writes.
pub trait AtomicGpioPort {
    /// Atomically sets some pins and clears others on the port.
    fn set_and_clear_atomic(&mut self, set_mask: u8, clear_mask: u8);
    /// Writes a full mask to the port (used for the direction pin).
    fn write(&mut self, mask: u8);
}

/// The hardware timer a [`StepConsumer`](crate::consumer::StepConsumer)
/// programs between pulses.
pub trait Timer {
    /// Arms the timer to fire again after `ticks`.
    fn schedule_next(&mut self, ticks: u16);
    /// Fires the timer interrupt immediately (used for a zero-tick delta).
    fn trigger_now(&mut self);
    /// Disarms the timer; no further interrupts until `schedule_next`.
    fn stop(&mut self);
}

#[cfg(any(test, feature = "test-backend"))]
pub mod test_backend {
    use super::{AtomicGpioPort, Timer};

    /// An in-memory `AtomicGpioPort`/`Timer` pair for host-side tests.
    #[derive(Debug, Default)]
    pub struct TestGpioPort {
        pub state: u8,
        pub write_calls: u32,
    }

    impl AtomicGpioPort for TestGpioPort {
        fn set_and_clear_atomic(&mut self, set_mask: u8, clear_mask: u8) {
            self.state |= set_mask;
            self.state &= !clear_mask;
        }
        fn write(&mut self, mask: u8) {
            self.state = mask;
            self.write_calls += 1;
        }
    }

    #[derive(Debug, Default)]
    pub struct TestTimer {
        pub scheduled_ticks: u16,
        pub triggered_now: bool,
        pub stopped: bool,
    }

    impl Timer for TestTimer {
        fn schedule_next(&mut self, ticks: u16) {
            self.scheduled_ticks = ticks;
            self.triggered_now = false;
            self.stopped = false;
        }
        fn trigger_now(&mut self) {
            self.triggered_now = true;
            self.stopped = false;
        }
        fn stop(&mut self) {
            self.stopped = true;
        }
    }
}
