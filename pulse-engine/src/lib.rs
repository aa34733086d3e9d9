//! The hardware-interrupt-driven consumer side of the ramp generator.
//!
//! `ramp-queue` produces [`ramp_queue::queue::QueueEntry`] values; this
//! crate pops them and drives a step pin, a direction pin, and a timer.
//! Split out the way the teacher workspace splits `motion` (planning) from
//! `mcu-drivers` (hardware-facing consumption).
#![no_std]

pub mod backend;
pub mod consumer;

pub use backend::{AtomicGpioPort, Backend, Timer};
pub use consumer::{StepConsumer, STEP_PIN_MASK};
