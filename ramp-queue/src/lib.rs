//! Trapezoidal ramp generator and lock-free step command queue.
//!
//! This crate implements the numerically-stable core of a stepper-motor
//! motion system: a fixed-point unit for divide/sqrt on MCUs without a
//! hardware FPU ([`fixed`]), a bounded SPSC command queue
//! ([`queue`]), the ramp planner that fills it ([`planner`]), and a
//! per-axis façade tying the two together ([`axis`]).
//!
//! The consumer side — the platform driver that actually pops
//! [`queue::QueueEntry`] values and drives hardware — lives in the
//! `pulse-engine` crate; this crate only produces the entries.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod axis;
pub mod errors;
pub mod fixed;
mod log;
pub mod planner;
pub mod queue;

pub use axis::AxisController;
pub use errors::{AddEntryError, DelayError, MoveError};
pub use fixed::UpmFloat;
pub use planner::{RampPlanner, RampState};
pub use queue::{CommandQueue, QueueEntry, ABSOLUTE_MAX_TICKS, MIN_DELTA_TICKS, QUEUE_LEN};

/// Timer ticks per second for the reference hardware (16 MHz AVR, matching
/// the original library's default). Platform crates built on a different
/// timer clock should treat this as a default, not a hard constant.
pub const TICKS_PER_S: u32 = queue::TICKS_PER_S;
