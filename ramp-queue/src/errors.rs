//! Error types returned by the queue and the axis controller.
//!
//! Plain, `Copy` enums returned by value — the same idiom used throughout
//! the rest of this workspace for `no_std` code (no `thiserror`/`anyhow`,
//! those are for the host-side binaries this spec has no counterpart for).

/// Errors from [`crate::queue::CommandQueue::add_entry`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AddEntryError {
    /// `steps` was zero or exceeded the 7-bit field's range.
    StepsError,
    /// `ticks` exceeded `ABSOLUTE_MAX_TICKS`.
    TooHigh,
    /// `delta * (steps - 1)` exceeded `i16::MAX`.
    ChangeTooHigh,
    /// `delta * (steps - 1)` was below `i16::MIN`.
    ChangeTooLow,
    /// The cumulated interval (`ticks + delta * (steps - 1)`) fell below
    /// `MIN_DELTA_TICKS` while decelerating the interval (`delta < 0`).
    CumulatedChangeTooLow,
    /// The ring is full; benign, the caller should retry on the next refill.
    Full,
}

/// Errors from [`crate::axis::AxisController::move_to`] / `move_by`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MoveError {
    /// The requested delta was zero; not an error, just a no-op.
    Zero,
    /// A negative move was requested but no direction pin is configured.
    NoDirectionPin,
    /// `set_speed` has not been called yet.
    SpeedUndefined,
    /// `set_acceleration` has not been called yet.
    AccelerationUndefined,
    /// The new target would reverse the direction of an in-flight motion.
    Direction,
    /// The requested move would overflow the signed step-position counter.
    Overflow,
}

/// Errors from [`crate::axis::AxisController::set_delay_to_enable`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DelayError {
    /// The requested delay is below the driver's minimum enable time.
    TooLow,
    /// The requested delay exceeds `ABSOLUTE_MAX_TICKS` once converted to ticks.
    TooHigh,
}
