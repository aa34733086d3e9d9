//! # Axis Controller
//!
//! Per-axis façade holding kinematic parameters, target position, the
//! planner, and the queue. Grounded in structure on
//! `motion::kinematics`/`motion::planner`'s `MotionPlanner` façade, but the
//! pin/auto-enable surface below comes from the original `FastAccelStepper`
//! rather than the teacher (the teacher has no auto-enable concept).

use crate::errors::{DelayError, MoveError};
use crate::planner::{RampPlanner, RampState};
use crate::queue::{CommandQueue, ABSOLUTE_MAX_TICKS};

/// Minimum physically sane enable-to-first-step delay, in microseconds.
/// The original library's driver boards need at least this much settle time.
const MIN_ENABLE_DELAY_US: u32 = 5;

/// Per-axis façade: kinematic parameters, target position, ramp bookkeeping,
/// and the command queue shared with the pulse-engine consumer.
pub struct AxisController<const N: usize = { crate::queue::QUEUE_LEN }> {
    queue: CommandQueue<N>,
    planner: RampPlanner,
    target_pos: i32,
    has_direction_pin: bool,

    auto_enable: bool,
    delay_to_enable_ticks: u16,
    delay_to_disable_ticks: u16,
    auto_disable_counter: u16,
}

impl<const N: usize> AxisController<N> {
    pub const fn new(has_direction_pin: bool) -> Self {
        Self {
            queue: CommandQueue::new(),
            planner: RampPlanner::new(),
            target_pos: 0,
            has_direction_pin,
            auto_enable: false,
            delay_to_enable_ticks: 0,
            delay_to_disable_ticks: 0,
            auto_disable_counter: 0,
        }
    }

    pub fn set_speed(&mut self, min_step_us: u32) {
        self.planner.set_speed(min_step_us);
    }

    pub fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.planner.set_acceleration(steps_per_s2);
    }

    pub fn set_auto_enable(&mut self, enabled: bool) {
        self.auto_enable = enabled;
    }

    /// Sets the delay between asserting the enable pin and the first step,
    /// converted to ticks. Rejects delays the driver board cannot honor or
    /// that would overflow the tick range.
    pub fn set_delay_to_enable(&mut self, delay_us: u32) -> Result<(), DelayError> {
        if delay_us < MIN_ENABLE_DELAY_US {
            return Err(DelayError::TooLow);
        }
        let ticks = delay_us as u64 * crate::queue::TICKS_PER_S as u64 / 1_000_000;
        if ticks > ABSOLUTE_MAX_TICKS as u64 {
            return Err(DelayError::TooHigh);
        }
        self.delay_to_enable_ticks = ticks as u16;
        Ok(())
    }

    /// Sets how long the axis idles before auto-disabling the driver,
    /// in milliseconds converted to ticks (same validation as enable delay).
    pub fn set_delay_to_disable(&mut self, delay_ms: u32) -> Result<(), DelayError> {
        let delay_us = delay_ms.saturating_mul(1000);
        self.set_delay_to_enable(delay_us).map(|()| {
            self.delay_to_disable_ticks = self.delay_to_enable_ticks;
        })?;
        Ok(())
    }

    /// Called from the periodic firmware task; counts down toward disabling
    /// the driver once the axis has been idle for `delay_to_disable`.
    /// No-op unless auto-enable is on and the axis is currently idle.
    pub fn tick_auto_disable(&mut self) -> bool {
        if !self.auto_enable || self.is_running() {
            self.auto_disable_counter = self.delay_to_disable_ticks;
            return false;
        }
        if self.auto_disable_counter == 0 {
            return true;
        }
        self.auto_disable_counter -= 1;
        self.auto_disable_counter == 0
    }

    pub fn is_running(&self) -> bool {
        self.planner.is_running()
    }

    pub fn target_pos(&self) -> i32 {
        self.target_pos
    }

    pub fn ramp_state(&self) -> RampState {
        self.planner.ramp_state()
    }

    /// The position reached once every currently-enqueued entry completes.
    pub fn position_after_commands_completed(&self) -> i32 {
        self.queue.pos_at_queue_end
    }

    /// The position actually reached by pulses emitted so far.
    pub fn position(&self) -> i32 {
        self.queue.position_now()
    }

    /// Shifts both the live position and the in-flight target by the same
    /// amount, so an in-flight motion is unaffected (only its numbering
    /// changes). Brief critical section, per §5.
    pub fn set_position(&mut self, new_position: i32) {
        let delta = new_position - self.position();
        critical_section::with(|_| {
            self.queue.pos_at_queue_end += delta;
            self.target_pos += delta;
        });
    }

    /// Requests an absolute target position. The move is computed against
    /// the queue-end position, not the previous target: when not already
    /// running, the target is first reset to the queue-end position (as
    /// the original `moveTo` does), so retargeting mid-flight after
    /// `stop_move` plans against where the ramp will actually end up.
    pub fn move_to(&mut self, position: i32) -> Result<(), MoveError> {
        let curr_pos = self.queue.pos_at_queue_end;
        let target_pos = if self.is_running() {
            self.target_pos
        } else {
            curr_pos
        };
        let delta = position - curr_pos;
        if delta == 0 {
            return Err(MoveError::Zero);
        }
        if self.is_running() {
            let in_flight_direction_up = target_pos > curr_pos;
            let requested_direction_up = delta > 0;
            if in_flight_direction_up != requested_direction_up {
                return Err(MoveError::Direction);
            }
        }
        self.planner
            .plan_initial(delta, self.queue.ticks_at_queue_end, self.has_direction_pin)?;
        self.target_pos = position;
        Ok(())
    }

    /// Requests a relative move. Rejects a direction reversal of an
    /// in-flight motion and signed-overflow targets, per §7.
    pub fn move_by(&mut self, delta: i32) -> Result<(), MoveError> {
        if delta == 0 {
            return Err(MoveError::Zero);
        }
        let base = if self.is_running() {
            self.target_pos
        } else {
            self.queue.pos_at_queue_end
        };
        let new_target = base.checked_add(delta).ok_or(MoveError::Overflow)?;
        self.move_to(new_target)
    }

    /// Cancels the in-flight motion by retargeting to where the ramp would
    /// naturally bring the axis to rest along its current symmetric
    /// deceleration — never by truncating the queue (which would cause an
    /// instantaneous velocity step).
    pub fn stop_move(&mut self) {
        if !self.is_running() {
            return;
        }
        let performed = self.planner.performed_ramp_up_steps() as i32;
        let direction_up = self.target_pos > self.queue.pos_at_queue_end;
        let stop_target = if direction_up {
            self.queue.pos_at_queue_end + performed
        } else {
            self.queue.pos_at_queue_end - performed
        };
        let _ = self.move_to(stop_target);
    }

    /// Fills the queue from the planner until it is full or the motion is
    /// fully scheduled. Call periodically and from the pulse-engine's
    /// completion callback.
    pub fn refill(&mut self) {
        while !self.queue.is_full() && self.planner.is_running() {
            self.planner.single_fill(self.target_pos, &mut self.queue);
        }
    }

    /// Read-only access to the command queue, for the pulse-engine consumer.
    pub fn queue(&self) -> &CommandQueue<N> {
        &self.queue
    }

    /// Mutable access to the command queue, for the pulse-engine consumer to
    /// advance `read_idx`.
    pub fn queue_mut(&mut self) -> &mut CommandQueue<N> {
        &mut self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_zero_is_rejected() {
        let mut axis: AxisController = AxisController::new(true);
        axis.set_speed(1000);
        axis.set_acceleration(1000);
        assert_eq!(axis.move_by(0), Err(MoveError::Zero));
    }

    #[test]
    fn move_without_speed_is_rejected() {
        let mut axis: AxisController = AxisController::new(true);
        assert_eq!(axis.move_by(100), Err(MoveError::SpeedUndefined));
    }

    #[test]
    fn negative_move_without_direction_pin_is_rejected() {
        let mut axis: AxisController = AxisController::new(false);
        axis.set_speed(1000);
        axis.set_acceleration(1000);
        assert_eq!(axis.move_by(-10), Err(MoveError::NoDirectionPin));
    }

    #[test]
    fn full_move_to_target_completes_and_reports_position() {
        let mut axis: AxisController = AxisController::new(true);
        axis.set_speed(1000);
        axis.set_acceleration(1000);
        axis.move_to(10_000).unwrap();

        let mut iterations = 0;
        while axis.is_running() && iterations < 10_000 {
            axis.refill();
            while !axis.queue().is_empty() {
                axis.queue_mut().advance_read();
            }
            iterations += 1;
        }
        assert!(!axis.is_running());
        assert_eq!(axis.position(), 10_000);
        assert_eq!(axis.position_after_commands_completed(), 10_000);
    }

    #[test]
    fn set_position_shifts_target_by_same_delta() {
        let mut axis: AxisController = AxisController::new(true);
        axis.set_speed(1000);
        axis.set_acceleration(1000);
        axis.move_to(100).unwrap();
        let target_before = axis.target_pos();
        axis.set_position(50);
        assert_eq!(axis.target_pos() - target_before, 50 - 0);
    }

    #[test]
    fn reversing_direction_mid_motion_is_rejected() {
        let mut axis: AxisController = AxisController::new(true);
        axis.set_speed(1000);
        axis.set_acceleration(1000);
        axis.move_to(10_000).unwrap();
        axis.refill();
        assert_eq!(axis.move_to(-10_000), Err(MoveError::Direction));
    }

    #[test]
    fn delay_to_enable_rejects_out_of_range() {
        let mut axis: AxisController = AxisController::new(true);
        assert_eq!(axis.set_delay_to_enable(0), Err(DelayError::TooLow));
        assert_eq!(
            axis.set_delay_to_enable(u32::MAX),
            Err(DelayError::TooHigh)
        );
        assert!(axis.set_delay_to_enable(100).is_ok());
    }
}
