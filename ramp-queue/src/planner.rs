//! # Ramp Planner
//!
//! Computes, from the axis's current kinematic state, the next small batch
//! of [`QueueEntry`] values covering roughly 10 ms of future motion. Called
//! twice: once per user-level motion request (`plan_initial`), then
//! repeatedly from `refill()` (`single_fill`) until the queue is full or the
//! motion is fully scheduled.
//!
//! Grounded in structure (lookahead window, staged fill-until-full) on
//! `motion::planner::MotionPlanner`, but trapezoidal rather than
//! jerk-limited — this workspace has no S-curve profile.

use crate::errors::{AddEntryError, MoveError};
use crate::fixed::UpmFloat;
use crate::queue::{CommandQueue, ABSOLUTE_MAX_TICKS};

/// Rule-of-thumb look-ahead: `LOOKAHEAD / ticks_at_queue_end` steps gives
/// roughly 10 ms of scheduled motion at the current pulse rate.
const LOOKAHEAD: u32 = 16_000;

/// Which phase of the trapezoidal profile the planner is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampState {
    Idle,
    Accelerate,
    Coast,
    Decelerate,
    DecelerateToStop,
}

/// Per-axis ramp bookkeeping: everything `plan_initial`/`single_fill` need
/// besides the queue and the target position (those live on
/// [`crate::axis::AxisController`]).
pub struct RampPlanner {
    min_step_us: Option<u32>,
    accel: Option<u32>,
    min_travel_ticks: u16,
    ramp_steps: u32,
    upm_inv_accel2: UpmFloat,
    performed_ramp_up_steps: u32,
    deceleration_start: u32,
    ramp_state: RampState,
    speed_control_enabled: bool,
}

impl RampPlanner {
    pub const fn new() -> Self {
        Self {
            min_step_us: None,
            accel: None,
            min_travel_ticks: 0,
            ramp_steps: 0,
            upm_inv_accel2: crate::fixed::ZERO,
            performed_ramp_up_steps: 0,
            deceleration_start: 0,
            ramp_state: RampState::Idle,
            speed_control_enabled: false,
        }
    }

    pub fn set_speed(&mut self, min_step_us: u32) {
        self.min_step_us = Some(min_step_us);
    }

    pub fn set_acceleration(&mut self, accel: u32) {
        self.accel = Some(accel);
    }

    pub fn ramp_state(&self) -> RampState {
        self.ramp_state
    }

    pub fn is_running(&self) -> bool {
        self.speed_control_enabled
    }

    pub fn performed_ramp_up_steps(&self) -> u32 {
        self.performed_ramp_up_steps
    }

    pub fn deceleration_start(&self) -> u32 {
        self.deceleration_start
    }

    /// One-time (per motion request) recomputation of the ramp constants and
    /// the starting point on the acceleration parabola. Publishes the
    /// refill-visible fields atomically, per §5.
    pub fn plan_initial(
        &mut self,
        move_delta: i32,
        ticks_at_queue_end: u16,
        has_direction_pin: bool,
    ) -> Result<(), MoveError> {
        if move_delta == 0 {
            return Err(MoveError::Zero);
        }
        if move_delta < 0 && !has_direction_pin {
            return Err(MoveError::NoDirectionPin);
        }
        let min_step_us = self.min_step_us.ok_or(MoveError::SpeedUndefined)?;
        let accel = self.accel.ok_or(MoveError::AccelerationUndefined)?;

        let min_travel_ticks = ((min_step_us as u64 * crate::queue::TICKS_PER_S as u64)
            / 1_000_000)
            .min(ABSOLUTE_MAX_TICKS as u64) as u16;

        let ticks_per_s = UpmFloat::from_u32(crate::queue::TICKS_PER_S);
        let upm_inv_accel2 = ticks_per_s.square().divide(UpmFloat::from_u32(2 * accel));
        let mtt_sq = UpmFloat::from_u16(min_travel_ticks).square();
        let ramp_steps = upm_inv_accel2.divide(mtt_sq).to_u32();

        let abs_move = move_delta.unsigned_abs();
        let (performed, deceleration_start) = if ticks_at_queue_end == 0 {
            (0, ramp_steps.min(abs_move / 2))
        } else if ticks_at_queue_end == min_travel_ticks {
            (ramp_steps, ramp_steps)
        } else {
            let performed = upm_inv_accel2
                .divide(UpmFloat::from_u16(ticks_at_queue_end).square())
                .to_u32();
            if ticks_at_queue_end > min_travel_ticks {
                (performed, ramp_steps.min((abs_move + performed) / 2))
            } else {
                (performed, ramp_steps)
            }
        };

        // The refill ISR only ever reads this group of fields together; a
        // brief critical section is enough to make the publication atomic.
        critical_section::with(|_| {
            self.min_travel_ticks = min_travel_ticks;
            self.ramp_steps = ramp_steps;
            self.upm_inv_accel2 = upm_inv_accel2;
            self.performed_ramp_up_steps = performed;
            self.deceleration_start = deceleration_start;
            self.speed_control_enabled = true;
        });
        Ok(())
    }

    /// Called from `refill()`. Enqueues at most a handful of entries
    /// covering the look-ahead window, or emergency-stops on an internal
    /// invariant violation.
    pub fn single_fill<const N: usize>(
        &mut self,
        target_pos: i32,
        queue: &mut CommandQueue<N>,
    ) {
        if !self.speed_control_enabled {
            return;
        }
        let pos = queue.pos_at_queue_end;
        let remaining = target_pos.abs_diff(pos);
        if remaining == 0 {
            self.speed_control_enabled = false;
            return;
        }

        let ticks_at_queue_end = queue.ticks_at_queue_end;
        let mut planning_steps = if ticks_at_queue_end == 0 {
            1
        } else {
            (LOOKAHEAD / ticks_at_queue_end as u32).max(1)
        };
        planning_steps = planning_steps.min(remaining);

        let was_idle = self.ramp_state == RampState::Idle;
        let prev_ticks = if ticks_at_queue_end == 0 {
            ABSOLUTE_MAX_TICKS
        } else {
            ticks_at_queue_end
        };

        if was_idle {
            self.ramp_state = RampState::Accelerate;
            planning_steps = 1;
        } else if remaining <= self.deceleration_start {
            self.ramp_state = RampState::DecelerateToStop;
        } else if self.min_travel_ticks < ticks_at_queue_end {
            self.ramp_state = RampState::Accelerate;
        } else if self.min_travel_ticks > ticks_at_queue_end {
            self.ramp_state = RampState::Decelerate;
        } else {
            self.ramp_state = RampState::Coast;
        }

        let next_ticks: u16 = match self.ramp_state {
            RampState::Coast => {
                planning_steps = planning_steps.min(remaining - self.deceleration_start);
                self.min_travel_ticks
            }
            RampState::Accelerate => {
                let denom = self.performed_ramp_up_steps + planning_steps;
                let t = self.upm_inv_accel2.divide(UpmFloat::from_u32(denom)).sqrt().to_u32();
                let t = t.min(ABSOLUTE_MAX_TICKS as u32) as u16;
                t.max(self.min_travel_ticks).min(prev_ticks)
            }
            RampState::Decelerate => {
                let denom = self.performed_ramp_up_steps + planning_steps;
                let t = self.upm_inv_accel2.divide(UpmFloat::from_u32(denom)).sqrt().to_u32();
                let t = t.min(ABSOLUTE_MAX_TICKS as u32) as u16;
                t.min(self.min_travel_ticks).max(prev_ticks)
            }
            RampState::DecelerateToStop => {
                let denom = remaining.saturating_sub(planning_steps);
                let t = self.upm_inv_accel2.divide(UpmFloat::from_u32(denom)).sqrt().to_u32();
                let t = t.min(ABSOLUTE_MAX_TICKS as u32) as u16;
                t.max(self.min_travel_ticks).max(prev_ticks)
            }
            RampState::Idle => unreachable!("ramp_state was just assigned above"),
        };
        let next_ticks = next_ticks.min(ABSOLUTE_MAX_TICKS);

        let will_complete = planning_steps >= remaining;
        let toggle_dir = (target_pos > pos) != queue.dir_at_queue_end;

        if let Err(_e) = self.emit_fragment(queue, ticks_at_queue_end, next_ticks, planning_steps, toggle_dir) {
            self.emergency_stop(queue);
            return;
        }

        match self.ramp_state {
            RampState::Accelerate => self.performed_ramp_up_steps += planning_steps,
            RampState::Decelerate => {
                self.performed_ramp_up_steps =
                    self.performed_ramp_up_steps.saturating_sub(planning_steps)
            }
            _ => {}
        }

        if will_complete {
            if queue.add_stop().is_err() {
                // Queue had no room for the marker; the next refill will
                // retry once the consumer frees a slot.
                return;
            }
            self.ramp_state = RampState::Idle;
            self.speed_control_enabled = false;
        }
    }

    /// Splits `planning_steps` pulses, ramping `curr_ticks` to `next_ticks`,
    /// into as many `add_entry` calls as needed to respect the 127-step and
    /// 32767-cumulative-delta limits per entry.
    fn emit_fragment<const N: usize>(
        &self,
        queue: &mut CommandQueue<N>,
        curr_ticks: u16,
        next_ticks: u16,
        steps: u32,
        toggle_dir: bool,
    ) -> Result<(), AddEntryError> {
        // `curr_ticks == 0` is the stopped sentinel, not a real interval to
        // ramp from — starting the fragment there would emit a zero-tick
        // entry and leave `ticks_at_queue_end` stuck at zero forever. Start
        // from the freshly-computed first-step interval instead.
        let start_ticks = if curr_ticks == 0 { next_ticks } else { curr_ticks };
        let total_change = next_ticks as i32 - start_ticks as i32;
        let by_steps = steps.div_ceil(127);
        let by_change = (total_change.unsigned_abs() as u32).div_ceil(32_768);
        let command_cnt = steps.min(by_steps.max(by_change)).max(1);

        let mut remaining_steps = steps;
        let mut ticks = start_ticks;
        let mut first = true;
        for i in 0..command_cnt {
            let entries_left = command_cnt - i;
            let entry_steps = remaining_steps.div_ceil(entries_left).min(127).max(1);
            let delta = if entry_steps > 1 {
                (total_change / steps as i32) as i16
            } else {
                0
            };
            queue.add_entry(ticks, entry_steps as u8, delta, first && toggle_dir)?;
            ticks = (ticks as i32 + delta as i32 * (entry_steps as i32 - 1)).clamp(0, u16::MAX as i32) as u16;
            remaining_steps -= entry_steps;
            first = false;
        }
        Ok(())
    }

    fn emergency_stop<const N: usize>(&mut self, queue: &mut CommandQueue<N>) {
        crate::log::warn!("ramp planner: internal invariant violated, emergency-stopping axis");
        let _ = queue.add_stop();
        self.ramp_state = RampState::Idle;
        self.speed_control_enabled = false;
    }
}

impl Default for RampPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::CommandQueue;

    #[test]
    fn plan_initial_rejects_zero_move() {
        let mut p = RampPlanner::new();
        p.set_speed(1000);
        p.set_acceleration(1000);
        assert_eq!(p.plan_initial(0, 0, true), Err(MoveError::Zero));
    }

    #[test]
    fn plan_initial_requires_speed_and_accel() {
        let mut p = RampPlanner::new();
        assert_eq!(
            p.plan_initial(100, 0, true),
            Err(MoveError::SpeedUndefined)
        );
        p.set_speed(1000);
        assert_eq!(
            p.plan_initial(100, 0, true),
            Err(MoveError::AccelerationUndefined)
        );
    }

    #[test]
    fn plan_initial_rejects_negative_move_without_direction_pin() {
        let mut p = RampPlanner::new();
        p.set_speed(1000);
        p.set_acceleration(1000);
        assert_eq!(
            p.plan_initial(-100, 0, false),
            Err(MoveError::NoDirectionPin)
        );
    }

    #[test]
    fn short_move_produces_symmetric_triangle() {
        let mut p = RampPlanner::new();
        p.set_speed(1000);
        p.set_acceleration(1000);
        p.plan_initial(3, 0, true).unwrap();
        assert_eq!(p.deceleration_start, 1);
    }

    #[test]
    fn full_motion_drains_to_target_and_stops() {
        let mut p = RampPlanner::new();
        p.set_speed(1000);
        p.set_acceleration(1000);
        let mut q: CommandQueue<16> = CommandQueue::new();
        p.plan_initial(10_000, q.ticks_at_queue_end, true).unwrap();

        let mut iterations = 0;
        while p.is_running() && iterations < 10_000 {
            while !q.is_full() && p.is_running() {
                p.single_fill(10_000, &mut q);
            }
            // Drain the ring like a consumer would, to make room for more.
            while !q.is_empty() {
                q.advance_read();
            }
            iterations += 1;
        }
        assert!(!p.is_running());
        assert_eq!(q.pos_at_queue_end, 10_000);
        assert_eq!(q.ticks_at_queue_end, 0);
    }

    #[test]
    fn ticks_stay_within_physical_bounds() {
        let mut p = RampPlanner::new();
        p.set_speed(200);
        p.set_acceleration(4000);
        let mut q: CommandQueue<16> = CommandQueue::new();
        p.plan_initial(2_000, q.ticks_at_queue_end, true).unwrap();
        let mut iterations = 0;
        while p.is_running() && iterations < 10_000 {
            while !q.is_full() && p.is_running() {
                p.single_fill(2_000, &mut q);
            }
            while !q.is_empty() {
                q.advance_read();
            }
            iterations += 1;
        }
        assert_eq!(q.pos_at_queue_end, 2_000);
    }
}
