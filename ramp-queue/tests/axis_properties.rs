//! Property-style tests for the quantified invariants in the planner's
//! design notes: every enqueued entry stays within the physical tick range,
//! and a fully-drained motion lands exactly on target.

use ramp_queue::AxisController;

fn drain_fully(axis: &mut AxisController) {
    let mut iterations = 0;
    while axis.is_running() && iterations < 20_000 {
        axis.refill();
        while !axis.queue().is_empty() {
            axis.queue_mut().advance_read();
        }
        iterations += 1;
    }
}

#[test]
fn every_entry_respects_the_tick_range_invariant() {
    let mut axis: AxisController = AxisController::new(true);
    axis.set_speed(1000);
    axis.set_acceleration(1000);
    axis.move_to(10_000).unwrap();

    let mut iterations = 0;
    while axis.is_running() && iterations < 20_000 {
        axis.refill();
        while let Some(entry) = axis.queue().peek().copied() {
            if !entry.is_stop() {
                let mut ticks = entry.ticks as i32;
                for _ in 0..entry.steps {
                    assert!(
                        ticks >= ramp_queue::MIN_DELTA_TICKS as i32 - 1
                            && ticks <= ramp_queue::ABSOLUTE_MAX_TICKS as i32 + 1,
                        "tick {ticks} outside physical bounds"
                    );
                    ticks += entry.delta as i32;
                }
            }
            axis.queue_mut().advance_read();
        }
        iterations += 1;
    }
}

#[test]
fn full_motion_lands_exactly_on_target_for_several_distances() {
    for target in [3, 10, 100, 1_000, 10_000, 100_000] {
        let mut axis: AxisController = AxisController::new(true);
        axis.set_speed(500);
        axis.set_acceleration(2000);
        axis.move_to(target).unwrap();
        drain_fully(&mut axis);
        assert_eq!(axis.position_after_commands_completed(), target);
        assert!(!axis.is_running());
    }
}

#[test]
fn negative_motion_lands_exactly_on_target() {
    let mut axis: AxisController = AxisController::new(true);
    axis.set_speed(800);
    axis.set_acceleration(1500);
    axis.move_to(-5_000).unwrap();
    drain_fully(&mut axis);
    assert_eq!(axis.position_after_commands_completed(), -5_000);
}

#[test]
fn refill_on_a_full_and_completed_queue_is_a_no_op() {
    let mut axis: AxisController = AxisController::new(true);
    axis.set_speed(1000);
    axis.set_acceleration(1000);
    axis.move_to(5).unwrap();
    drain_fully(&mut axis);
    let pos_before = axis.position_after_commands_completed();
    axis.refill();
    assert_eq!(axis.position_after_commands_completed(), pos_before);
}
