//! # End-to-End Axis Pipeline Test
//!
//! Verifies the complete pipeline: `AxisController::move_to` plans a motion,
//! `refill()` fills the queue, and `StepConsumer` drains it by simulating
//! the hardware timer interrupt, ending at the requested position with the
//! timer stopped.

use pulse_engine::backend::test_backend::{TestGpioPort, TestTimer};
use pulse_engine::StepConsumer;
use ramp_queue::AxisController;

#[test]
fn move_to_drains_through_consumer_to_target() {
    let mut axis: AxisController = AxisController::new(true);
    axis.set_speed(1000);
    axis.set_acceleration(1000);
    axis.move_to(10_000).unwrap();
    axis.refill();

    let mut consumer = StepConsumer::new();
    let mut step_port = TestGpioPort::default();
    let mut dir_port = TestGpioPort::default();
    let mut timer = TestTimer::default();
    consumer.start(axis.queue_mut(), &mut dir_port, &mut timer);

    let mut pulses = 0usize;
    let mut safety = 0;
    while (consumer.is_active() || axis.is_running()) && safety < 2_000_000 {
        let mut needs_refill = false;
        consumer.on_timer_interrupt(
            axis.queue_mut(),
            &mut step_port,
            &mut dir_port,
            &mut timer,
            || needs_refill = true,
        );
        if needs_refill {
            axis.refill();
        }
        pulses += 1;
        safety += 1;
    }

    assert!(timer.stopped);
    assert_eq!(pulses, 10_000);
    assert_eq!(axis.position_after_commands_completed(), 10_000);
}

#[test]
fn short_move_completes_with_symmetric_profile() {
    let mut axis: AxisController = AxisController::new(true);
    axis.set_speed(1000);
    axis.set_acceleration(1000);
    axis.move_to(3).unwrap();
    axis.refill();

    let mut consumer = StepConsumer::new();
    let mut step_port = TestGpioPort::default();
    let mut dir_port = TestGpioPort::default();
    let mut timer = TestTimer::default();
    consumer.start(axis.queue_mut(), &mut dir_port, &mut timer);

    let mut pulses = 0usize;
    while (consumer.is_active() || axis.is_running()) && pulses < 1000 {
        let mut needs_refill = false;
        consumer.on_timer_interrupt(
            axis.queue_mut(),
            &mut step_port,
            &mut dir_port,
            &mut timer,
            || needs_refill = true,
        );
        if needs_refill {
            axis.refill();
        }
        pulses += 1;
    }

    assert_eq!(pulses, 3);
    assert_eq!(axis.position_after_commands_completed(), 3);
}
