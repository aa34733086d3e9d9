//! # Embassy Entry Point
//!
//! Brings up the board and spawns the axis refill task. Wiring each axis's
//! step/direction pins and timer to a concrete `pulse_engine::StepConsumer`
//! is board-specific (pin mappings, which timer peripheral, whether the
//! pulse train is generated by compare-match or by an MCPWM unit) — that's
//! the platform-driver layer this crate's spec leaves external, so it is
//! not implemented here.
//!
//! TODO(hardware bring-up): instantiate a `StepConsumer` per axis and bind
//! its `AtomicGpioPort`/`Timer` impls to this board's peripherals, then call
//! `consumer.start(...)` before the executor starts running tasks.

use crate::{engine, firmware_task, log};
use embassy_executor::Spawner;
use embassy_stm32::Config;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    log::info!("Initializing stepper firmware...");

    let config = Config::default();
    let _peripherals = embassy_stm32::init(config);

    engine::with_engine(|e| {
        if let Some(axis) = e.axis(0) {
            axis.set_speed(1000);
            axis.set_acceleration(1000);
        }
    });

    spawner.spawn(firmware_task::refill_task()).unwrap();

    log::info!("Initialization complete. Refill task is running.");
}
