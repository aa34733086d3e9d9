//! The periodic refill task.
//!
//! Satisfies the pulse-engine driver's §6 obligation ("a periodic task at
//! ≥ 100 Hz that calls refill on every axis") for boards that would rather
//! not thread a refill call through every platform timer's completion
//! callback.

use crate::engine;
use crate::log;
use embassy_time::{Duration, Timer};

const REFILL_PERIOD: Duration = Duration::from_millis(10);

#[embassy_executor::task]
pub async fn refill_task() {
    log::info!("Axis refill task started");
    loop {
        engine::with_engine(|e| e.refill_all());
        Timer::after(REFILL_PERIOD).await;
    }
}
