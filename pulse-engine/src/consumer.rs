//! # Pipelined Step Consumer
//!
//! The hardware-interrupt side of the ramp generator: pops [`QueueEntry`]
//! values from a [`CommandQueue`] and drives a step pin, a direction pin,
//! and a hardware timer. Grounded on `mcu-drivers::stepper::StepperController`'s
//! pipelined design — direction is set one step ahead of the pulse it
//! applies to, and the timer is always rearmed from inside the interrupt
//! handler with the interval that was just computed, keeping the
//! interrupt-to-pulse latency to a GPIO write and a timer write.
//!
//! Unlike the teacher's controller (one `StepCommand` per queue slot, one
//! step per dequeue), an entry here describes up to 127 pulses with a
//! linearly changing interval, so the consumer keeps a small in-progress
//! cursor and only touches the queue once per *entry*, not once per pulse.

use ramp_queue::queue::CommandQueue;

use crate::backend::{AtomicGpioPort, Timer};

/// Bit written to the step pin's atomic set/clear port for a single axis.
/// A multi-axis driver assigns a distinct bit per `StepConsumer` it owns.
pub const STEP_PIN_MASK: u8 = 0b0000_0001;

struct PulseCursor {
    ticks: u16,
    delta: i16,
    steps_left: u8,
}

/// Consumes one axis's [`CommandQueue`] and drives one step/direction pin
/// pair. One instance per physical axis.
pub struct StepConsumer {
    cursor: Option<PulseCursor>,
    direction_high: bool,
}

impl StepConsumer {
    pub const fn new() -> Self {
        Self {
            cursor: None,
            direction_high: true,
        }
    }

    /// `true` once an entry has been loaded and the timer is expected to be
    /// running.
    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    /// Primes the pipeline with the first entry and arms the timer. Call
    /// once after enqueuing the initial motion, before interrupts are live.
    pub fn start<const N: usize>(
        &mut self,
        queue: &mut CommandQueue<N>,
        dir_port: &mut impl AtomicGpioPort,
        timer: &mut impl Timer,
    ) {
        self.load_next_entry(queue, dir_port);
        match &self.cursor {
            Some(c) if c.ticks > 0 => timer.schedule_next(c.ticks),
            Some(_) => timer.trigger_now(),
            None => timer.stop(),
        }
    }

    /// The timer-interrupt handler. Fires one step pulse, rearms the timer,
    /// and — when the current entry is exhausted — pops the next one and
    /// calls `on_entry_consumed` so the caller can request a refill.
    #[inline(always)]
    pub fn on_timer_interrupt<const N: usize>(
        &mut self,
        queue: &mut CommandQueue<N>,
        step_port: &mut impl AtomicGpioPort,
        dir_port: &mut impl AtomicGpioPort,
        timer: &mut impl Timer,
        mut on_entry_consumed: impl FnMut(),
    ) {
        let Some(mut cursor) = self.cursor.take() else {
            timer.stop();
            return;
        };

        // --- Critical path: GPIO + timer writes only. ---
        step_port.set_and_clear_atomic(STEP_PIN_MASK, STEP_PIN_MASK);
        cursor.steps_left -= 1;

        if cursor.steps_left > 0 {
            cursor.ticks = (cursor.ticks as i32 + cursor.delta as i32).clamp(0, u16::MAX as i32) as u16;
            self.cursor = Some(cursor);
        } else {
            // --- Deferred: queue/direction bookkeeping for the entry after next. ---
            self.load_next_entry(queue, dir_port);
            on_entry_consumed();
        }

        match &self.cursor {
            Some(c) if c.ticks > 0 => timer.schedule_next(c.ticks),
            Some(_) => timer.trigger_now(),
            None => timer.stop(),
        }
    }

    fn load_next_entry<const N: usize>(
        &mut self,
        queue: &mut CommandQueue<N>,
        dir_port: &mut impl AtomicGpioPort,
    ) {
        let Some(entry) = queue.peek().copied() else {
            self.cursor = None;
            return;
        };
        queue.advance_read();
        if entry.is_stop() {
            self.cursor = None;
            return;
        }
        if entry.toggle_dir {
            self.direction_high = !self.direction_high;
            dir_port.write(self.direction_high as u8);
        }
        self.cursor = Some(PulseCursor {
            ticks: entry.ticks,
            delta: entry.delta,
            steps_left: entry.steps,
        });
    }
}

impl Default for StepConsumer {
    fn default() -> Self {
        Self::new()
    }
}
