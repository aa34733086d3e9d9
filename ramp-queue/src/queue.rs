//! # Command Queue
//!
//! A bounded single-producer/single-consumer ring of [`QueueEntry`] values.
//! The producer is the [`crate::planner::RampPlanner`], called from
//! `refill()` (either a periodic task or the pulse-engine's own completion
//! interrupt). The consumer is the platform pulse-engine driver, which lives
//! outside this crate (see `pulse-engine`) and only needs read access to
//! `entries` plus the ability to advance `read_idx`.
//!
//! Indices follow the standard Lamport SPSC protocol: the producer writes an
//! entry, then publishes `write_idx`; the consumer reads `write_idx`, then
//! the entry, then publishes `read_idx`. One slot is always left empty to
//! disambiguate full from empty, so usable capacity is `N - 1`.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::AddEntryError;

/// Lower bound on a single inter-pulse interval, in timer ticks.
pub const MIN_DELTA_TICKS: u16 = 100;
/// Upper bound on a single inter-pulse interval, in timer ticks.
pub const ABSOLUTE_MAX_TICKS: u16 = u16::MAX - 1;
/// Default ring length. Must be a power of two.
pub const QUEUE_LEN: usize = 16;
/// Timer ticks per second on the reference hardware (16 MHz AVR).
pub const TICKS_PER_S: u32 = 16_000_000;

/// Sentinel written into [`QueueEntry::steps`] for a stop marker.
const STOP_MARKER_STEPS: u8 = 0;

/// A compact description of `steps` uniformly-spaced pulses, the inter-pulse
/// interval changing by `delta` ticks after each pulse.
///
/// `steps == 0` is reserved to mean "stop marker" (see [`CommandQueue::add_stop`]);
/// real motion entries always have `steps` in `1..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueEntry {
    /// Interval, in timer ticks, before the first pulse of this entry.
    pub ticks: u16,
    /// Pulse count, `1..=127` for a real entry, `0` for a stop marker.
    pub steps: u8,
    /// Per-pulse interval delta applied after each emitted pulse.
    pub delta: i16,
    /// If set, the direction output is toggled before the first pulse.
    pub toggle_dir: bool,
}

impl QueueEntry {
    const fn stop() -> Self {
        Self {
            ticks: 0,
            steps: STOP_MARKER_STEPS,
            delta: 0,
            toggle_dir: false,
        }
    }

    /// Whether this entry is a stop marker rather than real motion.
    pub fn is_stop(&self) -> bool {
        self.steps == STOP_MARKER_STEPS
    }

    /// The interval in effect for the last pulse of this entry.
    fn last_pulse_ticks(&self) -> u16 {
        if self.steps == 0 {
            return 0;
        }
        (self.ticks as i32 + self.delta as i32 * (self.steps as i32 - 1)) as u16
    }
}

/// A ring buffer of [`QueueEntry`] plus a shadow of the state reached once
/// every enqueued entry finishes.
pub struct CommandQueue<const N: usize> {
    entries: [QueueEntry; N],
    /// Consumer-owned: the next entry to be popped.
    read_idx: AtomicUsize,
    /// Producer-owned: where the next `add_entry`/`add_stop` will write.
    write_idx: AtomicUsize,
    /// The interval in effect at the end of the last-enqueued entry; `0`
    /// means "stopped" (the last enqueued entry was a stop marker).
    pub ticks_at_queue_end: u16,
    /// The signed step position reached after all enqueued entries finish.
    pub pos_at_queue_end: i32,
    /// The direction bit in effect after the last-enqueued entry.
    pub dir_at_queue_end: bool,
}

impl<const N: usize> CommandQueue<N> {
    const MASK_CHECK: () = assert!(N.is_power_of_two() && N >= 2);

    /// Creates an empty, stopped queue at position `0`.
    pub const fn new() -> Self {
        let _ = Self::MASK_CHECK;
        Self {
            entries: [QueueEntry::stop(); N],
            read_idx: AtomicUsize::new(0),
            write_idx: AtomicUsize::new(0),
            ticks_at_queue_end: 0,
            pos_at_queue_end: 0,
            dir_at_queue_end: true,
        }
    }

    fn mask(idx: usize) -> usize {
        idx & (N - 1)
    }

    /// Number of entries currently enqueued and not yet consumed.
    pub fn len(&self) -> usize {
        self.write_idx.load(Ordering::Acquire) - self.read_idx.load(Ordering::Acquire)
    }

    /// `true` once the usable capacity (`N - 1` slots) is occupied.
    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }

    /// `true` when the consumer has drained every enqueued entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the entry a consumer would pop next, without advancing.
    pub fn peek(&self) -> Option<&QueueEntry> {
        if self.is_empty() {
            None
        } else {
            let idx = Self::mask(self.read_idx.load(Ordering::Acquire));
            Some(&self.entries[idx])
        }
    }

    /// Advances the consumer's read index past one entry. Only the consumer
    /// (the pulse-engine driver) should call this.
    pub fn advance_read(&mut self) {
        self.read_idx.fetch_add(1, Ordering::Release);
    }

    /// Appends one motion entry, validating it against the invariants of
    /// §4.2 in order, and updates the tail-state shadow on success.
    pub fn add_entry(
        &mut self,
        ticks: u16,
        steps: u8,
        delta: i16,
        toggle_dir: bool,
    ) -> Result<(), AddEntryError> {
        if steps == 0 || steps > 127 {
            return Err(AddEntryError::StepsError);
        }
        if ticks > ABSOLUTE_MAX_TICKS {
            return Err(AddEntryError::TooHigh);
        }
        let cumulative = delta as i32 * (steps as i32 - 1);
        if cumulative > i16::MAX as i32 {
            return Err(AddEntryError::ChangeTooHigh);
        }
        if cumulative < i16::MIN as i32 {
            return Err(AddEntryError::ChangeTooLow);
        }
        if delta < 0 && (ticks as i32 + cumulative) < MIN_DELTA_TICKS as i32 {
            return Err(AddEntryError::CumulatedChangeTooLow);
        }
        if self.is_full() {
            return Err(AddEntryError::Full);
        }

        let entry = QueueEntry {
            ticks,
            steps,
            delta,
            toggle_dir,
        };
        let write = self.write_idx.load(Ordering::Relaxed);
        self.entries[Self::mask(write)] = entry;
        self.write_idx.store(write + 1, Ordering::Release);

        if toggle_dir {
            self.dir_at_queue_end = !self.dir_at_queue_end;
        }
        let signed_steps = if self.dir_at_queue_end {
            steps as i32
        } else {
            -(steps as i32)
        };
        self.pos_at_queue_end += signed_steps;
        self.ticks_at_queue_end = entry.last_pulse_ticks();
        Ok(())
    }

    /// Appends a stop marker: the motor idles once the consumer reaches it.
    /// Does not change `pos_at_queue_end` or `dir_at_queue_end`.
    pub fn add_stop(&mut self) -> Result<(), AddEntryError> {
        if self.is_full() {
            return Err(AddEntryError::Full);
        }
        let write = self.write_idx.load(Ordering::Relaxed);
        self.entries[Self::mask(write)] = QueueEntry::stop();
        self.write_idx.store(write + 1, Ordering::Release);
        self.ticks_at_queue_end = 0;
        Ok(())
    }

    /// The position actually reached by pulses emitted so far: walks
    /// backward from `pos_at_queue_end` through not-yet-consumed entries,
    /// undoing their contribution. Safe to call while the consumer is
    /// concurrently advancing `read_idx` — on a race it stops early and
    /// returns a lower bound, refreshed on the next call.
    pub fn position_now(&self) -> i32 {
        let write = self.write_idx.load(Ordering::Acquire);
        let mut pos = self.pos_at_queue_end;
        let mut dir_up = self.dir_at_queue_end;
        let mut idx = write;
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if idx <= read {
                break;
            }
            idx -= 1;
            let entry = &self.entries[Self::mask(idx)];
            if !entry.is_stop() {
                if dir_up {
                    pos -= entry.steps as i32;
                } else {
                    pos += entry.steps as i32;
                }
                if entry.toggle_dir {
                    dir_up = !dir_up;
                }
            }
        }
        pos
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
