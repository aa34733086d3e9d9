//! # Process-Wide Axis Engine
//!
//! The original library reaches its axes from interrupt context through a
//! file-scope pointer; the Rust equivalent is a single process-wide
//! `Engine`, guarded by a `critical_section::Mutex`, that the firmware's
//! tasks and (eventually) the platform's timer ISRs reach through
//! [`with_engine`]. Axes never hold a pointer back to the engine — the
//! firmware task holds the only handle and addresses each axis by index,
//! per the "cyclic references" design note.

use core::cell::RefCell;
use critical_section::Mutex;
use ramp_queue::AxisController;

/// Number of axes this firmware instance manages. A real board's `main`
/// would size this to its stepper count; one is enough to demonstrate the
/// wiring this crate is responsible for.
pub const AXES: usize = 1;

/// All axis state the firmware owns, reachable from any task or ISR.
pub struct Engine {
    axes: [AxisController; AXES],
}

impl Engine {
    const fn new() -> Self {
        // AXES == 1, so a single-element array literal matches the type
        // without needing const-generic array-repeat support.
        Self {
            axes: [AxisController::new(true)],
        }
    }

    pub fn axis(&mut self, index: usize) -> Option<&mut AxisController> {
        self.axes.get_mut(index)
    }

    /// Refills every axis's queue. Call from a periodic task at ≥ 100 Hz, or
    /// from each axis's pulse-engine completion callback.
    pub fn refill_all(&mut self) {
        for axis in &mut self.axes {
            axis.refill();
        }
    }
}

static ENGINE: Mutex<RefCell<Engine>> = Mutex::new(RefCell::new(Engine::new()));

/// Runs `f` with exclusive, brief access to the process-wide engine. Safe to
/// call from both task and interrupt context.
pub fn with_engine<R>(f: impl FnOnce(&mut Engine) -> R) -> R {
    critical_section::with(|cs| f(&mut ENGINE.borrow_ref_mut(cs)))
}
