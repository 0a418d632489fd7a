//

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::{Parker, Unparker};

struct State {
    requested: AtomicBool,
    critical: AtomicBool,
}

/// Cooperative interruption point owned by one consumer.
///
/// Requests are only acted upon in `checkpoint`, `pause` and `yield_now`,
/// which the consumer calls outside any lock. While a `CriticalSection` is
/// alive requests are recorded but not delivered.
pub struct Interrupt {
    state: Arc<State>,
    parker: Parker,
}

/// Sender side of an `Interrupt`; stays valid after the consumer exits.
#[derive(Clone)]
pub struct InterruptHandle {
    state: Arc<State>,
    unparker: Unparker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The target was woken (or will not sleep on its next pause).
    Delivered,
    /// The target is inside its critical section; the request waits for the
    /// next checkpoint.
    Deferred,
}

pub struct CriticalSection<'a> {
    state: &'a State,
}

impl<'a> Drop for CriticalSection<'a> {
    fn drop(&mut self) {
        self.state.critical.store(false, Ordering::Release);
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        Interrupt {
            state: Arc::new(State {
                requested: AtomicBool::new(false),
                critical: AtomicBool::new(false),
            }),
            parker: Parker::new(),
        }
    }

    pub fn handle(&self) -> InterruptHandle {
        InterruptHandle {
            state: Arc::clone(&self.state),
            unparker: self.parker.unparker().clone(),
        }
    }

    /// Marks the region where interrupts must not land.
    pub fn critical(&self) -> CriticalSection {
        self.state.critical.store(true, Ordering::Release);
        CriticalSection { state: &self.state }
    }

    pub fn in_critical(&self) -> bool {
        self.state.critical.load(Ordering::Acquire)
    }

    /// Takes a pending request, if any.
    ///
    /// A taken request also drops the wake-up token it left on the parker, so
    /// the next `pause` sleeps in full.
    pub fn checkpoint(&self) -> bool {
        debug_assert!(!self.in_critical(), "checkpoint inside critical section");
        let taken = self.state.requested.swap(false, Ordering::AcqRel);
        if taken {
            self.parker.park_timeout(Duration::from_millis(0));
        }
        taken
    }

    /// Sleeps up to `duration`; an interrupt request cuts the sleep short.
    pub fn pause(&self, duration: Duration) -> bool {
        if self.checkpoint() {
            return true;
        }
        self.parker.park_timeout(duration);
        self.checkpoint()
    }

    pub fn yield_now(&self) -> bool {
        thread::yield_now();
        self.checkpoint()
    }
}

impl InterruptHandle {
    /// Fire and forget. A consumer that already exited simply never looks.
    pub fn interrupt(&self) -> Delivery {
        self.state.requested.store(true, Ordering::Release);
        if self.state.critical.load(Ordering::Acquire) {
            Delivery::Deferred
        } else {
            self.unparker.unpark();
            Delivery::Delivered
        }
    }
}
