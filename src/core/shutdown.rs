//

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::utils::CachePadded;

/// Stop request shared by the interruptor and the consumers. Set once.
#[derive(Default)]
pub struct ShutdownSignal(CachePadded<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        ShutdownSignal(CachePadded::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
