//

use std::time::Duration;

use tracing::warn;

use crate::core::error::Result;
use crate::core::gate::{StartupGate, WorkGate};
use crate::core::mailbox::Mailbox;
use crate::core::shutdown::ShutdownSignal;

pub mod consumer;
pub mod interruptor;
pub mod producer;

/// Everything the participants of one run share. Handed out behind an `Arc`.
pub struct Shared {
    pub mailbox: Mailbox,
    pub startup: StartupGate,
    pub work: WorkGate,
    pub shutdown: ShutdownSignal,
    pub timeout: Duration,
}

impl Shared {
    pub fn new(participants: usize, timeout: Duration) -> Self {
        Shared {
            mailbox: Mailbox::new(),
            startup: StartupGate::new(participants),
            work: WorkGate::new(),
            shutdown: ShutdownSignal::new(),
            timeout,
        }
    }

    /// Raises shutdown and wakes the mailbox when a participant fails.
    pub fn abort_on_error<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("aborting run: {}", err);
            self.shutdown.set();
            if let Err(wake_err) = self.mailbox.wake_all() {
                warn!("{}", wake_err);
            }
        }
        result
    }
}
