//

use std::thread;

use rand::seq::SliceRandom;
use tracing::debug;

use crate::core::error::Result;
use crate::core::inc::thread_id;
use crate::core::interrupt::{Delivery, InterruptHandle};
use crate::roles::Shared;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterruptorReport {
    pub issued: usize,
    pub deferred: usize,
}

/// Keeps interrupting a random consumer until shutdown is requested.
///
/// No pause between requests. Targets that already exited are still picked;
/// the request just goes nowhere.
pub fn interrupt_consumers(
    shared: &Shared,
    targets: Vec<InterruptHandle>,
) -> Result<InterruptorReport> {
    let tid = thread_id();
    shared.startup.register()?;
    debug!(thread_id = tid, targets = targets.len(), "interruptor registered");
    shared.work.wait(shared.timeout)?;

    let mut rng = rand::thread_rng();
    let mut report = InterruptorReport::default();
    loop {
        match targets.choose(&mut rng) {
            Some(target) => {
                if target.interrupt() == Delivery::Deferred {
                    report.deferred += 1;
                }
                report.issued += 1;
            }
            None => thread::yield_now(),
        }
        if shared.shutdown.is_set() {
            break;
        }
    }
    debug!(
        thread_id = tid,
        issued = report.issued,
        deferred = report.deferred,
        "interruptor exits"
    );
    Ok(report)
}
