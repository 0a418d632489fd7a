//

use std::time::Duration;

use rand::Rng;
use tracing::{debug, trace};

use crate::core::error::{Error, Result};
use crate::core::inc::thread_id;
use crate::core::interrupt::Interrupt;
use crate::core::mailbox::Wait;
use crate::roles::Shared;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerReport {
    pub thread_id: usize,
    pub sum: i64,
    pub claimed: usize,
    pub interrupted: usize,
}

/// `-debug` trace printed after every claim: `(threadId, runningSum)`.
pub fn debug_line(thread_id: usize, sum: i64) -> String {
    format!("({}, {})", thread_id, sum)
}

pub struct Consumer {
    pub max_sleep_ms: u64,
    pub debug: bool,
}

impl Consumer {
    /// Drains the mailbox until shutdown is requested and the slot is empty.
    ///
    /// The claim is the only place touching shared state and runs inside the
    /// interrupt's critical section; interrupts land on the idle pause.
    pub fn run(&self, shared: &Shared, interrupt: Interrupt) -> Result<ConsumerReport> {
        let tid = thread_id();
        shared.startup.register()?;
        debug!(thread_id = tid, "consumer registered");
        shared.work.wait(shared.timeout)?;

        let mut rng = rand::thread_rng();
        let mut report = ConsumerReport {
            thread_id: tid,
            sum: 0,
            claimed: 0,
            interrupted: 0,
        };
        loop {
            match shared
                .mailbox
                .wait_for_item(|| shared.shutdown.is_set(), shared.timeout)?
            {
                Wait::Stop => break,
                Wait::Idle => continue,
                Wait::Ready => {}
            }

            let claimed = {
                let _critical = interrupt.critical();
                shared.mailbox.try_consume()?
            };
            if let Some(value) = claimed {
                report.sum = report
                    .sum
                    .checked_add(value)
                    .ok_or(Error::SumOverflow { thread_id: tid })?;
                report.claimed += 1;
                if self.debug {
                    println!("{}", debug_line(tid, report.sum));
                }
            }

            // nothing left to desynchronize once the run is shutting down
            if shared.shutdown.is_set() {
                continue;
            }
            let interrupted = if self.max_sleep_ms == 0 {
                interrupt.yield_now()
            } else {
                let pause = rng.gen_range(0..=self.max_sleep_ms);
                interrupt.pause(Duration::from_millis(pause))
            };
            if interrupted {
                report.interrupted += 1;
                trace!(thread_id = tid, sum = report.sum, "interrupted");
            }
        }
        debug!(
            thread_id = tid,
            sum = report.sum,
            claimed = report.claimed,
            interrupted = report.interrupted,
            "consumer exits"
        );
        Ok(report)
    }
}
