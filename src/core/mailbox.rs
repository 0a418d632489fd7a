//

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};

struct Slot {
    value: i64,
    // true while the slot is empty
    consumed: bool,
}

/// Outcome of waiting for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// A value is sitting in the slot; race for it with `try_consume`.
    Ready,
    /// The stop predicate holds and the slot is empty.
    Stop,
    /// Nothing happened within the wait bound.
    Idle,
}

/// Single-slot handoff between one producer and many consumers.
///
/// `{value, consumed}` is only touched with the lock held and the condition
/// variable is only awaited under that same lock.
pub struct Mailbox {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox {
            slot: Mutex::new(Slot {
                value: 0,
                consumed: true,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<Slot>> {
        self.slot
            .lock()
            .map_err(|_| Error::Poisoned { what: "mailbox" })
    }

    /// Blocks until the slot is empty, then stores `value` and wakes one waiter.
    ///
    /// Returns `false` without storing anything if `should_stop` holds while
    /// the slot is still full. Running out of `timeout` means no consumer
    /// drained the slot and is fatal.
    pub fn produce<F>(&self, value: i64, should_stop: F, timeout: Duration) -> Result<bool>
    where
        F: Fn() -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock()?;
        while !slot.consumed {
            if should_stop() {
                return Ok(false);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout {
                    waiting_for: "consumers to drain the mailbox",
                });
            }
            slot = self
                .changed
                .wait_timeout(slot, deadline - now)
                .map_err(|_| Error::Poisoned { what: "mailbox" })?
                .0;
        }
        slot.value = value;
        slot.consumed = false;
        self.changed.notify_one();
        Ok(true)
    }

    /// Blocks while the slot is empty and `should_stop` is false.
    ///
    /// A pending item wins over `should_stop`, so the last value is never left
    /// behind at shutdown. Returns `Wait::Idle` once `timeout` elapses, leaving
    /// the caller to poll again.
    pub fn wait_for_item<F>(&self, should_stop: F, timeout: Duration) -> Result<Wait>
    where
        F: Fn() -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock()?;
        loop {
            if !slot.consumed {
                return Ok(Wait::Ready);
            }
            if should_stop() {
                return Ok(Wait::Stop);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(Wait::Idle);
            }
            slot = self
                .changed
                .wait_timeout(slot, deadline - now)
                .map_err(|_| Error::Poisoned { what: "mailbox" })?
                .0;
        }
    }

    /// Claims the pending value if it is still there.
    ///
    /// `None` means another consumer got it first. A successful claim wakes
    /// everyone: the producer and idle consumers wait on the same flag.
    pub fn try_consume(&self) -> Result<Option<i64>> {
        let mut slot = self.lock()?;
        if slot.consumed {
            return Ok(None);
        }
        slot.consumed = true;
        let value = slot.value;
        self.changed.notify_all();
        Ok(Some(value))
    }

    /// Wakes every waiter so it re-evaluates its predicate.
    pub fn wake_all(&self) -> Result<()> {
        let _slot = self.lock()?;
        self.changed.notify_all();
        Ok(())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const LONG: Duration = Duration::from_secs(10);

    #[test]
    fn starts_empty() {
        let mailbox = Mailbox::new();
        assert!(mailbox.is_empty().unwrap());
        assert_eq!(mailbox.try_consume().unwrap(), None);
    }

    #[test]
    fn produce_then_consume() {
        let mailbox = Mailbox::new();
        assert!(mailbox.produce(42, || false, LONG).unwrap());
        assert!(!mailbox.is_empty().unwrap());
        assert_eq!(mailbox.wait_for_item(|| false, LONG).unwrap(), Wait::Ready);
        assert_eq!(mailbox.try_consume().unwrap(), Some(42));
        assert_eq!(mailbox.try_consume().unwrap(), None);
        assert!(mailbox.is_empty().unwrap());
    }

    #[test]
    fn produce_times_out_on_full_slot() {
        let mailbox = Mailbox::new();
        mailbox.produce(1, || false, LONG).unwrap();
        match mailbox.produce(2, || false, Duration::from_millis(20)) {
            Err(Error::Timeout { .. }) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
        // the first value is still there
        assert_eq!(mailbox.try_consume().unwrap(), Some(1));
    }

    #[test]
    fn stopped_producer_gives_up_on_full_slot() {
        let mailbox = Arc::new(Mailbox::new());
        let stop = Arc::new(AtomicBool::new(false));
        assert!(mailbox.produce(1, || false, LONG).unwrap());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let start = Instant::now();
                let stored = mailbox.produce(2, || stop.load(Ordering::SeqCst), LONG);
                (stored, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::SeqCst);
        mailbox.wake_all().unwrap();
        let (stored, elapsed) = producer.join().unwrap();
        assert!(!stored.unwrap());
        assert!(elapsed < LONG);
        assert_eq!(mailbox.try_consume().unwrap(), Some(1));
        // an empty slot still takes the value
        assert!(mailbox.produce(3, || true, LONG).unwrap());
    }

    #[test]
    fn stop_only_when_empty() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.wait_for_item(|| true, LONG).unwrap(), Wait::Stop);
        mailbox.produce(7, || false, LONG).unwrap();
        assert_eq!(mailbox.wait_for_item(|| true, LONG).unwrap(), Wait::Ready);
    }

    #[test]
    fn idle_after_timeout() {
        let mailbox = Mailbox::new();
        assert_eq!(
            mailbox
                .wait_for_item(|| false, Duration::from_millis(10))
                .unwrap(),
            Wait::Idle
        );
    }

    #[test]
    fn wake_all_releases_parked_waiter() {
        let mailbox = Arc::new(Mailbox::new());
        let stop = Arc::new(AtomicBool::new(false));
        let waiter = {
            let mailbox = Arc::clone(&mailbox);
            let stop = Arc::clone(&stop);
            thread::spawn(move || mailbox.wait_for_item(|| stop.load(Ordering::SeqCst), LONG))
        };
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::SeqCst);
        mailbox.wake_all().unwrap();
        assert_eq!(waiter.join().unwrap().unwrap(), Wait::Stop);
    }

    #[test]
    fn every_value_claimed_once() {
        let mailbox = Arc::new(Mailbox::new());
        let done = Arc::new(AtomicBool::new(false));
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let mailbox = Arc::clone(&mailbox);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut claimed = Vec::new();
                    loop {
                        match mailbox
                            .wait_for_item(|| done.load(Ordering::SeqCst), LONG)
                            .unwrap()
                        {
                            Wait::Stop => return claimed,
                            Wait::Idle => continue,
                            Wait::Ready => {
                                if let Some(value) = mailbox.try_consume().unwrap() {
                                    claimed.push(value);
                                }
                            }
                        }
                    }
                })
            })
            .collect();

        for value in 1..=1000 {
            mailbox.produce(value, || false, LONG).unwrap();
        }
        done.store(true, Ordering::SeqCst);
        mailbox.wake_all().unwrap();

        let mut all: Vec<i64> = consumers
            .into_iter()
            .flat_map(|c| c.join().unwrap())
            .collect();
        all.sort();
        assert_eq!(all, (1..=1000).collect::<Vec<i64>>());
    }
}
