//

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};

fn wait_until<'a, T, F>(
    cond: &Condvar,
    mut guard: MutexGuard<'a, T>,
    timeout: Duration,
    what: &'static str,
    waiting_for: &'static str,
    done: F,
) -> Result<MutexGuard<'a, T>>
where
    F: Fn(&T) -> bool,
{
    let deadline = Instant::now() + timeout;
    while !done(&*guard) {
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout { waiting_for });
        }
        guard = cond
            .wait_timeout(guard, deadline - now)
            .map_err(|_| Error::Poisoned { what })?
            .0;
    }
    Ok(guard)
}

/// Count-down latch: every participant registers once, the orchestrator
/// waits for all of them.
pub struct StartupGate {
    registered: Mutex<usize>,
    target: usize,
    all_in: Condvar,
}

impl StartupGate {
    pub fn new(target: usize) -> Self {
        StartupGate {
            registered: Mutex::new(0),
            target,
            all_in: Condvar::new(),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    fn lock(&self) -> Result<MutexGuard<usize>> {
        self.registered.lock().map_err(|_| Error::Poisoned {
            what: "startup gate",
        })
    }

    /// Marks the calling participant as alive. Returns how many are in now.
    pub fn register(&self) -> Result<usize> {
        let mut registered = self.lock()?;
        if *registered == self.target {
            return Err(Error::Overregistered {
                target: self.target,
            });
        }
        *registered += 1;
        if *registered == self.target {
            self.all_in.notify_all();
        }
        Ok(*registered)
    }

    pub fn registered(&self) -> Result<usize> {
        Ok(*self.lock()?)
    }

    /// Blocks until every participant has registered.
    pub fn wait_all(&self, timeout: Duration) -> Result<()> {
        let target = self.target;
        let registered = self.lock()?;
        wait_until(
            &self.all_in,
            registered,
            timeout,
            "startup gate",
            "all threads to start",
            |registered| *registered == target,
        )?;
        Ok(())
    }
}

/// One-shot latch releasing every participant at once. Never closes again.
pub struct WorkGate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Default for WorkGate {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkGate {
    pub fn new() -> Self {
        WorkGate {
            open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<bool>> {
        self.open
            .lock()
            .map_err(|_| Error::Poisoned { what: "work gate" })
    }

    pub fn open(&self) -> Result<()> {
        let mut open = self.lock()?;
        *open = true;
        self.opened.notify_all();
        Ok(())
    }

    pub fn is_open(&self) -> Result<bool> {
        Ok(*self.lock()?)
    }

    pub fn wait(&self, timeout: Duration) -> Result<()> {
        let open = self.lock()?;
        wait_until(
            &self.opened,
            open,
            timeout,
            "work gate",
            "the work gate to open",
            |open| *open,
        )?;
        Ok(())
    }
}
