//

use std::env;
use std::time::Duration;

use crate::core::error::{Error, Result};

pub const MIN_CONSUMERS: usize = 1;
pub const MAX_CONSUMERS: usize = 1000;
pub const MAX_SLEEP_MS: u64 = 1_000_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const TIMEOUT_ENV: &str = "MAILROOM_TIMEOUT_SECS";
pub const DEBUG_FLAG: &str = "-debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub consumers: usize,
    /// Upper bound of the random consumer pause; zero means yield.
    pub max_sleep_ms: u64,
    pub debug: bool,
    /// Bound on every wait for a peer. Running out of it aborts the run.
    pub timeout: Duration,
}

impl Config {
    pub fn new(consumers: usize, max_sleep_ms: u64) -> Result<Self> {
        if consumers < MIN_CONSUMERS || consumers > MAX_CONSUMERS {
            return Err(Error::usage(format!(
                "{} <= N <= {}",
                MIN_CONSUMERS, MAX_CONSUMERS
            )));
        }
        if max_sleep_ms > MAX_SLEEP_MS {
            return Err(Error::usage(format!("0 <= MS <= {}", MAX_SLEEP_MS)));
        }
        Ok(Config {
            consumers,
            max_sleep_ms,
            debug: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parses `N MS [-debug]` (program name already stripped).
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        if args.len() != 2 && args.len() != 3 {
            return Err(Error::usage("expected 2 or 3 arguments"));
        }
        let consumers = args[0].as_ref().trim().parse::<usize>().map_err(|_| {
            Error::usage(format!("{} <= N <= {}", MIN_CONSUMERS, MAX_CONSUMERS))
        })?;
        let max_sleep_ms = args[1]
            .as_ref()
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::usage(format!("0 <= MS <= {}", MAX_SLEEP_MS)))?;
        let debug = match args.get(2) {
            Some(flag) if flag.as_ref() == DEBUG_FLAG => true,
            Some(_) => {
                return Err(Error::usage(format!(
                    "invalid argument, '{}' expected",
                    DEBUG_FLAG
                )))
            }
            None => false,
        };
        Ok(Config::new(consumers, max_sleep_ms)?.with_debug(debug))
    }

    /// Applies `MAILROOM_TIMEOUT_SECS` when it holds a positive integer.
    pub fn with_env(self) -> Self {
        match env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
        {
            Some(secs) if secs > 0 => self.with_timeout(Duration::from_secs(secs)),
            _ => self,
        }
    }

    /// Producer, interruptor and every consumer.
    pub fn participants(&self) -> usize {
        self.consumers + 2
    }

    pub fn usage(program: &str) -> String {
        format!("Usage: {} (N) (MS) [{}]", program, DEBUG_FLAG)
    }
}
