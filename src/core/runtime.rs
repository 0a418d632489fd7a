//

use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::interrupt::{Interrupt, InterruptHandle};
use crate::roles::consumer::{Consumer, ConsumerReport};
use crate::roles::interruptor::{interrupt_consumers, InterruptorReport};
use crate::roles::producer::produce;
use crate::roles::Shared;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub total: i64,
    pub produced: usize,
    pub interrupts: InterruptorReport,
    pub consumers: Vec<ConsumerReport>,
}

pub struct Runtime {
    config: Config,
}

type Handle<T> = JoinHandle<Result<T>>;

fn spawn<T, F>(role: &'static str, name: String, routine: F) -> Result<Handle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(routine)
        .map_err(|io_error| Error::Spawn { role, io_error })
}

fn join<T>(role: &'static str, handle: Handle<T>) -> Result<T> {
    handle.join().map_err(|_| Error::Panicked { role })?
}

// keeps the first failure of the run, logs the rest
fn settle<T>(first: &mut Option<Error>, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!("{}", err);
            if first.is_none() {
                *first = Some(err);
            }
            None
        }
    }
}

impl Runtime {
    pub fn new(config: Config) -> Self {
        Runtime { config }
    }

    /// Runs producer, interruptor and consumers to completion.
    ///
    /// Teardown happens on every path: once something fails the shutdown
    /// signal is raised, the work gate opened and every spawned thread joined
    /// before the first error is returned.
    pub fn run<R>(&self, input: R) -> Result<RunReport>
    where
        R: BufRead + Send + 'static,
    {
        let config = &self.config;
        let shared = Arc::new(Shared::new(config.participants(), config.timeout));
        let mut first = None;

        let producer = settle(&mut first, {
            let shared = Arc::clone(&shared);
            spawn("producer", "producer".to_string(), move || {
                shared.abort_on_error(produce(&shared, input))
            })
        });

        let points: Vec<Interrupt> = (0..config.consumers)
            .map(|_| Interrupt::new())
            .collect();
        let targets: Vec<InterruptHandle> = points.iter().map(Interrupt::handle).collect();
        let sleepers = targets.clone();

        let interruptor = settle(&mut first, {
            let shared = Arc::clone(&shared);
            spawn("interruptor", "interruptor".to_string(), move || {
                shared.abort_on_error(interrupt_consumers(&shared, targets))
            })
        });

        let mut consumers = Vec::with_capacity(config.consumers);
        for (index, interrupt) in points.into_iter().enumerate() {
            let shared = Arc::clone(&shared);
            let consumer = Consumer {
                max_sleep_ms: config.max_sleep_ms,
                debug: config.debug,
            };
            let spawned = spawn("consumer", format!("consumer-{}", index), move || {
                shared.abort_on_error(consumer.run(&shared, interrupt))
            });
            if let Some(handle) = settle(&mut first, spawned) {
                consumers.push(handle);
            }
        }
        debug!(consumers = consumers.len(), "threads spawned");

        if first.is_none() {
            settle(&mut first, shared.startup.wait_all(config.timeout));
        }
        if first.is_some() {
            shared.shutdown.set();
        }
        settle(&mut first, shared.work.open());
        info!(participants = shared.startup.target(), "work gate open");

        let produced = producer
            .and_then(|handle| settle(&mut first, join("producer", handle)))
            .unwrap_or(0);
        debug!(produced, "producer joined");

        shared.shutdown.set();
        let interrupts = interruptor
            .and_then(|handle| settle(&mut first, join("interruptor", handle)))
            .unwrap_or_default();
        debug!(issued = interrupts.issued, "interruptor joined");

        // cut every pause short, then release consumers blocked on the slot
        for sleeper in sleepers.iter() {
            sleeper.interrupt();
        }
        settle(&mut first, shared.mailbox.wake_all());
        let reports: Vec<ConsumerReport> = consumers
            .into_iter()
            .filter_map(|handle| settle(&mut first, join("consumer", handle)))
            .collect();

        if let Some(err) = first {
            return Err(err);
        }

        let mut total: i64 = 0;
        for report in reports.iter() {
            total = total.checked_add(report.sum).ok_or(Error::SumOverflow {
                thread_id: report.thread_id,
            })?;
        }
        info!(total, produced, "run complete");
        Ok(RunReport {
            total,
            produced,
            interrupts,
            consumers: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn config(consumers: usize, max_sleep_ms: u64) -> Config {
        Config::new(consumers, max_sleep_ms)
            .unwrap()
            .with_timeout(Duration::from_secs(30))
    }

    fn run(consumers: usize, max_sleep_ms: u64, line: &str) -> Result<RunReport> {
        Runtime::new(config(consumers, max_sleep_ms)).run(Cursor::new(line.to_string()))
    }

    #[test]
    fn four_consumers_five_values() {
        let report = run(4, 0, "1 2 3 4 5").unwrap();
        assert_eq!(report.total, 15);
        assert_eq!(report.produced, 5);
        assert_eq!(report.consumers.len(), 4);
        assert_eq!(report.consumers.iter().map(|c| c.claimed).sum::<usize>(), 5);
        assert!(report.interrupts.issued > 0);
    }

    #[test]
    fn stops_at_first_non_numeric_token() {
        let report = run(4, 0, "10 x 20").unwrap();
        assert_eq!(report.total, 10);
        assert_eq!(report.produced, 1);
    }

    #[test]
    fn single_consumer_empty_input() {
        let report = run(1, 0, "").unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.produced, 0);
        assert_eq!(report.consumers[0].claimed, 0);
    }

    #[test]
    fn sleeping_consumers_keep_the_sum() {
        let line: String = (1..=100)
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let report = run(8, 3, &line).unwrap();
        assert_eq!(report.total, 5050);
        assert_eq!(report.consumers.iter().map(|c| c.claimed).sum::<usize>(), 100);
    }

    #[test]
    fn random_inputs_conserve_sum() {
        let mut rng = rand::thread_rng();
        for _ in 0..5 {
            let consumers = rng.gen_range(1..=16);
            let values: Vec<i64> = (0..rng.gen_range(0..200))
                .map(|_| rng.gen_range(-1_000_000..=1_000_000))
                .collect();
            let line = values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let report = run(consumers, rng.gen_range(0..=2), &line).unwrap();
            assert_eq!(report.total, values.iter().sum::<i64>());
            assert_eq!(report.produced, values.len());
        }
    }

    #[test]
    fn input_overflow_is_fatal_but_joins_everyone() {
        match run(3, 0, "1 2 99999999999999999999 4") {
            Err(Error::InputOverflow { token }) => {
                assert_eq!(token, "99999999999999999999")
            }
            other => panic!("expected input overflow, got {:?}", other),
        }
    }

    #[test]
    fn total_overflow_is_fatal() {
        let line = format!("{} {}", i64::max_value(), i64::max_value());
        match run(2, 1, &line) {
            Err(Error::SumOverflow { .. }) => {}
            other => panic!("expected sum overflow, got {:?}", other),
        }
    }

    #[test]
    fn long_pauses_do_not_delay_shutdown() {
        let start = Instant::now();
        let report = run(8, 8000, "1 2 3 4 5 6 7 8 9 10").unwrap();
        assert_eq!(report.total, 55);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn failing_consumer_releases_producer() {
        let config = Config::new(1, 0)
            .unwrap()
            .with_timeout(Duration::from_secs(3));
        let line = format!("{} 1 2 3 4", i64::max_value());
        let start = Instant::now();
        match Runtime::new(config).run(Cursor::new(line)) {
            Err(Error::SumOverflow { .. }) => {}
            other => panic!("expected sum overflow, got {:?}", other),
        }
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn invalid_utf8_ends_input() {
        let input = Cursor::new(b"1 2 \xff 3\n".to_vec());
        let report = Runtime::new(config(2, 0)).run(input).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.produced, 2);
    }

    #[test]
    #[ignore]
    fn thousand_consumers() {
        let line: String = (1..=10_000)
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let report = run(1000, 1, &line).unwrap();
        assert_eq!(report.total, 10_000 * 10_001 / 2);
    }
}
