//

#[macro_use]
extern crate failure_derive;

pub mod core;
pub mod roles;
pub mod util;

use std::io::BufRead;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::core::runtime::{RunReport, Runtime};

/// Runs one producer, `config.consumers` consumers and the interruptor over
/// the first line of `input`, returning the sum of everything consumed.
pub fn run<R>(config: Config, input: R) -> Result<i64>
where
    R: BufRead + Send + 'static,
{
    Ok(Runtime::new(config).run(input)?.total)
}
