//

extern crate mailroom;

use std::env;
use std::io::{self, BufReader};
use std::process;

use mailroom::util::logger::LoggerConfig;
use mailroom::{Config, Error};

fn main() {
    LoggerConfig::from_env().init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "mailroom".to_string());
    let config = match Config::from_args(args) {
        Ok(config) => config.with_env(),
        Err(err) => {
            eprintln!("{}", Config::usage(&program));
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    match mailroom::run(config, BufReader::new(io::stdin())) {
        Ok(total) => println!("{}", total),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(exit_code(&err));
        }
    }
}

fn exit_code(err: &Error) -> i32 {
    if err.is_usage() {
        1
    } else {
        2
    }
}
