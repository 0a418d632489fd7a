//

use std::io;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "{}", reason)]
    Usage { reason: String },
    #[fail(display = "integer overflow in input token '{}'", token)]
    InputOverflow { token: String },
    #[fail(display = "sum overflow in thread {}", thread_id)]
    SumOverflow { thread_id: usize },
    #[fail(display = "timed out waiting for {}", waiting_for)]
    Timeout { waiting_for: &'static str },
    #[fail(display = "poisoned lock on {}", what)]
    Poisoned { what: &'static str },
    #[fail(display = "more than {} threads registered on startup gate", target)]
    Overregistered { target: usize },
    #[fail(display = "fail to spawn {} thread: {}", role, io_error)]
    Spawn {
        role: &'static str,
        io_error: io::Error,
    },
    #[fail(display = "{} thread panicked", role)]
    Panicked { role: &'static str },
    #[fail(display = "fail to read input: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(io_err: io::Error) -> Self {
        Error::Io(io_err)
    }
}

impl Error {
    pub fn usage<S: Into<String>>(reason: S) -> Self {
        Error::Usage {
            reason: reason.into(),
        }
    }

    // usage errors are reported with the help text and exit code 1,
    // everything else aborts the run
    pub fn is_usage(&self) -> bool {
        match self {
            Error::Usage { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
