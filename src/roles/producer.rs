//

use std::io::BufRead;

use tracing::{debug, trace};

use crate::core::error::Result;
use crate::core::inc::thread_id;
use crate::roles::Shared;
use crate::util::tokens::Tokens;

/// Reads one line from `input` and hands every integer token to the mailbox.
///
/// Returns how many values were produced. Stops early, without error, once
/// the run is shut down by a failing participant.
pub fn produce<R: BufRead>(shared: &Shared, mut input: R) -> Result<usize> {
    let tid = thread_id();
    shared.startup.register()?;
    debug!(thread_id = tid, "producer registered");

    shared.work.wait(shared.timeout)?;
    if shared.shutdown.is_set() {
        debug!(thread_id = tid, "run aborted before start");
        return Ok(0);
    }

    let mut line = Vec::new();
    input.read_until(b'\n', &mut line)?;

    let mut produced = 0;
    for value in Tokens::new(&line) {
        let value = value?;
        let stored = shared
            .mailbox
            .produce(value, || shared.shutdown.is_set(), shared.timeout)?;
        if !stored {
            debug!(thread_id = tid, produced, "run aborted while producing");
            return Ok(produced);
        }
        produced += 1;
        trace!(thread_id = tid, value, "produced");
    }
    debug!(thread_id = tid, produced, "input exhausted");
    Ok(produced)
}
