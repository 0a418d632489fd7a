//

use std::cell::Cell;
use std::sync::Mutex;

pub struct Inc(usize);

impl Inc {
    pub const fn new() -> Self {
        Inc(0)
    }

    pub fn create(&mut self) -> usize {
        let Self(next_id) = self;
        *next_id += 1;
        *next_id
    }
}

static THREAD_IDS: Mutex<Inc> = Mutex::new(Inc::new());

thread_local! {
    static THREAD_ID: Cell<Option<usize>> = Cell::new(None);
}

/// Small per-thread id, assigned on first call and stable afterwards.
///
/// Ids start from 1 and follow the order in which threads first ask for one.
pub fn thread_id() -> usize {
    THREAD_ID.with(|id| match id.get() {
        Some(id) => id,
        None => {
            let new_id = THREAD_IDS
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .create();
            id.set(Some(new_id));
            new_id
        }
    })
}
