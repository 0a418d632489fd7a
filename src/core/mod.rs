//

pub mod config;
pub mod error;
pub mod gate;
pub mod inc;
pub mod interrupt;
pub mod mailbox;
pub mod runtime;
pub mod shutdown;
