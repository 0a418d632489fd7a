//

pub mod logger;
pub mod tokens;
