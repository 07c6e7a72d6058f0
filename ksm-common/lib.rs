pub use self::utils::*;

pub mod logging;
pub mod tasks;

mod utils;
