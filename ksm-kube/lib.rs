pub use self::core::{CORE_VERSION, GroupVersionKind, WILDCARD};
pub use self::watcher::{EventHandler, WatchEvent, WatchOptions, watch};

pub mod client;
pub mod discovery;
pub mod utils;

mod core;
mod stream_backoff;
mod watcher;
