pub use self::gvk::{CORE_VERSION, GroupVersionKind, WILDCARD};

mod gvk;
