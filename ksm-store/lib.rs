pub use self::builder::{Builder, BuilderError, BuiltStores, ShardFilter, StoreHandler, StorePlan};
pub use self::custom_resources::{CustomResourceError, CustomResourceFactory};

pub mod custom_resources;
pub mod resources;
pub mod values;

mod builder;
