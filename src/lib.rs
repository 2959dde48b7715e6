mod builder;
mod cache;
mod engine;
mod error;
mod metrics;
mod store;
mod sync;
pub mod listener;
pub mod loader;
pub mod weigher;

pub use builder::CacheBuilder;
pub use cache::LruCache;
pub use error::{CacheError, CacheResult};
pub use metrics::stats::Metrics;
pub use sync::SyncLruCache;
