mod backend;
mod clock;
mod entry;
mod key;
mod store;

pub use backend::{CacheBackend, FileBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::cache_key;
pub use store::{CacheStats, CacheStore, LoadSummary, DEFAULT_TTL};
