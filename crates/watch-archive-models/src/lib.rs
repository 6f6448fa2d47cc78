pub mod certification;
pub mod detail;
pub mod record;
pub mod watch_entry;

pub use certification::{CertificationMap, DEFAULT_REGION_PREFERENCE};
pub use detail::DetailRecord;
pub use record::{RecordKey, ResolvedRecord};
pub use watch_entry::WatchEntry;
