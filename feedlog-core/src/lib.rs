//! Feedlog core library.
//!
//! Provides configuration, the access gate, feeding records, day-window
//! arithmetic in a configured time zone, and record storage.

pub mod access;
pub mod config;
pub mod record;
pub mod storage;
pub mod window;

pub use access::AccessGate;
pub use config::{Config, ConfigError, Settings};
pub use record::{Amount, FeedingRecord, RecordId, ValidationError};
pub use storage::{FeedingStore, SqliteStore, StorageError, create_storage};
pub use window::{Clock, DayWindow, FixedClock, SystemClock, start_of_today};
