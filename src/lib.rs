//! # cachemap
//!
//! An in-memory key-value map with per-entry TTL (time-to-live) expiry.
//!
//! ## Features
//!
//! - Entries become invisible once their age exceeds the configured TTL
//! - Lazy expiry: every operation sweeps expired entries before running,
//!   with no timer thread involved
//! - Writes refresh an entry's age; plain reads never do
//! - Pluggable time source, with a manual clock for deterministic tests
//!
//! ## Example
//!
//! ```rust
//! use cachemap::{CacheMap, MapConfig};
//! use std::time::Duration;
//!
//! // Default configuration: entries live for one second.
//! let mut map = CacheMap::new();
//! map.put("session:42", "alice");
//! assert_eq!(map.get(&"session:42"), Some(&"alice"));
//!
//! // Or configure sizing hints and the TTL explicitly.
//! let config = MapConfig::default()
//!     .with_initial_capacity(64)
//!     .with_time_to_live(Duration::from_secs(30));
//! let mut map: cachemap::CacheMap<String, u64> = CacheMap::with_config(config);
//! map.put("hits".to_string(), 1);
//! map.merge("hits".to_string(), 1, |old, new| Some(old + new));
//! assert_eq!(map.get(&"hits".to_string()), Some(&2));
//! ```
//!
//! The map is single-threaded: read operations take `&mut self` because
//! sweeping expired entries mutates the map. Wrap it in a lock if it must
//! be shared across threads.

mod clock;
mod config;
mod entry;
mod map;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MapConfig, DEFAULT_TIME_TO_LIVE};
pub use entry::TimedEntry;
pub use map::CacheMap;
