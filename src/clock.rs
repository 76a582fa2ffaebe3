use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source consumed by the map.
///
/// The map only requires that `now` yields points whose difference from a
/// recorded write time can be compared against the configured TTL.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The default time source, backed by the monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Intended for tests.
///
/// Clones share the same underlying time, so a test can hand one handle to
/// the map and keep another to advance:
///
/// ```rust
/// use cachemap::{CacheMap, ManualClock, MapConfig};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut map = CacheMap::with_clock(MapConfig::default(), clock.clone());
/// map.put("k", 1);
/// clock.advance(Duration::from_millis(1001));
/// assert_eq!(map.get(&"k"), None);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Creates a manual clock starting at the current instant.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Moves this clock (and every clone of it) forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
