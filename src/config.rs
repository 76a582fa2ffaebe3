use std::time::Duration;

/// Time-to-live applied when none is configured: 1000 milliseconds.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_millis(1000);

const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Configuration for a [`CacheMap`](crate::CacheMap).
///
/// Capacity and load factor are sizing hints passed to the backing store
/// and carry no expiry semantics. The map is pre-sized for roughly
/// `initial_capacity * load_factor` entries, which is the number of entries
/// a bucket table of `initial_capacity` slots holds before resizing.
///
/// # Example
///
/// ```rust
/// use cachemap::MapConfig;
/// use std::time::Duration;
///
/// let config = MapConfig::default()
///     .with_initial_capacity(64)
///     .with_time_to_live(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Sizing hint for the backing store (default: 0, no pre-allocation)
    pub initial_capacity: usize,
    /// Sizing hint scaling the capacity (default: 0.75)
    pub load_factor: f32,
    /// Maximum entry age before it is treated as absent (default: 1000 ms)
    pub time_to_live: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            time_to_live: DEFAULT_TIME_TO_LIVE,
        }
    }
}

impl MapConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backing store's initial capacity hint
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the load factor the capacity hint is scaled by
    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Sets the time-to-live applied to every entry
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = ttl;
        self
    }

    /// Number of entries to pre-size the backing store for.
    pub(crate) fn effective_capacity(&self) -> usize {
        (self.initial_capacity as f32 * self.load_factor.max(0.0)).ceil() as usize
    }
}
