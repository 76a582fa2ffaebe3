use std::time::{Duration, Instant};

/// A stored value together with the time it was last written.
///
/// The write time is refreshed by every mutating operation that is
/// documented to refresh, and left untouched by plain reads.
#[derive(Debug, Clone)]
pub struct TimedEntry<V> {
    value: V,
    written_at: Instant,
}

impl<V> TimedEntry<V> {
    /// Creates an entry stamped with the given write time.
    pub fn new(value: V, written_at: Instant) -> Self {
        Self { value, written_at }
    }

    /// Returns the stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the time this entry was last written.
    pub fn written_at(&self) -> Instant {
        self.written_at
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    /// Resets the write time, postponing expiry.
    pub(crate) fn touch(&mut self, now: Instant) {
        self.written_at = now;
    }

    /// Checks whether this entry's age exceeds `ttl` at `now`.
    ///
    /// The test is a strict greater-than: an entry whose age equals the TTL
    /// exactly is still alive. A `now` earlier than the write time reads as
    /// age zero (`saturating_duration_since`), so the entry survives.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.written_at) > ttl
    }
}
