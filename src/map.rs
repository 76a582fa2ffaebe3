use std::collections::{hash_map, HashMap};
use std::hash::Hash;
use std::time::Duration;

use ahash::RandomState;
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::config::MapConfig;
use crate::entry::TimedEntry;

/// Key-value map whose entries expire once their age exceeds a configured
/// time-to-live.
///
/// Expiry is lazy: there is no timer thread. Every public operation first
/// sweeps out the entries that have expired by then, so no expired entry is
/// ever observable through the API, but entries may sit in memory past
/// their TTL until the next call. Because of the sweep, read operations
/// take `&mut self` and can shrink the map.
///
/// Mutating operations that write a value (`put`, `replace`, the
/// `compute*` family, `merge`, `replace_all`) stamp the entry with the
/// current time, resetting its age. Plain reads and a `put_if_absent` that
/// finds the key present leave the stamp alone.
///
/// The map is single-threaded by design; wrap it in a lock externally if
/// it must be shared.
///
/// # Example
///
/// ```rust
/// use cachemap::{CacheMap, MapConfig};
/// use std::time::Duration;
///
/// let mut map = CacheMap::with_config(
///     MapConfig::default().with_time_to_live(Duration::from_secs(30)),
/// );
///
/// map.put("user:123", "John");
/// assert_eq!(map.get(&"user:123"), Some(&"John"));
///
/// map.remove(&"user:123");
/// assert!(map.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CacheMap<K, V, C = SystemClock> {
    entries: HashMap<K, TimedEntry<V>, RandomState>,
    ttl: Duration,
    clock: C,
}

impl<K: Eq + Hash, V> CacheMap<K, V> {
    /// Creates a map with the default configuration (1000 ms TTL) and the
    /// system clock.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    /// Creates a map with the given time-to-live and the system clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_config(MapConfig::default().with_time_to_live(ttl))
    }

    /// Creates a map with the given configuration and the system clock.
    pub fn with_config(config: MapConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K: Eq + Hash, V, C: Clock> CacheMap<K, V, C> {
    /// Creates a map reading time from the given [`Clock`].
    ///
    /// Injecting a [`ManualClock`](crate::ManualClock) makes expiry fully
    /// deterministic in tests.
    pub fn with_clock(config: MapConfig, clock: C) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(
                config.effective_capacity(),
                RandomState::default(),
            ),
            ttl: config.time_to_live,
            clock,
        }
    }

    /// Removes every entry whose age exceeds the TTL. Runs at the start of
    /// every public operation except `clear` and the TTL accessors.
    fn sweep(&mut self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        let removed = before - self.entries.len();
        if removed > 0 {
            trace!(removed, remaining = self.entries.len(), "swept expired entries");
        }
    }

    /// Returns the value stored under `key`, if it is present and alive.
    ///
    /// Looking a key up does not refresh its timestamp.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.sweep();
        self.entries.get(key).map(TimedEntry::value)
    }

    /// Returns the value stored under `key`, or `default` when the key is
    /// absent or expired. Never inserts and never refreshes.
    pub fn get_or_default<'a>(&'a mut self, key: &K, default: &'a V) -> &'a V {
        self.sweep();
        self.entries.get(key).map(TimedEntry::value).unwrap_or(default)
    }

    /// Checks whether `key` is present and alive.
    pub fn contains_key(&mut self, key: &K) -> bool {
        self.sweep();
        self.entries.contains_key(key)
    }

    /// Checks whether any live entry's value equals `value`.
    pub fn contains_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.sweep();
        self.entries.values().any(|entry| entry.value() == value)
    }

    /// Number of live entries.
    pub fn len(&mut self) -> usize {
        self.sweep();
        self.entries.len()
    }

    /// Checks whether the map holds no live entries.
    pub fn is_empty(&mut self) -> bool {
        self.sweep();
        self.entries.is_empty()
    }

    /// Inserts or overwrites the entry under `key` with a fresh timestamp
    /// and returns a reference to the stored value.
    ///
    /// Overwriting an existing key also resets its age.
    pub fn put(&mut self, key: K, value: V) -> &V {
        self.sweep();
        let now = self.clock.now();
        let entry = match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut slot) => {
                slot.insert(TimedEntry::new(value, now));
                slot.into_mut()
            }
            hash_map::Entry::Vacant(slot) => slot.insert(TimedEntry::new(value, now)),
        };
        entry.value()
    }

    /// Inserts `value` only when `key` is absent.
    ///
    /// Returns `None` when this call performed the insert, or the existing
    /// value otherwise. Finding the key present does **not** refresh its
    /// timestamp.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        self.sweep();
        let now = self.clock.now();
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(slot) => Some(slot.into_mut().value()),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(TimedEntry::new(value, now));
                None
            }
        }
    }

    /// Inserts every pair, each stamped at this call's current time.
    ///
    /// Timestamps the source pairs may have carried elsewhere are ignored.
    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.sweep();
        let now = self.clock.now();
        for (key, value) in entries {
            self.entries.insert(key, TimedEntry::new(value, now));
        }
    }

    /// Removes the entry under `key` and returns its value, or `None` when
    /// the key is absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.sweep();
        self.entries.remove(key).map(TimedEntry::into_value)
    }

    /// Removes the entry under `key` only when its current value equals
    /// `expected`. Returns whether a removal occurred.
    pub fn remove_matching(&mut self, key: &K, expected: &V) -> bool
    where
        V: PartialEq,
    {
        self.sweep();
        match self.entries.get(key) {
            Some(entry) if entry.value() == expected => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Overwrites the entry under `key` with a fresh timestamp, but only
    /// when the key is present. Returns the prior value.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.sweep();
        let now = self.clock.now();
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut slot) => {
                Some(slot.insert(TimedEntry::new(value, now)).into_value())
            }
            hash_map::Entry::Vacant(_) => None,
        }
    }

    /// Replaces the entry under `key` with `new_value` (fresh timestamp)
    /// when `key` is present **and** `old_value` equals some live value
    /// anywhere in the map. Returns whether a replacement occurred.
    ///
    /// Note the equality check is against any current value, not
    /// necessarily the one stored under `key`. That anywhere-match is an
    /// observable contract of this map, so callers wanting a true
    /// compare-and-swap should read the key first.
    pub fn replace_matching(&mut self, key: K, old_value: &V, new_value: V) -> bool
    where
        V: PartialEq,
    {
        self.sweep();
        if !self.entries.contains_key(&key) {
            return false;
        }
        if !self.entries.values().any(|entry| entry.value() == old_value) {
            return false;
        }
        let now = self.clock.now();
        self.entries.insert(key, TimedEntry::new(new_value, now));
        true
    }

    /// Returns the value under `key`, computing and inserting it first when
    /// the key is absent.
    ///
    /// The resulting entry carries a fresh timestamp either way, so calling
    /// this on a present key resets its age.
    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        self.sweep();
        let now = self.clock.now();
        let entry = match self.entries.entry(key) {
            hash_map::Entry::Occupied(slot) => {
                let entry = slot.into_mut();
                entry.touch(now);
                entry
            }
            hash_map::Entry::Vacant(slot) => {
                let value = f(slot.key());
                slot.insert(TimedEntry::new(value, now))
            }
        };
        entry.value()
    }

    /// Remaps the value under `key` when present. `None` from `f` removes
    /// the key; `Some` stores the new value with a fresh timestamp.
    ///
    /// Returns the computed value. `f` is not called for an absent key.
    pub fn compute_if_present<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, V) -> Option<V>,
    {
        self.sweep();
        let current = self.entries.remove(&key)?;
        let now = self.clock.now();
        match f(&key, current.into_value()) {
            Some(value) => Some(
                self.entries
                    .entry(key)
                    .or_insert(TimedEntry::new(value, now))
                    .value(),
            ),
            None => None,
        }
    }

    /// Remaps the value under `key` whether or not it is present. `f`
    /// receives the current value (`None` when absent); returning `None`
    /// leaves the key removed, `Some` stores the value with a fresh
    /// timestamp.
    ///
    /// Returns the computed value. Because every `Some` result is
    /// re-stamped even when the value is unchanged, periodically computing
    /// on a key postpones its expiry indefinitely.
    pub fn compute<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>,
    {
        self.sweep();
        let current = self.entries.remove(&key).map(TimedEntry::into_value);
        let now = self.clock.now();
        match f(&key, current) {
            Some(value) => Some(
                self.entries
                    .entry(key)
                    .or_insert(TimedEntry::new(value, now))
                    .value(),
            ),
            None => None,
        }
    }

    /// Inserts `value` when `key` is absent, or combines the existing value
    /// with `value` through `f` when present. `None` from `f` removes the
    /// key. The resulting entry carries a fresh timestamp.
    ///
    /// Returns the merged value.
    pub fn merge<F>(&mut self, key: K, value: V, f: F) -> Option<&V>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        self.sweep();
        let merged = match self.entries.remove(&key).map(TimedEntry::into_value) {
            Some(existing) => f(existing, value),
            None => Some(value),
        };
        let now = self.clock.now();
        match merged {
            Some(value) => Some(
                self.entries
                    .entry(key)
                    .or_insert(TimedEntry::new(value, now))
                    .value(),
            ),
            None => None,
        }
    }

    /// Visits every live entry.
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        self.sweep();
        for (key, entry) in self.entries.iter() {
            f(key, entry.value());
        }
    }

    /// Rewrites every live entry with `f(key, current)`.
    ///
    /// Every retained entry gets a fresh timestamp, even when `f` returns
    /// the value unchanged.
    pub fn replace_all<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &V) -> V,
    {
        self.sweep();
        let now = self.clock.now();
        for (key, entry) in self.entries.iter_mut() {
            let value = f(key, entry.value());
            *entry = TimedEntry::new(value, now);
        }
    }

    /// Removes all entries unconditionally. Does not sweep and does not
    /// consult the TTL.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over the live entries.
    ///
    /// The map cannot be mutated while the iterator is borrowed, so the
    /// view stays consistent with the sweep that produced it.
    pub fn iter(&mut self) -> impl Iterator<Item = (&K, &V)> {
        self.sweep();
        self.entries.iter().map(|(key, entry)| (key, entry.value()))
    }

    /// Iterates over the live keys.
    pub fn keys(&mut self) -> impl Iterator<Item = &K> {
        self.sweep();
        self.entries.keys()
    }

    /// Iterates over the live values.
    pub fn values(&mut self) -> impl Iterator<Item = &V> {
        self.sweep();
        self.entries.values().map(TimedEntry::value)
    }

    /// Copies the live entries into a plain `HashMap`.
    pub fn to_map(&mut self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.sweep();
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value().clone()))
            .collect()
    }

    /// Live entries as of this instant, without removing the expired ones.
    /// Comparison support; every mutating path goes through `sweep` instead.
    fn live_entries(&self) -> impl Iterator<Item = (&K, &V)> {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries
            .iter()
            .filter(move |(_, entry)| !entry.is_expired(now, ttl))
            .map(|(key, entry)| (key, entry.value()))
    }

    /// The configured time-to-live.
    pub fn time_to_live(&self) -> Duration {
        self.ttl
    }

    /// Changes the time-to-live.
    ///
    /// Takes effect on the next sweep; entries already removed under the
    /// previous TTL do not come back, and surviving entries keep their
    /// original timestamps.
    pub fn set_time_to_live(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }
}

/// Two maps are equal when their live entries hold the same keys and
/// values. Timestamps and TTL settings do not participate; each side's
/// liveness is judged against its own clock, and nothing is removed.
impl<K: Eq + Hash, V: PartialEq, C: Clock> PartialEq for CacheMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        let other_now = other.clock.now();
        let other_ttl = other.ttl;
        if self.live_entries().count() != other.live_entries().count() {
            return false;
        }
        self.live_entries().all(|(key, value)| {
            other
                .entries
                .get(key)
                .map_or(false, |entry| !entry.is_expired(other_now, other_ttl) && entry.value() == value)
        })
    }
}

impl<K: Eq + Hash, V> Default for CacheMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V, C: Clock> Extend<(K, V)> for CacheMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for CacheMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.put_all(iter);
        map
    }
}
