use indexmap::IndexMap;
use std::{hash::Hash, time::Duration};

/// Creates a timestamp from the message passed to the synchronizer.
pub trait WithTimestamp: Send {
    fn timestamp(&self) -> Duration;
}

/// The key that identifies one input stream in the synchronizer.
pub trait Key: Clone + PartialEq + Eq + Hash + Sync + Send {}

impl<K> Key for K where K: Clone + PartialEq + Eq + Hash + Sync + Send {}

/// One time-aligned selection of messages, one per input stream.
///
/// A tuple is immutable once emitted. Its *pivot* is the maximum member
/// timestamp; the *spread* is the difference between the maximum and
/// minimum member timestamps and never exceeds the configured tolerance.
#[derive(Debug, Clone)]
pub struct Tuple<K, T>
where
    K: Key,
{
    items: IndexMap<K, T>,
    pivot: Duration,
    spread: Duration,
}

impl<K, T> Tuple<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    pub(crate) fn new(items: IndexMap<K, T>) -> Self {
        let min = items
            .values()
            .map(|item| item.timestamp())
            .min()
            .unwrap_or_default();
        let max = items
            .values()
            .map(|item| item.timestamp())
            .max()
            .unwrap_or_default();

        Self {
            items,
            pivot: max,
            spread: max.saturating_sub(min),
        }
    }

    /// The maximum member timestamp. Non-decreasing across successive
    /// emissions from one synchronizer.
    pub fn pivot(&self) -> Duration {
        self.pivot
    }

    /// The difference between the maximum and minimum member timestamps.
    pub fn spread(&self) -> Duration {
        self.spread
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.items.iter()
    }

    /// Consume the tuple, yielding the member messages keyed by stream.
    pub fn into_items(self) -> IndexMap<K, T> {
        self.items
    }
}

/// A snapshot of the synchronizer's lifetime counters.
///
/// Sampled by the watchdog once per audit period; the counters themselves
/// are never reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCounters<K>
where
    K: Key,
{
    /// Messages delivered per stream since the synchronizer was created,
    /// including messages that were evicted or rejected.
    pub arrivals: IndexMap<K, u64>,

    /// Tuples emitted since the synchronizer was created.
    pub emitted: u64,
}
