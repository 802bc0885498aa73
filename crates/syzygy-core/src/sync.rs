use crate::{
    buffer::{PushOutcome, SourceBuffer},
    config::SyncConfig,
    types::{Key, SyncCounters, Tuple, WithTimestamp},
};
use eyre::{Result, ensure};
use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Event-driven approximate-time synchronizer over a fixed set of input
/// streams.
///
/// Each stream owns a bounded [`SourceBuffer`]. A matching pass runs after
/// every [`push`](Synchronizer::push); when the oldest buffered messages of
/// all streams lie within the configured tolerance of each other, they are
/// emitted together as a [`Tuple`] and handed back to the caller. At most
/// one tuple is produced per push.
///
/// The matcher is greedy: it emits the first valid combination rather than
/// waiting for a potentially tighter one, trading alignment optimality for
/// latency.
#[derive(Debug)]
pub struct Synchronizer<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    buffers: IndexMap<K, SourceBuffer<T>>,
    tolerance: Duration,
    emitted: u64,
    last_pivot: Option<Duration>,
}

impl<K, T> Synchronizer<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    /// Create a synchronizer for the given stream keys.
    ///
    /// Fails on an empty or duplicated key set, a zero tolerance, or a
    /// zero stream capacity.
    pub fn new<I>(keys: I, config: &SyncConfig) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        ensure!(
            config.tolerance > Duration::ZERO,
            "tolerance must be greater than zero"
        );
        ensure!(config.capacity >= 1, "stream capacity must be at least 1");

        let keys: Vec<K> = keys.into_iter().collect();
        ensure!(!keys.is_empty(), "at least one stream key is required");

        let key_count = keys.len();
        let buffers: IndexMap<K, SourceBuffer<T>> = keys
            .into_iter()
            .map(|key| (key, SourceBuffer::with_capacity(config.capacity)))
            .collect();
        ensure!(buffers.len() == key_count, "stream keys must be distinct");

        Ok(Self {
            buffers,
            tolerance: config.tolerance,
            emitted: 0,
            last_pivot: None,
        })
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Tuples emitted over the lifetime of this synchronizer.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Number of messages currently buffered for `key`.
    pub fn buffered(&self, key: &K) -> Option<usize> {
        self.buffers.get(key).map(|buffer| buffer.len())
    }

    /// Snapshot the lifetime arrival and emission counters.
    pub fn counters(&self) -> SyncCounters<K> {
        let arrivals = self
            .buffers
            .iter()
            .map(|(key, buffer)| (key.clone(), buffer.arrivals()))
            .collect();

        SyncCounters {
            arrivals,
            emitted: self.emitted,
        }
    }

    /// Deliver one message and run a matching pass.
    ///
    /// Returns the emitted tuple if the delivery completed one. Messages
    /// for unknown streams and messages older than the previously accepted
    /// one on the same stream are dropped with a warning; both still count
    /// as arrivals on a known stream.
    pub fn push(&mut self, key: &K, item: T) -> Option<Tuple<K, T>> {
        let timestamp = item.timestamp();

        let Some(buffer) = self.buffers.get_mut(key) else {
            warn!(?timestamp, "dropping message for unknown stream");
            return None;
        };

        match buffer.push(item) {
            PushOutcome::Stored => {}
            PushOutcome::Evicted => {
                debug!(?timestamp, "stream buffer full, evicted oldest message");
            }
            PushOutcome::OutOfOrder => {
                warn!(?timestamp, "dropping out-of-order message");
                return None;
            }
        }

        self.try_match()
    }

    /// Attempt to form one tuple from the current buffer contents.
    fn try_match(&mut self) -> Option<Tuple<K, T>> {
        loop {
            // No tuple can be formed while any stream is empty.
            if self.buffers.values().any(|buffer| buffer.is_empty()) {
                return None;
            }

            // The pivot is the newest of the oldest buffered messages. No
            // earlier message in any other stream can join a tuple with
            // it once it lags more than the tolerance behind.
            let pivot = self
                .buffers
                .values()
                .filter_map(|buffer| buffer.front())
                .map(|msg| msg.timestamp())
                .max()?;
            let floor = pivot.saturating_sub(self.tolerance);

            let dropped: usize = self
                .buffers
                .values_mut()
                .map(|buffer| buffer.drop_before(floor))
                .sum();
            if dropped == 0 {
                break;
            }

            // Dropping may have emptied a stream or advanced a front past
            // the pivot; re-evaluate from scratch.
            debug!(dropped, ?pivot, "discarded messages too old to match");
        }

        let (min_ts, max_ts) = match self
            .buffers
            .values()
            .filter_map(|buffer| buffer.front())
            .map(|msg| msg.timestamp())
            .minmax()
        {
            MinMaxResult::MinMax(min, max) => (min, max),
            MinMaxResult::OneElement(ts) => (ts, ts),
            MinMaxResult::NoElements => return None,
        };

        if max_ts.saturating_sub(min_ts) > self.tolerance {
            // The stream holding the minimum candidate must advance before
            // a tuple can exist.
            return None;
        }

        let items: IndexMap<K, T> = self
            .buffers
            .iter_mut()
            .map(|(key, buffer)| (key.clone(), buffer.pop_front().unwrap()))
            .collect();
        let tuple = Tuple::new(items);

        // Nothing at or before the tuple's minimum member may ever be
        // reconsidered.
        for buffer in self.buffers.values_mut() {
            buffer.drop_up_to(min_ts);
        }

        debug_assert!(
            self.last_pivot.is_none_or(|last| tuple.pivot() >= last),
            "tuple pivots must be non-decreasing"
        );
        self.last_pivot = Some(tuple.pivot());
        self.emitted += 1;

        debug!(
            pivot = ?tuple.pivot(),
            spread = ?tuple.spread(),
            emitted = self.emitted,
            "emitted aligned tuple"
        );

        Some(tuple)
    }
}
