use crate::types::{Key, WithTimestamp};

/// The handoff point between the transport layer and the synchronizer.
///
/// Transport callbacks push messages through per-stream [`SourceSender`]
/// handles from any thread; the driver drains the inbox from its single
/// logical thread between render iterations. Sends never block.
#[derive(Debug)]
pub struct Inbox<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    tx: flume::Sender<(K, T)>,
    rx: flume::Receiver<(K, T)>,
}

impl<K, T> Inbox<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    /// Create a sender that tags every message with the given stream key.
    pub fn sender(&self, key: K) -> SourceSender<K, T> {
        SourceSender {
            key,
            tx: self.tx.clone(),
        }
    }

    /// Number of messages waiting to be drained.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Drain all currently pending messages without blocking.
    pub fn drain(&self) -> impl Iterator<Item = (K, T)> + '_ {
        self.rx.try_iter()
    }
}

impl<K, T> Default for Inbox<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking handle given to the transport layer for one stream.
#[derive(Debug)]
pub struct SourceSender<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    key: K,
    tx: flume::Sender<(K, T)>,
}

impl<K, T> SourceSender<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Deliver one message. Returns false if the inbox was dropped.
    pub fn send(&self, item: T) -> bool {
        self.tx.send((self.key.clone(), item)).is_ok()
    }
}

impl<K, T> Clone for SourceSender<K, T>
where
    K: Key,
    T: WithTimestamp,
{
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            tx: self.tx.clone(),
        }
    }
}
