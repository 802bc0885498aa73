use crate::types::WithTimestamp;
use std::{collections::VecDeque, time::Duration};

/// Outcome of pushing one message into a [`SourceBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The message was appended.
    Stored,
    /// The message was appended and the oldest buffered message was
    /// evicted to make room.
    Evicted,
    /// The message's timestamp was not greater than the previously
    /// accepted one and the message was discarded.
    OutOfOrder,
}

/// A bounded FIFO of messages with strictly increasing timestamps.
///
/// The buffer never blocks and never grows past its capacity: pushing
/// into a full buffer evicts the oldest message first. Every push is
/// counted as an arrival, including pushes that evict or are rejected.
#[derive(Debug)]
pub struct SourceBuffer<T>
where
    T: WithTimestamp,
{
    buffer: VecDeque<T>,
    capacity: usize,
    last_ts: Option<Duration>,
    arrivals: u64,
}

impl<T> SourceBuffer<T>
where
    T: WithTimestamp,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            last_ts: None,
            arrivals: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn front(&self) -> Option<&T> {
        self.buffer.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    /// Messages delivered over the lifetime of this buffer, including
    /// evicted and rejected ones.
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    /// Push a message onto the tail.
    ///
    /// A message whose timestamp is not strictly greater than that of
    /// the previously accepted message is discarded and reported as
    /// [`PushOutcome::OutOfOrder`]. If the buffer is full, the oldest
    /// message is evicted before the new one is appended.
    pub fn push(&mut self, item: T) -> PushOutcome {
        self.arrivals += 1;

        let timestamp = item.timestamp();
        if let Some(last_ts) = self.last_ts
            && timestamp <= last_ts
        {
            return PushOutcome::OutOfOrder;
        }
        self.last_ts = Some(timestamp);

        let evicted = if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
            true
        } else {
            false
        };
        self.buffer.push_back(item);

        if evicted {
            PushOutcome::Evicted
        } else {
            PushOutcome::Stored
        }
    }

    /// Drop messages with timestamps before `ts` and return the number
    /// of dropped messages.
    pub fn drop_before(&mut self, ts: Duration) -> usize {
        let mut count = 0;

        while let Some(front) = self.buffer.front() {
            if front.timestamp() >= ts {
                break;
            }
            self.buffer.pop_front();
            count += 1;
        }

        count
    }

    /// Drop messages with timestamps at or before `ts` and return the
    /// number of dropped messages.
    pub fn drop_up_to(&mut self, ts: Duration) -> usize {
        let mut count = 0;

        while let Some(front) = self.buffer.front() {
            if front.timestamp() > ts {
                break;
            }
            self.buffer.pop_front();
            count += 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestMessage {
        timestamp: Duration,
        data: String,
    }

    impl TestMessage {
        fn new(timestamp_ms: u64, data: &str) -> Self {
            Self {
                timestamp: Duration::from_millis(timestamp_ms),
                data: data.to_string(),
            }
        }
    }

    impl WithTimestamp for TestMessage {
        fn timestamp(&self) -> Duration {
            self.timestamp
        }
    }

    fn create_message(timestamp_ms: u64) -> TestMessage {
        TestMessage::new(timestamp_ms, &format!("msg_{}", timestamp_ms))
    }

    #[test]
    fn test_buffer_with_capacity() {
        let buffer: SourceBuffer<TestMessage> = SourceBuffer::with_capacity(5);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.arrivals(), 0);
    }

    #[test]
    fn test_buffer_push_and_fifo_order() {
        let mut buffer = SourceBuffer::with_capacity(3);

        assert_eq!(buffer.push(create_message(1000)), PushOutcome::Stored);
        assert_eq!(buffer.push(create_message(2000)), PushOutcome::Stored);

        assert_eq!(
            buffer.front().unwrap().timestamp(),
            Duration::from_millis(1000)
        );
        assert_eq!(
            buffer.back().unwrap().timestamp(),
            Duration::from_millis(2000)
        );

        let popped = buffer.pop_front().unwrap();
        assert_eq!(popped.timestamp(), Duration::from_millis(1000));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_overflow_keeps_most_recent() {
        let mut buffer = SourceBuffer::with_capacity(3);

        for ts in [1000, 2000, 3000] {
            assert_eq!(buffer.push(create_message(ts)), PushOutcome::Stored);
        }

        // The fourth push evicts the oldest message.
        assert_eq!(buffer.push(create_message(4000)), PushOutcome::Evicted);
        assert_eq!(buffer.len(), 3);

        let retained: Vec<Duration> = std::iter::from_fn(|| buffer.pop_front())
            .map(|msg| msg.timestamp())
            .collect();
        assert_eq!(
            retained,
            vec![
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(4000),
            ]
        );
    }

    #[test]
    fn test_buffer_out_of_order_rejection() {
        let mut buffer = SourceBuffer::with_capacity(3);

        buffer.push(create_message(2000));
        assert_eq!(buffer.push(create_message(1000)), PushOutcome::OutOfOrder);
        assert_eq!(buffer.len(), 1);

        // Equal timestamps are rejected as well.
        assert_eq!(buffer.push(create_message(2000)), PushOutcome::OutOfOrder);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_arrivals_count_everything() {
        let mut buffer = SourceBuffer::with_capacity(2);

        buffer.push(create_message(1000));
        buffer.push(create_message(2000));
        buffer.push(create_message(3000)); // evicts
        buffer.push(create_message(500)); // rejected

        assert_eq!(buffer.arrivals(), 4);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_buffer_drop_before_empty() {
        let mut buffer: SourceBuffer<TestMessage> = SourceBuffer::with_capacity(3);
        let dropped = buffer.drop_before(Duration::from_millis(1000));
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_buffer_drop_before_multiple_messages() {
        let mut buffer = SourceBuffer::with_capacity(5);
        for ts in [1000, 1500, 2000, 2500, 3000] {
            buffer.push(create_message(ts));
        }

        let dropped = buffer.drop_before(Duration::from_millis(2200));
        assert_eq!(dropped, 3);
        assert_eq!(buffer.len(), 2);
        assert_eq!(
            buffer.front().unwrap().timestamp(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_buffer_drop_before_is_exclusive() {
        let mut buffer = SourceBuffer::with_capacity(3);
        buffer.push(create_message(1000));
        buffer.push(create_message(2000));

        let dropped = buffer.drop_before(Duration::from_millis(2000));
        assert_eq!(dropped, 1);
        assert_eq!(
            buffer.front().unwrap().timestamp(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_buffer_drop_up_to_is_inclusive() {
        let mut buffer = SourceBuffer::with_capacity(3);
        buffer.push(create_message(1000));
        buffer.push(create_message(2000));

        let dropped = buffer.drop_up_to(Duration::from_millis(1000));
        assert_eq!(dropped, 1);
        assert_eq!(
            buffer.front().unwrap().timestamp(),
            Duration::from_millis(2000)
        );
    }
}
