use std::time::Duration;
use syzygy_core::{SyncConfig, Synchronizer, Tuple, WithTimestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMessage {
    pub timestamp: Duration,
    pub data: String,
}

impl TestMessage {
    pub fn new(timestamp_ms: u64, data: &str) -> Self {
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

#[allow(dead_code)]
pub fn create_message(timestamp_ms: u64) -> TestMessage {
    TestMessage::new(timestamp_ms, &format!("msg_{}", timestamp_ms))
}

/// Create a synchronizer over the given keys with a millisecond tolerance.
pub fn create_sync(
    keys: &[&'static str],
    tolerance_ms: u64,
    capacity: usize,
) -> Synchronizer<&'static str, TestMessage> {
    let config = SyncConfig {
        tolerance: Duration::from_millis(tolerance_ms),
        capacity,
    };
    Synchronizer::new(keys.iter().copied(), &config).unwrap()
}

/// Deliver an arrival-ordered script of (key, timestamp) pairs and collect
/// every emitted tuple.
pub fn push_script(
    sync: &mut Synchronizer<&'static str, TestMessage>,
    script: &[(&'static str, u64)],
) -> Vec<Tuple<&'static str, TestMessage>> {
    script
        .iter()
        .filter_map(|&(key, ts)| sync.push(&key, create_message(ts)))
        .collect()
}

/// Assert that every tuple's spread is within the tolerance.
#[allow(dead_code)]
pub fn assert_tuples_valid(tuples: &[Tuple<&'static str, TestMessage>], tolerance: Duration) {
    for tuple in tuples {
        assert!(!tuple.is_empty(), "Tuple should not be empty");
        assert!(
            tuple.spread() <= tolerance,
            "Tuple spread exceeds tolerance: spread={:?}, tolerance={:?}",
            tuple.spread(),
            tolerance
        );
    }
}

/// Assert that tuple pivots are non-decreasing.
#[allow(dead_code)]
pub fn assert_pivot_ordering(tuples: &[Tuple<&'static str, TestMessage>]) {
    let mut prev_pivot: Option<Duration> = None;

    for tuple in tuples {
        if let Some(prev) = prev_pivot {
            assert!(
                tuple.pivot() >= prev,
                "Tuples not in pivot order: prev={:?}, current={:?}",
                prev,
                tuple.pivot()
            );
        }
        prev_pivot = Some(tuple.pivot());
    }
}

/// Assert that no message instance appears in more than one tuple.
#[allow(dead_code)]
pub fn assert_no_reuse(tuples: &[Tuple<&'static str, TestMessage>]) {
    let mut seen: Vec<(&str, Duration)> = Vec::new();

    for tuple in tuples {
        for (key, msg) in tuple.iter() {
            let entry = (*key, msg.timestamp());
            assert!(
                !seen.contains(&entry),
                "Message {:?} appears in more than one tuple",
                entry
            );
            seen.push(entry);
        }
    }
}
