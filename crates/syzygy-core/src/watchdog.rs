use crate::types::{Key, SyncCounters};
use indexmap::IndexMap;
use std::time::Duration;

/// Health verdict for one input stream, re-evaluated at every audit tick.
///
/// `Degraded` is not sticky; the next audit can return the stream to
/// `Healthy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamHealth {
    Healthy,
    Degraded,
}

/// Configuration parameters for the [`Watchdog`].
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// Interval between audits.
    pub period: Duration,

    /// A healthy stream is expected to deliver at least this many
    /// messages per emitted tuple within one audit period. Chosen
    /// empirically to tolerate normal loss and jitter without false
    /// alarms.
    pub multiplier: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(30),
            multiplier: 3,
        }
    }
}

/// The report produced by one audit tick.
#[derive(Debug, Clone)]
pub struct HealthReport<K>
where
    K: Key,
{
    /// Messages that arrived per stream since the previous audit.
    pub arrivals: IndexMap<K, u64>,

    /// Tuples emitted since the previous audit.
    pub emitted: u64,

    /// Arrival count below which a stream is considered degraded this
    /// period.
    pub threshold: u64,

    /// Streams whose arrival count fell below the threshold.
    pub degraded: Vec<K>,
}

impl<K> HealthReport<K>
where
    K: Key,
{
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Periodic auditor of the synchronizer's arrival and emission counters.
///
/// The watchdog observes the counters from outside the data path: the
/// driver samples [`Synchronizer::counters`](crate::Synchronizer::counters)
/// once per audit period and feeds the snapshot to [`audit`](Watchdog::audit).
/// Counts are rebased after every audit, so each verdict reflects the most
/// recent period only rather than the lifetime ratio.
///
/// The degradation threshold is `multiplier x emitted`, with a floor of
/// one so that a stream that delivered nothing at all is flagged even
/// while no tuples are being emitted. The watchdog only reports; it never
/// halts or alters the synchronizer.
#[derive(Debug)]
pub struct Watchdog<K>
where
    K: Key,
{
    config: WatchdogConfig,
    baseline_arrivals: IndexMap<K, u64>,
    baseline_emitted: u64,
    health: IndexMap<K, StreamHealth>,
}

impl<K> Watchdog<K>
where
    K: Key,
{
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            baseline_arrivals: IndexMap::new(),
            baseline_emitted: 0,
            health: IndexMap::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// The verdict from the most recent audit, if the stream has been
    /// audited at all.
    pub fn health(&self, key: &K) -> Option<StreamHealth> {
        self.health.get(key).copied()
    }

    /// Compare the sampled counters against the previous audit's baseline
    /// and rebase for the next period.
    pub fn audit(&mut self, counters: &SyncCounters<K>) -> HealthReport<K> {
        let arrivals: IndexMap<K, u64> = counters
            .arrivals
            .iter()
            .map(|(key, &total)| {
                let baseline = self.baseline_arrivals.get(key).copied().unwrap_or(0);
                (key.clone(), total.saturating_sub(baseline))
            })
            .collect();
        let emitted = counters.emitted.saturating_sub(self.baseline_emitted);

        let threshold = (self.config.multiplier * emitted).max(1);

        let degraded: Vec<K> = arrivals
            .iter()
            .filter(|&(_key, &count)| count < threshold)
            .map(|(key, _count)| key.clone())
            .collect();

        for key in arrivals.keys() {
            let verdict = if degraded.contains(key) {
                StreamHealth::Degraded
            } else {
                StreamHealth::Healthy
            };
            self.health.insert(key.clone(), verdict);
        }

        self.baseline_arrivals = counters.arrivals.clone();
        self.baseline_emitted = counters.emitted;

        HealthReport {
            arrivals,
            emitted,
            threshold,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(pairs: &[(&'static str, u64)], emitted: u64) -> SyncCounters<&'static str> {
        SyncCounters {
            arrivals: pairs.iter().copied().collect(),
            emitted,
        }
    }

    #[test]
    fn test_healthy_stream_passes_threshold() {
        let mut watchdog = Watchdog::new(WatchdogConfig::default());

        let report = watchdog.audit(&counters(&[("A", 10), ("B", 12)], 3));
        assert_eq!(report.threshold, 9);
        assert!(report.degraded.is_empty());
        assert_eq!(watchdog.health(&"A"), Some(StreamHealth::Healthy));
    }

    #[test]
    fn test_slow_stream_is_degraded() {
        let mut watchdog = Watchdog::new(WatchdogConfig::default());

        // threshold = 3 x 1 = 3; two arrivals fall short.
        let report = watchdog.audit(&counters(&[("A", 2), ("B", 10)], 1));
        assert_eq!(report.threshold, 3);
        assert_eq!(report.degraded, vec!["A"]);
        assert_eq!(watchdog.health(&"A"), Some(StreamHealth::Degraded));
        assert_eq!(watchdog.health(&"B"), Some(StreamHealth::Healthy));
    }

    #[test]
    fn test_silent_stream_degraded_without_emissions() {
        let mut watchdog = Watchdog::new(WatchdogConfig::default());

        // No tuples emitted; the threshold floor still flags the silent
        // stream while the publishing one stays healthy.
        let report = watchdog.audit(&counters(&[("A", 0), ("B", 40)], 0));
        assert_eq!(report.threshold, 1);
        assert_eq!(report.degraded, vec!["A"]);
    }

    #[test]
    fn test_audit_rebases_counters() {
        let mut watchdog = Watchdog::new(WatchdogConfig::default());

        watchdog.audit(&counters(&[("A", 100)], 30));

        // Only the delta since the previous audit is judged.
        let report = watchdog.audit(&counters(&[("A", 102)], 31));
        assert_eq!(report.arrivals["A"], 2);
        assert_eq!(report.emitted, 1);
        assert_eq!(report.degraded, vec!["A"]);
    }

    #[test]
    fn test_degraded_is_not_sticky() {
        let mut watchdog = Watchdog::new(WatchdogConfig::default());

        let report = watchdog.audit(&counters(&[("A", 0)], 0));
        assert!(report.is_degraded());

        let report = watchdog.audit(&counters(&[("A", 90)], 30));
        assert!(!report.is_degraded());
        assert_eq!(watchdog.health(&"A"), Some(StreamHealth::Healthy));
    }
}
