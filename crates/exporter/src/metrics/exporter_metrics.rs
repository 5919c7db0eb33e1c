use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct ExporterMetrics {
    poll_cycles_total: AtomicU64,
    poll_failures_total: AtomicU64,
    evaluation_ticks_total: AtomicU64,
    lag_samples_total: AtomicU64,
    lag_samples_discarded_total: AtomicU64,
    alerts_fired_total: AtomicU64,
    alerts_resolved_total: AtomicU64,
    notifications_sent_total: AtomicU64,
    notifications_failed_total: AtomicU64,
    notifications_suppressed_total: AtomicU64,
}

impl ExporterMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_poll_cycles(&self) {
        self.poll_cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_poll_failures(&self, n: u64) {
        self.poll_failures_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_evaluation_ticks(&self) {
        self.evaluation_ticks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lag_samples(&self) {
        self.lag_samples_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lag_samples_discarded(&self) {
        self.lag_samples_discarded_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_alerts_fired(&self, n: u64) {
        self.alerts_fired_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_alerts_resolved(&self, n: u64) {
        self.alerts_resolved_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_notifications_sent(&self, n: u64) {
        self.notifications_sent_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_notifications_failed(&self, n: u64) {
        self.notifications_failed_total
            .fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_notifications_suppressed(&self, n: u64) {
        self.notifications_suppressed_total
            .fetch_add(n, Ordering::Relaxed);
    }

    pub fn poll_cycles_total(&self) -> u64 {
        self.poll_cycles_total.load(Ordering::Relaxed)
    }

    pub fn poll_failures_total(&self) -> u64 {
        self.poll_failures_total.load(Ordering::Relaxed)
    }

    pub fn evaluation_ticks_total(&self) -> u64 {
        self.evaluation_ticks_total.load(Ordering::Relaxed)
    }

    pub fn lag_samples_total(&self) -> u64 {
        self.lag_samples_total.load(Ordering::Relaxed)
    }

    pub fn lag_samples_discarded_total(&self) -> u64 {
        self.lag_samples_discarded_total.load(Ordering::Relaxed)
    }

    pub fn alerts_fired_total(&self) -> u64 {
        self.alerts_fired_total.load(Ordering::Relaxed)
    }

    pub fn alerts_resolved_total(&self) -> u64 {
        self.alerts_resolved_total.load(Ordering::Relaxed)
    }

    pub fn notifications_sent_total(&self) -> u64 {
        self.notifications_sent_total.load(Ordering::Relaxed)
    }

    pub fn notifications_failed_total(&self) -> u64 {
        self.notifications_failed_total.load(Ordering::Relaxed)
    }

    pub fn notifications_suppressed_total(&self) -> u64 {
        self.notifications_suppressed_total.load(Ordering::Relaxed)
    }
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self {
            poll_cycles_total: AtomicU64::new(0),
            poll_failures_total: AtomicU64::new(0),
            evaluation_ticks_total: AtomicU64::new(0),
            lag_samples_total: AtomicU64::new(0),
            lag_samples_discarded_total: AtomicU64::new(0),
            alerts_fired_total: AtomicU64::new(0),
            alerts_resolved_total: AtomicU64::new(0),
            notifications_sent_total: AtomicU64::new(0),
            notifications_failed_total: AtomicU64::new(0),
            notifications_suppressed_total: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = ExporterMetrics::new();
        m.inc_poll_cycles();
        m.inc_poll_cycles();
        m.add_poll_failures(3);
        m.inc_evaluation_ticks();
        m.inc_lag_samples();
        m.inc_lag_samples_discarded();
        m.add_alerts_fired(2);
        m.add_alerts_resolved(1);
        m.add_notifications_sent(4);
        m.add_notifications_failed(1);
        m.add_notifications_suppressed(1);

        assert_eq!(m.poll_cycles_total(), 2);
        assert_eq!(m.poll_failures_total(), 3);
        assert_eq!(m.evaluation_ticks_total(), 1);
        assert_eq!(m.lag_samples_total(), 1);
        assert_eq!(m.lag_samples_discarded_total(), 1);
        assert_eq!(m.alerts_fired_total(), 2);
        assert_eq!(m.alerts_resolved_total(), 1);
        assert_eq!(m.notifications_sent_total(), 4);
        assert_eq!(m.notifications_failed_total(), 1);
        assert_eq!(m.notifications_suppressed_total(), 1);
    }
}
