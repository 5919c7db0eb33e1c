use std::collections::VecDeque;

use lagwatch_common::lag::LagSample;

/// Bounded time-ordered lag history for one replication slot. Owned
/// exclusively by the detector's evaluation loop.
pub struct SlotHistory {
    window_ms: i64,
    samples: VecDeque<LagSample>,
}

impl SlotHistory {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            samples: VecDeque::new(),
        }
    }

    /// Appends a sample. Out-of-order or duplicate timestamps are discarded
    /// to keep the series monotonic; returns whether the sample was kept.
    pub fn push(&mut self, sample: LagSample) -> bool {
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms <= last.timestamp_ms {
                return false;
            }
        }
        let now = sample.timestamp_ms;
        self.samples.push_back(sample);
        self.evict(now);
        true
    }

    pub fn latest(&self) -> Option<&LagSample> {
        self.samples.back()
    }

    /// Closest retained sample at or before `ts`, the conservative lookback
    /// choice for the growth window boundary.
    pub fn at_or_before(&self, ts: i64) -> Option<&LagSample> {
        self.samples
            .iter()
            .rev()
            .find(|s| s.timestamp_ms <= ts)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn evict(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.window_ms;
        while let Some(front) = self.samples.front() {
            if front.timestamp_ms < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }
}
