//! Per-layout usage history
//!
//! Lives for the process lifetime only; nothing is persisted.

use std::collections::HashMap;
use std::time::Instant;

use super::LayoutHandle;

/// Usage of a single layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    /// When the layout was last activated by the switcher
    pub last_used: Instant,
    /// Number of successful activations
    pub use_count: u64,
}

/// Tracks last-used time and use count per layout handle
#[derive(Debug, Default)]
pub struct UsageTracker {
    records: HashMap<LayoutHandle, UsageRecord>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful activation of `handle` at `at`
    pub fn record(&mut self, handle: LayoutHandle, at: Instant) -> UsageRecord {
        let record = self
            .records
            .entry(handle)
            .and_modify(|r| {
                r.use_count += 1;
                r.last_used = at;
            })
            .or_insert(UsageRecord {
                last_used: at,
                use_count: 1,
            });
        *record
    }

    pub fn get(&self, handle: LayoutHandle) -> Option<&UsageRecord> {
        self.records.get(&handle)
    }

    /// Use count of `handle`, zero if it was never activated
    pub fn use_count(&self, handle: LayoutHandle) -> u64 {
        self.records.get(&handle).map_or(0, |r| r.use_count)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_record_is_lazy() {
        let tracker = UsageTracker::new();
        assert!(tracker.is_empty());
        assert!(tracker.get(LayoutHandle(1)).is_none());
        assert_eq!(tracker.use_count(LayoutHandle(1)), 0);
    }

    #[test]
    fn test_record_increments_by_one() {
        let mut tracker = UsageTracker::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(3);

        let first = tracker.record(LayoutHandle(1), t0);
        assert_eq!(first.use_count, 1);
        assert_eq!(first.last_used, t0);

        let second = tracker.record(LayoutHandle(1), t1);
        assert_eq!(second.use_count, 2);
        assert_eq!(second.last_used, t1);

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.use_count(LayoutHandle(2)), 0);
    }
}
