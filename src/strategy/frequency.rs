use super::{StrategyContext, SwitchingAlgorithm, SwitchingStrategy};
use crate::layout::Layout;

/// Switches to the most frequently activated layout other than the current one
///
/// Ties on use count go to the more recently used layout, then to the one
/// enumerated first.
#[derive(Debug, Default)]
pub struct FrequencyStrategy;

impl FrequencyStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl SwitchingStrategy for FrequencyStrategy {
    fn algorithm(&self) -> SwitchingAlgorithm {
        SwitchingAlgorithm::Frequency
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Option<Layout> {
        let Some(current_index) = ctx.current_index() else {
            return ctx.layouts.first().cloned();
        };

        ctx.best_used_by(current_index, |record| (record.use_count, record.last_used))
            .or_else(|| ctx.cycle_next())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::layout::{LayoutHandle, UsageTracker};
    use crate::strategy::fixtures::abc;

    fn record_n(usage: &mut UsageTracker, handle: u64, times: u64, at: Instant) {
        for _ in 0..times {
            usage.record(LayoutHandle(handle), at);
        }
    }

    #[test]
    fn test_picks_most_used_other_layout() {
        let layouts = abc();
        let now = Instant::now();
        let mut usage = UsageTracker::new();
        record_n(&mut usage, 1, 3, now);
        record_n(&mut usage, 3, 7, now);

        let ctx = StrategyContext::new(&layouts, Some(&layouts[1]), &usage);
        assert_eq!(FrequencyStrategy::new().next_layout(&ctx).unwrap().name(), "C");
    }

    #[test]
    fn test_count_tie_prefers_recent() {
        let layouts = abc();
        let base = Instant::now();
        let mut usage = UsageTracker::new();
        record_n(&mut usage, 1, 2, base + Duration::from_secs(9));
        record_n(&mut usage, 2, 2, base + Duration::from_secs(1));

        let ctx = StrategyContext::new(&layouts, Some(&layouts[2]), &usage);
        assert_eq!(FrequencyStrategy::new().next_layout(&ctx).unwrap().name(), "A");
    }

    #[test]
    fn test_never_returns_current() {
        let layouts = abc();
        let now = Instant::now();
        let mut usage = UsageTracker::new();
        record_n(&mut usage, 1, 50, now);

        let ctx = StrategyContext::new(&layouts, Some(&layouts[0]), &usage);
        assert_eq!(FrequencyStrategy::new().next_layout(&ctx).unwrap().name(), "B");
    }

    #[test]
    fn test_unused_candidates_cycle() {
        let layouts = abc();
        let usage = UsageTracker::new();

        let ctx = StrategyContext::new(&layouts, Some(&layouts[0]), &usage);
        assert_eq!(FrequencyStrategy::new().next_layout(&ctx).unwrap().name(), "B");
    }
}
