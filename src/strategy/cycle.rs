use super::{StrategyContext, SwitchingAlgorithm, SwitchingStrategy};
use crate::layout::Layout;

/// Cycles through the installed layouts in enumeration order
#[derive(Debug, Default)]
pub struct CycleStrategy;

impl CycleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl SwitchingStrategy for CycleStrategy {
    fn algorithm(&self) -> SwitchingAlgorithm {
        SwitchingAlgorithm::Cycle
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Option<Layout> {
        ctx.cycle_next().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutHandle, UsageTracker};
    use crate::strategy::fixtures::abc;

    #[test]
    fn test_cycle_advances_and_wraps() {
        let layouts = abc();
        let usage = UsageTracker::new();
        let mut cycle = CycleStrategy::new();

        let ctx = StrategyContext::new(&layouts, Some(&layouts[1]), &usage);
        assert_eq!(cycle.next_layout(&ctx).unwrap().name(), "C");

        let ctx = StrategyContext::new(&layouts, Some(&layouts[2]), &usage);
        assert_eq!(cycle.next_layout(&ctx).unwrap().name(), "A");
    }

    #[test]
    fn test_cycle_closure() {
        let layouts = abc();
        let usage = UsageTracker::new();
        let mut cycle = CycleStrategy::new();

        for start in 0..layouts.len() {
            let mut current = layouts[start].clone();
            for _ in 0..layouts.len() {
                let ctx = StrategyContext::new(&layouts, Some(&current), &usage);
                current = cycle.next_layout(&ctx).unwrap();
            }
            assert_eq!(current, layouts[start]);
        }
    }

    #[test]
    fn test_cycle_single_layout() {
        let layouts = vec![Layout::new(LayoutHandle(7), "Only")];
        let usage = UsageTracker::new();
        let mut cycle = CycleStrategy::new();

        let ctx = StrategyContext::new(&layouts, Some(&layouts[0]), &usage);
        assert_eq!(cycle.next_layout(&ctx).unwrap(), layouts[0]);
    }
}
