use super::{StrategyContext, SwitchingAlgorithm, SwitchingStrategy};
use crate::layout::Layout;

/// Switches to the most recently activated layout other than the current one
///
/// Equal timestamps resolve to the layout enumerated first. With no usage
/// history among the candidates this behaves like cycling.
#[derive(Debug, Default)]
pub struct MostRecentStrategy;

impl MostRecentStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl SwitchingStrategy for MostRecentStrategy {
    fn algorithm(&self) -> SwitchingAlgorithm {
        SwitchingAlgorithm::MostRecent
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Option<Layout> {
        let Some(current_index) = ctx.current_index() else {
            return ctx.layouts.first().cloned();
        };

        ctx.best_used_by(current_index, |record| record.last_used)
            .or_else(|| ctx.cycle_next())
            .cloned()
    }
}
