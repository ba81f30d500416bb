use tracing::debug;

use super::{StrategyContext, SwitchingAlgorithm, SwitchingStrategy};
use crate::layout::{position_of, Layout, LayoutHandle};

/// Toggles between the current layout and the one active before it
///
/// Carries the "other" layout across calls, so one instance must live as
/// long as the switcher that owns it.
#[derive(Debug, Default)]
pub struct ToggleStrategy {
    remembered: Option<LayoutHandle>,
}

impl ToggleStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout the next toggle will return to, if any
    #[cfg(test)]
    pub fn remembered(&self) -> Option<LayoutHandle> {
        self.remembered
    }
}

impl SwitchingStrategy for ToggleStrategy {
    fn algorithm(&self) -> SwitchingAlgorithm {
        SwitchingAlgorithm::Toggle
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Option<Layout> {
        let first = ctx.layouts.first()?;

        let Some(current_index) = ctx.current_index() else {
            return Some(first.clone());
        };
        let current = &ctx.layouts[current_index];

        // A remembered layout that has since been uninstalled counts as none
        let remembered_index = self
            .remembered
            .and_then(|handle| position_of(ctx.layouts, handle));

        let next = match remembered_index {
            Some(index) if index != current_index => &ctx.layouts[index],
            None if current_index != 0 => first,
            // The pair collapsed onto the current layout
            _ => {
                debug!(current = %current, "toggle pair collapsed, cycling");
                &ctx.layouts[(current_index + 1) % ctx.layouts.len()]
            }
        };

        Some(next.clone())
    }

    /// Remember the layout being left, or the chosen one when that is unknown
    fn commit(&mut self, ctx: &StrategyContext<'_>, chosen: &Layout) {
        let left = ctx
            .current_index()
            .map_or(chosen.handle(), |index| ctx.layouts[index].handle());
        self.remembered = Some(left);
    }

    fn reset(&mut self) {
        self.remembered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UsageTracker;
    use crate::strategy::fixtures::abc;

    fn toggle_from(toggle: &mut ToggleStrategy, layouts: &[Layout], current: &Layout) -> Layout {
        let usage = UsageTracker::new();
        let ctx = StrategyContext::new(layouts, Some(current), &usage);
        toggle.next_layout(&ctx).unwrap()
    }

    #[test]
    fn test_first_call_returns_first_layout() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();

        let next = toggle_from(&mut toggle, &layouts, &layouts[1]);
        assert_eq!(next.name(), "A");
        // The layout left behind is the one to come back to
        assert_eq!(toggle.remembered(), Some(LayoutHandle(2)));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let layouts = abc();

        for start in &layouts {
            let mut toggle = ToggleStrategy::new();
            let there = toggle_from(&mut toggle, &layouts, start);
            assert_ne!(&there, start);

            let back = toggle_from(&mut toggle, &layouts, &there);
            assert_eq!(&back, start, "toggling from {} via {}", start, there);
        }
    }

    #[test]
    fn test_toggles_between_pair() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();

        let mut current = layouts[2].clone();
        for expected in ["A", "C", "A", "C"] {
            current = toggle_from(&mut toggle, &layouts, &current);
            assert_eq!(current.name(), expected);
        }
    }

    #[test]
    fn test_external_change_returns_to_remembered() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        toggle_from(&mut toggle, &layouts, &layouts[1]);

        // Something else moved the user to C; the pair becomes B/C
        let next = toggle_from(&mut toggle, &layouts, &layouts[2]);
        assert_eq!(next.name(), "B");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(3)));
    }

    #[test]
    fn test_collapsed_pair_cycles() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        toggle_from(&mut toggle, &layouts, &layouts[0]);

        // Remembered A while A is already active again
        let next = toggle_from(&mut toggle, &layouts, &layouts[0]);
        assert_eq!(next.name(), "B");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(1)));
    }

    #[test]
    fn test_first_call_on_first_layout_does_not_stay() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();

        let next = toggle_from(&mut toggle, &layouts, &layouts[0]);
        assert_eq!(next.name(), "B");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(1)));
    }

    #[test]
    fn test_unknown_current_remembers_choice() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        let usage = UsageTracker::new();
        let ctx = StrategyContext::new(&layouts, None, &usage);

        assert_eq!(toggle.next_layout(&ctx).unwrap().name(), "A");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(1)));
    }

    #[test]
    fn test_propose_does_not_remember() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        toggle_from(&mut toggle, &layouts, &layouts[2]);

        let usage = UsageTracker::new();
        let ctx = StrategyContext::new(&layouts, Some(&layouts[0]), &usage);
        assert_eq!(toggle.propose(&ctx).unwrap().name(), "C");
        assert_eq!(toggle.propose(&ctx).unwrap().name(), "C");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(3)));
    }

    #[test]
    fn test_reset_forgets_pair() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        toggle_from(&mut toggle, &layouts, &layouts[1]);

        toggle.reset();
        assert!(toggle.remembered().is_none());
        assert_eq!(toggle_from(&mut toggle, &layouts, &layouts[2]).name(), "A");
    }

    #[test]
    fn test_uninstalled_remembered_layout_is_ignored() {
        let layouts = abc();
        let mut toggle = ToggleStrategy::new();
        // Remembers A
        toggle_from(&mut toggle, &layouts, &layouts[0]);

        let reduced = vec![layouts[1].clone(), layouts[2].clone()];
        let next = toggle_from(&mut toggle, &reduced, &reduced[1]);
        assert_eq!(next.name(), "B");
        assert_eq!(toggle.remembered(), Some(LayoutHandle(3)));
    }
}
