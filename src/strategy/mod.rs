//! Layout switching strategies
//!
//! Each strategy maps the installed layouts, the current layout and the usage
//! history to the layout that should be activated next:
//! - Cycle: next layout in enumeration order, wrapping
//! - Toggle: back and forth between the current and the previous layout
//! - MostRecent: most recently activated other layout
//! - Frequency: most frequently activated other layout
//!
//! All of them fall back to the first installed layout when the current
//! layout is absent or not among the installed ones.

mod cycle;
mod frequency;
mod recent;
mod set;
mod toggle;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::{position_of, Layout, UsageRecord, UsageTracker};

pub use cycle::CycleStrategy;
pub use frequency::FrequencyStrategy;
pub use recent::MostRecentStrategy;
pub use set::StrategySet;
pub use toggle::ToggleStrategy;

/// Selectable switching algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchingAlgorithm {
    /// Cycle through all layouts
    Cycle,
    /// Toggle between the two most recent layouts
    #[default]
    Toggle,
    /// Switch to the most recently used layout
    MostRecent,
    /// Switch based on usage frequency
    Frequency,
}

impl SwitchingAlgorithm {
    pub const ALL: [SwitchingAlgorithm; 4] = [
        SwitchingAlgorithm::Cycle,
        SwitchingAlgorithm::Toggle,
        SwitchingAlgorithm::MostRecent,
        SwitchingAlgorithm::Frequency,
    ];
}

impl fmt::Display for SwitchingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchingAlgorithm::Cycle => write!(f, "cycle"),
            SwitchingAlgorithm::Toggle => write!(f, "toggle"),
            SwitchingAlgorithm::MostRecent => write!(f, "most_recent"),
            SwitchingAlgorithm::Frequency => write!(f, "frequency"),
        }
    }
}

/// Error for an unrecognised algorithm name
#[derive(Debug, thiserror::Error)]
#[error("unknown switching algorithm '{0}'")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for SwitchingAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cycle" => Ok(SwitchingAlgorithm::Cycle),
            "toggle" => Ok(SwitchingAlgorithm::Toggle),
            "most_recent" | "recent" => Ok(SwitchingAlgorithm::MostRecent),
            "frequency" => Ok(SwitchingAlgorithm::Frequency),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Inputs to a single switching decision
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Installed layouts in enumeration order
    pub layouts: &'a [Layout],
    /// Active layout, which may not be among `layouts`
    pub current: Option<&'a Layout>,
    pub usage: &'a UsageTracker,
}

impl<'a> StrategyContext<'a> {
    pub fn new(layouts: &'a [Layout], current: Option<&'a Layout>, usage: &'a UsageTracker) -> Self {
        Self {
            layouts,
            current,
            usage,
        }
    }

    /// Index of the current layout, `None` when absent or not installed
    pub fn current_index(&self) -> Option<usize> {
        self.current.and_then(|c| position_of(self.layouts, c.handle()))
    }

    /// Layout following the current one, wrapping at the end
    ///
    /// Falls back to the first layout when the current one is unknown.
    pub fn cycle_next(&self) -> Option<&'a Layout> {
        let first = self.layouts.first()?;
        match self.current_index() {
            Some(index) => Some(&self.layouts[(index + 1) % self.layouts.len()]),
            None => Some(first),
        }
    }

    /// Best non-current layout with a usage record, by `key`
    ///
    /// Ties keep the lowest index in `layouts`.
    fn best_used_by<K, F>(&self, current_index: usize, key: F) -> Option<&'a Layout>
    where
        K: Ord,
        F: Fn(&UsageRecord) -> K,
    {
        let mut best: Option<(K, &'a Layout)> = None;

        for (index, layout) in self.layouts.iter().enumerate() {
            if index == current_index {
                continue;
            }
            let Some(record) = self.usage.get(layout.handle()) else {
                continue;
            };
            let candidate = key(record);
            if best.as_ref().map_or(true, |(k, _)| candidate > *k) {
                best = Some((candidate, layout));
            }
        }

        best.map(|(_, layout)| layout)
    }
}

/// A layout selection policy
pub trait SwitchingStrategy: Send {
    fn algorithm(&self) -> SwitchingAlgorithm;

    /// Choose the next layout without touching any memory
    ///
    /// `None` only when no layouts are installed.
    fn propose(&self, ctx: &StrategyContext<'_>) -> Option<Layout>;

    /// Record that `chosen`, proposed from `ctx`, was actually activated
    fn commit(&mut self, _ctx: &StrategyContext<'_>, _chosen: &Layout) {}

    /// Propose and commit in one step
    fn next_layout(&mut self, ctx: &StrategyContext<'_>) -> Option<Layout> {
        let next = self.propose(ctx)?;
        self.commit(ctx, &next);
        Some(next)
    }

    /// Forget any memory carried between calls
    fn reset(&mut self) {}
}
