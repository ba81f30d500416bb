//! Registry of strategy instances keyed by algorithm

use std::collections::HashMap;

use super::{
    CycleStrategy, FrequencyStrategy, MostRecentStrategy, SwitchingAlgorithm, SwitchingStrategy,
    ToggleStrategy,
};
use crate::switcher::SwitchError;

/// The strategies a switcher can dispatch to
///
/// Each algorithm maps to exactly one long-lived instance, so stateful
/// strategies keep their memory across dispatches.
#[derive(Default)]
pub struct StrategySet {
    strategies: HashMap<SwitchingAlgorithm, Box<dyn SwitchingStrategy>>,
}

impl StrategySet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// One instance of each built-in strategy
    pub fn standard() -> Self {
        Self::new()
            .with(CycleStrategy::new())
            .with(ToggleStrategy::new())
            .with(MostRecentStrategy::new())
            .with(FrequencyStrategy::new())
    }

    /// Register `strategy` under its own algorithm, replacing any previous one
    pub fn with(mut self, strategy: impl SwitchingStrategy + 'static) -> Self {
        self.strategies.insert(strategy.algorithm(), Box::new(strategy));
        self
    }

    pub fn contains(&self, algorithm: SwitchingAlgorithm) -> bool {
        self.strategies.contains_key(&algorithm)
    }

    /// Fail unless every algorithm in `required` has a strategy
    pub fn require(&self, required: &[SwitchingAlgorithm]) -> Result<(), SwitchError> {
        match required.iter().find(|a| !self.contains(**a)) {
            Some(missing) => Err(SwitchError::StrategyNotConfigured(*missing)),
            None => Ok(()),
        }
    }

    pub fn get_mut(
        &mut self,
        algorithm: SwitchingAlgorithm,
    ) -> Result<&mut dyn SwitchingStrategy, SwitchError> {
        match self.strategies.get_mut(&algorithm) {
            Some(strategy) => Ok(strategy.as_mut()),
            None => Err(SwitchError::StrategyNotConfigured(algorithm)),
        }
    }

    /// Clear the memory of every strategy
    pub fn reset_all(&mut self) {
        for strategy in self.strategies.values_mut() {
            strategy.reset();
        }
    }

    /// Registered algorithms in declaration order
    pub fn algorithms(&self) -> Vec<SwitchingAlgorithm> {
        SwitchingAlgorithm::ALL
            .into_iter()
            .filter(|a| self.contains(*a))
            .collect()
    }
}

impl std::fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategySet")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}
