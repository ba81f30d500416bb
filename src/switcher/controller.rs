//! Switch orchestration
//!
//! Resolves a gesture or menu choice to a strategy, asks it for the next
//! layout, requests activation and records usage on success.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::{Notification, Notifier};
use crate::gesture::GestureKind;
use crate::layout::{Layout, LayoutHandle, LayoutRegistry, UsageTracker};
use crate::platform::LayoutProvider;
use crate::strategy::{StrategyContext, StrategySet, SwitchingAlgorithm};

use super::SwitchError;

/// Which algorithm each gesture kind runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureBindings {
    pub tap: SwitchingAlgorithm,
    pub hold: SwitchingAlgorithm,
}

impl GestureBindings {
    pub fn resolve(&self, kind: GestureKind) -> SwitchingAlgorithm {
        match kind {
            GestureKind::Tap => self.tap,
            GestureKind::Hold => self.hold,
        }
    }
}

impl Default for GestureBindings {
    fn default() -> Self {
        Self {
            tap: SwitchingAlgorithm::Toggle,
            hold: SwitchingAlgorithm::Cycle,
        }
    }
}

/// Installed layout together with its use count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutUsage {
    pub layout: Layout,
    pub use_count: u64,
}

/// Snapshot of the switcher for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitcherStatus {
    /// Algorithm used by menu activation
    pub algorithm: SwitchingAlgorithm,
    pub current: Option<Layout>,
    pub layouts: Vec<LayoutUsage>,
    /// Most recently settled first
    pub recency: Vec<LayoutHandle>,
}

/// Drives layout switching on behalf of gestures and menu commands
pub struct SwitchController<P, N> {
    provider: P,
    notifier: N,
    registry: LayoutRegistry,
    usage: UsageTracker,
    strategies: StrategySet,
    bindings: GestureBindings,
    /// Algorithm used when the menu does not name one
    algorithm: SwitchingAlgorithm,
}

impl<P: LayoutProvider, N: Notifier> SwitchController<P, N> {
    /// Wire a controller, failing if any bound algorithm has no strategy
    pub fn new(
        provider: P,
        notifier: N,
        strategies: StrategySet,
        bindings: GestureBindings,
        algorithm: SwitchingAlgorithm,
    ) -> Result<Self, SwitchError> {
        strategies.require(&[bindings.tap, bindings.hold, algorithm])?;

        Ok(Self {
            provider,
            notifier,
            registry: LayoutRegistry::new(),
            usage: UsageTracker::new(),
            strategies,
            bindings,
            algorithm,
        })
    }

    /// Switch in response to a classified hotkey gesture
    pub fn on_gesture(&mut self, kind: GestureKind) -> Result<Layout, SwitchError> {
        let algorithm = self.bindings.resolve(kind);
        debug!(?kind, %algorithm, "gesture dispatch");
        self.dispatch(algorithm)
    }

    /// Switch with an explicitly chosen algorithm
    pub fn on_menu_select(&mut self, algorithm: SwitchingAlgorithm) -> Result<Layout, SwitchError> {
        debug!(%algorithm, "menu dispatch");
        self.dispatch(algorithm)
    }

    /// Switch with the controller's own algorithm
    pub fn on_menu_activate(&mut self) -> Result<Layout, SwitchError> {
        self.on_menu_select(self.algorithm)
    }

    /// Release-settle: move the active layout to the front of the recency order
    pub fn on_settle(&mut self) -> Option<LayoutHandle> {
        let current = self.provider.current_layout()?;
        if !self.registry.promote(current.handle()) {
            debug!(current = %current, "settled on unknown layout");
            return None;
        }

        debug!(
            current = %current,
            order = ?self.registry.recency(),
            "chord settled"
        );
        Some(current.handle())
    }

    pub fn algorithm(&self) -> SwitchingAlgorithm {
        self.algorithm
    }

    /// Change the algorithm used by menu activation
    pub fn set_algorithm(&mut self, algorithm: SwitchingAlgorithm) -> Result<(), SwitchError> {
        self.strategies.require(&[algorithm])?;
        if algorithm != self.algorithm {
            info!(from = %self.algorithm, to = %algorithm, "switching algorithm changed");
        }
        self.algorithm = algorithm;
        Ok(())
    }

    /// Forget strategy memory such as the toggle pair
    pub fn reset_strategies(&mut self) {
        self.strategies.reset_all();
        info!("strategy state reset");
    }

    /// Re-enumerate installed layouts, returning how many there are
    pub fn refresh(&mut self) -> usize {
        self.registry.refresh(&self.provider).len()
    }

    pub fn status(&mut self) -> SwitcherStatus {
        self.registry.refresh(&self.provider);
        SwitcherStatus {
            algorithm: self.algorithm,
            current: self.provider.current_layout(),
            layouts: self
                .registry
                .layouts()
                .iter()
                .map(|layout| LayoutUsage {
                    layout: layout.clone(),
                    use_count: self.usage.use_count(layout.handle()),
                })
                .collect(),
            recency: self.registry.recency().to_vec(),
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Run one switch and report its outcome
    fn dispatch(&mut self, algorithm: SwitchingAlgorithm) -> Result<Layout, SwitchError> {
        let result = self.switch(algorithm);

        match &result {
            Ok(layout) => {
                self.notifier.notify(Notification::LayoutChanged {
                    layout: layout.clone(),
                });
            }
            Err(e) => {
                warn!(%algorithm, error = %e, "layout switch failed");
                self.notifier.notify(Notification::Error {
                    message: e.to_string(),
                });
            }
        }

        result
    }

    fn switch(&mut self, algorithm: SwitchingAlgorithm) -> Result<Layout, SwitchError> {
        let strategy = self.strategies.get_mut(algorithm)?;

        let layouts = self.registry.refresh(&self.provider);
        if layouts.is_empty() {
            return Err(SwitchError::NoLayoutsAvailable);
        }

        let current = self.provider.current_layout();
        let ctx = StrategyContext::new(layouts, current.as_ref(), &self.usage);
        // Strategy memory only moves once the switch has happened
        let next = strategy
            .propose(&ctx)
            .ok_or(SwitchError::NoLayoutsAvailable)?;

        let activated = self
            .provider
            .activate_layout(&next)
            .map_err(|e| SwitchError::ActivationFailed {
                layout: next.to_string(),
                reason: e.to_string(),
            })?;
        if !activated {
            return Err(SwitchError::ActivationFailed {
                layout: next.to_string(),
                reason: "the system refused the request".to_string(),
            });
        }
        strategy.commit(&ctx, &next);

        let record = self.usage.record(next.handle(), Instant::now());
        info!(
            %algorithm,
            from = %current.as_ref().map_or_else(|| "unknown".to_string(), |l| l.to_string()),
            to = %next,
            use_count = record.use_count,
            "layout switched"
        );

        Ok(next)
    }
}
