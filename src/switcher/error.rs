//! Errors surfaced by the switch controller

use crate::strategy::SwitchingAlgorithm;

/// Reasons a switch request did not activate a layout
///
/// All of them are recoverable: the controller reports them as a
/// notification and leaves usage history untouched.
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("no keyboard layouts available")]
    NoLayoutsAvailable,

    #[error("failed to activate {layout}: {reason}")]
    ActivationFailed { layout: String, reason: String },

    #[error("no strategy configured for algorithm '{0}'")]
    StrategyNotConfigured(SwitchingAlgorithm),
}

impl SwitchError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SwitchError::NoLayoutsAvailable => "no_layouts_available",
            SwitchError::ActivationFailed { .. } => "activation_failed",
            SwitchError::StrategyNotConfigured(_) => "strategy_not_configured",
        }
    }
}
