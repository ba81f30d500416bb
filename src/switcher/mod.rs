//! Switch controller module
//!
//! Glues the strategies to the OS collaborators: one activation request and
//! at most one usage update per dispatch.

mod controller;
mod error;

pub use controller::{GestureBindings, LayoutUsage, SwitchController, SwitcherStatus};
pub use error::SwitchError;
