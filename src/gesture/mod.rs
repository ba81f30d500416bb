//! Gesture module for the switching chord
//!
//! Distinguishes a quick tap of the chord (toggle) from presses made while
//! the chord is held (cycle):
//! - Idle: no chord in progress
//! - Armed: chord pressed, not yet seen held by a poll
//! - Held: a poll saw the chord still down
//!
//! The driver runs the classifier, the switch controller and the poll timer
//! on a single task.

mod classifier;
mod driver;

pub use classifier::{GestureClassifier, GestureKind, GesturePhase, TickOutcome};
pub use driver::{GestureDriver, MenuAction, MenuCommand, MenuReply};
