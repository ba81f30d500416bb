//! Operating-system collaborators
//!
//! The switching core only talks to the OS through these traits. The Win32
//! implementation lives in `win32`; tests supply in-memory fakes.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(windows)]
mod win32;

#[cfg(windows)]
pub use self::win32::{Win32KeyProbe, Win32Layouts};

use crate::hotkey::{Chord, ChordState, KeyState, Modifier};
use crate::layout::Layout;

/// Errors raised by an OS collaborator
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("no foreground window to switch")]
    NoForegroundWindow,

    #[error("{call} failed: {reason}")]
    Call { call: &'static str, reason: String },
}

/// Source of installed layouts and target of activation requests
pub trait LayoutProvider {
    /// Installed layouts in OS enumeration order
    fn enumerate_layouts(&self) -> Vec<Layout>;

    /// Layout active in the foreground input context, if any
    fn current_layout(&self) -> Option<Layout>;

    /// Ask the OS to activate `layout`
    ///
    /// `Ok(false)` means the OS reported failure. Activating the layout that
    /// is already active must report success.
    fn activate_layout(&self, layout: &Layout) -> Result<bool, PlatformError>;
}

/// Physical key state sampling
pub trait KeyStateProbe {
    fn key_state(&self, modifier: Modifier) -> KeyState;

    /// Sample both modifiers of `chord`
    fn chord_state(&self, chord: &Chord) -> ChordState {
        ChordState {
            primary: self.key_state(chord.primary),
            secondary: self.key_state(chord.secondary),
        }
    }
}
