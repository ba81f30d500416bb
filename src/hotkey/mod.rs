//! Hotkey module for the global switching chord
//!
//! Uses Win32 `RegisterHotKey` to receive a notification each time the
//! chord is pressed. Release is never signalled here; the gesture driver
//! polls physical key state for that.

mod keys;
mod listener;

pub use keys::{mods, vk, Chord, ChordState, KeyState, Modifier};
pub use listener::{HotkeyError, HotkeyEvent, HotkeyListener, HOTKEY_ID};
