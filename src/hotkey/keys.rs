//! Modifier key definitions and chord state tracking
//!
//! Provides the Win32 modifier masks and virtual-key codes used to register
//! the switching chord, and a struct for the sampled state of that chord.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::listener::HotkeyError;

/// Modifier masks accepted by `RegisterHotKey`
pub mod mods {
    pub const ALT: u32 = 0x0001;
    pub const CONTROL: u32 = 0x0002;
    pub const SHIFT: u32 = 0x0004;
    pub const WIN: u32 = 0x0008;
    /// Suppress auto-repeat notifications while the chord is held
    pub const NOREPEAT: u32 = 0x4000;
}

/// Virtual-key codes of the modifier keys
pub mod vk {
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    /// Alt
    pub const MENU: u32 = 0x12;
    pub const LWIN: u32 = 0x5B;
}

/// A modifier key that can take part in the switching chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Control,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    pub fn mask(self) -> u32 {
        match self {
            Modifier::Control => mods::CONTROL,
            Modifier::Alt => mods::ALT,
            Modifier::Shift => mods::SHIFT,
            Modifier::Win => mods::WIN,
        }
    }

    pub fn virtual_key(self) -> u32 {
        match self {
            Modifier::Control => vk::CONTROL,
            Modifier::Alt => vk::MENU,
            Modifier::Shift => vk::SHIFT,
            Modifier::Win => vk::LWIN,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Control => write!(f, "ctrl"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Shift => write!(f, "shift"),
            Modifier::Win => write!(f, "win"),
        }
    }
}

impl FromStr for Modifier {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Control),
            "alt" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "win" | "super" => Ok(Modifier::Win),
            other => Err(HotkeyError::InvalidChord(format!("unknown modifier '{}'", other))),
        }
    }
}

/// Physical state of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Up,
    Down,
}

impl KeyState {
    pub fn is_up(self) -> bool {
        self == KeyState::Up
    }
}

/// The two-modifier chord that triggers switching
///
/// The primary modifier is the key the hotkey is registered on; the secondary
/// modifier is the one whose release re-arms tap detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub primary: Modifier,
    pub secondary: Modifier,
}

impl Chord {
    pub fn new(primary: Modifier, secondary: Modifier) -> Result<Self, HotkeyError> {
        if primary == secondary {
            return Err(HotkeyError::InvalidChord(format!(
                "modifier '{}' used twice",
                primary
            )));
        }
        Ok(Self { primary, secondary })
    }

    /// Modifier mask passed to hotkey registration
    pub fn modifier_mask(&self) -> u32 {
        self.primary.mask() | self.secondary.mask()
    }

    /// Virtual key passed to hotkey registration
    pub fn virtual_key(&self) -> u32 {
        self.primary.virtual_key()
    }
}

impl Default for Chord {
    fn default() -> Self {
        Self {
            primary: Modifier::Alt,
            secondary: Modifier::Shift,
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.primary, self.secondary)
    }
}

impl FromStr for Chord {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').collect();
        let [primary, secondary] = parts.as_slice() else {
            return Err(HotkeyError::InvalidChord(format!(
                "expected two modifiers, got '{}'",
                s
            )));
        };
        Chord::new(primary.parse()?, secondary.parse()?)
    }
}

/// Sampled physical state of both chord modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordState {
    pub primary: KeyState,
    pub secondary: KeyState,
}

impl ChordState {
    /// Check if both modifiers are released
    pub fn is_released(&self) -> bool {
        self.primary.is_up() && self.secondary.is_up()
    }
}
