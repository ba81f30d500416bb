//! Keyboard layout model
//!
//! Provides the `Layout` entity, the registry holding the installed layouts
//! and the per-layout usage tracker consulted by the switching strategies.

mod registry;
mod usage;

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub use registry::LayoutRegistry;
pub use usage::{UsageRecord, UsageTracker};

/// Opaque OS-assigned identity of an installed keyboard layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutHandle(pub u64);

impl LayoutHandle {
    /// Language identifier carried in the low word of the handle
    pub fn language_id(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for LayoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// An installed keyboard layout
///
/// Identity is the handle alone: two layouts may share a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    handle: LayoutHandle,
    name: String,
    layout_id: u16,
}

impl Layout {
    /// Create a layout, deriving the numeric identifier from the handle
    pub fn new(handle: LayoutHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            layout_id: handle.language_id(),
        }
    }

    /// Create a layout with the fallback name used when the OS has none
    pub fn unnamed(handle: LayoutHandle) -> Self {
        Self::new(handle, format!("Layout {}", handle))
    }

    pub fn handle(&self) -> LayoutHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn layout_id(&self) -> u16 {
        self.layout_id
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Layout {}

impl Hash for Layout {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {:04X})", self.name, self.layout_id)
    }
}

/// Position of `handle` in `layouts`, by handle equality
pub fn position_of(layouts: &[Layout], handle: LayoutHandle) -> Option<usize> {
    layouts.iter().position(|l| l.handle == handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_handle() {
        let a = Layout::new(LayoutHandle(0x0409_0409), "English");
        let b = Layout::new(LayoutHandle(0x0409_0409), "Renamed");
        let c = Layout::new(LayoutHandle(0xF001_0409), "English");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_layout_id_is_low_word() {
        let layout = Layout::new(LayoutHandle(0x0419_0419), "Russian");
        assert_eq!(layout.layout_id(), 0x0419);
    }

    #[test]
    fn test_display() {
        let layout = Layout::new(LayoutHandle(0x0409_0409), "English (United States)");
        assert_eq!(layout.to_string(), "English (United States) (ID: 0409)");

        let unnamed = Layout::unnamed(LayoutHandle(0x0407_0407));
        assert_eq!(unnamed.name(), "Layout 04070407");
    }
}
