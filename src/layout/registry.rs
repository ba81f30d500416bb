//! Installed layout registry
//!
//! Holds the enumeration-ordered layout snapshot taken at the last refresh,
//! plus a separate recency ordering updated when a chord settles.

use tracing::debug;

use crate::platform::LayoutProvider;

use super::{position_of, Layout, LayoutHandle};

/// Installed layouts as of the last refresh
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    /// Enumeration order; never re-sorted
    layouts: Vec<Layout>,
    /// Most recently settled first
    recency: Vec<LayoutHandle>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a single enumeration from `provider`
    pub fn refresh<P: LayoutProvider + ?Sized>(&mut self, provider: &P) -> &[Layout] {
        let layouts = provider.enumerate_layouts();
        self.replace(layouts);
        &self.layouts
    }

    /// Replace the snapshot, keeping the recency order of surviving layouts
    pub fn replace(&mut self, layouts: Vec<Layout>) {
        self.recency
            .retain(|handle| position_of(&layouts, *handle).is_some());
        for layout in &layouts {
            if !self.recency.contains(&layout.handle()) {
                self.recency.push(layout.handle());
            }
        }

        debug!(count = layouts.len(), "layout registry refreshed");
        self.layouts = layouts;
    }

    /// Layouts in enumeration order
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Handles ordered most recently settled first
    pub fn recency(&self) -> &[LayoutHandle] {
        &self.recency
    }

    #[cfg(test)]
    pub fn position(&self, handle: LayoutHandle) -> Option<usize> {
        position_of(&self.layouts, handle)
    }

    #[cfg(test)]
    pub fn contains(&self, handle: LayoutHandle) -> bool {
        self.position(handle).is_some()
    }

    #[cfg(test)]
    pub fn get(&self, handle: LayoutHandle) -> Option<&Layout> {
        self.position(handle).map(|i| &self.layouts[i])
    }

    /// Move `handle` to the front of the recency order
    ///
    /// Returns false if the handle is not a known layout.
    pub fn promote(&mut self, handle: LayoutHandle) -> bool {
        let Some(index) = self.recency.iter().position(|h| *h == handle) else {
            return false;
        };
        let handle = self.recency.remove(index);
        self.recency.insert(0, handle);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
