//! In-memory collaborators for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{KeyStateProbe, LayoutProvider, PlatformError};
use crate::hotkey::{KeyState, Modifier};
use crate::layout::{Layout, LayoutHandle};

#[derive(Debug, Default)]
struct LayoutsState {
    layouts: Vec<Layout>,
    current: Option<Layout>,
    activations: Vec<LayoutHandle>,
    enumerations: usize,
    refuse: bool,
    raise: bool,
}

/// Layout provider whose state tests can inspect and change
#[derive(Debug, Clone, Default)]
pub struct FakeLayouts {
    state: Arc<Mutex<LayoutsState>>,
}

impl FakeLayouts {
    pub fn new(layouts: Vec<Layout>, current: Option<Layout>) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.layouts = layouts;
            state.current = current;
        }
        fake
    }

    pub fn set_current(&self, current: Option<Layout>) {
        self.state.lock().unwrap().current = current;
    }

    pub fn current(&self) -> Option<Layout> {
        self.state.lock().unwrap().current.clone()
    }

    /// Make activation report failure
    pub fn refuse_activation(&self, refuse: bool) {
        self.state.lock().unwrap().refuse = refuse;
    }

    /// Make activation raise an error
    pub fn raise_on_activation(&self, raise: bool) {
        self.state.lock().unwrap().raise = raise;
    }

    pub fn activations(&self) -> Vec<LayoutHandle> {
        self.state.lock().unwrap().activations.clone()
    }

    pub fn enumerations(&self) -> usize {
        self.state.lock().unwrap().enumerations
    }
}

impl LayoutProvider for FakeLayouts {
    fn enumerate_layouts(&self) -> Vec<Layout> {
        let mut state = self.state.lock().unwrap();
        state.enumerations += 1;
        state.layouts.clone()
    }

    fn current_layout(&self) -> Option<Layout> {
        self.current()
    }

    fn activate_layout(&self, layout: &Layout) -> Result<bool, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.activations.push(layout.handle());
        if state.raise {
            return Err(PlatformError::NoForegroundWindow);
        }
        if state.refuse {
            return Ok(false);
        }
        state.current = Some(layout.clone());
        Ok(true)
    }
}

/// Key probe with settable physical key state; everything starts up
#[derive(Debug, Clone, Default)]
pub struct FakeKeys {
    down: Arc<Mutex<HashMap<Modifier, bool>>>,
}

impl FakeKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, modifier: Modifier) {
        self.down.lock().unwrap().insert(modifier, true);
    }

    pub fn release(&self, modifier: Modifier) {
        self.down.lock().unwrap().insert(modifier, false);
    }
}

impl KeyStateProbe for FakeKeys {
    fn key_state(&self, modifier: Modifier) -> KeyState {
        match self.down.lock().unwrap().get(&modifier) {
            Some(true) => KeyState::Down,
            _ => KeyState::Up,
        }
    }
}
