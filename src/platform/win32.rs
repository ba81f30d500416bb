//! Win32 layout provider and key-state probe

use tracing::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{FALSE, LPARAM, TRUE, WPARAM};
use windows::Win32::Globalization::{GetLocaleInfoEx, LCIDToLocaleName, LOCALE_SLOCALIZEDDISPLAYNAME};
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    ActivateKeyboardLayout, GetAsyncKeyState, GetKeyboardLayout, GetKeyboardLayoutList, HKL,
    KLF_ACTIVATE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowThreadProcessId, PostMessageW, WM_INPUTLANGCHANGEREQUEST,
};

use super::{KeyStateProbe, LayoutProvider, PlatformError};
use crate::hotkey::{KeyState, Modifier};
use crate::layout::{Layout, LayoutHandle};

const INPUTLANGCHANGE_SYSCHARSET: usize = 0x0001;
const LOCALE_NAME_MAX_LENGTH: usize = 85;

/// Installed layouts of the interactive desktop
#[derive(Debug, Default)]
pub struct Win32Layouts;

impl Win32Layouts {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutProvider for Win32Layouts {
    fn enumerate_layouts(&self) -> Vec<Layout> {
        let count = unsafe { GetKeyboardLayoutList(None) };
        if count <= 0 {
            return Vec::new();
        }

        let mut handles = vec![HKL::default(); count as usize];
        let written = unsafe { GetKeyboardLayoutList(Some(&mut handles)) };
        handles.truncate(written.max(0) as usize);

        handles.into_iter().map(layout_from_hkl).collect()
    }

    fn current_layout(&self) -> Option<Layout> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            return None;
        }

        let thread_id = unsafe { GetWindowThreadProcessId(hwnd, None) };
        let hkl = unsafe { GetKeyboardLayout(thread_id) };
        if hkl.is_invalid() {
            return None;
        }
        Some(layout_from_hkl(hkl))
    }

    fn activate_layout(&self, layout: &Layout) -> Result<bool, PlatformError> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            return Err(PlatformError::NoForegroundWindow);
        }

        let hkl = HKL(layout.handle().0 as usize as _);
        let foreground_thread = unsafe { GetWindowThreadProcessId(hwnd, None) };
        let own_thread = unsafe { GetCurrentThreadId() };

        // ActivateKeyboardLayout only affects the calling thread's input
        // context unless it shares the foreground thread's input state.
        let attached = unsafe { AttachThreadInput(own_thread, foreground_thread, TRUE) }.as_bool();
        let activated = unsafe { ActivateKeyboardLayout(hkl, KLF_ACTIVATE) };
        if attached {
            unsafe {
                let _ = AttachThreadInput(own_thread, foreground_thread, FALSE);
            }
        }
        if let Err(e) = activated {
            debug!(?e, handle = %layout.handle(), "ActivateKeyboardLayout failed, relying on request message");
        }

        unsafe {
            PostMessageW(
                hwnd,
                WM_INPUTLANGCHANGEREQUEST,
                WPARAM(INPUTLANGCHANGE_SYSCHARSET),
                LPARAM(hkl.0 as isize),
            )
        }
        .map_err(|e| PlatformError::Call {
            call: "PostMessageW",
            reason: e.to_string(),
        })?;

        Ok(true)
    }
}

/// Physical modifier state via `GetAsyncKeyState`
#[derive(Debug, Default)]
pub struct Win32KeyProbe;

impl Win32KeyProbe {
    pub fn new() -> Self {
        Self
    }
}

impl KeyStateProbe for Win32KeyProbe {
    fn key_state(&self, modifier: Modifier) -> KeyState {
        // High bit set means the key is physically down
        if unsafe { GetAsyncKeyState(modifier.virtual_key() as i32) } < 0 {
            KeyState::Down
        } else {
            KeyState::Up
        }
    }
}

fn layout_from_hkl(hkl: HKL) -> Layout {
    let handle = LayoutHandle(hkl.0 as usize as u64);
    match display_name(handle.language_id()) {
        Some(name) => Layout::new(handle, name),
        None => {
            warn!(%handle, "no display name for layout");
            Layout::unnamed(handle)
        }
    }
}

/// Localized display name of a language identifier
fn display_name(language_id: u16) -> Option<String> {
    let mut locale = [0u16; LOCALE_NAME_MAX_LENGTH];
    let len = unsafe { LCIDToLocaleName(u32::from(language_id), Some(&mut locale), 0) };
    if len <= 0 {
        return None;
    }

    let mut name = [0u16; 256];
    let len = unsafe {
        GetLocaleInfoEx(
            PCWSTR(locale.as_ptr()),
            LOCALE_SLOCALIZEDDISPLAYNAME,
            Some(&mut name),
        )
    };
    // Length includes the terminating null
    if len <= 1 {
        return None;
    }
    Some(String::from_utf16_lossy(&name[..len as usize - 1]))
}
