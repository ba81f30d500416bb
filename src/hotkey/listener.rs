//! Global hotkey listener using Win32 `RegisterHotKey`
//!
//! Registers the switching chord on a dedicated thread and runs that thread's
//! message loop, forwarding each `WM_HOTKEY` to the gesture driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::keys::Chord;

/// Identifier the switching chord is registered under
pub const HOTKEY_ID: i32 = 1;

/// Events sent from the hotkey listener to the gesture driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The registered chord fired
    Pressed { id: i32 },
}

/// Errors that can occur in the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey listener is already running")]
    AlreadyRunning,

    #[error("failed to register hotkey {chord}: {reason}")]
    Registration { chord: String, reason: String },

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("invalid hotkey chord: {0}")]
    InvalidChord(String),

    #[error("global hotkeys are not supported on this platform")]
    #[cfg_attr(windows, allow(dead_code))]
    Unsupported,
}

/// Global hotkey listener
///
/// Dropping the listener stops the thread, which unregisters the hotkey.
pub struct HotkeyListener {
    chord: Chord,
    event_tx: mpsc::Sender<HotkeyEvent>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<Worker>>,
}

/// Handle to the running listener thread
struct Worker {
    #[cfg_attr(not(windows), allow(dead_code))]
    thread_id: u32,
    handle: JoinHandle<()>,
}

impl HotkeyListener {
    /// Create a new hotkey listener for `chord`
    pub fn new(chord: Chord, event_tx: mpsc::Sender<HotkeyEvent>) -> Self {
        Self {
            chord,
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Start the hotkey listener
    ///
    /// Spawns the listener thread and waits until it reports whether the
    /// chord could be registered.
    pub fn start(&self) -> Result<(), HotkeyError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }

        match platform::spawn(self.chord, self.event_tx.clone(), Arc::clone(&self.running)) {
            Ok(worker) => {
                info!(chord = %self.chord, "hotkey registered");
                if let Ok(mut slot) = self.worker.lock() {
                    *slot = Some(worker);
                }
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Stop the hotkey listener and wait for it to unregister the chord
    pub fn stop(&self) {
        let worker = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let Some(worker) = worker else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        platform::wake(&worker);
        if worker.handle.join().is_err() {
            warn!("hotkey listener thread panicked");
        }
    }

    #[cfg(test)]
    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn chord(&self) -> Chord {
        self.chord
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(windows)]
mod platform {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use tokio::sync::mpsc;
    use tracing::{debug, info, warn};
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetMessageW, PostThreadMessageW, MSG, WM_HOTKEY, WM_QUIT,
    };

    use super::{HotkeyError, HotkeyEvent, Worker, HOTKEY_ID};
    use crate::hotkey::keys::{mods, Chord};

    pub(super) fn spawn(
        chord: Chord,
        event_tx: mpsc::Sender<HotkeyEvent>,
        running: Arc<AtomicBool>,
    ) -> Result<Worker, HotkeyError> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<u32, HotkeyError>>();

        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                let thread_id = unsafe { GetCurrentThreadId() };
                let modifiers = HOT_KEY_MODIFIERS(chord.modifier_mask() | mods::NOREPEAT);

                // The hotkey belongs to the thread that registers it, so the
                // message loop has to run here.
                if let Err(e) = unsafe { RegisterHotKey(None, HOTKEY_ID, modifiers, chord.virtual_key()) } {
                    let _ = ready_tx.send(Err(HotkeyError::Registration {
                        chord: chord.to_string(),
                        reason: e.to_string(),
                    }));
                    return;
                }
                let _ = ready_tx.send(Ok(thread_id));

                info!("hotkey listener thread started");
                run_message_loop(event_tx, &running);

                if let Err(e) = unsafe { UnregisterHotKey(None, HOTKEY_ID) } {
                    warn!(?e, "failed to unregister hotkey");
                }
                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => Ok(Worker { thread_id, handle }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(HotkeyError::ThreadSpawn("listener thread exited during startup".to_string()))
            }
        }
    }

    fn run_message_loop(event_tx: mpsc::Sender<HotkeyEvent>, running: &AtomicBool) {
        let mut msg = MSG::default();

        while running.load(Ordering::SeqCst) {
            // 0 means WM_QUIT, -1 an error
            let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if status.0 <= 0 {
                break;
            }

            if msg.message == WM_HOTKEY && msg.wParam.0 as i32 == HOTKEY_ID {
                debug!("hotkey fired");
                if event_tx
                    .blocking_send(HotkeyEvent::Pressed { id: HOTKEY_ID })
                    .is_err()
                {
                    warn!("failed to send hotkey event - channel closed?");
                    break;
                }
            }
        }
    }

    pub(super) fn wake(worker: &Worker) {
        if let Err(e) = unsafe { PostThreadMessageW(worker.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            warn!(?e, "failed to post quit to hotkey listener");
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::{HotkeyError, HotkeyEvent, Worker};
    use crate::hotkey::keys::Chord;

    pub(super) fn spawn(
        _chord: Chord,
        _event_tx: mpsc::Sender<HotkeyEvent>,
        _running: Arc<AtomicBool>,
    ) -> Result<Worker, HotkeyError> {
        Err(HotkeyError::Unsupported)
    }

    pub(super) fn wake(_worker: &Worker) {}
}
