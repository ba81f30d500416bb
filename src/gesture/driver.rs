//! Single-timeline event loop for the switcher
//!
//! Hotkey notifications, menu commands and poll ticks are all handled by one
//! task, so the classifier, the controller and the strategies never see
//! concurrent mutation.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::events::Notifier;
use crate::hotkey::{HotkeyEvent, HOTKEY_ID};
use crate::layout::Layout;
use crate::platform::{KeyStateProbe, LayoutProvider};
use crate::strategy::SwitchingAlgorithm;
use crate::switcher::{SwitchController, SwitchError, SwitcherStatus};

use super::classifier::{GestureClassifier, TickOutcome};

/// A request from the menu side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Switch now; `None` uses the controller's own algorithm
    Switch(Option<SwitchingAlgorithm>),
    /// Change the controller's own algorithm
    SetAlgorithm(SwitchingAlgorithm),
    /// Forget strategy memory
    ResetStrategies,
    /// Report a status snapshot
    Status,
}

/// Outcome of a menu action
#[derive(Debug)]
pub enum MenuReply {
    Switched(Layout),
    AlgorithmSet(SwitchingAlgorithm),
    Reset,
    Status(SwitcherStatus),
    Failed(SwitchError),
}

/// Menu action plus an optional channel for its outcome
#[derive(Debug)]
pub struct MenuCommand {
    pub action: MenuAction,
    pub reply: Option<oneshot::Sender<MenuReply>>,
}

impl MenuCommand {
    /// Build a command and the receiver its reply will arrive on
    pub fn with_reply(action: MenuAction) -> (Self, oneshot::Receiver<MenuReply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                action,
                reply: Some(tx),
            },
            rx,
        )
    }
}

/// Owns the classifier, the controller and the poll timer
pub struct GestureDriver<P, N, K> {
    classifier: GestureClassifier,
    controller: SwitchController<P, N>,
    probe: K,
    poll_interval: Duration,
    /// Running only while a chord is in progress
    timer: Option<Interval>,
}

impl<P, N, K> GestureDriver<P, N, K>
where
    P: LayoutProvider,
    N: Notifier,
    K: KeyStateProbe,
{
    pub fn new(
        classifier: GestureClassifier,
        controller: SwitchController<P, N>,
        probe: K,
        poll_interval: Duration,
    ) -> Self {
        Self {
            classifier,
            controller,
            probe,
            poll_interval,
            timer: None,
        }
    }

    #[cfg(test)]
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    #[cfg(test)]
    pub fn controller(&self) -> &SwitchController<P, N> {
        &self.controller
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.timer.is_some()
    }

    /// Process events until both input channels close and no chord is active
    pub async fn run(
        &mut self,
        mut hotkey_rx: mpsc::Receiver<HotkeyEvent>,
        mut menu_rx: mpsc::Receiver<MenuCommand>,
    ) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "gesture driver started");

        let mut hotkeys_open = true;
        let mut menu_open = true;

        loop {
            tokio::select! {
                event = hotkey_rx.recv(), if hotkeys_open => match event {
                    Some(HotkeyEvent::Pressed { id }) => self.handle_hotkey(id),
                    None => {
                        debug!("hotkey channel closed");
                        hotkeys_open = false;
                    }
                },

                command = menu_rx.recv(), if menu_open => match command {
                    Some(command) => self.handle_menu(command),
                    None => {
                        debug!("menu channel closed");
                        menu_open = false;
                    }
                },

                _ = next_tick(&mut self.timer), if self.timer.is_some() => {
                    self.handle_tick();
                }

                else => break,
            }
        }

        self.shutdown();
        info!("gesture driver stopped");
    }

    /// Stop polling and abandon any chord in progress
    pub fn shutdown(&mut self) {
        self.stop_timer();
        self.classifier.reset();
    }

    fn handle_hotkey(&mut self, id: i32) {
        if id != HOTKEY_ID {
            debug!(id, "ignoring unknown hotkey");
            return;
        }

        let kind = self.classifier.classify();
        // Failures are already reported by the controller and leave the
        // classifier as it was
        if self.controller.on_gesture(kind).is_ok() {
            self.classifier.arm(kind);
            self.start_timer();
        }
    }

    fn handle_tick(&mut self) {
        let sample = self.probe.chord_state(&self.classifier.chord());

        match self.classifier.on_tick(sample) {
            TickOutcome::Pending => {}
            TickOutcome::Settled => {
                self.controller.on_settle();
                self.stop_timer();
            }
            TickOutcome::Inactive => {
                warn!("poll tick without an active chord");
                self.stop_timer();
            }
        }
    }

    fn handle_menu(&mut self, command: MenuCommand) {
        debug!(action = ?command.action, "menu command");

        let result = match command.action {
            MenuAction::Switch(Some(algorithm)) => {
                self.controller.on_menu_select(algorithm).map(MenuReply::Switched)
            }
            MenuAction::Switch(None) => self.controller.on_menu_activate().map(MenuReply::Switched),
            MenuAction::SetAlgorithm(algorithm) => self
                .controller
                .set_algorithm(algorithm)
                .map(|()| MenuReply::AlgorithmSet(algorithm)),
            MenuAction::ResetStrategies => {
                self.controller.reset_strategies();
                Ok(MenuReply::Reset)
            }
            MenuAction::Status => Ok(MenuReply::Status(self.controller.status())),
        };

        if let Some(reply) = command.reply {
            let _ = reply.send(result.unwrap_or_else(MenuReply::Failed));
        }
    }

    fn start_timer(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let mut interval = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(interval);
        debug!("poll timer started");
    }

    fn stop_timer(&mut self) {
        if self.timer.take().is_some() {
            debug!("poll timer stopped");
        }
    }
}

/// Wait for the next tick of `timer`; never completes when it is stopped
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
