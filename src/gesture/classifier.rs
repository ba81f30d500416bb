//! Hold-vs-tap classification of the switching chord
//!
//! The hotkey fires once per chord press and never reports release, so the
//! classifier is fed two kinds of input: hotkey notifications and periodic
//! samples of the physical modifier state.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::hotkey::{Chord, ChordState};

/// What a hotkey notification means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// First press after the secondary modifier was released
    Tap,
    /// Further press while the secondary modifier is still held
    Hold,
}

/// Phase of the current chord
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    /// No chord in progress
    #[default]
    Idle,
    /// Chord pressed, no poll has seen it held yet
    Armed,
    /// At least one poll saw the chord still held
    Held,
}

impl std::fmt::Display for GesturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GesturePhase::Idle => write!(f, "Idle"),
            GesturePhase::Armed => write!(f, "Armed"),
            GesturePhase::Held => write!(f, "Held"),
        }
    }
}

/// Result of feeding one poll sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No chord in progress; the poll timer should not be running
    Inactive,
    /// Chord still (partly) held
    Pending,
    /// Both modifiers released; the chord is over
    Settled,
}

/// Classifies hotkey notifications as taps or holds
///
/// Not thread-safe by itself: hotkey notifications and poll samples must be
/// delivered on one timeline.
#[derive(Debug)]
pub struct GestureClassifier {
    chord: Chord,
    /// Secondary modifier seen released since the last tap
    secondary_released: bool,
    /// A chord is in progress and the poll timer should run
    chord_active: bool,
    /// Polls that observed the chord still held
    held_ticks: u32,
    /// Time the current chord was armed
    armed_at: Option<Instant>,
}

impl GestureClassifier {
    pub fn new(chord: Chord) -> Self {
        Self {
            chord,
            secondary_released: true,
            chord_active: false,
            held_ticks: 0,
            armed_at: None,
        }
    }

    pub fn chord(&self) -> Chord {
        self.chord
    }

    pub fn phase(&self) -> GesturePhase {
        match (self.chord_active, self.held_ticks) {
            (false, _) => GesturePhase::Idle,
            (true, 0) => GesturePhase::Armed,
            (true, _) => GesturePhase::Held,
        }
    }

    #[cfg(test)]
    pub fn is_chord_active(&self) -> bool {
        self.chord_active
    }

    /// Kind of gesture a hotkey notification would be right now
    pub fn classify(&self) -> GestureKind {
        if self.secondary_released {
            GestureKind::Tap
        } else {
            GestureKind::Hold
        }
    }

    /// Commit a hotkey notification that was successfully acted on
    pub fn arm(&mut self, kind: GestureKind) {
        let old_phase = self.phase();

        if kind == GestureKind::Tap {
            self.secondary_released = false;
        }
        if !self.chord_active {
            self.chord_active = true;
            self.held_ticks = 0;
            self.armed_at = Some(Instant::now());
        }

        debug!(?kind, from = %old_phase, to = %self.phase(), "hotkey armed");
    }

    /// Feed one poll sample of the chord's physical state
    pub fn on_tick(&mut self, sample: ChordState) -> TickOutcome {
        if !self.chord_active {
            return TickOutcome::Inactive;
        }

        // Re-arms tap detection, but the chord only ends once both are up
        if sample.secondary.is_up() && !self.secondary_released {
            debug!("secondary modifier released");
            self.secondary_released = true;
        }

        if sample.is_released() {
            let duration_ms = self
                .armed_at
                .take()
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0);
            info!(
                from = %self.phase(),
                to = %GesturePhase::Idle,
                held_ticks = self.held_ticks,
                duration_ms = duration_ms,
                "chord released"
            );

            self.chord_active = false;
            self.held_ticks = 0;
            return TickOutcome::Settled;
        }

        if self.held_ticks == 0 {
            debug!(from = %GesturePhase::Armed, to = %GesturePhase::Held, "chord held");
        }
        self.held_ticks = self.held_ticks.saturating_add(1);
        TickOutcome::Pending
    }

    /// Return to the initial state, abandoning any chord in progress
    pub fn reset(&mut self) {
        *self = Self::new(self.chord);
    }
}
