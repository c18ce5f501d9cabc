// src/application/scheduler.rs
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    PendingSave { deadline: Instant },
    /// `follow_up` records a change that arrived while the save was in flight.
    Saving { follow_up: bool },
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveState::Idle => f.write_str("idle"),
            SaveState::PendingSave { .. } => f.write_str("pending"),
            SaveState::Saving { .. } => f.write_str("saving"),
        }
    }
}

/// Debounce state machine for one open note.
///
/// Holds no timer itself; the owner sleeps until [`SaveScheduler::deadline`]
/// and reports back. Re-arming the deadline replaces the previous one.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    quiet: Duration,
    state: SaveState,
}

impl SaveScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            state: SaveState::Idle,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SaveState::PendingSave { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == SaveState::Idle
    }

    pub fn on_change(&mut self, now: Instant) {
        self.state = match self.state {
            SaveState::Idle | SaveState::PendingSave { .. } => SaveState::PendingSave {
                deadline: now + self.quiet,
            },
            SaveState::Saving { .. } => SaveState::Saving { follow_up: true },
        };
    }

    /// Returns `true` when the quiet period is over and a save starts.
    pub fn on_deadline(&mut self, now: Instant) -> bool {
        match self.state {
            SaveState::PendingSave { deadline } if now >= deadline => {
                self.state = SaveState::Saving { follow_up: false };
                true
            }
            _ => false,
        }
    }

    /// Starts a pending save immediately.
    pub fn force(&mut self) -> bool {
        match self.state {
            SaveState::PendingSave { .. } => {
                self.state = SaveState::Saving { follow_up: false };
                true
            }
            _ => false,
        }
    }

    /// The save finished, failed, or was vetoed by the diff guard.
    pub fn on_settled(&mut self, now: Instant) {
        self.state = match self.state {
            SaveState::Saving { follow_up: true } => SaveState::PendingSave {
                deadline: now + self.quiet,
            },
            SaveState::Saving { follow_up: false } => SaveState::Idle,
            other => other,
        };
    }
}
