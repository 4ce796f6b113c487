//! Session state machine and the deferred respawn it schedules.

use std::time::Duration;

use hungry_worm_core::{Event, SessionGeneration, SessionState};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingRespawn {
    due: Duration,
    generation: SessionGeneration,
}

/// Owns the current [`SessionState`] and every transition out of it.
///
/// Exactly one state is current. Transitions push the matching
/// `SessionStateChanged` and overlay events; rejected requests push nothing.
#[derive(Clone, Debug)]
pub(crate) struct SessionMachine {
    state: SessionState,
    generation: SessionGeneration,
    contacts_enabled: bool,
    pending_respawn: Option<PendingRespawn>,
}

impl SessionMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Active,
            generation: SessionGeneration::default(),
            contacts_enabled: false,
            pending_respawn: None,
        }
    }

    pub(crate) const fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) const fn generation(&self) -> SessionGeneration {
        self.generation
    }

    pub(crate) const fn contacts_enabled(&self) -> bool {
        self.contacts_enabled
    }

    pub(crate) fn respawn_due_at(&self) -> Option<Duration> {
        self.pending_respawn.map(|pending| pending.due)
    }

    pub(crate) fn accepts_restart(&self) -> bool {
        self.state.overlay().is_some()
    }

    /// Starts a new session instance. Any pending respawn belongs to the old
    /// generation and is dropped here.
    pub(crate) fn begin(&mut self, out_events: &mut Vec<Event>) -> SessionGeneration {
        self.generation = self.generation.next();
        self.pending_respawn = None;
        self.contacts_enabled = true;
        self.transition(SessionState::Active, out_events);
        info!(generation = self.generation.get(), "session started");
        self.generation
    }

    pub(crate) fn toggle_pause(&mut self, out_events: &mut Vec<Event>) -> bool {
        match self.state {
            SessionState::Active => {
                self.transition(SessionState::Paused, out_events);
                true
            }
            SessionState::Paused => {
                self.transition(SessionState::Active, out_events);
                true
            }
            SessionState::Death | SessionState::Results => false,
        }
    }

    pub(crate) fn enter_death(
        &mut self,
        now: Duration,
        respawn_delay: Duration,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if self.state != SessionState::Active {
            return false;
        }

        self.contacts_enabled = false;
        self.transition(SessionState::Death, out_events);

        let due = now.saturating_add(respawn_delay);
        self.pending_respawn = Some(PendingRespawn {
            due,
            generation: self.generation,
        });
        out_events.push(Event::RespawnScheduled {
            due,
            generation: self.generation,
        });
        true
    }

    pub(crate) fn finish(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.state != SessionState::Active {
            return false;
        }

        self.contacts_enabled = false;
        self.pending_respawn = None;
        self.transition(SessionState::Results, out_events);
        true
    }

    /// Accepts a freshly spawned creature for `generation`.
    ///
    /// Valid right after `begin` (state already active) and while waiting in
    /// the death state. Spawns planned for an older generation are refused.
    pub(crate) fn admit_creature(
        &mut self,
        generation: SessionGeneration,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        match self.state {
            SessionState::Active => {
                self.contacts_enabled = true;
                true
            }
            SessionState::Death => {
                self.pending_respawn = None;
                self.contacts_enabled = true;
                self.transition(SessionState::Active, out_events);
                true
            }
            SessionState::Paused | SessionState::Results => false,
        }
    }

    /// Fires the pending respawn once simulation time reaches its due time.
    pub(crate) fn poll_respawn(&mut self, now: Duration) -> Option<SessionGeneration> {
        let pending = self.pending_respawn?;
        if pending.generation != self.generation {
            self.pending_respawn = None;
            return None;
        }
        if now < pending.due {
            return None;
        }

        self.pending_respawn = None;
        Some(pending.generation)
    }

    fn transition(&mut self, to: SessionState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        out_events.push(Event::SessionStateChanged { from, to });
        if let Some(overlay) = from.overlay() {
            out_events.push(Event::OverlayHidden { overlay });
        }
        if let Some(overlay) = to.overlay() {
            out_events.push(Event::OverlayShown { overlay });
        }
    }
}
