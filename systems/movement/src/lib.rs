#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that paces creature steps.

use std::time::Duration;

use hungry_worm_core::{Command, Event, SessionState};

/// Pure system that reacts to world events and emits movement commands.
///
/// At most one step is requested per batch of events. Time that elapses beyond
/// the step interval is not carried over to later steps.
#[derive(Debug, Default)]
pub struct Movement {
    now: Duration,
    last_move: Duration,
}

impl Movement {
    /// Consumes world events and emits [`Command::AdvanceCreature`] when the
    /// step interval has elapsed in the active state.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: SessionState,
        time_per_move: Duration,
        out: &mut Vec<Command>,
    ) {
        let mut step_due = false;

        for event in events {
            match event {
                Event::TimeAdvanced { now, .. } => {
                    self.now = *now;
                    if self.now.saturating_sub(self.last_move) >= time_per_move {
                        step_due = true;
                    }
                }
                Event::CreatureSpawned { .. } => {
                    self.last_move = self.now;
                    step_due = false;
                }
                _ => {}
            }
        }

        if !step_due || state != SessionState::Active {
            return;
        }

        self.last_move = self.now;
        out.push(Command::AdvanceCreature);
    }
}
