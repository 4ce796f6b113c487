#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-driven session controller for Hungry Worm.
//!
//! The controller owns the world and every system. Each external signal is
//! turned into a [`Command`] and pumped through the world and the systems until
//! no further commands are produced. The resulting events are translated into
//! [`PresentationRequest`] values that callers drain once per frame.

use std::time::Duration;

use hungry_worm_core::{
    Command, Direction, EntitySnapshot, Event, LevelLayout, SessionGeneration, SessionRules,
    SessionState,
};
use hungry_worm_presentation::{Presentation, PresentationRequest};
use hungry_worm_system_collision::Collision;
use hungry_worm_system_markers::{LevelAsset, LevelError};
use hungry_worm_system_movement::Movement;
use hungry_worm_system_spawning::Spawning;
use hungry_worm_world::{self as world, query, CreatureBody, World};
use thiserror::Error;
use tracing::info;

/// Errors raised while constructing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The level asset failed validation.
    #[error("level `{name}` is invalid")]
    InvalidLevel {
        /// Name of the rejected level.
        name: String,
        /// Validation failure reported by the level loader.
        #[source]
        source: LevelError,
    },
}

/// Drives a single level: owns the world, the systems and the pending
/// presentation requests.
#[derive(Debug)]
pub struct SessionController {
    world: World,
    movement: Movement,
    spawning: Spawning,
    collision: Collision,
    presentation: Presentation,
    requests: Vec<PresentationRequest>,
}

impl SessionController {
    /// Validates `level` and starts the first session instance.
    pub fn new(level: LevelAsset, seed: u64) -> Result<Self, SessionError> {
        let invalid = |source| SessionError::InvalidLevel {
            name: level.name().to_owned(),
            source,
        };
        let layout = level.layout().map_err(invalid)?;
        let rules = level.rules().map_err(invalid)?;

        info!(level = level.name(), seed, "session created");
        Ok(Self::from_layout(layout, rules, seed))
    }

    /// Starts the first session instance on an already validated layout.
    #[must_use]
    pub fn from_layout(layout: LevelLayout, rules: SessionRules, seed: u64) -> Self {
        let mut controller = Self {
            world: World::new(layout, rules),
            movement: Movement::default(),
            spawning: Spawning::new(seed),
            collision: Collision::default(),
            presentation: Presentation,
            requests: Vec::new(),
        };
        controller.submit(Command::StartSession);
        controller
    }

    /// Advances the session to the driver's current frame time.
    pub fn update(&mut self, current_time: Duration) {
        self.submit(Command::Tick { now: current_time });
    }

    /// Requests a new heading for the creature.
    pub fn change_direction(&mut self, direction: Direction) {
        self.submit(Command::ChangeDirection { direction });
    }

    /// Pauses an active session or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        self.submit(Command::TogglePause);
    }

    /// Restarts the level from one of the overlay states.
    pub fn restart(&mut self) {
        self.submit(Command::Restart);
    }

    /// Reports that the level was completed.
    pub fn complete_level(&mut self) {
        self.submit(Command::CompleteLevel);
    }

    /// Takes every presentation request produced since the last call.
    pub fn drain_requests(&mut self) -> Vec<PresentationRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        query::session_state(&self.world)
    }

    /// Fruit consumed in the running session instance.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Generation of the running session instance.
    #[must_use]
    pub fn generation(&self) -> SessionGeneration {
        query::generation(&self.world)
    }

    /// The living creature, if one is attached.
    #[must_use]
    pub fn creature(&self) -> Option<&CreatureBody> {
        query::creature(&self.world)
    }

    /// Live fruit and hazards ordered by identifier.
    #[must_use]
    pub fn entities(&self) -> Vec<EntitySnapshot> {
        query::entities(&self.world)
    }

    /// Simulated time, excluding time spent paused.
    #[must_use]
    pub fn simulation_time(&self) -> Duration {
        query::simulation_time(&self.world)
    }

    /// Level layout the session runs on.
    #[must_use]
    pub fn layout(&self) -> &LevelLayout {
        query::layout(&self.world)
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            self.presentation.translate(&events, &mut self.requests);

            let mut commands = Vec::new();
            self.collision.handle(&events, &mut commands);
            self.spawning.handle(
                &events,
                query::markers(&self.world),
                &query::occupied_cells(&self.world),
                &mut commands,
            );
            self.movement.handle(
                &events,
                query::session_state(&self.world),
                query::rules(&self.world).time_per_move(),
                &mut commands,
            );

            events = self.apply_all(commands);
        }
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }
}
