#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Hungry Worm.
//!
//! The world owns the creature, the live fruit and hazard placements, the
//! score, the simulation clock and the session state machine. Nothing outside
//! this crate mutates them: adapters and systems submit [`Command`] values to
//! [`apply`] and observe the resulting [`Event`] stream.

mod contacts;
mod creature;
mod entities;
mod session;

use std::time::Duration;

use hungry_worm_core::{
    Cell, Command, DeathCause, Direction, EntityKind, Event, LevelLayout, SessionGeneration,
    SessionRules, SessionState,
};
use tracing::{debug, info, warn};

pub use creature::{CreatureBody, Step};

use contacts::detect_head_contacts;
use entities::EntityRegistry;
use session::SessionMachine;

/// Represents the authoritative Hungry Worm session.
#[derive(Debug)]
pub struct World {
    layout: LevelLayout,
    rules: SessionRules,
    session: SessionMachine,
    creature: Option<CreatureBody>,
    entities: EntityRegistry,
    score: u32,
    clock: SimulationClock,
}

impl World {
    /// Creates a world for the provided level. The session does not start
    /// until [`Command::StartSession`] is applied.
    #[must_use]
    pub fn new(layout: LevelLayout, rules: SessionRules) -> Self {
        Self {
            layout,
            rules,
            session: SessionMachine::new(),
            creature: None,
            entities: EntityRegistry::default(),
            score: 0,
            clock: SimulationClock::default(),
        }
    }

    fn reset_session(&mut self, out_events: &mut Vec<Event>) {
        if self.creature.take().is_some() {
            out_events.push(Event::CreatureDetached);
        }

        for entity in self.entities.clear() {
            out_events.push(Event::EntityCleared {
                id: entity.id,
                kind: entity.kind,
                cell: entity.cell,
            });
        }

        self.score = 0;
        out_events.push(Event::ScoreChanged { score: 0 });

        let generation = self.session.begin(out_events);
        out_events.push(Event::SessionStarted { generation });
    }

    fn tick(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let frozen = self.session.state() == SessionState::Paused;
        let Some(dt) = self.clock.observe(now, frozen) else {
            return;
        };
        out_events.push(Event::TimeAdvanced {
            now: self.clock.now,
            dt,
        });

        if let Some(generation) = self.session.poll_respawn(self.clock.now) {
            out_events.push(Event::RespawnDue { generation });
        }
    }

    fn change_direction(&mut self, direction: Direction) {
        if !matches!(
            self.session.state(),
            SessionState::Active | SessionState::Paused
        ) {
            return;
        }

        if let Some(creature) = self.creature.as_mut() {
            if !creature.change_direction(direction) {
                debug!(?direction, "direction change rejected");
            }
        }
    }

    fn advance_creature(&mut self, out_events: &mut Vec<Event>) {
        if self.session.state() != SessionState::Active {
            return;
        }

        let Some(creature) = self.creature.as_mut() else {
            return;
        };
        let Some(step) = creature.advance() else {
            return;
        };
        out_events.push(Event::CreatureAdvanced {
            head: step.head,
            vacated: step.vacated,
        });

        self.detect_contacts(out_events);
    }

    fn detect_contacts(&self, out_events: &mut Vec<Event>) {
        if !self.session.contacts_enabled() {
            return;
        }
        let Some(creature) = self.creature.as_ref() else {
            return;
        };

        let mut contacts = Vec::new();
        detect_head_contacts(creature, &self.entities, self.layout.walls(), &mut contacts);
        out_events.extend(
            contacts
                .into_iter()
                .map(|contact| Event::ContactDetected { contact }),
        );
    }

    fn grow_creature(&mut self, out_events: &mut Vec<Event>) {
        if let Some(creature) = self.creature.as_mut() {
            let pending = creature.grow();
            out_events.push(Event::CreatureGrowthQueued { pending });
        }
    }

    fn kill_creature(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        if self.session.state() != SessionState::Active {
            debug!(?cause, "kill ignored outside the active state");
            return;
        }

        let Some(mut creature) = self.creature.take() else {
            return;
        };
        let _ = creature.kill();
        info!(?cause, head = ?creature.head(), length = creature.len(), "creature died");
        out_events.push(Event::CreatureKilled { cause });
        out_events.push(Event::CreatureDetached);

        let _ = self
            .session
            .enter_death(self.clock.now, self.rules.respawn_delay(), out_events);
    }

    fn spawn_creature(
        &mut self,
        cell: Cell,
        generation: SessionGeneration,
        out_events: &mut Vec<Event>,
    ) {
        if self.creature.is_some() {
            debug!(?cell, "spawn ignored while a creature is alive");
            return;
        }

        if !self.session.admit_creature(generation, out_events) {
            debug!(
                ?cell,
                generation = generation.get(),
                "spawn ignored for inactive or stale session"
            );
            return;
        }

        if self.layout.walls().blocks(cell) {
            warn!(?cell, "creature spawned on a wall cell");
        }
        self.creature = Some(CreatureBody::new(cell));
        out_events.push(Event::CreatureSpawned { cell });
        self.detect_contacts(out_events);
    }

    fn place_entity(&mut self, kind: EntityKind, cell: Cell, out_events: &mut Vec<Event>) {
        if !self.is_cell_free(cell) {
            out_events.push(Event::EntityPlacementRejected { kind, cell });
            return;
        }

        let entity = self.entities.place(kind, cell);
        out_events.push(Event::EntityPlaced {
            id: entity.id,
            kind,
            cell,
        });
    }

    fn consume_entity(&mut self, cell: Cell, out_events: &mut Vec<Event>) {
        let Some(entity) = self.entities.consume(cell) else {
            return;
        };
        out_events.push(Event::EntityConsumed {
            id: entity.id,
            kind: entity.kind,
            cell,
        });

        if entity.kind != EntityKind::Fruit {
            return;
        }

        self.score = self.score.saturating_add(1);
        out_events.push(Event::ScoreChanged { score: self.score });

        if self
            .rules
            .fruit_goal()
            .map_or(false, |goal| self.score >= goal)
            && self.session.finish(out_events)
        {
            info!(score = self.score, "fruit goal reached");
        }
    }

    fn is_cell_free(&self, cell: Cell) -> bool {
        !self.layout.walls().blocks(cell)
            && !self.entities.is_occupied(cell)
            && !self
                .creature
                .as_ref()
                .map_or(false, |creature| creature.contains(cell))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => world.reset_session(out_events),
        Command::Restart => {
            if world.session.accepts_restart() {
                world.reset_session(out_events);
            } else {
                debug!(state = ?world.session.state(), "restart ignored");
            }
        }
        Command::Tick { now } => world.tick(now, out_events),
        Command::ChangeDirection { direction } => world.change_direction(direction),
        Command::TogglePause => {
            if !world.session.toggle_pause(out_events) {
                debug!(state = ?world.session.state(), "pause toggle ignored");
            }
        }
        Command::CompleteLevel => {
            if !world.session.finish(out_events) {
                debug!(state = ?world.session.state(), "completion ignored");
            }
        }
        Command::AdvanceCreature => world.advance_creature(out_events),
        Command::GrowCreature => world.grow_creature(out_events),
        Command::KillCreature { cause } => world.kill_creature(cause, out_events),
        Command::SpawnCreature { cell, generation } => {
            world.spawn_creature(cell, generation, out_events)
        }
        Command::PlaceEntity { kind, cell } => world.place_entity(kind, cell, out_events),
        Command::ConsumeEntity { cell } => world.consume_entity(cell, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeSet, time::Duration};

    use hungry_worm_core::{
        Cell, EntitySnapshot, LevelLayout, LevelMarkerSet, SessionGeneration, SessionRules,
        SessionState,
    };

    use super::{CreatureBody, World};

    /// Current session state.
    #[must_use]
    pub fn session_state(world: &World) -> SessionState {
        world.session.state()
    }

    /// Generation of the running session instance.
    #[must_use]
    pub fn generation(world: &World) -> SessionGeneration {
        world.session.generation()
    }

    /// Reports whether contacts are evaluated after movement.
    #[must_use]
    pub fn contacts_enabled(world: &World) -> bool {
        world.session.contacts_enabled()
    }

    /// Simulation time at which the pending respawn fires, if one is scheduled.
    #[must_use]
    pub fn respawn_due_at(world: &World) -> Option<Duration> {
        world.session.respawn_due_at()
    }

    /// Fruit consumed during the running session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// The living creature, if one is attached.
    #[must_use]
    pub fn creature(world: &World) -> Option<&CreatureBody> {
        world.creature.as_ref()
    }

    /// Live entities ordered by identifier.
    #[must_use]
    pub fn entities(world: &World) -> Vec<EntitySnapshot> {
        let mut snapshots: Vec<EntitySnapshot> = world.entities.iter().collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Cells a new placement must avoid: creature segments and live entities.
    #[must_use]
    pub fn occupied_cells(world: &World) -> BTreeSet<Cell> {
        let mut occupied: BTreeSet<Cell> = world.entities.iter().map(|entity| entity.cell).collect();
        if let Some(creature) = world.creature.as_ref() {
            occupied.extend(creature.segments());
        }
        occupied
    }

    /// Simulation time, which excludes time spent paused.
    #[must_use]
    pub fn simulation_time(world: &World) -> Duration {
        world.clock.now
    }

    /// Level layout the world was created with.
    #[must_use]
    pub fn layout(world: &World) -> &LevelLayout {
        &world.layout
    }

    /// Marker sets of the level.
    #[must_use]
    pub fn markers(world: &World) -> &LevelMarkerSet {
        world.layout.markers()
    }

    /// Timing and completion rules of the level.
    #[must_use]
    pub fn rules(world: &World) -> SessionRules {
        world.rules
    }
}

/// Clock that follows driver time except while frozen.
#[derive(Clone, Copy, Debug, Default)]
struct SimulationClock {
    driver_time: Duration,
    now: Duration,
}

impl SimulationClock {
    /// Records the driver time and returns the simulated delta, or `None` when
    /// frozen. Time that passes while frozen is never replayed.
    fn observe(&mut self, driver_time: Duration, frozen: bool) -> Option<Duration> {
        let dt = driver_time.saturating_sub(self.driver_time);
        self.driver_time = self.driver_time.max(driver_time);
        if frozen {
            return None;
        }

        self.now = self.now.saturating_add(dt);
        Some(dt)
    }
}
