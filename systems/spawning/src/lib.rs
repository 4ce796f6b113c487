#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for placing the creature, fruit
//! and hazards on their marker cells.

use std::collections::BTreeSet;

use hungry_worm_core::{Cell, Command, EntityKind, Event, LevelMarkerSet, SessionGeneration};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Seeded uniform selection of a free cell from a candidate set.
#[derive(Clone, Debug)]
pub struct SpawnSelector {
    rng: ChaCha8Rng,
}

impl SpawnSelector {
    /// Creates a selector whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws a cell from `candidates` that is not contained in `occupied`.
    ///
    /// Returns `None` when every candidate is occupied.
    pub fn select(
        &mut self,
        candidates: &BTreeSet<Cell>,
        occupied: &BTreeSet<Cell>,
    ) -> Option<Cell> {
        let eligible: Vec<Cell> = candidates
            .iter()
            .copied()
            .filter(|cell| !occupied.contains(cell))
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let index = self.rng.gen_range(0..eligible.len());
        Some(eligible[index])
    }
}

/// Placement policy for one entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySpawner {
    kind: EntityKind,
    replace_on_consume: bool,
}

impl EntitySpawner {
    /// Fruit is replaced as soon as it is eaten.
    #[must_use]
    pub const fn fruit() -> Self {
        Self {
            kind: EntityKind::Fruit,
            replace_on_consume: true,
        }
    }

    /// Hazards are placed once per session and never replaced.
    #[must_use]
    pub const fn hazard() -> Self {
        Self {
            kind: EntityKind::Hazard,
            replace_on_consume: false,
        }
    }

    /// Kind of entity managed by the policy.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Places the single entity a fresh session starts with.
    pub fn place_initial(
        &self,
        selector: &mut SpawnSelector,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) {
        if !self.place(selector, markers, planned, out) {
            warn!(
                kind = ?self.kind,
                candidates = markers.points_for(self.kind).len(),
                "no free marker cell, placement skipped"
            );
        }
    }

    /// Reacts to the consumption of an entity of `consumed` kind.
    ///
    /// Returns `true` when a replacement is owed but no marker cell is free
    /// yet.
    #[must_use]
    pub fn on_consumed(
        &self,
        consumed: EntityKind,
        selector: &mut SpawnSelector,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) -> bool {
        if consumed != self.kind || !self.replace_on_consume {
            return false;
        }
        if self.place(selector, markers, planned, out) {
            return false;
        }
        warn!(kind = ?self.kind, "no free marker cell, replacement deferred");
        true
    }

    /// Attempts an owed replacement again. Returns `true` once it is placed.
    pub fn retry(
        &self,
        selector: &mut SpawnSelector,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) -> bool {
        self.place(selector, markers, planned, out)
    }

    fn place(
        &self,
        selector: &mut SpawnSelector,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) -> bool {
        let Some(cell) = selector.select(markers.points_for(self.kind), planned) else {
            return false;
        };

        let _ = planned.insert(cell);
        debug!(kind = ?self.kind, ?cell, "entity placement planned");
        out.push(Command::PlaceEntity {
            kind: self.kind,
            cell,
        });
        true
    }
}

/// Pure system that emits creature and entity spawn commands in response to
/// session lifecycle events.
#[derive(Debug)]
pub struct Spawning {
    selector: SpawnSelector,
    spawners: [EntitySpawner; 2],
    deferred: Vec<EntityKind>,
}

impl Spawning {
    /// Creates the spawning system with a deterministic selection seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            selector: SpawnSelector::new(seed),
            spawners: [EntitySpawner::fruit(), EntitySpawner::hazard()],
            deferred: Vec::new(),
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// `occupied` holds the creature segments and live entities. Cells planned
    /// while handling this batch are excluded from later selections in the
    /// same batch. Replacements that found no free cell are retried whenever
    /// time passes or the creature moves, until the next session starts.
    pub fn handle(
        &mut self,
        events: &[Event],
        markers: &LevelMarkerSet,
        occupied: &BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) {
        let mut planned = occupied.clone();

        for event in events {
            match event {
                Event::SessionStarted { generation } => {
                    self.deferred.clear();
                    self.spawn_creature(*generation, markers, &mut planned, out);
                    for spawner in self.spawners {
                        spawner.place_initial(&mut self.selector, markers, &mut planned, out);
                    }
                }
                Event::RespawnDue { generation } => {
                    self.spawn_creature(*generation, markers, &mut planned, out);
                }
                Event::EntityConsumed { kind, .. } => {
                    for spawner in self.spawners {
                        if spawner.on_consumed(
                            *kind,
                            &mut self.selector,
                            markers,
                            &mut planned,
                            out,
                        ) {
                            self.deferred.push(spawner.kind());
                        }
                    }
                }
                Event::TimeAdvanced { .. } | Event::CreatureAdvanced { .. } => {
                    self.retry_deferred(markers, &mut planned, out);
                }
                _ => {}
            }
        }
    }

    fn retry_deferred(
        &mut self,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) {
        if self.deferred.is_empty() {
            return;
        }

        let Self {
            selector,
            spawners,
            deferred,
        } = self;
        deferred.retain(|kind| {
            !spawners
                .iter()
                .filter(|spawner| spawner.kind() == *kind)
                .any(|spawner| spawner.retry(selector, markers, planned, out))
        });
    }

    fn spawn_creature(
        &mut self,
        generation: SessionGeneration,
        markers: &LevelMarkerSet,
        planned: &mut BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) {
        let cell = self
            .selector
            .select(markers.spawn_points(), planned)
            .unwrap_or_else(|| {
                warn!(
                    generation = generation.get(),
                    "no free spawn point, creature placed at the origin"
                );
                Cell::ORIGIN
            });

        let _ = planned.insert(cell);
        debug!(?cell, generation = generation.get(), "creature spawn planned");
        out.push(Command::SpawnCreature { cell, generation });
    }
}
