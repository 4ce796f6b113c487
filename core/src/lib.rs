#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hungry Worm simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cadence between creature steps when a level does not override it.
pub const DEFAULT_TIME_PER_MOVE: Duration = Duration::from_millis(600);

/// Default delay between a fatal contact and the automatic respawn.
pub const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_secs(2);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Tears down any running session and starts a fresh one unconditionally.
    StartSession,
    /// Requests a restart from one of the overlay states.
    Restart,
    /// Reports the driver's current frame time.
    Tick {
        /// Monotonic time supplied by the external driver.
        now: Duration,
    },
    /// Buffers a new heading for the creature.
    ChangeDirection {
        /// Heading requested by the input layer.
        direction: Direction,
    },
    /// Toggles between the active and paused states.
    TogglePause,
    /// Signals that the level was completed by an external condition.
    CompleteLevel,
    /// Moves the creature one cell along its heading.
    AdvanceCreature,
    /// Queues one segment of growth for the creature.
    GrowCreature,
    /// Kills the creature following a fatal contact.
    KillCreature {
        /// Contact category that caused the death.
        cause: DeathCause,
    },
    /// Creates a fresh creature for the session identified by `generation`.
    SpawnCreature {
        /// Cell the new creature's head occupies.
        cell: Cell,
        /// Session generation the spawn was planned for.
        generation: SessionGeneration,
    },
    /// Places a fruit or hazard on the provided cell.
    PlaceEntity {
        /// Kind of entity to place.
        kind: EntityKind,
        /// Cell the entity should occupy.
        cell: Cell,
    },
    /// Consumes the live entity occupying the provided cell.
    ConsumeEntity {
        /// Cell holding the entity to consume.
        cell: Cell,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulation time after the advance. Excludes time spent paused.
        now: Duration,
        /// Simulation time that elapsed during the tick.
        dt: Duration,
    },
    /// Acknowledges that a fresh session instance started.
    SessionStarted {
        /// Generation assigned to the new session instance.
        generation: SessionGeneration,
    },
    /// Announces a session state transition.
    SessionStateChanged {
        /// State that was current before the transition.
        from: SessionState,
        /// State that is current after the transition.
        to: SessionState,
    },
    /// Requests that the presentation layer display an overlay.
    OverlayShown {
        /// Overlay to display.
        overlay: OverlayKind,
    },
    /// Requests that the presentation layer dismiss an overlay.
    OverlayHidden {
        /// Overlay to dismiss.
        overlay: OverlayKind,
    },
    /// Confirms that a creature was created.
    CreatureSpawned {
        /// Cell occupied by the new creature's head.
        cell: Cell,
    },
    /// Confirms that the creature moved one cell.
    CreatureAdvanced {
        /// Cell the head occupies after the move.
        head: Cell,
        /// Tail cell released by the move, absent when the creature grew.
        vacated: Option<Cell>,
    },
    /// Reports that growth was queued for the creature.
    CreatureGrowthQueued {
        /// Number of segments still waiting to be realised.
        pending: u32,
    },
    /// Reports that the creature died.
    CreatureKilled {
        /// Contact category that caused the death.
        cause: DeathCause,
    },
    /// Requests that the presentation layer detach the creature node.
    CreatureDetached,
    /// Reports a contact between two occupants of the same cell.
    ContactDetected {
        /// Contact that was detected.
        contact: ContactEvent,
    },
    /// Confirms that an entity was placed.
    EntityPlaced {
        /// Identifier allocated to the entity.
        id: EntityId,
        /// Kind of the placed entity.
        kind: EntityKind,
        /// Cell occupied by the entity.
        cell: Cell,
    },
    /// Reports that an entity placement was rejected because the cell was taken.
    EntityPlacementRejected {
        /// Kind of entity requested.
        kind: EntityKind,
        /// Cell requested for the placement.
        cell: Cell,
    },
    /// Confirms that an entity was consumed by the creature.
    EntityConsumed {
        /// Identifier of the consumed entity.
        id: EntityId,
        /// Kind of the consumed entity.
        kind: EntityKind,
        /// Cell the entity occupied.
        cell: Cell,
    },
    /// Confirms that an entity was removed during a session reset.
    EntityCleared {
        /// Identifier of the removed entity.
        id: EntityId,
        /// Kind of the removed entity.
        kind: EntityKind,
        /// Cell the entity occupied.
        cell: Cell,
    },
    /// Reports the updated score.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Reports that a respawn was scheduled.
    RespawnScheduled {
        /// Simulation time at which the respawn becomes due.
        due: Duration,
        /// Session generation the respawn belongs to.
        generation: SessionGeneration,
    },
    /// Reports that a scheduled respawn became due.
    RespawnDue {
        /// Session generation the respawn belongs to.
        generation: SessionGeneration,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Rows grow downward, so [`Direction::Up`] decreases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    column: i32,
    row: i32,
}

impl Cell {
    /// Grid origin, used as the last-resort creature spawn location.
    pub const ORIGIN: Cell = Cell::new(0, 0);

    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the neighbouring cell one step along `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (column_delta, row_delta) = direction.delta();
        Self {
            column: self.column.saturating_add(column_delta),
            row: self.row.saturating_add(row_delta),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Cardinal headings available to the creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Column and row offsets applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether `other` is the exact reverse of this heading.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Kinds of entities placed on the grid by spawners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Consumable that grows the creature and scores a point.
    Fruit,
    /// Time bomb that kills the creature on contact.
    Hazard,
}

impl EntityKind {
    /// Contact category reported when the creature touches this kind.
    #[must_use]
    pub const fn contact_tag(self) -> ContactTag {
        match self {
            Self::Fruit => ContactTag::Fruit,
            Self::Hazard => ContactTag::Hazard,
        }
    }
}

/// Unique identifier assigned to a spawned entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Counter identifying a session instance.
///
/// Every start or restart allocates a new generation; deferred work tagged
/// with an older generation is discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    /// Creates a generation wrapper around the provided value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Categories of occupants that can meet in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactTag {
    /// Leading segment of the creature.
    CreatureHead,
    /// Any trailing segment of the creature.
    CreatureBody,
    /// A live fruit.
    Fruit,
    /// A live hazard.
    Hazard,
    /// Wall tile or the outside of the grid.
    Wall,
}

/// Contact between two occupants of the same cell.
///
/// The pair is unordered: `(a, b)` and `(b, a)` describe the same contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContactEvent {
    first: ContactTag,
    second: ContactTag,
    cell: Cell,
}

impl ContactEvent {
    /// Creates a contact between two occupants of `cell`.
    #[must_use]
    pub const fn new(first: ContactTag, second: ContactTag, cell: Cell) -> Self {
        Self {
            first,
            second,
            cell,
        }
    }

    /// Tags of the two occupants in the order they were reported.
    #[must_use]
    pub const fn tags(&self) -> (ContactTag, ContactTag) {
        (self.first, self.second)
    }

    /// Cell in which the contact happened.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Reports whether the contact is between `a` and `b`, in either order.
    #[must_use]
    pub fn is_between(&self, a: ContactTag, b: ContactTag) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// Contact category responsible for a creature death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The head touched a hazard.
    Hazard,
    /// The head ran into the creature's own body.
    SelfCollision,
    /// The head ran into a wall or left the grid.
    Wall,
}

/// Session states governed by the session controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The simulation is running.
    Active,
    /// The simulation clock is frozen by the player.
    Paused,
    /// The creature died and a respawn is pending.
    Death,
    /// The level finished; collision detection is disabled for good.
    Results,
}

impl SessionState {
    /// Overlay shown while this state is current, if any.
    #[must_use]
    pub const fn overlay(self) -> Option<OverlayKind> {
        match self {
            Self::Active => None,
            Self::Paused => Some(OverlayKind::Pause),
            Self::Death => Some(OverlayKind::Death),
            Self::Results => Some(OverlayKind::Results),
        }
    }
}

/// Overlays that the presentation layer draws above the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Pause menu.
    Pause,
    /// Death notice shown until the respawn.
    Death,
    /// End-of-level results.
    Results,
}

/// Reasons a [`LevelMarkerSet`] cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MarkerSetError {
    /// The same cell was tagged with more than one marker role.
    #[error("cell {cell:?} carries more than one marker")]
    Overlap {
        /// Cell that appears in more than one set.
        cell: Cell,
    },
}

/// Spawn, fruit and hazard coordinates derived from a level's marker layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarkerSetParts")]
pub struct LevelMarkerSet {
    spawn_points: BTreeSet<Cell>,
    fruit_points: BTreeSet<Cell>,
    hazard_points: BTreeSet<Cell>,
}

impl LevelMarkerSet {
    /// Creates a marker set, rejecting cells that belong to more than one role.
    pub fn new(
        spawn_points: BTreeSet<Cell>,
        fruit_points: BTreeSet<Cell>,
        hazard_points: BTreeSet<Cell>,
    ) -> Result<Self, MarkerSetError> {
        let overlap = spawn_points
            .intersection(&fruit_points)
            .chain(spawn_points.intersection(&hazard_points))
            .chain(fruit_points.intersection(&hazard_points))
            .min()
            .copied();
        if let Some(cell) = overlap {
            return Err(MarkerSetError::Overlap { cell });
        }

        Ok(Self {
            spawn_points,
            fruit_points,
            hazard_points,
        })
    }

    /// Cells where the creature may be created.
    #[must_use]
    pub fn spawn_points(&self) -> &BTreeSet<Cell> {
        &self.spawn_points
    }

    /// Cells where fruit may be placed.
    #[must_use]
    pub fn fruit_points(&self) -> &BTreeSet<Cell> {
        &self.fruit_points
    }

    /// Cells where hazards may be placed.
    #[must_use]
    pub fn hazard_points(&self) -> &BTreeSet<Cell> {
        &self.hazard_points
    }

    /// Candidate cells for the provided entity kind.
    #[must_use]
    pub fn points_for(&self, kind: EntityKind) -> &BTreeSet<Cell> {
        match kind {
            EntityKind::Fruit => &self.fruit_points,
            EntityKind::Hazard => &self.hazard_points,
        }
    }
}

#[derive(Deserialize)]
struct MarkerSetParts {
    spawn_points: BTreeSet<Cell>,
    fruit_points: BTreeSet<Cell>,
    hazard_points: BTreeSet<Cell>,
}

impl TryFrom<MarkerSetParts> for LevelMarkerSet {
    type Error = MarkerSetError;

    fn try_from(parts: MarkerSetParts) -> Result<Self, Self::Error> {
        Self::new(parts.spawn_points, parts.fruit_points, parts.hazard_points)
    }
}

/// Wall tiles and grid bounds of a level.
///
/// Renderers own how walls look; the simulation only needs to know which
/// cells a creature cannot enter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallGeometry {
    columns: u32,
    rows: u32,
    cells: BTreeSet<Cell>,
}

impl WallGeometry {
    /// Creates wall geometry for a grid of the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32, cells: BTreeSet<Cell>) -> Self {
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Number of columns in the level grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the level grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cells occupied by wall tiles.
    #[must_use]
    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        u32::try_from(cell.column()).map_or(false, |column| column < self.columns)
            && u32::try_from(cell.row()).map_or(false, |row| row < self.rows)
    }

    /// Reports whether the creature would hit a wall by entering the cell.
    #[must_use]
    pub fn blocks(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.cells.contains(&cell)
    }
}

/// Static level data consumed by the simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    markers: LevelMarkerSet,
    walls: WallGeometry,
}

impl LevelLayout {
    /// Bundles marker sets and walls into a layout.
    #[must_use]
    pub fn new(markers: LevelMarkerSet, walls: WallGeometry) -> Self {
        Self { markers, walls }
    }

    /// Marker sets of the level.
    #[must_use]
    pub fn markers(&self) -> &LevelMarkerSet {
        &self.markers
    }

    /// Wall geometry of the level.
    #[must_use]
    pub fn walls(&self) -> &WallGeometry {
        &self.walls
    }
}

/// Per-level timing and completion rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionRules {
    time_per_move: Duration,
    respawn_delay: Duration,
    fruit_goal: Option<u32>,
}

impl SessionRules {
    /// Creates rules using the provided cadence, respawn delay and goal.
    #[must_use]
    pub const fn new(time_per_move: Duration, respawn_delay: Duration, fruit_goal: Option<u32>) -> Self {
        Self {
            time_per_move,
            respawn_delay,
            fruit_goal,
        }
    }

    /// Minimum simulated time between two creature steps.
    #[must_use]
    pub const fn time_per_move(&self) -> Duration {
        self.time_per_move
    }

    /// Delay between a death and the automatic respawn.
    #[must_use]
    pub const fn respawn_delay(&self) -> Duration {
        self.respawn_delay
    }

    /// Score at which the level completes, if the level has a goal.
    #[must_use]
    pub const fn fruit_goal(&self) -> Option<u32> {
        self.fruit_goal
    }
}

impl Default for SessionRules {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_PER_MOVE, DEFAULT_RESPAWN_DELAY, None)
    }
}

/// Immutable representation of a live entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntitySnapshot {
    /// Identifier allocated to the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Cell occupied by the entity.
    pub cell: Cell,
}

#[cfg(test)]
mod tests {
    use super::{
        Cell, ContactEvent, ContactTag, Direction, LevelMarkerSet, MarkerSetError, WallGeometry,
    };
    use std::collections::BTreeSet;

    fn cells(values: &[(i32, i32)]) -> BTreeSet<Cell> {
        values
            .iter()
            .map(|(column, row)| Cell::new(*column, *row))
            .collect()
    }

    #[test]
    fn step_follows_screen_axes() {
        let origin = Cell::new(5, 5);
        assert_eq!(origin.step(Direction::Right), Cell::new(6, 5));
        assert_eq!(origin.step(Direction::Left), Cell::new(4, 5));
        assert_eq!(origin.step(Direction::Up), Cell::new(5, 4));
        assert_eq!(origin.step(Direction::Down), Cell::new(5, 6));
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert!(direction.is_opposite(direction.opposite()));
            assert!(!direction.is_opposite(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn contact_pairs_are_unordered() {
        let contact = ContactEvent::new(ContactTag::Fruit, ContactTag::CreatureHead, Cell::ORIGIN);
        assert!(contact.is_between(ContactTag::CreatureHead, ContactTag::Fruit));
        assert!(contact.is_between(ContactTag::Fruit, ContactTag::CreatureHead));
        assert!(!contact.is_between(ContactTag::CreatureHead, ContactTag::Hazard));
    }

    #[test]
    fn marker_set_rejects_overlapping_roles() {
        let result = LevelMarkerSet::new(
            cells(&[(1, 1), (2, 2)]),
            cells(&[(2, 2)]),
            cells(&[(3, 3)]),
        );
        assert_eq!(
            result,
            Err(MarkerSetError::Overlap {
                cell: Cell::new(2, 2)
            })
        );
    }

    #[test]
    fn walls_block_outside_of_grid() {
        let walls = WallGeometry::new(4, 3, cells(&[(0, 0)]));
        assert!(walls.blocks(Cell::new(0, 0)));
        assert!(walls.blocks(Cell::new(-1, 1)));
        assert!(walls.blocks(Cell::new(4, 1)));
        assert!(walls.blocks(Cell::new(1, 3)));
        assert!(!walls.blocks(Cell::new(3, 2)));
    }

    #[test]
    fn marker_set_round_trips_through_bincode() {
        let markers = LevelMarkerSet::new(cells(&[(1, 1)]), cells(&[(2, 1)]), cells(&[(3, 1)]))
            .expect("disjoint markers");
        let bytes = bincode::serialize(&markers).expect("serialize");
        let restored: LevelMarkerSet = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, markers);
    }

    #[test]
    fn overlapping_marker_set_is_rejected_on_deserialize() {
        let overlapping = (cells(&[(1, 1)]), cells(&[(1, 1)]), cells(&[(3, 1)]));
        let bytes = bincode::serialize(&overlapping).expect("serialize");

        let error = bincode::deserialize::<LevelMarkerSet>(&bytes).expect_err("overlap");

        assert!(error.to_string().contains("more than one marker"));
    }
}
