#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts shared by Hungry Worm adapters.
//!
//! The simulation never talks to a renderer directly. World events are
//! translated into [`PresentationRequest`] values that a scene graph, a
//! terminal view or a test harness can apply in order.

use glam::Vec2;
use hungry_worm_core::{
    Cell, EntityId, EntityKind, Event, OverlayKind, SessionGeneration, WallGeometry,
};
use std::{error::Error, fmt};

/// Scene node addressed by a presentation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The creature as a whole.
    Creature,
    /// A fruit or hazard.
    Entity {
        /// Identifier allocated by the world.
        id: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
    },
}

/// Instruction for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresentationRequest {
    /// Adds a node to the scene at the provided cell.
    AttachNode {
        /// Node to attach.
        node: NodeKind,
        /// Cell the node occupies.
        cell: Cell,
    },
    /// Moves the creature head, releasing the tail cell when present.
    MoveCreature {
        /// Cell now occupied by the head.
        head: Cell,
        /// Tail cell no longer occupied.
        vacated: Option<Cell>,
    },
    /// Removes a node from the scene.
    DetachNode {
        /// Node to detach.
        node: NodeKind,
    },
    /// Shows the overlay.
    ShowOverlay(OverlayKind),
    /// Hides the overlay.
    HideOverlay(OverlayKind),
    /// Updates the score display.
    Score(u32),
    /// Announces that a new session instance started.
    SessionReset {
        /// Generation of the new session instance.
        generation: SessionGeneration,
    },
}

/// Translates world events into presentation requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Presentation;

impl Presentation {
    /// Appends the requests implied by `events`, preserving event order.
    pub fn translate(&self, events: &[Event], out: &mut Vec<PresentationRequest>) {
        out.extend(events.iter().filter_map(Self::request_for));
    }

    /// World-space centre of `cell` on a grid of square tiles.
    ///
    /// Rows grow downwards, matching the cell coordinate system.
    #[must_use]
    pub fn cell_center(cell: Cell, tile_length: f32) -> Vec2 {
        (Vec2::new(cell.column() as f32, cell.row() as f32) + Vec2::splat(0.5)) * tile_length
    }

    fn request_for(event: &Event) -> Option<PresentationRequest> {
        let request = match *event {
            Event::SessionStarted { generation } => {
                PresentationRequest::SessionReset { generation }
            }
            Event::CreatureSpawned { cell } => PresentationRequest::AttachNode {
                node: NodeKind::Creature,
                cell,
            },
            Event::CreatureAdvanced { head, vacated } => {
                PresentationRequest::MoveCreature { head, vacated }
            }
            Event::CreatureDetached => PresentationRequest::DetachNode {
                node: NodeKind::Creature,
            },
            Event::EntityPlaced { id, kind, cell } => PresentationRequest::AttachNode {
                node: NodeKind::Entity { id, kind },
                cell,
            },
            Event::EntityConsumed { id, kind, .. } | Event::EntityCleared { id, kind, .. } => {
                PresentationRequest::DetachNode {
                    node: NodeKind::Entity { id, kind },
                }
            }
            Event::OverlayShown { overlay } => PresentationRequest::ShowOverlay(overlay),
            Event::OverlayHidden { overlay } => PresentationRequest::HideOverlay(overlay),
            Event::ScoreChanged { score } => PresentationRequest::Score(score),
            _ => return None,
        };
        Some(request)
    }
}

/// Describes the playfield grid in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
}

impl GridPresentation {
    /// Creates a grid descriptor matching the level's wall geometry.
    ///
    /// Returns an error when `tile_length` is not a positive finite number.
    pub fn new(walls: &WallGeometry, tile_length: f32) -> Result<Self, PresentationError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(PresentationError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns: walls.columns(),
            rows: walls.rows(),
            tile_length,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// World-space centre of `cell` on this grid.
    #[must_use]
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        Presentation::cell_center(cell, self.tile_length)
    }
}

/// Errors that can occur when constructing presentation descriptors.
#[derive(Debug, PartialEq)]
pub enum PresentationError {
    /// Tiles must have a positive side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for PresentationError {}
