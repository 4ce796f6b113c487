//! Segmented creature body with buffered turns and deferred growth.

use std::collections::VecDeque;

use hungry_worm_core::{Cell, Direction};

/// Outcome of a single [`CreatureBody::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Cell the head moved into.
    pub head: Cell,
    /// Tail cell released by the move, absent when the step realised growth.
    pub vacated: Option<Cell>,
}

/// Ordered run of occupied cells with the head at index zero.
///
/// A body is created with a single segment and no heading; it stays in place
/// until the first direction is buffered. Killing a body is one-way, a respawn
/// always creates a fresh instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatureBody {
    segments: VecDeque<Cell>,
    heading: Option<Direction>,
    pending_heading: Option<Direction>,
    pending_growth: u32,
    alive: bool,
}

impl CreatureBody {
    /// Creates a single-segment body at the provided cell.
    #[must_use]
    pub fn new(at: Cell) -> Self {
        Self {
            segments: VecDeque::from([at]),
            heading: None,
            pending_heading: None,
            pending_growth: 0,
            alive: true,
        }
    }

    /// Cell occupied by the head segment.
    #[must_use]
    pub fn head(&self) -> Cell {
        // Non-empty by construction: `advance` pushes before it pops.
        self.segments[0]
    }

    /// Segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.segments.iter().copied()
    }

    /// Number of segments currently occupied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Heading applied by the most recent step, if any.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Heading that will be applied at the start of the next step.
    #[must_use]
    pub const fn pending_heading(&self) -> Option<Direction> {
        self.pending_heading
    }

    /// Number of growth segments waiting for upcoming steps.
    #[must_use]
    pub const fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    /// Reports whether the body has not been killed.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Reports whether any segment, head included, occupies the cell.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    /// Reports whether a trailing segment (not the head) occupies the cell.
    #[must_use]
    pub fn body_contains(&self, cell: Cell) -> bool {
        self.segments.iter().skip(1).any(|segment| *segment == cell)
    }

    /// Buffers `direction` as the heading for the next step.
    ///
    /// Returns `false` without touching the buffer when the body is dead or
    /// when `direction` reverses the current heading of a multi-segment body.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if !self.alive {
            return false;
        }

        let reverses = self
            .heading
            .map_or(false, |heading| heading.is_opposite(direction));
        if reverses && self.segments.len() > 1 {
            return false;
        }

        self.pending_heading = Some(direction);
        true
    }

    /// Moves the head one cell along the heading.
    ///
    /// The buffered heading is applied first. The tail is dropped unless a
    /// growth is pending, in which case one pending growth is consumed instead.
    /// Returns `None` when the body is dead or has never been given a heading.
    pub fn advance(&mut self) -> Option<Step> {
        if !self.alive {
            return None;
        }

        if let Some(next) = self.pending_heading.take() {
            self.heading = Some(next);
        }
        let heading = self.heading?;

        let head = self.head().step(heading);
        self.segments.push_front(head);

        let vacated = if self.pending_growth > 0 {
            self.pending_growth -= 1;
            None
        } else {
            self.segments.pop_back()
        };

        Some(Step { head, vacated })
    }

    /// Queues one segment of growth, returning the number now pending.
    pub fn grow(&mut self) -> u32 {
        self.pending_growth = self.pending_growth.saturating_add(1);
        self.pending_growth
    }

    /// Marks the body dead. Returns `true` if it was alive before the call.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }
}
