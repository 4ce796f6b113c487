#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision system that maps head contacts to gameplay commands.

use hungry_worm_core::{Cell, Command, ContactEvent, ContactTag, DeathCause, Event};
use tracing::debug;

/// Outcome of resolving a single contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The contact has no gameplay consequence.
    None,
    /// The creature eats the fruit on the cell and grows.
    Consume {
        /// Cell holding the fruit.
        cell: Cell,
    },
    /// The creature dies.
    Fatal {
        /// Category of the fatal contact.
        cause: DeathCause,
        /// Cell of an entity destroyed by the contact, if any.
        consumed: Option<Cell>,
    },
}

/// Stateless table mapping contact tag pairs to effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Resolves `contact` regardless of the order of its tags.
    #[must_use]
    pub fn resolve(&self, contact: &ContactEvent) -> Effect {
        use ContactTag::{CreatureBody, CreatureHead, Fruit, Hazard, Wall};

        let cell = contact.cell();
        if contact.is_between(CreatureHead, Fruit) {
            Effect::Consume { cell }
        } else if contact.is_between(CreatureHead, Hazard) {
            Effect::Fatal {
                cause: DeathCause::Hazard,
                consumed: Some(cell),
            }
        } else if contact.is_between(CreatureHead, CreatureBody) {
            Effect::Fatal {
                cause: DeathCause::SelfCollision,
                consumed: None,
            }
        } else if contact.is_between(CreatureHead, Wall) {
            Effect::Fatal {
                cause: DeathCause::Wall,
                consumed: None,
            }
        } else {
            Effect::None
        }
    }
}

/// Pure system that reacts to contact events and emits the resulting commands.
#[derive(Debug, Default)]
pub struct Collision {
    resolver: CollisionResolver,
}

impl Collision {
    /// Consumes world events and emits consume, growth and kill commands.
    ///
    /// At most one [`Command::KillCreature`] is emitted per call, for the first
    /// fatal contact in the batch. Contacts that follow a fatal one are ignored.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for contact in events.iter().filter_map(|event| match event {
            Event::ContactDetected { contact } => Some(contact),
            _ => None,
        }) {
            match self.resolver.resolve(contact) {
                Effect::None => {
                    debug!(tags = ?contact.tags(), "contact without effect");
                }
                Effect::Consume { cell } => {
                    out.push(Command::ConsumeEntity { cell });
                    out.push(Command::GrowCreature);
                }
                Effect::Fatal { cause, consumed } => {
                    if let Some(cell) = consumed {
                        out.push(Command::ConsumeEntity { cell });
                    }
                    out.push(Command::KillCreature { cause });
                    return;
                }
            }
        }
    }
}
