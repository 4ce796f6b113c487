use hungry_worm_core::{ContactEvent, ContactTag, WallGeometry};

use crate::{creature::CreatureBody, entities::EntityRegistry};

/// Collects every contact involving the creature's head cell.
///
/// Contacts are reported entity first, then body, then wall, matching the
/// order in which their effects are resolved.
pub(crate) fn detect_head_contacts(
    creature: &CreatureBody,
    entities: &EntityRegistry,
    walls: &WallGeometry,
    out: &mut Vec<ContactEvent>,
) {
    let head = creature.head();

    if let Some(entity) = entities.at(head) {
        out.push(ContactEvent::new(
            ContactTag::CreatureHead,
            entity.kind.contact_tag(),
            head,
        ));
    }

    if creature.body_contains(head) {
        out.push(ContactEvent::new(
            ContactTag::CreatureHead,
            ContactTag::CreatureBody,
            head,
        ));
    }

    if walls.blocks(head) {
        out.push(ContactEvent::new(ContactTag::CreatureHead, ContactTag::Wall, head));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use hungry_worm_core::{Cell, Direction, EntityKind};

    use super::*;

    fn open_walls() -> WallGeometry {
        WallGeometry::new(8, 8, BTreeSet::new())
    }

    #[test]
    fn head_on_fruit_reports_fruit_contact() {
        let mut entities = EntityRegistry::default();
        let _ = entities.place(EntityKind::Fruit, Cell::new(3, 3));
        let creature = CreatureBody::new(Cell::new(3, 3));
        let mut contacts = Vec::new();

        detect_head_contacts(&creature, &entities, &open_walls(), &mut contacts);

        assert_eq!(
            contacts,
            vec![ContactEvent::new(
                ContactTag::CreatureHead,
                ContactTag::Fruit,
                Cell::new(3, 3)
            )]
        );
    }

    #[test]
    fn leaving_the_grid_counts_as_wall() {
        let mut creature = CreatureBody::new(Cell::new(7, 0));
        assert!(creature.change_direction(Direction::Right));
        let _ = creature.advance();
        let mut contacts = Vec::new();

        detect_head_contacts(&creature, &EntityRegistry::default(), &open_walls(), &mut contacts);

        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].is_between(ContactTag::CreatureHead, ContactTag::Wall));
    }

    #[test]
    fn turning_into_own_body_reports_self_contact() {
        let mut creature = CreatureBody::new(Cell::new(2, 2));
        for direction in [Direction::Right, Direction::Down, Direction::Left] {
            assert!(creature.change_direction(direction));
            let _ = creature.grow();
            let _ = creature.advance();
        }
        assert!(creature.change_direction(Direction::Up));
        let _ = creature.grow();
        let _ = creature.advance();
        let mut contacts = Vec::new();

        detect_head_contacts(&creature, &EntityRegistry::default(), &open_walls(), &mut contacts);

        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].is_between(ContactTag::CreatureHead, ContactTag::CreatureBody));
    }
}
