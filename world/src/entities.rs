use hungry_worm_core::{Cell, EntityId, EntityKind, EntitySnapshot};

/// Live fruit and hazard placements. Removal is destruction: a consumed or
/// cleared entity is dropped from the registry and its identifier is never
/// reused within the world.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityRegistry {
    live: Vec<EntitySnapshot>,
    next_id: u32,
}

impl EntityRegistry {
    pub(crate) fn place(&mut self, kind: EntityKind, cell: Cell) -> EntitySnapshot {
        let entity = EntitySnapshot {
            id: EntityId::new(self.next_id),
            kind,
            cell,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.live.push(entity);
        entity
    }

    pub(crate) fn at(&self, cell: Cell) -> Option<EntitySnapshot> {
        self.live.iter().copied().find(|entity| entity.cell == cell)
    }

    pub(crate) fn is_occupied(&self, cell: Cell) -> bool {
        self.at(cell).is_some()
    }

    pub(crate) fn consume(&mut self, cell: Cell) -> Option<EntitySnapshot> {
        let index = self.live.iter().position(|entity| entity.cell == cell)?;
        Some(self.live.remove(index))
    }

    pub(crate) fn clear(&mut self) -> Vec<EntitySnapshot> {
        std::mem::take(&mut self.live)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = EntitySnapshot> + '_ {
        self.live.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_not_reused_after_consumption() {
        let mut registry = EntityRegistry::default();
        let first = registry.place(EntityKind::Fruit, Cell::new(1, 1));
        let consumed = registry.consume(Cell::new(1, 1)).expect("fruit present");
        assert_eq!(consumed, first);

        let second = registry.place(EntityKind::Fruit, Cell::new(1, 1));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn clear_drains_every_entity() {
        let mut registry = EntityRegistry::default();
        let _ = registry.place(EntityKind::Fruit, Cell::new(1, 1));
        let _ = registry.place(EntityKind::Hazard, Cell::new(2, 1));

        let cleared = registry.clear();

        assert_eq!(cleared.len(), 2);
        assert_eq!(registry.iter().count(), 0);
        assert!(!registry.is_occupied(Cell::new(2, 1)));
    }
}
