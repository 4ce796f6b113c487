use std::collections::BTreeSet;

use hungry_worm_core::{
    Cell, Command, EntityKind, Event, LevelLayout, LevelMarkerSet, SessionGeneration, SessionRules,
    WallGeometry,
};
use hungry_worm_system_spawning::Spawning;
use hungry_worm_world::{self as world, query, World};

fn cells(values: &[(i32, i32)]) -> BTreeSet<Cell> {
    values
        .iter()
        .map(|(column, row)| Cell::new(*column, *row))
        .collect()
}

fn level() -> World {
    let markers = LevelMarkerSet::new(
        cells(&[(1, 1), (8, 1), (1, 8)]),
        cells(&[(4, 4), (5, 5), (6, 6)]),
        cells(&[(2, 6), (7, 2)]),
    )
    .expect("disjoint markers");
    let walls = WallGeometry::new(10, 10, BTreeSet::new());
    World::new(LevelLayout::new(markers, walls), SessionRules::default())
}

fn start(world: &mut World, spawning: &mut Spawning) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::StartSession, &mut events);

    let mut commands = Vec::new();
    spawning.handle(
        &events,
        query::markers(world),
        &query::occupied_cells(world),
        &mut commands,
    );
    commands
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn session_start_spawns_creature_before_entities() {
    let mut world = level();
    let mut spawning = Spawning::new(0x5eed);

    let commands = start(&mut world, &mut spawning);

    assert_eq!(commands.len(), 3);
    let Command::SpawnCreature { cell, generation } = commands[0].clone() else {
        panic!("first command must spawn the creature: {commands:?}");
    };
    assert!(cells(&[(1, 1), (8, 1), (1, 8)]).contains(&cell));
    assert_eq!(generation, query::generation(&world));
    assert!(matches!(
        commands[1],
        Command::PlaceEntity {
            kind: EntityKind::Fruit,
            ..
        }
    ));
    assert!(matches!(
        commands[2],
        Command::PlaceEntity {
            kind: EntityKind::Hazard,
            ..
        }
    ));

    let events = apply_all(&mut world, commands);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EntityPlacementRejected { .. })));
    assert_eq!(query::entities(&world).len(), 2);
    assert!(query::creature(&world).is_some());
}

#[test]
fn eaten_fruit_is_replaced_away_from_occupied_cells() {
    let mut world = level();
    let mut spawning = Spawning::new(42);
    let commands = start(&mut world, &mut spawning);
    let _ = apply_all(&mut world, commands);

    for _ in 0..20 {
        let fruit = query::entities(&world)
            .into_iter()
            .find(|entity| entity.kind == EntityKind::Fruit)
            .expect("a fruit is always live");

        let events = apply_all(
            &mut world,
            vec![Command::ConsumeEntity { cell: fruit.cell }],
        );
        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::markers(&world),
            &query::occupied_cells(&world),
            &mut commands,
        );

        assert_eq!(commands.len(), 1);
        let Command::PlaceEntity {
            kind: EntityKind::Fruit,
            cell,
        } = commands[0].clone()
        else {
            panic!("expected a fruit placement: {commands:?}");
        };
        assert!(!query::occupied_cells(&world).contains(&cell));

        let _ = apply_all(&mut world, commands);
    }

    assert_eq!(query::score(&world), 20);
}

#[test]
fn consumed_hazard_is_not_replaced() {
    let mut world = level();
    let mut spawning = Spawning::new(42);
    let commands = start(&mut world, &mut spawning);
    let _ = apply_all(&mut world, commands);
    let hazard = query::entities(&world)
        .into_iter()
        .find(|entity| entity.kind == EntityKind::Hazard)
        .expect("hazard placed at start");

    let events = apply_all(
        &mut world,
        vec![Command::ConsumeEntity { cell: hazard.cell }],
    );
    let mut commands = Vec::new();
    spawning.handle(
        &events,
        query::markers(&world),
        &query::occupied_cells(&world),
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(query::score(&world), 0);
}

#[test]
fn blocked_spawn_points_fall_back_to_origin() {
    let markers = LevelMarkerSet::new(cells(&[(3, 3)]), cells(&[(4, 4)]), BTreeSet::new())
        .expect("disjoint markers");
    let mut spawning = Spawning::new(3);
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::RespawnDue {
            generation: SessionGeneration::new(2),
        }],
        &markers,
        &cells(&[(3, 3)]),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::SpawnCreature {
            cell: Cell::ORIGIN,
            generation: SessionGeneration::new(2),
        }]
    );
}

#[test]
fn same_seed_reproduces_the_same_placements() {
    let run = |seed| {
        let mut world = level();
        let mut spawning = Spawning::new(seed);
        start(&mut world, &mut spawning)
    };

    assert_eq!(run(0xfeed), run(0xfeed));
}
