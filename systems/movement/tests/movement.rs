use std::{collections::BTreeSet, time::Duration};

use hungry_worm_core::{
    Cell, Command, Direction, Event, LevelLayout, LevelMarkerSet, SessionRules, WallGeometry,
};
use hungry_worm_system_movement::Movement;
use hungry_worm_world::{self as world, query, World};

fn world_with_creature_at(cell: Cell) -> (World, Vec<Event>) {
    let markers = LevelMarkerSet::new(
        BTreeSet::from([cell]),
        BTreeSet::from([Cell::new(0, 0)]),
        BTreeSet::new(),
    )
    .expect("disjoint markers");
    let walls = WallGeometry::new(20, 20, BTreeSet::new());
    let mut world = World::new(LevelLayout::new(markers, walls), SessionRules::default());

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    let generation = query::generation(&world);
    world::apply(
        &mut world,
        Command::SpawnCreature { cell, generation },
        &mut events,
    );
    (world, events)
}

fn tick(world: &mut World, movement: &mut Movement, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            now: Duration::from_millis(millis),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    movement.handle(
        &events,
        query::session_state(world),
        query::rules(world).time_per_move(),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn segments(world: &World) -> Vec<Cell> {
    query::creature(world)
        .expect("creature alive")
        .segments()
        .collect()
}

#[test]
fn heading_right_steps_once_per_interval() {
    let (mut world, spawn_events) = world_with_creature_at(Cell::new(5, 5));
    let mut movement = Movement::default();
    let mut commands = Vec::new();
    movement.handle(
        &spawn_events,
        query::session_state(&world),
        query::rules(&world).time_per_move(),
        &mut commands,
    );
    assert!(commands.is_empty());

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ChangeDirection {
            direction: Direction::Right,
        },
        &mut events,
    );
    assert!(events.is_empty());

    let events = tick(&mut world, &mut movement, 600);

    assert!(events.contains(&Event::CreatureAdvanced {
        head: Cell::new(6, 5),
        vacated: Some(Cell::new(5, 5)),
    }));
    assert_eq!(segments(&world), vec![Cell::new(6, 5)]);
}

#[test]
fn ticks_inside_the_interval_leave_the_body_unchanged() {
    let (mut world, _) = world_with_creature_at(Cell::new(5, 5));
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ChangeDirection {
            direction: Direction::Down,
        },
        &mut events,
    );

    for millis in [100, 200, 350, 599] {
        let events = tick(&mut world, &mut movement, millis);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::CreatureAdvanced { .. })));
        assert_eq!(segments(&world), vec![Cell::new(5, 5)]);
    }
}

#[test]
fn paused_session_does_not_move() {
    let (mut world, _) = world_with_creature_at(Cell::new(5, 5));
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ChangeDirection {
            direction: Direction::Left,
        },
        &mut events,
    );
    world::apply(&mut world, Command::TogglePause, &mut events);

    let _ = tick(&mut world, &mut movement, 3_000);
    assert_eq!(segments(&world), vec![Cell::new(5, 5)]);

    world::apply(&mut world, Command::TogglePause, &mut events);
    let _ = tick(&mut world, &mut movement, 3_500);
    assert_eq!(segments(&world), vec![Cell::new(5, 5)]);

    let _ = tick(&mut world, &mut movement, 3_600);
    assert_eq!(segments(&world), vec![Cell::new(4, 5)]);
}
