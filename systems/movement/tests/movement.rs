use std::time::Duration;

use dark_snake_core::{Command, Event, GameMode, GridCell, Heading, PlayerId, Players};
use dark_snake_system_movement::Movement;
use dark_snake_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(25);

fn started(players: Players) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame { players, seed: 17 }, &mut events);
    world
}

/// Ticks the world once and applies whatever the movement system asks for.
fn frame(world: &mut World, movement: &mut Movement) -> usize {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        query::mode(world),
        query::effective_speed(world),
        &mut commands,
    );
    let steps = commands.len();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    steps
}

fn head(world: &World, player: PlayerId) -> Option<GridCell> {
    query::player_snapshots(world)
        .into_iter()
        .find(|snapshot| snapshot.id == player)
        .and_then(|snapshot| snapshot.head())
}

#[test]
fn default_speed_steps_eight_times_per_second() {
    let mut world = started(Players::Single);
    let mut movement = Movement::default();

    let steps: usize = (0..40).map(|_| frame(&mut world, &mut movement)).sum();

    assert_eq!(steps, 8);
    assert_eq!(head(&world, PlayerId::One), Some(GridCell::new(26, 13)));
}

#[test]
fn no_steps_while_paused_or_on_the_title_screen() {
    let mut world = World::new();
    let mut movement = Movement::default();
    for _ in 0..20 {
        assert_eq!(frame(&mut world, &mut movement), 0);
    }

    let mut world = started(Players::Single);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Pause, &mut events);
    assert_eq!(query::mode(&world), GameMode::Paused { during_boss: false });
    for _ in 0..20 {
        assert_eq!(frame(&mut world, &mut movement), 0);
    }
}

#[test]
fn reverse_request_is_ignored_and_the_snake_keeps_going() {
    let mut world = started(Players::Single);
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SteerSnake {
            player: PlayerId::One,
            heading: Heading::Left,
        },
        &mut events,
    );

    let steps: usize = (0..5).map(|_| frame(&mut world, &mut movement)).sum();

    assert_eq!(steps, 1);
    assert_eq!(head(&world, PlayerId::One), Some(GridCell::new(19, 13)));
}

#[test]
fn snake_wraps_across_the_field_edge() {
    let mut world = started(Players::Single);
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SteerSnake {
            player: PlayerId::One,
            heading: Heading::Up,
        },
        &mut events,
    );

    let steps: usize = (0..70).map(|_| frame(&mut world, &mut movement)).sum();

    assert_eq!(steps, 14);
    assert_eq!(head(&world, PlayerId::One), Some(GridCell::new(18, 26)));
}

#[test]
fn every_snake_steps_on_the_same_tick() {
    let mut world = started(Players::Two);
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(125),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    movement.handle(
        &events,
        query::mode(&world),
        query::effective_speed(&world),
        &mut commands,
    );
    assert_eq!(commands, vec![Command::StepSnakes]);

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    let stepped: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::SnakeStepped { player, .. } => Some(*player),
            _ => None,
        })
        .collect();
    assert_eq!(stepped, vec![PlayerId::One, PlayerId::Two]);
}
