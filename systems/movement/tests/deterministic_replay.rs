use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use dark_snake_core::{Command, Event, GridCell, Heading, PlayerId, Players};
use dark_snake_system_movement::Movement;
use dark_snake_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|record| matches!(record, EventRecord::SnakeStepped { .. })),
        "script never moved a snake"
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut movement = Movement::default();
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        record_events(&events, &mut log);
        process_movement(&mut world, &mut movement, &events, &mut log);
    }

    let snakes = query::player_snapshots(&world)
        .into_iter()
        .map(|snapshot| SnakeState {
            player: snapshot.id,
            cells: snapshot.cells,
            heading: snapshot.heading,
        })
        .collect();

    ReplayOutcome { snakes, events: log }
}

fn process_movement(
    world: &mut World,
    movement: &mut Movement,
    events: &[Event],
    log: &mut Vec<EventRecord>,
) {
    let mut commands = Vec::new();
    movement.handle(
        events,
        query::mode(world),
        query::effective_speed(world),
        &mut commands,
    );
    for command in commands {
        let mut generated = Vec::new();
        world::apply(world, command, &mut generated);
        record_events(&generated, log);
    }
}

fn record_events(events: &[Event], log: &mut Vec<EventRecord>) {
    log.extend(events.iter().filter_map(EventRecord::from_event));
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![Command::StartGame {
        players: Players::Two,
        seed: 0x0dd5_eed5,
    }];
    let turns = [
        (PlayerId::One, Heading::Down),
        (PlayerId::Two, Heading::Up),
        (PlayerId::One, Heading::Left),
        (PlayerId::Two, Heading::Right),
    ];
    for (frame, (player, heading)) in (0..120).zip(turns.iter().cycle()) {
        if frame % 15 == 0 {
            commands.push(Command::SteerSnake {
                player: *player,
                heading: *heading,
            });
        }
        commands.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
    }
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    snakes: Vec<SnakeState>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SnakeState {
    player: PlayerId,
    cells: Vec<GridCell>,
    heading: Heading,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { now_micros: u128 },
    SnakeStepped { player: PlayerId, head: GridCell, length: usize },
    ItemCollected { player: PlayerId },
}

impl EventRecord {
    fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::TimeAdvanced { now, .. } => Some(Self::TimeAdvanced {
                now_micros: now.as_micros(),
            }),
            Event::SnakeStepped {
                player,
                head,
                length,
            } => Some(Self::SnakeStepped {
                player: *player,
                head: *head,
                length: *length,
            }),
            Event::ItemCollected { player, .. } => Some(Self::ItemCollected { player: *player }),
            _ => None,
        }
    }
}
