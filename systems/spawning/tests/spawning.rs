use std::time::Duration;

use dark_snake_core::{
    Command, Event, GameMode, GridCell, Players, SpawnView, ZoneKind, REFERENCE_FRAME,
};
use dark_snake_system_spawning::{Config, Spawning};
use dark_snake_world::{self as world, query, World};

fn view(columns: u32, rows: u32) -> SpawnView {
    SpawnView {
        mode: GameMode::Playing,
        columns,
        rows,
        difficulty: 1.0,
        enemy_spawn_rate: 1.0,
        enemies: 0,
        items: 0,
        roaming_zones: 0,
        portal_open: false,
        portal_ready: false,
        portal_armed: false,
        boss_due: false,
        boss_loot: false,
        occupied: Vec::new(),
    }
}

fn tick(dt: Duration) -> [Event; 1] {
    [Event::TimeAdvanced { dt, now: dt }]
}

fn long_frame() -> [Event; 1] {
    tick(Duration::from_secs(3_600))
}

fn spawned_cells(commands: &[Command]) -> Vec<GridCell> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { cell, .. }
            | Command::SpawnItem { cell, .. }
            | Command::SpawnPortal { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect()
}

#[test]
fn inactive_modes_spawn_nothing() {
    let mut spawning = Spawning::new(Config::new(7));
    for mode in [
        GameMode::Intro,
        GameMode::Paused { during_boss: false },
        GameMode::GameOver {
            awaiting_name: false,
        },
    ] {
        let mut commands = Vec::new();
        let view = SpawnView {
            mode,
            boss_due: true,
            portal_armed: true,
            ..view(37, 27)
        };
        spawning.handle(&long_frame(), &view, &mut commands);
        assert!(commands.is_empty(), "{mode:?} spawned {commands:?}");
    }
}

#[test]
fn long_frames_saturate_every_category() {
    let mut spawning = Spawning::new(Config::new(11));
    let mut commands = Vec::new();
    let view = SpawnView {
        portal_ready: true,
        boss_due: true,
        ..view(37, 27)
    };

    spawning.handle(&long_frame(), &view, &mut commands);

    assert_eq!(commands.first(), Some(&Command::StartBossFight));
    assert!(commands
        .iter()
        .any(|command| matches!(command, Command::SpawnEnemy { .. })));
    assert!(commands
        .iter()
        .any(|command| matches!(command, Command::SpawnItem { .. })));
    assert!(commands
        .iter()
        .any(|command| matches!(command, Command::SpawnPortal { .. })));
    assert!(commands.iter().any(|command| matches!(
        command,
        Command::SpawnZone {
            kind: ZoneKind::Damage | ZoneKind::Heal | ZoneKind::Slow | ZoneKind::Aura,
            ..
        }
    )));

    let mut cells = spawned_cells(&commands);
    let count = cells.len();
    cells.sort_unstable();
    cells.dedup();
    assert_eq!(cells.len(), count, "two spawns claimed the same cell");
}

#[test]
fn population_caps_hold() {
    let mut spawning = Spawning::new(Config::new(3));
    let view = SpawnView {
        enemies: 12,
        items: 5,
        roaming_zones: 3,
        portal_open: true,
        portal_ready: true,
        ..view(37, 27)
    };
    for _ in 0..10 {
        let mut commands = Vec::new();
        spawning.handle(&long_frame(), &view, &mut commands);
        assert!(commands.is_empty(), "spawned past a cap: {commands:?}");
    }
}

#[test]
fn earned_portal_opens_without_a_draw() {
    let mut spawning = Spawning::new(Config::new(5));
    let view = SpawnView {
        portal_armed: true,
        ..view(37, 27)
    };
    let mut commands = Vec::new();
    spawning.handle(&tick(REFERENCE_FRAME), &view, &mut commands);
    assert!(commands
        .iter()
        .any(|command| matches!(command, Command::SpawnPortal { .. })));
}

#[test]
fn crowded_field_still_finds_the_last_free_cell() {
    let mut spawning = Spawning::new(Config::new(21));
    let free = GridCell::new(5, 6);
    let occupied: Vec<GridCell> = (0..8)
        .flat_map(|row| (0..8).map(move |column| GridCell::new(column, row)))
        .filter(|cell| *cell != free)
        .collect();
    let view = SpawnView {
        occupied,
        ..view(8, 8)
    };

    let mut commands = Vec::new();
    spawning.handle(&long_frame(), &view, &mut commands);

    let cells = spawned_cells(&commands);
    assert_eq!(cells, vec![free], "only one spawn fits: {commands:?}");
}

#[test]
fn same_seed_same_commands() {
    let view = SpawnView {
        portal_ready: true,
        ..view(37, 27)
    };
    let run = || {
        let mut spawning = Spawning::new(Config::new(0xfeed));
        let mut commands = Vec::new();
        for _ in 0..5_000 {
            spawning.handle(&tick(REFERENCE_FRAME), &view, &mut commands);
        }
        commands
    };
    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

#[test]
fn world_accepts_spawns_away_from_the_snake() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartGame {
            players: Players::Single,
            seed: 99,
        },
        &mut events,
    );
    let mut spawning = Spawning::new(Config::new(99));

    for _ in 0..20 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        spawning.handle(&events, &query::spawn_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    let snake: Vec<GridCell> = query::player_snapshots(&world)
        .into_iter()
        .flat_map(|snapshot| snapshot.cells)
        .collect();
    let items = query::items(&world);
    assert!(items.len() > 1, "expected the spawner to add items");
    assert!(items.len() <= 6);
    assert!(items.iter().all(|item| !snake.contains(&item.cell)));
}
