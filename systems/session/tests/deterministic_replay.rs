use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use dark_snake_core::{AdminCommand, Command, Event, Heading, PlayerId, Players};
use dark_snake_system_session::{Config, FrameIntents, Session};
use dark_snake_world::query;

const FRAME: Duration = Duration::from_micros(16_667);
const SEED: u64 = 0x5a4e_d00d;

#[test]
fn same_seed_and_inputs_replay_identically() {
    let first = replay(SEED);
    let second = replay(SEED);

    assert_eq!(first.events, second.events, "event streams diverged");
    assert_eq!(first.snapshot, second.snapshot);
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::SnakeStepped { .. })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut session = Session::new(Config::new(seed));
    let mut events = Vec::new();
    session.apply(
        Command::StartGame {
            players: Players::Two,
            seed,
        },
        &mut events,
    );

    for frame in 0..1_800_u32 {
        let intents = scripted_intents(frame);
        session.frame(FRAME, &intents, &mut events);
    }

    let snapshot = serde_json::to_string(&query::frame_snapshot(session.world()))
        .unwrap_or_default();
    ReplayOutcome { events, snapshot }
}

fn scripted_intents(frame: u32) -> FrameIntents {
    let turns = [
        (PlayerId::One, Heading::Down),
        (PlayerId::Two, Heading::Up),
        (PlayerId::One, Heading::Right),
        (PlayerId::Two, Heading::Left),
    ];
    let mut intents = FrameIntents::default();
    if frame % 40 == 0 {
        let turn = turns[(frame / 40) as usize % turns.len()];
        intents.steer.push(turn);
    }
    if frame % 90 == 45 {
        intents.fire_special.push(PlayerId::One);
    }
    match frame {
        60 => intents.admin.push(AdminCommand::GrantMultiShot {
            player: PlayerId::Two,
        }),
        600 => intents.admin.push(AdminCommand::SpawnBoss),
        900 => intents.admin.push(AdminCommand::DamageZoneAtHead {
            player: PlayerId::One,
        }),
        _ => {}
    }
    intents
}

#[derive(Debug)]
struct ReplayOutcome {
    events: Vec<Event>,
    snapshot: String,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.snapshot.hash(&mut hasher);
        self.events.len().hash(&mut hasher);
        hasher.finish()
    }
}
