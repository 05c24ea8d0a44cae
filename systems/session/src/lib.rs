#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame pipeline that drives the world and the pure systems.
//!
//! A frame translates the collected intents into commands, then, while the
//! game is running, advances the clock and runs the systems in a fixed order:
//! spawner, auto-fire, entity update, collision resolution, movement and the
//! effect sweep. Every event the world emits is appended to the caller's
//! buffer in the order it happened.

use std::time::Duration;

use dark_snake_core::{AdminCommand, Command, Event, GameMode, Heading, PlayerId};
use dark_snake_system_auto_fire::{self as auto_fire, AutoFire};
use dark_snake_system_movement::Movement;
use dark_snake_system_spawning::{self as spawning, Spawning};
use dark_snake_world::{self as world, query, World};
use tracing::{debug, trace};

const AUTO_FIRE_SALT: u64 = 0xa17f_17e5_0000_0001;

/// Player input gathered since the previous frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameIntents {
    /// Heading requests in arrival order; the last one per player wins.
    pub steer: Vec<(PlayerId, Heading)>,
    /// Players that pressed the manual fire key.
    pub fire_special: Vec<PlayerId>,
    /// Flips between running and paused.
    pub toggle_pause: bool,
    /// Debug commands to run this frame.
    pub admin: Vec<AdminCommand>,
}

impl FrameIntents {
    /// Returns whether no input was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steer.is_empty()
            && self.fire_special.is_empty()
            && !self.toggle_pause
            && self.admin.is_empty()
    }
}

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the systems with `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Owns the world and the systems that act on it.
#[derive(Debug)]
pub struct Session {
    world: World,
    movement: Movement,
    spawning: Spawning,
    auto_fire: AutoFire,
    frames: u64,
    scratch: Vec<Command>,
}

impl Session {
    /// Creates a session on the title screen.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            world: World::new(),
            movement: Movement::default(),
            spawning: Spawning::new(spawning::Config::new(config.seed)),
            auto_fire: AutoFire::new(auto_fire::Config::new(config.seed ^ AUTO_FIRE_SALT)),
            frames: 0,
            scratch: Vec::new(),
        }
    }

    /// Read access to the world for queries and snapshots.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of frames that advanced simulated time.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Applies a command outside the frame pipeline.
    ///
    /// Starting a game reseeds every system from the game seed so a run is
    /// reproducible from its seed and its inputs alone.
    pub fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        if let Command::StartGame { seed, .. } = command {
            self.movement = Movement::default();
            self.spawning = Spawning::new(spawning::Config::new(seed));
            self.auto_fire = AutoFire::new(auto_fire::Config::new(seed ^ AUTO_FIRE_SALT));
            self.frames = 0;
        }
        world::apply(&mut self.world, command, out_events);
    }

    /// Runs one frame of `dt` simulated time.
    pub fn frame(&mut self, dt: Duration, intents: &FrameIntents, out_events: &mut Vec<Event>) {
        self.apply_intents(intents, out_events);

        if !query::mode(&self.world).is_active() {
            return;
        }
        self.frames += 1;
        trace!(frame = self.frames, ?dt, "frame");

        let start = out_events.len();
        world::apply(&mut self.world, Command::Tick { dt }, out_events);
        let tick_events = out_events[start..].to_vec();

        self.spawning.handle(
            &tick_events,
            &query::spawn_view(&self.world),
            &mut self.scratch,
        );
        self.flush(out_events);

        self.auto_fire.handle(
            query::mode(&self.world),
            &query::player_snapshots(&self.world),
            &query::enemy_view(&self.world),
            query::rules(&self.world).projectile_speed_factor,
            &mut self.scratch,
        );
        self.flush(out_events);

        world::apply(&mut self.world, Command::AdvanceEntities, out_events);
        world::apply(&mut self.world, Command::ResolveCollisions, out_events);

        self.movement.handle(
            &tick_events,
            query::mode(&self.world),
            query::effective_speed(&self.world),
            &mut self.scratch,
        );
        self.flush(out_events);

        world::apply(&mut self.world, Command::SweepEffects, out_events);
    }

    fn apply_intents(&mut self, intents: &FrameIntents, out_events: &mut Vec<Event>) {
        if intents.toggle_pause {
            let command = match query::mode(&self.world) {
                GameMode::Paused { .. } => Command::Resume,
                _ => Command::Pause,
            };
            self.scratch.push(command);
        }
        self.scratch.extend(
            intents
                .steer
                .iter()
                .map(|&(player, heading)| Command::SteerSnake { player, heading }),
        );
        self.scratch.extend(
            intents
                .fire_special
                .iter()
                .map(|&player| Command::FireSpecial { player }),
        );
        for admin in &intents.admin {
            debug!(?admin, "admin intent");
            self.scratch.push(Command::Admin(*admin));
        }
        self.flush(out_events);
    }

    fn flush(&mut self, out_events: &mut Vec<Event>) {
        for command in self.scratch.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}
