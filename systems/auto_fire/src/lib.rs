#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims and queues player auto-fire volleys.
//!
//! Each ready player fires one primary shot at the nearest enemy that has left
//! its spawn grace window, or straight ahead when no such enemy exists. Every
//! extra shot granted by multi-shot adds a companion with a small random spread.

use dark_snake_core::{Command, EnemyId, EnemyView, FieldPoint, GameMode, PlayerSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const COMPANION_SPREAD: f32 = 0.3;

/// Configuration parameters required to construct the auto-fire system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spread seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Auto-fire system that reuses its candidate buffer between frames.
#[derive(Debug)]
pub struct AutoFire {
    rng: ChaCha8Rng,
    candidates: Vec<Candidate>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: EnemyId,
    center: FieldPoint,
}

impl AutoFire {
    /// Creates a new auto-fire system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            candidates: Vec::new(),
        }
    }

    /// Emits a [`Command::FireVolley`] for every player whose shot is ready.
    ///
    /// `speed_factor` scales every direction, which the world turns into the
    /// projectile's velocity.
    pub fn handle(
        &mut self,
        mode: GameMode,
        players: &[PlayerSnapshot],
        enemies: &EnemyView,
        speed_factor: f32,
        out: &mut Vec<Command>,
    ) {
        if !mode.is_active() {
            return;
        }

        self.candidates.clear();
        self.candidates.extend(
            enemies
                .iter()
                .filter(|enemy| !enemy.in_grace)
                .map(|enemy| Candidate {
                    id: enemy.id,
                    center: enemy.footprint.center(),
                }),
        );

        for player in players {
            if !player.auto_fire || !player.shot_ready {
                continue;
            }
            let Some(head) = player.head() else {
                continue;
            };
            let from = head.center();
            let primary = self
                .nearest(from)
                .and_then(|target| from.toward(target).normalized())
                .unwrap_or_else(|| player.heading.vector());

            let mut directions = Vec::with_capacity(player.extra_shots as usize + 1);
            directions.push(primary.scaled(speed_factor));
            for _ in 0..player.extra_shots {
                let spread = self.rng.gen_range(-COMPANION_SPREAD..=COMPANION_SPREAD);
                directions.push(primary.rotated(spread).scaled(speed_factor));
            }
            out.push(Command::FireVolley {
                player: player.id,
                directions,
            });
        }
    }

    fn nearest(&self, from: FieldPoint) -> Option<FieldPoint> {
        let mut best: Option<(f32, EnemyId, FieldPoint)> = None;
        for candidate in &self.candidates {
            let distance = from.distance_squared(candidate.center);
            let closer = match best {
                None => true,
                Some((current, id, _)) => {
                    distance < current || (distance == current && candidate.id < id)
                }
            };
            if closer {
                best = Some((distance, candidate.id, candidate.center));
            }
        }
        best.map(|(_, _, center)| center)
    }
}

