#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that decides what appears on the field.
//!
//! Every category is a Bernoulli trial with a small per-reference-frame
//! probability. Frames of a different length convert that probability with
//! `1 - (1 - p)^(dt / frame)` so spawn density does not depend on frame rate.

use std::time::Duration;

use dark_snake_core::{
    Command, EnemyKind, Event, Faction, GridCell, ItemKind, PortalEvent, SpawnView, ZoneKind,
    REFERENCE_FRAME,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ENEMY_CHANCE: f64 = 0.002;
const ENEMY_CAP: usize = 12;
const SHOOTING_ENEMY_CHANCE: f64 = 0.25;
const ITEM_CHANCE: f64 = 0.005;
const BOSS_LOOT_ITEM_BONUS: f64 = 0.01;
const ITEM_CAP: usize = 5;
const PORTAL_CHANCE: f64 = 0.005;
const ZONE_CHANCE: f64 = 0.001;
const ZONE_CAP: usize = 3;
const ROAMING_ZONE_KINDS: [ZoneKind; 4] = [
    ZoneKind::Damage,
    ZoneKind::Heal,
    ZoneKind::Slow,
    ZoneKind::Aura,
];
const PLACEMENT_ATTEMPTS: usize = 100;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits spawn commands from per-frame random draws.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    claimed: Vec<GridCell>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            claimed: Vec::new(),
        }
    }

    /// Consumes events and the spawn view to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], view: &SpawnView, out: &mut Vec<Command>) {
        if !view.mode.is_active() {
            return;
        }

        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt, .. } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() {
            return;
        }
        let frames = elapsed.as_secs_f64() / REFERENCE_FRAME.as_secs_f64();
        self.claimed.clear();

        if view.boss_due {
            out.push(Command::StartBossFight);
        }

        let enemy_chance = ENEMY_CHANCE * f64::from(view.enemy_spawn_rate);
        if view.enemies < ENEMY_CAP && self.trial(enemy_chance, frames) {
            if let Some(cell) = self.free_cell(view) {
                let kind = if self.rng.gen_bool(SHOOTING_ENEMY_CHANCE) {
                    EnemyKind::Bolbu
                } else {
                    EnemyKind::Normal
                };
                out.push(Command::SpawnEnemy { cell, kind });
            }
        }

        let mut item_chance = ITEM_CHANCE * f64::from(view.difficulty);
        if view.boss_loot {
            item_chance += BOSS_LOOT_ITEM_BONUS;
        }
        if view.items < ITEM_CAP && self.trial(item_chance, frames) {
            if let Some(cell) = self.free_cell(view) {
                let kind = self.item_kind();
                out.push(Command::SpawnItem { cell, kind });
            }
        }

        if !view.portal_open
            && (view.portal_armed || (view.portal_ready && self.trial(PORTAL_CHANCE, frames)))
        {
            if let Some(cell) = self.free_cell(view) {
                let event = PortalEvent::ALL
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(PortalEvent::Teleport);
                out.push(Command::SpawnPortal { cell, event });
            }
        }

        if view.roaming_zones < ZONE_CAP && self.trial(ZONE_CHANCE, frames) {
            if let Some(cell) = self.free_cell(view) {
                let kind = ROAMING_ZONE_KINDS
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(ZoneKind::Aura);
                out.push(Command::SpawnZone {
                    center: cell.center(),
                    kind,
                    source: Faction::Environment,
                });
            }
        }
    }

    fn trial(&mut self, per_frame: f64, frames: f64) -> bool {
        self.rng.gen_bool(frame_probability(per_frame, frames))
    }

    fn item_kind(&mut self) -> ItemKind {
        let total = ItemKind::total_weight(|_| true);
        let roll = self.rng.gen_range(0..total);
        ItemKind::weighted_pick(roll, |_| true).unwrap_or(ItemKind::Food)
    }

    /// Draws cells until one is unoccupied; a full scan settles crowded fields.
    fn free_cell(&mut self, view: &SpawnView) -> Option<GridCell> {
        if view.columns == 0 || view.rows == 0 {
            return None;
        }
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = GridCell::new(
                self.rng.gen_range(0..view.columns),
                self.rng.gen_range(0..view.rows),
            );
            if self.is_free(view, cell) {
                self.claimed.push(cell);
                return Some(cell);
            }
        }

        let free: Vec<GridCell> = (0..view.rows)
            .flat_map(|row| (0..view.columns).map(move |column| GridCell::new(column, row)))
            .filter(|cell| self.is_free(view, *cell))
            .collect();
        let cell = free.choose(&mut self.rng).copied()?;
        self.claimed.push(cell);
        Some(cell)
    }

    fn is_free(&self, view: &SpawnView, cell: GridCell) -> bool {
        view.occupied.binary_search(&cell).is_err() && !self.claimed.contains(&cell)
    }
}

/// Probability of at least one success over `frames` reference frames.
#[must_use]
pub fn frame_probability(per_frame: f64, frames: f64) -> f64 {
    if !per_frame.is_finite() || !frames.is_finite() || frames <= 0.0 {
        return 0.0;
    }
    let per_frame = per_frame.clamp(0.0, 1.0);
    (1.0 - (1.0 - per_frame).powf(frames)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_compounds_over_frames() {
        assert!((frame_probability(0.5, 1.0) - 0.5).abs() < 1e-12);
        assert!((frame_probability(0.5, 2.0) - 0.75).abs() < 1e-12);
        assert_eq!(frame_probability(0.5, 0.0), 0.0);
        assert_eq!(frame_probability(2.0, 1.0), 1.0);
    }
}
