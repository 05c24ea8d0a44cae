//! Boss encounter lifecycle: spawning, defeat rewards and the respawn timer.

use std::time::Duration;

use dark_snake_core::{BossId, BossKind, CellRect, EffectKind, Event, GameMode, GridCell, ItemKind};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    hostiles::{boss_side, Boss, Hostile},
    World,
};

const PLACEMENT_ATTEMPTS: usize = 20;
const REARM_DELAY: Duration = Duration::from_secs(60);
const REARM_JITTER_SECS: u64 = 30;
const BOSS_LOOT_WINDOW: Duration = Duration::from_secs(10);
const BOSS_KILL_SCORE_PER_LEVEL: u32 = 100;

/// Spawns a boss sized for the current level unless one is already on the field.
///
/// Returns whether a boss was spawned.
pub(crate) fn start_boss_fight(world: &mut World, out_events: &mut Vec<Event>) -> bool {
    if world.boss.is_some() || !world.mode.is_active() {
        return false;
    }
    spawn_boss(world, out_events);
    true
}

/// Replaces any boss on the field with a fresh one sized for the current level.
pub(crate) fn force_boss_fight(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.mode.is_active() {
        return;
    }
    if let Some(previous) = world.boss.take() {
        debug!(boss = ?previous.id, "boss replaced on level-up");
    }
    spawn_boss(world, out_events);
}

fn spawn_boss(world: &mut World, out_events: &mut Vec<Event>) {
    let level = world.progress.level;
    let kind = BossKind::for_level(level);
    let origin = choose_origin(world, boss_side(kind, level));
    let id = BossId::new(world.allocate_id());
    let boss = Boss::spawn(
        id,
        kind,
        level,
        world.rules.boss_health_multiplier,
        origin,
        world.now,
    );
    info!(?kind, level, health = boss.health(), "boss spawned");
    out_events.push(Event::BossSpawned {
        boss: id,
        kind: boss.kind(),
        footprint: boss.footprint(),
        health: boss.health(),
    });
    world.boss = Some(boss);
    world.set_mode(GameMode::BossFight, out_events);
    world.announce("Boss incoming!", out_events);
    world.drop_item(Some(ItemKind::MultiShot), out_events);
}

/// Picks an origin whose footprint keeps clear of every head.
fn choose_origin(world: &mut World, side: u32) -> GridCell {
    let max_column = world.rules.columns.saturating_sub(side);
    let max_row = world.rules.rows.saturating_sub(side);
    let mut origin = GridCell::new(0, 0);
    for _ in 0..PLACEMENT_ATTEMPTS {
        origin = GridCell::new(
            world.rng.gen_range(0..=max_column),
            world.rng.gen_range(0..=max_row),
        );
        let footprint = CellRect::square(origin, side);
        let clear = world
            .roster
            .iter()
            .all(|player| !footprint.contains_cell(player.snake.head()));
        if clear {
            break;
        }
    }
    origin
}

/// Removes the defeated boss, pays out and re-arms the boss timer.
pub(crate) fn defeat_boss(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(boss) = world.boss.take() else {
        return;
    };
    let level = world.progress.level;
    world.award(BOSS_KILL_SCORE_PER_LEVEL.saturating_mul(level), 0);
    let jitter = Duration::from_secs(world.rng.gen_range(0..=REARM_JITTER_SECS));
    world.next_boss_at = world.now.saturating_add(REARM_DELAY).saturating_add(jitter);
    info!(level, next_boss_in = ?(REARM_DELAY + jitter), "boss defeated");

    out_events.push(Event::BossDefeated {
        boss: boss.id,
        level,
    });
    if world.mode == GameMode::BossFight {
        world.set_mode(GameMode::Playing, out_events);
    }
    world.arm_global(EffectKind::BossLoot, BOSS_LOOT_WINDOW, out_events);
    world.announce("Boss defeated!", out_events);
}

#[cfg(test)]
mod tests {
    use dark_snake_core::{Command, Players};

    use super::*;
    use crate::apply;

    fn started(seed: u64) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                players: Players::Two,
                seed,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn only_one_boss_at_a_time() {
        let mut world = started(9);
        let mut events = Vec::new();
        assert!(start_boss_fight(&mut world, &mut events));
        assert!(!start_boss_fight(&mut world, &mut events));
        assert_eq!(world.mode, GameMode::BossFight);
        assert!(world.items.iter().any(|item| item.kind == ItemKind::MultiShot));
    }

    #[test]
    fn forced_fight_replaces_the_boss_with_one_of_the_current_level() {
        let mut world = started(9);
        let mut events = Vec::new();
        assert!(start_boss_fight(&mut world, &mut events));
        let first = world.boss.as_ref().map(|boss| boss.id);

        world.progress.level = 4;
        events.clear();
        force_boss_fight(&mut world, &mut events);

        let second = world.boss.as_ref().map(|boss| (boss.id, boss.kind()));
        assert!(second.is_some_and(|(id, _)| Some(id) != first));
        assert_eq!(second.map(|(_, kind)| kind), Some(BossKind::for_level(4)));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::BossSpawned { .. })));
        assert_eq!(world.mode, GameMode::BossFight);
    }

    #[test]
    fn boss_avoids_spawning_on_a_head() {
        for seed in 0..20 {
            let mut world = started(seed);
            let mut events = Vec::new();
            assert!(start_boss_fight(&mut world, &mut events));
            let footprint = world.boss.as_ref().map(|boss| boss.footprint());
            let heads: Vec<_> = world.roster.iter().map(|p| p.snake.head()).collect();
            assert!(footprint
                .is_some_and(|rect| heads.iter().all(|head| !rect.contains_cell(*head))));
        }
    }

    #[test]
    fn defeat_rewards_and_rearms_timer() {
        let mut world = started(9);
        let mut events = Vec::new();
        assert!(start_boss_fight(&mut world, &mut events));
        world.now = Duration::from_secs(100);
        let score = world.progress.score;

        defeat_boss(&mut world, &mut events);

        assert!(world.boss.is_none());
        assert_eq!(world.mode, GameMode::Playing);
        assert_eq!(world.progress.score, score + 100);
        assert!(world.next_boss_at >= Duration::from_secs(160));
        assert!(world.next_boss_at <= Duration::from_secs(190));
        assert!(world.effects.is_active(EffectKind::BossLoot, world.now));
    }
}
