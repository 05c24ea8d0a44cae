//! Item pickups: one deterministic effect per item kind, applied once.

use std::time::Duration;

use dark_snake_core::{
    EffectKind, EnemyKind, Event, GridCell, ItemId, ItemKind, ItemSnapshot, PlayerId, MAX_SPEED,
    MAX_EXTRA_SHOTS,
};
use rand::Rng;
use tracing::info;

use crate::{
    encounter,
    hostiles::Hostile,
    progress::{dice_reward, DiceExperience},
    World,
};

const INVINCIBILITY_WINDOW: Duration = Duration::from_secs(10);
const LENGTH_EFFECT_WINDOW: Duration = Duration::from_secs(8);
const MULTI_SHOT_WINDOW: Duration = Duration::from_secs(30);
const SPECIAL_DAMAGE_COOLDOWN: Duration = Duration::from_secs(30);
const SPECIAL_DAMAGE_PER_LEVEL: f32 = 5.0;
const SPECIAL_DAMAGE_SCORE: u32 = 100;
const LEVEL_SPEED_STEP: f32 = 0.5;
const SHOOTING_ENEMY_CHANCE: f64 = 0.25;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Item {
    pub(crate) id: ItemId,
    pub(crate) cell: GridCell,
    pub(crate) kind: ItemKind,
}

impl Item {
    pub(crate) fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            cell: self.cell,
            kind: self.kind,
        }
    }
}

/// Applies a picked-up item. The caller has already removed it from the field.
pub(crate) fn collect(world: &mut World, player: PlayerId, item: Item, out_events: &mut Vec<Event>) {
    out_events.push(Event::ItemCollected {
        player,
        item: item.id,
        kind: item.kind,
    });
    apply_effect(world, player, item.kind, out_events);
    check_level_up(world, out_events);
}

/// Runs the effect of `kind` for `player` without touching the item list.
pub(crate) fn apply_effect(
    world: &mut World,
    player: PlayerId,
    kind: ItemKind,
    out_events: &mut Vec<Event>,
) {
    match kind {
        ItemKind::Food => {
            world.award(10, 10);
            world.drop_item(Some(ItemKind::Food), out_events);
        }
        ItemKind::SpeedUp => {
            world.award(15, 15);
            world.stack_speed_effect(EffectKind::SpeedBoost, out_events);
        }
        ItemKind::SpeedDown => {
            world.award(15, 15);
            world.stack_speed_effect(EffectKind::SpeedReduction, out_events);
        }
        ItemKind::ScoreBoost => world.award(50, 20),
        ItemKind::Invincibility => {
            world.award(25, 25);
            arm_personal(world, player, EffectKind::Invincibility, INVINCIBILITY_WINDOW, out_events);
        }
        ItemKind::LootBox => {
            world.award(20, 20);
            let eligible = |kind: ItemKind| kind != ItemKind::LootBox;
            let roll = world.rng.gen_range(0..ItemKind::total_weight(eligible));
            if let Some(reward) = ItemKind::weighted_pick(roll, eligible) {
                out_events.push(Event::LootBoxOpened { player, reward });
                apply_effect(world, player, reward, out_events);
            }
        }
        ItemKind::LengthShortener => {
            world.award(30, 15);
            if let Some(target) = world.roster.get_mut(player) {
                target.length_floor = Some((target.snake.len() / 2).max(1));
            }
            arm_personal(world, player, EffectKind::LengthShortener, LENGTH_EFFECT_WINDOW, out_events);
        }
        ItemKind::LengthDoubler => {
            world.award(30, 15);
            if let Some(target) = world.roster.get_mut(player) {
                target.length_target = Some(target.snake.len() * 2);
            }
            arm_personal(world, player, EffectKind::LengthDoubler, LENGTH_EFFECT_WINDOW, out_events);
        }
        ItemKind::Dice => {
            let roll = world.rng.gen_range(1_u8..=20);
            roll_dice(world, roll, out_events);
        }
        ItemKind::SpecialDamage => special_damage(world, out_events),
        ItemKind::MultiShot => {
            world.award(40, 20);
            let shots = match world.roster.get_mut(player) {
                Some(target) => {
                    target.extra_shots = (target.extra_shots + 1).min(MAX_EXTRA_SHOTS);
                    target.extra_shots
                }
                None => return,
            };
            arm_personal(world, player, EffectKind::MultiShot, MULTI_SHOT_WINDOW, out_events);
            world.announce(format!("Multi-shot x{}", shots + 1), out_events);
        }
        ItemKind::EnemyPack => {
            let count = world.rng.gen_range(1..=3);
            for _ in 0..count {
                let kind = if world.rng.gen_bool(SHOOTING_ENEMY_CHANCE) {
                    EnemyKind::Bolbu
                } else {
                    EnemyKind::Normal
                };
                if let Some(cell) = world.free_cell() {
                    world.place_enemy(cell, kind, out_events);
                }
            }
        }
    }
}

fn arm_personal(
    world: &mut World,
    player: PlayerId,
    kind: EffectKind,
    duration: Duration,
    out_events: &mut Vec<Event>,
) {
    let now = world.now;
    if let Some(target) = world.roster.get_mut(player) {
        target.effects.arm(kind, now, duration);
        out_events.push(Event::EffectArmed {
            kind,
            player: Some(player),
            duration,
        });
    }
}

fn special_damage(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.now;
    if now < world.special_ready_at {
        return;
    }
    let amount = SPECIAL_DAMAGE_PER_LEVEL * world.progress.level as f32;
    let Some(boss) = world.boss.as_mut() else {
        return;
    };
    let landed = boss.take_damage(amount, now);
    if landed <= 0.0 {
        return;
    }
    let (id, remaining, defeated) = (boss.id, boss.health(), boss.is_defeated());
    out_events.push(Event::BossDamaged {
        boss: id,
        amount: landed,
        remaining,
    });
    world.special_ready_at = now.saturating_add(SPECIAL_DAMAGE_COOLDOWN);
    world.award(SPECIAL_DAMAGE_SCORE, 0);
    if defeated {
        encounter::defeat_boss(world, out_events);
    }
}

/// Pays out a dice item for `roll` and announces its tier.
pub(crate) fn roll_dice(world: &mut World, roll: u8, out_events: &mut Vec<Event>) {
    let reward = dice_reward(roll);
    world.award(reward.score, 0);
    match reward.experience {
        DiceExperience::Add(experience) => world.award(0, experience),
        DiceExperience::FillToThreshold => world.progress.fill_experience(),
    }
    world.show_dice(roll);
    out_events.push(Event::DiceRolled {
        roll,
        score: reward.score,
    });
    world.announce(reward.achievement, out_events);
}

/// Levels up once if accumulated experience reached the threshold.
pub(crate) fn check_level_up(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.progress.level_up_due() {
        return;
    }
    let level = world.progress.level_up();
    world.speed = (world.speed + LEVEL_SPEED_STEP).min(MAX_SPEED);
    info!(level, speed = world.speed, "level up");
    out_events.push(Event::LevelUp {
        level,
        next_threshold: world.progress.threshold,
    });
    world.announce(format!("Level {level}!"), out_events);
    encounter::force_boss_fight(world, out_events);
}

#[cfg(test)]
mod tests {
    use dark_snake_core::{BossKind, Command, GameMode, Players};

    use super::*;
    use crate::apply;

    fn started() -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                players: Players::Single,
                seed: 42,
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn multi_shot_stacks_up_to_the_cap() {
        let (mut world, mut events) = started();
        for _ in 0..3 {
            apply_effect(&mut world, PlayerId::One, ItemKind::MultiShot, &mut events);
        }
        let player = world.roster.get(PlayerId::One).map(|p| p.extra_shots);
        assert_eq!(player, Some(3));

        for _ in 0..10 {
            apply_effect(&mut world, PlayerId::One, ItemKind::MultiShot, &mut events);
        }
        let player = world.roster.get(PlayerId::One).map(|p| p.extra_shots);
        assert_eq!(player, Some(MAX_EXTRA_SHOTS));
    }

    #[test]
    fn loot_box_never_rewards_another_loot_box() {
        let (mut world, _) = started();
        for _ in 0..200 {
            let mut events = Vec::new();
            apply_effect(&mut world, PlayerId::One, ItemKind::LootBox, &mut events);
            let rewards: Vec<_> = events
                .iter()
                .filter_map(|event| match event {
                    Event::LootBoxOpened { reward, .. } => Some(*reward),
                    _ => None,
                })
                .collect();
            assert_eq!(rewards.len(), 1);
            assert_ne!(rewards[0], ItemKind::LootBox);
        }
    }

    #[test]
    fn level_up_raises_speed_and_starts_a_boss_fight() {
        let (mut world, _) = started();
        let speed_before = world.speed;
        world.progress.experience = 100;
        let mut events = Vec::new();
        check_level_up(&mut world, &mut events);

        assert_eq!(world.progress.level, 2);
        assert_eq!(world.progress.threshold, 150);
        assert_eq!(world.progress.score, 100);
        assert!((world.speed - speed_before - LEVEL_SPEED_STEP).abs() < f32::EPSILON);
        assert!(world.boss.is_some());
        assert_eq!(world.mode, GameMode::BossFight);
        assert!(events.iter().any(|event| matches!(event, Event::LevelUp { level: 2, .. })));
    }

    #[test]
    fn level_up_during_a_boss_fight_brings_a_boss_of_the_new_level() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        assert!(encounter::start_boss_fight(&mut world, &mut events));
        let first = world.boss.as_ref().map(|boss| boss.id);

        world.progress.experience = world.progress.threshold;
        events.clear();
        check_level_up(&mut world, &mut events);

        let spawned: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::BossSpawned { boss, kind, .. } => Some((*boss, *kind)),
                _ => None,
            })
            .collect();
        assert_eq!(spawned.len(), 1);
        assert_ne!(Some(spawned[0].0), first);
        assert_eq!(spawned[0].1, BossKind::for_level(2));
        assert_eq!(world.boss.as_ref().map(|boss| boss.id), Some(spawned[0].0));
        assert_eq!(world.mode, GameMode::BossFight);
    }

    #[test]
    fn mid_tier_dice_pays_and_announces_its_tier() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        let score = world.progress.score;
        roll_dice(&mut world, 12, &mut events);

        assert_eq!(world.progress.score, score + 36);
        assert_eq!(world.progress.experience, 12);
        assert!(events.contains(&Event::DiceRolled { roll: 12, score: 36 }));
        assert!(events.contains(&Event::Achievement {
            text: "Success!".to_string()
        }));
    }

    #[test]
    fn natural_twenty_sets_experience_to_the_threshold() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        world.progress.experience = 400;
        roll_dice(&mut world, 20, &mut events);
        assert_eq!(world.progress.experience, world.progress.threshold);
        assert!(events.contains(&Event::Achievement {
            text: "Critical success!".to_string()
        }));
    }

    #[test]
    fn special_damage_respects_grace_and_cooldown() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        assert!(encounter::start_boss_fight(&mut world, &mut events));
        let full = world.boss.as_ref().map(|boss| boss.health());

        special_damage(&mut world, &mut events);
        assert_eq!(world.boss.as_ref().map(|boss| boss.health()), full);

        world.now = Duration::from_secs(4);
        special_damage(&mut world, &mut events);
        let hit = world.boss.as_ref().map(|boss| boss.health());
        assert_eq!(hit, full.map(|health| health - SPECIAL_DAMAGE_PER_LEVEL));

        world.now = Duration::from_secs(10);
        special_damage(&mut world, &mut events);
        assert_eq!(world.boss.as_ref().map(|boss| boss.health()), hit);
    }

    #[test]
    fn enemy_pack_releases_between_one_and_three_enemies() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        apply_effect(&mut world, PlayerId::One, ItemKind::EnemyPack, &mut events);
        assert!((1..=3).contains(&world.enemies.len()));
        assert!(world
            .enemies
            .iter()
            .all(|enemy| enemy.in_grace(world.now)));
    }
}
