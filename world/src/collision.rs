//! Collision and damage resolution.
//!
//! Runs once per frame after entities advanced. Every overlapping pair is
//! resolved to a health change, a state transition or a no-op when a grace
//! window or faction tag exempts it. Player damage is queued and applied last
//! so a respawn never interrupts the resolution of other pairs.

use std::time::Duration;

use dark_snake_core::{
    EffectKind, Event, Faction, GameMode, GridCell, PlayerId, ProjectileKind, MAX_HEALTH,
};
use tracing::{debug, info};

use crate::{encounter, hostiles::Hostile, portal, World};

const HURT_COOLDOWN: Duration = Duration::from_secs(1);
const RESPAWN_INVINCIBILITY: Duration = Duration::from_secs(3);
const ENEMY_KILL_SCORE: u32 = 20;
const PORTAL_KILL_THRESHOLD: u32 = 10;

/// Resolves every overlap on the field for the current frame.
pub(crate) fn resolve(world: &mut World, out_events: &mut Vec<Event>) {
    let mut hits = Vec::new();

    player_shots(world, out_events);
    hostile_shots(world, &mut hits, out_events);
    contact(world, &mut hits);
    zone_exposure(world, &mut hits, out_events);
    remove_defeated(world, out_events);
    enter_portal(world, out_events);

    for (player, amount) in hits {
        if !world.mode.is_active() {
            break;
        }
        damage_player(world, player, amount, out_events);
    }
}

/// Player projectiles against enemies and the boss. Hostiles in grace let shots pass.
fn player_shots(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.now;
    let World {
        projectiles,
        enemies,
        boss,
        ..
    } = world;

    projectiles.retain(|projectile| {
        if !matches!(projectile.origin, Faction::Player(_)) {
            return true;
        }
        let struck = projectile.swept_points().find_map(|point| {
            if let Some(index) = enemies
                .iter()
                .position(|enemy| !enemy.in_grace(now) && enemy.footprint().contains_point(point))
            {
                return Some(Struck::Enemy(index));
            }
            boss.as_ref()
                .filter(|boss| !boss.in_grace(now) && boss.footprint().contains_point(point))
                .map(|_| Struck::Boss)
        });

        match struck {
            Some(Struck::Enemy(index)) => {
                let _ = enemies[index].take_damage(projectile.damage_to(Faction::Enemy), now);
                false
            }
            Some(Struck::Boss) => {
                if let Some(boss) = boss.as_mut() {
                    let amount = boss.projectile_damage(projectile.damage_to(Faction::Boss));
                    let landed = boss.take_damage(amount, now);
                    out_events.push(Event::BossDamaged {
                        boss: boss.id,
                        amount: landed,
                        remaining: boss.health(),
                    });
                }
                false
            }
            None => true,
        }
    });
}

enum Struck {
    Enemy(usize),
    Boss,
}

/// Boss, flame and enemy projectiles against player heads.
///
/// A projectile striking an invincible head is consumed without dealing damage.
fn hostile_shots(world: &mut World, hits: &mut Vec<(PlayerId, f32)>, out_events: &mut Vec<Event>) {
    let now = world.now;
    let (columns, rows) = (world.rules.columns, world.rules.rows);
    let World {
        projectiles,
        roster,
        ..
    } = world;
    let roster = &*roster;

    projectiles.retain(|projectile| {
        if matches!(projectile.origin, Faction::Player(_)) {
            return true;
        }
        let struck = projectile.swept_points().find_map(|point| {
            let cell = point.cell(columns, rows)?;
            roster
                .iter()
                .find(|player| player.snake.head() == cell)
                .map(|player| (point, player))
        });
        let Some((at, target)) = struck else {
            return true;
        };

        if projectile.kind == ProjectileKind::Flame {
            out_events.push(Event::FlameExploded {
                projectile: projectile.id,
                at,
            });
        }
        if !target.is_invincible(now) {
            hits.push((target.id, projectile.damage_to(Faction::Player(target.id))));
        }
        false
    });
}

fn touching(hostile: &dyn Hostile, head: GridCell, now: Duration) -> Option<f32> {
    (!hostile.in_grace(now) && hostile.footprint().contains_cell(head))
        .then(|| hostile.contact_damage())
}

/// Heads touching a hostile footprint, at most once per hurt cooldown.
fn contact(world: &mut World, hits: &mut Vec<(PlayerId, f32)>) {
    let now = world.now;
    let World {
        roster,
        enemies,
        boss,
        ..
    } = world;

    for player in roster.iter_mut() {
        if player.is_invincible(now) || now < player.hurt_ready_at {
            continue;
        }
        let head = player.snake.head();
        let hostiles = enemies
            .iter()
            .map(|enemy| enemy as &dyn Hostile)
            .chain(boss.iter().map(|boss| boss as &dyn Hostile));
        let damage = hostiles
            .filter_map(|hostile| touching(hostile, head, now))
            .fold(0.0_f32, f32::max);
        if damage > 0.0 {
            player.hurt_ready_at = now.saturating_add(HURT_COOLDOWN);
            hits.push((player.id, damage));
        }
    }
}

/// Zone exposure for this frame, scaled by the frame length.
fn zone_exposure(world: &mut World, hits: &mut Vec<(PlayerId, f32)>, out_events: &mut Vec<Event>) {
    let now = world.now;
    let dt = world.frame_dt.as_secs_f32();
    if dt <= 0.0 {
        return;
    }
    let World {
        zones,
        roster,
        enemies,
        boss,
        ..
    } = world;

    for zone in zones.iter() {
        let rate = zone.health_rate();
        if rate == 0.0 {
            continue;
        }

        for player in roster.iter_mut() {
            if !zone.contains(player.snake.head().center(), now) {
                continue;
            }
            if rate > 0.0 {
                player.health = (player.health + rate * dt).min(MAX_HEALTH);
            } else if zone.source.harms(Faction::Player(player.id)) && !player.is_invincible(now) {
                hits.push((player.id, -rate * dt));
            }
        }

        if rate > 0.0 {
            continue;
        }
        if zone.source.harms(Faction::Enemy) {
            for enemy in enemies.iter_mut() {
                if zone.contains(enemy.footprint().center(), now) {
                    let _ = enemy.take_damage(-rate * dt, now);
                }
            }
        }
        if let Some(boss) = boss.as_mut().filter(|_| zone.source.harms(Faction::Boss)) {
            if zone.contains(boss.footprint().center(), now) {
                let landed = boss.take_damage(-rate * dt, now);
                if landed > 0.0 {
                    out_events.push(Event::BossDamaged {
                        boss: boss.id,
                        amount: landed,
                        remaining: boss.health(),
                    });
                }
            }
        }
    }
}

fn remove_defeated(world: &mut World, out_events: &mut Vec<Event>) {
    let mut defeated = Vec::new();
    world.enemies.retain(|enemy| {
        if enemy.is_defeated() {
            defeated.push(enemy.id);
            false
        } else {
            true
        }
    });

    for enemy in defeated {
        world.award(ENEMY_KILL_SCORE, 0);
        world.kills += 1;
        debug!(?enemy, kills = world.kills, "enemy defeated");
        world.announce("Nice One! Enemy Down!", out_events);
        if world.kills >= PORTAL_KILL_THRESHOLD && !world.portal_bonus_spent {
            world.portal_bonus_spent = true;
            world.portal_armed = true;
        }
        out_events.push(Event::EnemyDefeated { enemy });
    }

    if world.boss.as_ref().is_some_and(|boss| boss.is_defeated()) {
        encounter::defeat_boss(world, out_events);
    }
}

fn enter_portal(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(cell) = world.portal.map(|open| open.cell) else {
        return;
    };
    let entrant = world
        .roster
        .iter()
        .find(|player| player.snake.head() == cell)
        .map(|player| player.id);
    if let Some(player) = entrant {
        portal::enter(world, player, out_events);
    }
}

fn damage_player(world: &mut World, player: PlayerId, amount: f32, out_events: &mut Vec<Event>) {
    let now = world.now;
    let Some(target) = world.roster.get_mut(player) else {
        return;
    };
    if amount <= 0.0 || target.is_invincible(now) {
        return;
    }
    target.health -= amount;
    let health = target.health;
    out_events.push(Event::PlayerDamaged {
        player,
        amount,
        health,
    });
    if health <= 0.0 {
        lose_life(world, player, out_events);
    }
}

/// Costs a shared life. The dying player respawns with a short invincibility
/// window, or the game ends once no lives remain.
pub(crate) fn lose_life(world: &mut World, player: PlayerId, out_events: &mut Vec<Event>) {
    world.lives = world.lives.saturating_sub(1);
    let lives = world.lives;
    info!(?player, lives, "life lost");
    out_events.push(Event::LifeLost { player, lives });

    if lives == 0 {
        let score = world.progress.score;
        let awaiting_name = world.leaderboard_floor.map_or(true, |floor| score > floor);
        info!(score, awaiting_name, "game over");
        world.set_mode(GameMode::GameOver { awaiting_name }, out_events);
        out_events.push(Event::GameOver {
            score,
            awaiting_name,
        });
        return;
    }

    let (columns, rows, now) = (world.rules.columns, world.rules.rows, world.now);
    if let Some(target) = world.roster.get_mut(player) {
        target.respawn(columns, rows);
        target
            .effects
            .arm(EffectKind::Invincibility, now, RESPAWN_INVINCIBILITY);
        out_events.push(Event::EffectArmed {
            kind: EffectKind::Invincibility,
            player: Some(player),
            duration: RESPAWN_INVINCIBILITY,
        });
        out_events.push(Event::PlayerRespawned {
            player,
            head: target.snake.head(),
        });
    }
}
