//! Per-frame entity updates, snake movement steps and the effect expiry sweep.

use dark_snake_core::{EffectKind, Event, Faction, FieldPoint, ZoneId, REFERENCE_FRAME};

use crate::{
    collision,
    hostiles::{Hostile, HostileAction, HostileContext},
    pickup, portal,
    zones::Zone,
    World,
};

/// Updates enemies, the boss, projectiles, zones and the portal.
pub(crate) fn advance_entities(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.now;
    let heads = world.head_points();
    let mut actions: Vec<(Faction, HostileAction)> = Vec::new();

    {
        let mut ctx = HostileContext {
            now,
            columns: world.rules.columns,
            rows: world.rules.rows,
            heads: &heads,
            rng: &mut world.rng,
        };
        for enemy in world.enemies.iter_mut() {
            enemy.update(&mut ctx);
            if let Some(action) = enemy.attack_schedule(&mut ctx) {
                actions.push((Faction::Enemy, action));
            }
        }
        if let Some(boss) = world.boss.as_mut() {
            boss.update(&mut ctx);
            if let Some(action) = boss.attack_schedule(&mut ctx) {
                out_events.push(Event::BossAttacked {
                    boss: boss.id,
                    attack: action.as_boss_attack(),
                });
                actions.push((Faction::Boss, action));
            }
        }
    }

    for (origin, action) in actions {
        match action {
            HostileAction::Volley { from, shots } => {
                for (kind, direction) in shots {
                    world.launch(kind, origin, from, direction, out_events);
                }
            }
            HostileAction::Pulse {
                center,
                base_radius,
                max_radius,
            } => {
                let zone = ZoneId::new(world.allocate_id());
                let pulse = Zone::pulse(zone, center, base_radius, max_radius, now);
                out_events.push(Event::ZoneSpawned {
                    zone,
                    kind: pulse.kind,
                    source: pulse.source,
                });
                world.zones.push(pulse);
            }
        }
    }

    let frame_scale = world.frame_dt.as_secs_f32() / REFERENCE_FRAME.as_secs_f32();
    let (columns, rows) = (world.rules.columns, world.rules.rows);
    world.projectiles.retain_mut(|projectile| {
        let target = nearest(projectile.position, &heads);
        projectile.advance(frame_scale, target) && !projectile.is_outside(columns, rows)
    });

    world.zones.retain(|zone| {
        if zone.is_expired(now) {
            out_events.push(Event::ZoneExpired { zone: zone.id });
            false
        } else {
            true
        }
    });

    if world.portal.is_some_and(|open| open.is_expired(now)) {
        portal::expire(world, out_events);
    }
}

fn nearest(from: FieldPoint, points: &[FieldPoint]) -> Option<FieldPoint> {
    points
        .iter()
        .copied()
        .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}

/// Advances every snake by one cell, running pickups and self-collision checks.
pub(crate) fn step_snakes(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.now;
    let (columns, rows) = (world.rules.columns, world.rules.rows);

    for id in world.roster.ids() {
        if !world.mode.is_active() {
            return;
        }
        let Some(player) = world.roster.get_mut(id) else {
            continue;
        };

        let next = player.snake.next_head(columns, rows);
        if player.snake.collides_with_body(next) && !player.is_invincible(now) {
            out_events.push(Event::SelfCollision { player: id });
            collision::lose_life(world, id, out_events);
            continue;
        }

        let item_index = world.items.iter().position(|item| item.cell == next);
        let doubling = player.effects.is_active(EffectKind::LengthDoubler, now)
            && player
                .length_target
                .is_some_and(|target| player.snake.len() < target);
        player.snake.advance(next, item_index.is_some() || doubling);

        if player.effects.is_active(EffectKind::LengthShortener, now) {
            if let Some(floor) = player.length_floor {
                player.snake.shed_tail(floor);
            }
        }

        out_events.push(Event::SnakeStepped {
            player: id,
            head: next,
            length: player.snake.len(),
        });

        if let Some(index) = item_index {
            let item = world.items.remove(index);
            pickup::collect(world, id, item, out_events);
        }
    }
}

/// Expires timed effects, reverting what they changed.
pub(crate) fn sweep_effects(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.now;
    let mut expired = Vec::new();

    world.effects.sweep(now, &mut expired);
    for kind in expired.drain(..) {
        world.clear_speed_stacks(kind);
        out_events.push(Event::EffectExpired { kind, player: None });
    }

    for player in world.roster.iter_mut() {
        player.effects.sweep(now, &mut expired);
        for kind in expired.drain(..) {
            match kind {
                EffectKind::MultiShot => player.extra_shots = 0,
                EffectKind::LengthDoubler => player.length_target = None,
                EffectKind::LengthShortener => player.length_floor = None,
                _ => {}
            }
            out_events.push(Event::EffectExpired {
                kind,
                player: Some(player.id),
            });
        }
    }

    while world
        .achievements
        .front()
        .is_some_and(|achievement| achievement.expires_at <= now)
    {
        let _ = world.achievements.pop_front();
    }
    if world.dice_display.is_some_and(|(_, until)| until <= now) {
        world.dice_display = None;
    }
}
