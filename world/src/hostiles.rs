//! Enemies and bosses behind a shared [`Hostile`] behaviour.
//!
//! Variants differ only through the parameter tables below: movement cadence,
//! footprint, health and the attack schedule each reads its numbers from the
//! table for the entity's kind.

use std::time::Duration;

use dark_snake_core::{
    BossAttack, BossId, BossKind, BossSnapshot, CellRect, EnemyId, EnemyKind, EnemySnapshot,
    FieldPoint, FieldVector, GridCell, ProjectileKind,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

const ENEMY_GRACE: Duration = Duration::from_secs(2);
const BOSS_GRACE: Duration = Duration::from_secs(3);
const BOSS_AOE_PERIOD: Duration = Duration::from_secs(5);
const BOSS_VOLLEY_PERIOD: Duration = Duration::from_secs(3);
const ENEMY_CONTACT_DAMAGE: f32 = 20.0;
const BOSS_CONTACT_DAMAGE: f32 = 25.0;

/// Per-frame inputs shared by every hostile update.
pub(crate) struct HostileContext<'a> {
    pub(crate) now: Duration,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) heads: &'a [FieldPoint],
    pub(crate) rng: &'a mut ChaCha8Rng,
}

impl HostileContext<'_> {
    fn nearest_head(&self, from: FieldPoint) -> Option<FieldPoint> {
        let mut best: Option<(f32, FieldPoint)> = None;
        for head in self.heads {
            let distance = from.distance_squared(*head);
            if best.map_or(true, |(current, _)| distance < current) {
                best = Some((distance, *head));
            }
        }
        best.map(|(_, head)| head)
    }
}

/// Attack produced by a hostile's schedule, executed by the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HostileAction {
    Volley {
        from: FieldPoint,
        shots: Vec<(ProjectileKind, FieldVector)>,
    },
    Pulse {
        center: FieldPoint,
        base_radius: f32,
        max_radius: f32,
    },
}

impl HostileAction {
    pub(crate) fn as_boss_attack(&self) -> BossAttack {
        match self {
            Self::Volley { .. } => BossAttack::Volley,
            Self::Pulse { .. } => BossAttack::Aoe,
        }
    }
}

/// Behaviour shared by every entity that fights the snakes.
pub(crate) trait Hostile {
    fn footprint(&self) -> CellRect;

    fn in_grace(&self, now: Duration) -> bool;

    /// Damage dealt to a head touching the footprint.
    fn contact_damage(&self) -> f32;

    fn health(&self) -> f32;

    /// Applies projectile or zone damage, returning the amount that landed.
    fn take_damage(&mut self, amount: f32, now: Duration) -> f32;

    /// Moves the entity when its cadence allows.
    fn update(&mut self, ctx: &mut HostileContext<'_>);

    /// Polls the attack timers, consuming at most one due attack.
    fn attack_schedule(&mut self, ctx: &mut HostileContext<'_>) -> Option<HostileAction>;

    fn is_defeated(&self) -> bool {
        self.health() <= 0.0
    }
}

#[derive(Clone, Copy, Debug)]
struct EnemyParams {
    sprint_chance: f64,
    sprint_multiplier: u32,
    sprint_duration: Duration,
    shot_period: Option<Duration>,
    roll_period: Option<Duration>,
    dice_sprint_duration: Duration,
    fan_spread: f32,
}

const fn enemy_params(kind: EnemyKind) -> EnemyParams {
    match kind {
        EnemyKind::Normal => EnemyParams {
            sprint_chance: 0.05,
            sprint_multiplier: 3,
            sprint_duration: Duration::from_millis(500),
            shot_period: None,
            roll_period: None,
            dice_sprint_duration: Duration::ZERO,
            fan_spread: 0.0,
        },
        EnemyKind::Bolbu => EnemyParams {
            sprint_chance: 0.05,
            sprint_multiplier: 3,
            sprint_duration: Duration::from_millis(500),
            shot_period: Some(Duration::from_millis(2_500)),
            roll_period: Some(Duration::from_secs(5)),
            dice_sprint_duration: Duration::from_millis(700),
            fan_spread: 0.25,
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sprint {
    until: Duration,
    toward: bool,
}

/// Wandering hostile with an optional sprint and, for shooting variants, a dice-driven volley.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    kind: EnemyKind,
    origin: GridCell,
    side: u32,
    health: f32,
    move_interval: Duration,
    next_move_at: Duration,
    grace_until: Duration,
    sprint: Option<Sprint>,
    next_shot_at: Duration,
    next_roll_at: Duration,
    fan_ready: bool,
}

impl Enemy {
    /// Rolls health, speed and size for a new enemy anchored near `cell`.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        cell: GridCell,
        now: Duration,
        columns: u32,
        rows: u32,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let params = enemy_params(kind);
        let speed: f32 = rng.gen_range(0.5..1.5);
        let side = if rng.gen_bool(0.5) { 1 } else { 2 };
        let health = f32::from(rng.gen_range(1_u8..=3));
        Self {
            id,
            kind,
            origin: clamp_origin(cell, side, columns, rows),
            side,
            health,
            move_interval: Duration::from_secs_f32(1.0 / speed),
            next_move_at: now,
            grace_until: now.saturating_add(ENEMY_GRACE),
            sprint: None,
            next_shot_at: now.saturating_add(params.shot_period.unwrap_or(Duration::ZERO)),
            next_roll_at: now.saturating_add(params.roll_period.unwrap_or(Duration::ZERO)),
            fan_ready: false,
        }
    }

    pub(crate) fn snapshot(&self, now: Duration) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            footprint: self.footprint(),
            health: self.health,
            in_grace: self.in_grace(now),
            sprinting: self.sprint.is_some_and(|sprint| now < sprint.until),
        }
    }

    fn start_sprint(&mut self, now: Duration, duration: Duration, toward: bool) {
        self.sprint = Some(Sprint {
            until: now.saturating_add(duration),
            toward,
        });
    }
}

impl Hostile for Enemy {
    fn footprint(&self) -> CellRect {
        CellRect::square(self.origin, self.side)
    }

    fn in_grace(&self, now: Duration) -> bool {
        now < self.grace_until
    }

    fn contact_damage(&self) -> f32 {
        ENEMY_CONTACT_DAMAGE
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn take_damage(&mut self, amount: f32, now: Duration) -> f32 {
        if self.in_grace(now) || amount <= 0.0 {
            return 0.0;
        }
        self.health -= amount;
        amount
    }

    fn update(&mut self, ctx: &mut HostileContext<'_>) {
        let params = enemy_params(self.kind);
        let now = ctx.now;
        if self.sprint.is_some_and(|sprint| now >= sprint.until) {
            self.sprint = None;
        }
        if now < self.next_move_at {
            return;
        }

        if self.sprint.is_none() && ctx.rng.gen_bool(params.sprint_chance) {
            let toward = ctx.rng.gen_bool(0.5);
            self.start_sprint(now, params.sprint_duration, toward);
        }

        let center = self.footprint().center();
        let (dx, dy) = match (self.sprint, ctx.nearest_head(center)) {
            (Some(sprint), Some(head)) => {
                let (dx, dy) = step_toward(center, head);
                if sprint.toward {
                    (dx, dy)
                } else {
                    (-dx, -dy)
                }
            }
            _ => (ctx.rng.gen_range(-1..=1), ctx.rng.gen_range(-1..=1)),
        };
        self.origin = shift_clamped(self.origin, dx, dy, self.side, ctx.columns, ctx.rows);

        let interval = match self.sprint {
            Some(_) => self.move_interval / params.sprint_multiplier,
            None => self.move_interval,
        };
        self.next_move_at = now.saturating_add(interval);
    }

    fn attack_schedule(&mut self, ctx: &mut HostileContext<'_>) -> Option<HostileAction> {
        let params = enemy_params(self.kind);
        let (Some(shot_period), Some(roll_period)) = (params.shot_period, params.roll_period)
        else {
            return None;
        };
        let now = ctx.now;
        if self.in_grace(now) {
            return None;
        }

        if now >= self.next_roll_at {
            self.next_roll_at = self.next_roll_at.saturating_add(roll_period);
            match ctx.rng.gen_range(1_u8..=6) {
                6 => self.start_sprint(now, params.dice_sprint_duration, true),
                4 | 5 => self.fan_ready = true,
                _ => {}
            }
        }

        if now < self.next_shot_at {
            return None;
        }
        self.next_shot_at = self.next_shot_at.saturating_add(shot_period);

        let from = self.footprint().center();
        let aim = aim_at(from, ctx.nearest_head(from)?);
        let shots = if std::mem::take(&mut self.fan_ready) {
            vec![
                (ProjectileKind::EnemyShot, aim.rotated(-params.fan_spread)),
                (ProjectileKind::EnemyShot, aim),
                (ProjectileKind::EnemyShot, aim.rotated(params.fan_spread)),
            ]
        } else {
            vec![(ProjectileKind::EnemyShot, aim)]
        };
        Some(HostileAction::Volley { from, shots })
    }
}

#[derive(Clone, Copy, Debug)]
struct BossParams {
    base_side: u32,
    base_health: f32,
    move_every: Duration,
    first_aoe: Duration,
    first_volley: Duration,
    projectile_damage_scale: f32,
    flames: bool,
}

const fn boss_params(kind: BossKind) -> BossParams {
    match kind {
        BossKind::Standard => BossParams {
            base_side: 3,
            base_health: 3.0,
            move_every: Duration::from_millis(500),
            first_aoe: Duration::from_secs(5),
            first_volley: Duration::from_secs(3),
            projectile_damage_scale: 1.0,
            flames: false,
        },
        BossKind::Shielded => BossParams {
            base_side: 4,
            base_health: 5.0,
            move_every: Duration::from_millis(400),
            first_aoe: Duration::from_secs(6),
            first_volley: Duration::from_secs(4),
            projectile_damage_scale: 0.5,
            flames: true,
        },
    }
}

/// Footprint edge length of a boss of `kind` at `level`.
pub(crate) fn boss_side(kind: BossKind, level: u32) -> u32 {
    boss_params(kind).base_side + level / 2
}

/// Hostile with a large footprint and independent AoE and volley timers.
#[derive(Clone, Debug)]
pub(crate) struct Boss {
    pub(crate) id: BossId,
    kind: BossKind,
    origin: GridCell,
    side: u32,
    health: f32,
    max_health: f32,
    grace_until: Duration,
    next_move_at: Duration,
    next_aoe: Duration,
    next_volley: Duration,
}

impl Boss {
    pub(crate) fn spawn(
        id: BossId,
        kind: BossKind,
        level: u32,
        health_multiplier: f32,
        origin: GridCell,
        now: Duration,
    ) -> Self {
        let params = boss_params(kind);
        let health = (params.base_health + 5.0 * level as f32).max(30.0) * health_multiplier;
        Self {
            id,
            kind,
            origin,
            side: boss_side(kind, level),
            health,
            max_health: health,
            grace_until: now.saturating_add(BOSS_GRACE),
            next_move_at: now.saturating_add(params.move_every),
            next_aoe: now.saturating_add(params.first_aoe),
            next_volley: now.saturating_add(params.first_volley),
        }
    }

    pub(crate) fn kind(&self) -> BossKind {
        self.kind
    }

    /// Scales incoming projectile damage by the variant's resistance.
    pub(crate) fn projectile_damage(&self, amount: f32) -> f32 {
        amount * boss_params(self.kind).projectile_damage_scale
    }

    pub(crate) fn snapshot(&self, now: Duration) -> BossSnapshot {
        BossSnapshot {
            id: self.id,
            kind: self.kind,
            footprint: self.footprint(),
            health: self.health,
            max_health: self.max_health,
            in_grace: self.in_grace(now),
        }
    }
}

impl Hostile for Boss {
    fn footprint(&self) -> CellRect {
        CellRect::square(self.origin, self.side)
    }

    fn in_grace(&self, now: Duration) -> bool {
        now < self.grace_until
    }

    fn contact_damage(&self) -> f32 {
        BOSS_CONTACT_DAMAGE
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn take_damage(&mut self, amount: f32, now: Duration) -> f32 {
        if self.in_grace(now) || amount <= 0.0 {
            return 0.0;
        }
        self.health -= amount;
        amount
    }

    fn update(&mut self, ctx: &mut HostileContext<'_>) {
        let now = ctx.now;
        if now < self.next_move_at {
            return;
        }
        self.next_move_at = now.saturating_add(boss_params(self.kind).move_every);

        let center = self.footprint().center();
        let (dx, dy) = match ctx.nearest_head(center) {
            Some(head) if ctx.rng.gen_bool(0.7) => step_toward(center, head),
            _ => (ctx.rng.gen_range(-1..=1), ctx.rng.gen_range(-1..=1)),
        };
        self.origin = shift_clamped(self.origin, dx, dy, self.side, ctx.columns, ctx.rows);
    }

    fn attack_schedule(&mut self, ctx: &mut HostileContext<'_>) -> Option<HostileAction> {
        let now = ctx.now;
        if self.in_grace(now) {
            return None;
        }

        let center = self.footprint().center();
        if now >= self.next_aoe {
            self.next_aoe = self.next_aoe.saturating_add(BOSS_AOE_PERIOD);
            let side = self.side as f32;
            return Some(HostileAction::Pulse {
                center,
                base_radius: side / 2.0,
                max_radius: side * 1.5,
            });
        }

        if now >= self.next_volley {
            self.next_volley = self.next_volley.saturating_add(BOSS_VOLLEY_PERIOD);
            let aim = aim_at(center, ctx.nearest_head(center)?);
            let mut shots = vec![(ProjectileKind::BossShot, aim)];
            if boss_params(self.kind).flames {
                shots.push((ProjectileKind::Flame, aim));
            }
            return Some(HostileAction::Volley {
                from: center,
                shots,
            });
        }

        None
    }
}

fn aim_at(from: FieldPoint, target: FieldPoint) -> FieldVector {
    from.toward(target)
        .normalized()
        .unwrap_or(FieldVector::new(1.0, 0.0))
}

fn step_toward(from: FieldPoint, to: FieldPoint) -> (i64, i64) {
    let signum = |delta: f32| {
        if delta > 0.5 {
            1
        } else if delta < -0.5 {
            -1
        } else {
            0
        }
    };
    (signum(to.x - from.x), signum(to.y - from.y))
}

fn clamp_origin(cell: GridCell, side: u32, columns: u32, rows: u32) -> GridCell {
    GridCell::new(
        cell.column().min(columns.saturating_sub(side)),
        cell.row().min(rows.saturating_sub(side)),
    )
}

/// Moves a footprint origin by one step per axis, keeping the footprint on the field.
fn shift_clamped(origin: GridCell, dx: i64, dy: i64, side: u32, columns: u32, rows: u32) -> GridCell {
    let max_column = i64::from(columns.saturating_sub(side));
    let max_row = i64::from(rows.saturating_sub(side));
    let column = (i64::from(origin.column()) + dx).clamp(0, max_column);
    let row = (i64::from(origin.row()) + dy).clamp(0, max_row);
    GridCell::new(column as u32, row as u32)
}
