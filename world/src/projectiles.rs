//! Projectiles: straight shots and homing flames with frame-based lifetimes.

use dark_snake_core::{
    Faction, FieldPoint, FieldVector, ProjectileId, ProjectileKind, ProjectileSnapshot,
};

const FLAME_TURN_RATE: f32 = 0.05;
/// Largest gap between two hit-test samples along one move, in cells.
const SWEEP_SPACING: f32 = 0.5;
const MAX_SWEEP_SAMPLES: f32 = 512.0;

#[derive(Clone, Copy, Debug)]
struct ProjectileParams {
    /// Cells travelled per reference frame.
    speed: f32,
    lifetime_frames: u32,
    damage_to_players: f32,
    damage_to_enemies: f32,
    damage_to_boss: f32,
}

const fn projectile_params(kind: ProjectileKind) -> ProjectileParams {
    match kind {
        ProjectileKind::PlayerShot => ProjectileParams {
            speed: 0.5,
            lifetime_frames: 180,
            damage_to_players: 0.0,
            damage_to_enemies: 1.0,
            damage_to_boss: 10.0,
        },
        ProjectileKind::BossShot => ProjectileParams {
            speed: 0.25,
            lifetime_frames: 600,
            damage_to_players: 10.0,
            damage_to_enemies: 0.0,
            damage_to_boss: 0.0,
        },
        ProjectileKind::Flame => ProjectileParams {
            speed: 0.3,
            lifetime_frames: 1_200,
            damage_to_players: 8.0,
            damage_to_enemies: 0.0,
            damage_to_boss: 0.0,
        },
        ProjectileKind::EnemyShot => ProjectileParams {
            speed: 0.3,
            lifetime_frames: 240,
            damage_to_players: 5.0,
            damage_to_enemies: 0.0,
            damage_to_boss: 0.0,
        },
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) origin: Faction,
    pub(crate) position: FieldPoint,
    previous: FieldPoint,
    velocity: FieldVector,
    lifetime_frames: u32,
}

impl Projectile {
    /// Launches a projectile along `direction`; its length scales the kind's base speed.
    pub(crate) fn launch(
        id: ProjectileId,
        kind: ProjectileKind,
        origin: Faction,
        from: FieldPoint,
        direction: FieldVector,
    ) -> Self {
        let params = projectile_params(kind);
        Self {
            id,
            kind,
            origin,
            position: from,
            previous: from,
            velocity: direction.scaled(params.speed),
            lifetime_frames: params.lifetime_frames,
        }
    }

    /// Damage dealt to an entity of `target` faction, zero when the origin tag exempts it.
    pub(crate) fn damage_to(&self, target: Faction) -> f32 {
        if !self.origin.harms(target) {
            return 0.0;
        }
        let params = projectile_params(self.kind);
        match target {
            Faction::Player(_) => params.damage_to_players,
            Faction::Enemy => params.damage_to_enemies,
            Faction::Boss => params.damage_to_boss,
            Faction::Environment => 0.0,
        }
    }

    /// Moves the projectile by one frame of `frame_scale` reference frames.
    ///
    /// Flames bend toward `homing_target`. Returns `false` once the lifetime is spent.
    pub(crate) fn advance(&mut self, frame_scale: f32, homing_target: Option<FieldPoint>) -> bool {
        if self.kind == ProjectileKind::Flame {
            if let Some(target) = homing_target {
                let speed = self.velocity.length();
                if let Some(desired) = self.position.toward(target).normalized() {
                    let blend = (FLAME_TURN_RATE * frame_scale).clamp(0.0, 1.0);
                    let desired = desired.scaled(speed);
                    let bent = FieldVector::new(
                        self.velocity.dx + (desired.dx - self.velocity.dx) * blend,
                        self.velocity.dy + (desired.dy - self.velocity.dy) * blend,
                    );
                    self.velocity = bent
                        .normalized()
                        .map_or(self.velocity, |unit| unit.scaled(speed));
                }
            }
        }

        self.previous = self.position;
        self.position = self.position.offset(self.velocity, frame_scale);
        self.lifetime_frames = self.lifetime_frames.saturating_sub(1);
        self.lifetime_frames > 0
    }

    /// Points along the last move, ending at the current position.
    ///
    /// Samples are at most half a cell apart so a long frame cannot carry a
    /// shot across a one-cell target between two hit tests.
    pub(crate) fn swept_points(&self) -> impl Iterator<Item = FieldPoint> {
        let from = self.previous;
        let travel = from.toward(self.position);
        let samples = (travel.length() / SWEEP_SPACING)
            .ceil()
            .clamp(1.0, MAX_SWEEP_SAMPLES) as u32;
        (1..=samples).map(move |step| from.offset(travel, step as f32 / samples as f32))
    }

    pub(crate) fn is_outside(&self, columns: u32, rows: u32) -> bool {
        self.position.cell(columns, rows).is_none()
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            origin: self.origin,
            lifetime_frames: self.lifetime_frames,
        }
    }
}
