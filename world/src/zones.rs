//! Area-of-effect zones with fixed or growing radii.

use std::time::Duration;

use dark_snake_core::{Faction, FieldPoint, ZoneId, ZoneKind, ZoneSnapshot};

const ROAMING_RADIUS: f32 = 1.5;
const ROAMING_DURATION: Duration = Duration::from_secs(8);
const PULSE_DURATION: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub(crate) struct Zone {
    pub(crate) id: ZoneId,
    pub(crate) kind: ZoneKind,
    pub(crate) source: Faction,
    pub(crate) center: FieldPoint,
    base_radius: f32,
    max_radius: f32,
    started_at: Duration,
    duration: Duration,
}

impl Zone {
    pub(crate) fn roaming(
        id: ZoneId,
        kind: ZoneKind,
        center: FieldPoint,
        source: Faction,
        now: Duration,
    ) -> Self {
        Self {
            id,
            kind,
            source,
            center,
            base_radius: ROAMING_RADIUS,
            max_radius: ROAMING_RADIUS,
            started_at: now,
            duration: ROAMING_DURATION,
        }
    }

    /// Boss pulse growing from `base_radius` to `max_radius` over its lifetime.
    pub(crate) fn pulse(
        id: ZoneId,
        center: FieldPoint,
        base_radius: f32,
        max_radius: f32,
        now: Duration,
    ) -> Self {
        Self {
            id,
            kind: ZoneKind::BossPulse,
            source: Faction::Boss,
            center,
            base_radius,
            max_radius,
            started_at: now,
            duration: PULSE_DURATION,
        }
    }

    pub(crate) fn radius(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started_at).as_secs_f32();
        let progress = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.base_radius + (self.max_radius - self.base_radius) * progress
    }

    pub(crate) fn contains(&self, point: FieldPoint, now: Duration) -> bool {
        let radius = self.radius(now);
        self.center.distance_squared(point) <= radius * radius
    }

    pub(crate) fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }

    /// Health drained (negative) or restored (positive) per second of exposure.
    pub(crate) fn health_rate(&self) -> f32 {
        match self.kind {
            ZoneKind::Damage => -15.0,
            ZoneKind::BossPulse => -30.0,
            ZoneKind::Heal => 10.0,
            ZoneKind::Slow | ZoneKind::Aura => 0.0,
        }
    }

    pub(crate) fn snapshot(&self, now: Duration) -> ZoneSnapshot {
        ZoneSnapshot {
            id: self.id,
            kind: self.kind,
            center: self.center,
            radius: self.radius(now),
            source: self.source,
            remaining: (self.started_at + self.duration).saturating_sub(now),
        }
    }
}
