//! Portals and the events they trigger.

use std::time::Duration;

use dark_snake_core::{
    EffectKind, Event, GridCell, PlayerId, PortalEvent, PortalId, PortalSnapshot,
};
use rand::Rng;
use tracing::info;

use crate::{encounter, World};

const PORTAL_LIFETIME: Duration = Duration::from_secs(60);
const PORTAL_COOLDOWN: Duration = Duration::from_secs(300);
const PORTAL_AURA: Duration = Duration::from_secs(60);
const LOOT_BOOST_WINDOW: Duration = Duration::from_secs(60);
const BOSS_PORTAL_BONUS_ITEMS: usize = 3;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Portal {
    pub(crate) id: PortalId,
    pub(crate) cell: GridCell,
    event: PortalEvent,
    expires_at: Duration,
}

impl Portal {
    pub(crate) fn is_expired(&self, now: Duration) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn snapshot(&self, now: Duration) -> PortalSnapshot {
        PortalSnapshot {
            id: self.id,
            cell: self.cell,
            event: self.event,
            remaining: self.expires_at.saturating_sub(now),
        }
    }
}

/// Opens a portal at `cell`, consuming any earned guaranteed portal.
pub(crate) fn open(world: &mut World, cell: GridCell, event: PortalEvent, out_events: &mut Vec<Event>) {
    let id = PortalId::new(world.allocate_id());
    world.portal = Some(Portal {
        id,
        cell,
        event,
        expires_at: world.now.saturating_add(PORTAL_LIFETIME),
    });
    world.portal_armed = false;
    out_events.push(Event::PortalSpawned {
        portal: id,
        cell,
        event,
    });
}

/// Closes an unused portal and starts the spawn cooldown.
pub(crate) fn expire(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(portal) = world.portal.take() else {
        return;
    };
    world.portal_ready_at = world.now.saturating_add(PORTAL_COOLDOWN);
    out_events.push(Event::PortalExpired { portal: portal.id });
}

/// Consumes the portal for `player` and fires its event.
pub(crate) fn enter(world: &mut World, player: PlayerId, out_events: &mut Vec<Event>) {
    let Some(portal) = world.portal.take() else {
        return;
    };
    let event = portal.event;
    info!(?player, ?event, "portal entered");
    world.portal_ready_at = world.now.saturating_add(PORTAL_COOLDOWN);
    out_events.push(Event::PortalEntered { player, event });
    world.arm_global(EffectKind::PortalAura, PORTAL_AURA, out_events);

    match event {
        PortalEvent::Teleport => {
            let (columns, rows) = (world.rules.columns, world.rules.rows);
            if let Some(cell) = world.free_cell() {
                if let Some(target) = world.roster.get_mut(player) {
                    target.snake.relocate(cell, columns, rows);
                }
            }
        }
        PortalEvent::BossTrigger => {
            world.announce("Boss portal!", out_events);
            let _ = encounter::start_boss_fight(world, out_events);
            for _ in 0..BOSS_PORTAL_BONUS_ITEMS {
                world.drop_item(None, out_events);
            }
        }
        PortalEvent::LootBoost => {
            world.arm_global(EffectKind::ScoreBoost, LOOT_BOOST_WINDOW, out_events);
            world.announce("Double score!", out_events);
        }
        PortalEvent::ColorShift => {
            out_events.push(Event::PaletteShuffled);
            world.announce("Mystery colours!", out_events);
        }
        PortalEvent::DiceRoll => {
            let roll = world.rng.gen_range(1_u8..=20);
            portal_dice(world, roll, out_events);
        }
    }
}

/// Portal dice only pay out above ten, at five points per pip.
fn portal_dice(world: &mut World, roll: u8, out_events: &mut Vec<Event>) {
    let score = if roll > 10 { u32::from(roll) * 5 } else { 0 };
    world.award(score, 0);
    world.show_dice(roll);
    out_events.push(Event::DiceRolled { roll, score });
    world.announce(format!("Portal Dice: {roll}"), out_events);
}
