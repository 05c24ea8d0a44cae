#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dark Snake.
//!
//! The [`World`] owns every live entity, the timed effect sets, the health
//! pools, score and lives. It is mutated exclusively through [`apply`], which
//! executes one [`Command`] and reports the consequences as [`Event`] values.
//! Read access goes through the [`query`] module.

mod collision;
mod effects;
mod encounter;
mod frame;
mod hostiles;
mod pickup;
mod portal;
mod progress;
mod projectiles;
mod snake;
mod zones;

use std::{collections::VecDeque, time::Duration};

use dark_snake_core::{
    AdminCommand, Backdrop, Command, EffectKind, EnemyId, EnemyKind, Event, Faction, FieldPoint,
    FieldVector, GameMode, GridCell, ItemId, ItemKind, PlayerId, Players, ProjectileId,
    ProjectileKind, Rules, ZoneId, ZoneKind, MAX_HEALTH, MAX_LEADERBOARD_NAME, MAX_SPEED,
    MIN_SPEED, STARTING_LIVES,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    effects::TimedEffectSet,
    hostiles::{Boss, Enemy, Hostile},
    pickup::Item,
    portal::Portal,
    progress::Progress,
    projectiles::Projectile,
    snake::PlayerMode,
    zones::Zone,
};

const DEFAULT_SEED: u64 = 0x5eed_da7c_5a4e_0001;
const FREE_CELL_ATTEMPTS: usize = 100;
const ACHIEVEMENT_DISPLAY: Duration = Duration::from_secs(10);
const DICE_DISPLAY: Duration = Duration::from_secs(5);
const FIRST_BOSS_DELAY: Duration = Duration::from_secs(60);
const SPEED_EFFECT_DELTA: f32 = 3.0;
const SPEED_EFFECT_WINDOW: Duration = Duration::from_secs(5);
const SLOW_ZONE_FACTOR: f32 = 0.5;

#[derive(Clone, Debug)]
struct Achievement {
    text: String,
    expires_at: Duration,
}

/// Represents the authoritative Dark Snake world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    mode: GameMode,
    roster: PlayerMode,
    now: Duration,
    frame_dt: Duration,
    rng: ChaCha8Rng,
    next_id: u32,
    progress: Progress,
    lives: u32,
    speed: f32,
    boost_stacks: u32,
    slow_stacks: u32,
    effects: TimedEffectSet,
    enemies: Vec<Enemy>,
    boss: Option<Boss>,
    items: Vec<Item>,
    projectiles: Vec<Projectile>,
    zones: Vec<Zone>,
    portal: Option<Portal>,
    portal_ready_at: Duration,
    portal_armed: bool,
    portal_bonus_spent: bool,
    kills: u32,
    next_boss_at: Duration,
    special_ready_at: Duration,
    achievements: VecDeque<Achievement>,
    dice_display: Option<(u8, Duration)>,
    leaderboard_floor: Option<u32>,
    backdrop: Option<Backdrop>,
}

impl World {
    /// Creates a world on the title screen with default rules.
    #[must_use]
    pub fn new() -> Self {
        let rules = Rules::default();
        Self {
            roster: PlayerMode::new(Players::Single, rules.columns, rules.rows),
            speed: rules.initial_speed,
            rules,
            mode: GameMode::Intro,
            now: Duration::ZERO,
            frame_dt: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
            next_id: 0,
            progress: Progress::default(),
            lives: STARTING_LIVES,
            boost_stacks: 0,
            slow_stacks: 0,
            effects: TimedEffectSet::default(),
            enemies: Vec::new(),
            boss: None,
            items: Vec::new(),
            projectiles: Vec::new(),
            zones: Vec::new(),
            portal: None,
            portal_ready_at: Duration::ZERO,
            portal_armed: false,
            portal_bonus_spent: false,
            kills: 0,
            next_boss_at: FIRST_BOSS_DELAY,
            special_ready_at: Duration::ZERO,
            achievements: VecDeque::new(),
            dice_display: None,
            leaderboard_floor: None,
            backdrop: None,
        }
    }

    fn start_game(&mut self, players: Players, seed: u64, out_events: &mut Vec<Event>) {
        let columns = self.rules.columns;
        let rows = self.rules.rows;
        self.roster = PlayerMode::new(players, columns, rows);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.now = Duration::ZERO;
        self.frame_dt = Duration::ZERO;
        self.next_id = 0;
        self.progress = Progress::default();
        self.lives = STARTING_LIVES;
        self.speed = self.rules.initial_speed;
        self.boost_stacks = 0;
        self.slow_stacks = 0;
        self.effects.clear();
        self.enemies.clear();
        self.boss = None;
        self.items.clear();
        self.projectiles.clear();
        self.zones.clear();
        self.portal = None;
        self.portal_ready_at = Duration::ZERO;
        self.portal_armed = false;
        self.portal_bonus_spent = false;
        self.kills = 0;
        self.next_boss_at = FIRST_BOSS_DELAY;
        self.special_ready_at = Duration::ZERO;
        self.achievements.clear();
        self.dice_display = None;

        info!(?players, seed, columns, rows, "game started");
        out_events.push(Event::GameStarted { players });
        self.set_mode(GameMode::Playing, out_events);
        self.drop_item(Some(ItemKind::Food), out_events);
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    fn set_mode(&mut self, mode: GameMode, out_events: &mut Vec<Event>) {
        if self.mode == mode {
            return;
        }
        debug!(from = ?self.mode, to = ?mode, "mode changed");
        self.mode = mode;
        out_events.push(Event::ModeChanged { mode });
    }

    fn announce(&mut self, text: impl Into<String>, out_events: &mut Vec<Event>) {
        let text = text.into();
        self.achievements.push_back(Achievement {
            text: text.clone(),
            expires_at: self.now.saturating_add(ACHIEVEMENT_DISPLAY),
        });
        out_events.push(Event::Achievement { text });
    }

    fn show_dice(&mut self, roll: u8) {
        self.dice_display = Some((roll, self.now.saturating_add(DICE_DISPLAY)));
    }

    fn arm_global(&mut self, kind: EffectKind, duration: Duration, out_events: &mut Vec<Event>) {
        self.effects.arm(kind, self.now, duration);
        out_events.push(Event::EffectArmed {
            kind,
            player: None,
            duration,
        });
    }

    fn score_multiplier(&self) -> u32 {
        if self.effects.is_active(EffectKind::ScoreBoost, self.now) {
            2
        } else {
            1
        }
    }

    fn award(&mut self, score: u32, experience: u32) {
        let multiplier = self.score_multiplier();
        self.progress.award(score, experience, multiplier);
    }

    /// Stacks one more speed pickup and re-arms its window.
    fn stack_speed_effect(&mut self, kind: EffectKind, out_events: &mut Vec<Event>) {
        let active = self.effects.is_active(kind, self.now);
        let stacks = match kind {
            EffectKind::SpeedReduction => &mut self.slow_stacks,
            _ => &mut self.boost_stacks,
        };
        *stacks = if active { stacks.saturating_add(1) } else { 1 };
        self.arm_global(kind, SPEED_EFFECT_WINDOW, out_events);
    }

    fn clear_speed_stacks(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::SpeedBoost => self.boost_stacks = 0,
            EffectKind::SpeedReduction => self.slow_stacks = 0,
            _ => {}
        }
    }

    fn effective_speed(&self) -> f32 {
        let now = self.now;
        let mut speed = self.speed;
        if self.effects.is_active(EffectKind::SpeedBoost, now) {
            speed += SPEED_EFFECT_DELTA * self.boost_stacks as f32;
        }
        if self.effects.is_active(EffectKind::SpeedReduction, now) {
            speed -= SPEED_EFFECT_DELTA * self.slow_stacks as f32;
        }
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED);

        let slowed = self.roster.iter().any(|player| {
            let head = player.snake.head().center();
            self.zones.iter().any(|zone| {
                zone.kind == ZoneKind::Slow
                    && zone.source != Faction::Player(player.id)
                    && zone.contains(head, now)
            })
        });
        if slowed {
            (speed * SLOW_ZONE_FACTOR).max(MIN_SPEED)
        } else {
            speed
        }
    }

    fn head_points(&self) -> Vec<FieldPoint> {
        self.roster
            .iter()
            .map(|player| player.snake.head().center())
            .collect()
    }

    fn is_free(&self, cell: GridCell) -> bool {
        cell.within(self.rules.columns, self.rules.rows)
            && !self.roster.occupies(cell)
            && !self.items.iter().any(|item| item.cell == cell)
            && self.portal.as_ref().map_or(true, |portal| portal.cell != cell)
    }

    /// Draws random cells until one is free, giving up after a bounded number of attempts.
    fn free_cell(&mut self) -> Option<GridCell> {
        for _ in 0..FREE_CELL_ATTEMPTS {
            let cell = GridCell::new(
                self.rng.gen_range(0..self.rules.columns),
                self.rng.gen_range(0..self.rules.rows),
            );
            if self.is_free(cell) {
                return Some(cell);
            }
        }
        None
    }

    fn place_item(&mut self, cell: GridCell, kind: ItemKind, out_events: &mut Vec<Event>) {
        if !self.is_free(cell) {
            return;
        }
        let item = ItemId::new(self.allocate_id());
        self.items.push(Item {
            id: item,
            cell,
            kind,
        });
        out_events.push(Event::ItemSpawned { item, cell, kind });
    }

    /// Drops an item on a random free cell; `None` draws the kind from the spawn weights.
    fn drop_item(&mut self, kind: Option<ItemKind>, out_events: &mut Vec<Event>) {
        let kind = match kind {
            Some(kind) => kind,
            None => {
                let total = ItemKind::total_weight(|_| true);
                let roll = self.rng.gen_range(0..total);
                ItemKind::weighted_pick(roll, |_| true).unwrap_or(ItemKind::Food)
            }
        };
        if let Some(cell) = self.free_cell() {
            self.place_item(cell, kind, out_events);
        }
    }

    fn place_enemy(&mut self, cell: GridCell, kind: EnemyKind, out_events: &mut Vec<Event>) {
        if !cell.within(self.rules.columns, self.rules.rows) {
            return;
        }
        let id = EnemyId::new(self.allocate_id());
        let enemy = Enemy::spawn(
            id,
            kind,
            cell,
            self.now,
            self.rules.columns,
            self.rules.rows,
            &mut self.rng,
        );
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            footprint: enemy.footprint(),
        });
        self.enemies.push(enemy);
    }

    fn place_zone(
        &mut self,
        center: FieldPoint,
        kind: ZoneKind,
        source: Faction,
        out_events: &mut Vec<Event>,
    ) {
        let zone = ZoneId::new(self.allocate_id());
        let spawned = Zone::roaming(zone, kind, center, source, self.now);
        out_events.push(Event::ZoneSpawned {
            zone,
            kind,
            source: spawned.source,
        });
        self.zones.push(spawned);
    }

    fn launch(
        &mut self,
        kind: ProjectileKind,
        origin: Faction,
        from: FieldPoint,
        direction: FieldVector,
        out_events: &mut Vec<Event>,
    ) {
        let projectile = ProjectileId::new(self.allocate_id());
        self.projectiles
            .push(Projectile::launch(projectile, kind, origin, from, direction));
        out_events.push(Event::ProjectileFired {
            projectile,
            kind,
            origin,
        });
    }

    /// Fires player shots along `directions` when the player's shot cooldown has elapsed.
    fn fire(
        &mut self,
        player: PlayerId,
        directions: &[FieldVector],
        out_events: &mut Vec<Event>,
    ) {
        let now = self.now;
        let interval = self.rules.auto_fire_interval;
        let Some(shooter) = self.roster.get_mut(player) else {
            return;
        };
        if now < shooter.shot_ready_at || directions.is_empty() {
            return;
        }
        shooter.shot_ready_at = now.saturating_add(interval);
        let from = shooter.snake.head().center();
        for direction in directions {
            self.launch(
                ProjectileKind::PlayerShot,
                Faction::Player(player),
                from,
                *direction,
                out_events,
            );
        }
    }

    fn head_of(&self, player: PlayerId) -> Option<FieldPoint> {
        self.roster
            .get(player)
            .map(|player| player.snake.head().center())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let active = world.mode.is_active();
    match command {
        Command::ConfigureRules { rules } => {
            world.rules = rules.clamped();
        }
        Command::StartGame { players, seed } => world.start_game(players, seed, out_events),
        Command::ReturnToIntro => world.set_mode(GameMode::Intro, out_events),
        Command::Pause => {
            if active {
                let during_boss = world.mode == GameMode::BossFight;
                world.set_mode(GameMode::Paused { during_boss }, out_events);
            }
        }
        Command::Resume => {
            if let GameMode::Paused { during_boss } = world.mode {
                let mode = if during_boss {
                    GameMode::BossFight
                } else {
                    GameMode::Playing
                };
                world.set_mode(mode, out_events);
            }
        }
        Command::Tick { dt } => {
            if active {
                world.now = world.now.saturating_add(dt);
                world.frame_dt = dt;
                out_events.push(Event::TimeAdvanced { dt, now: world.now });
            }
        }
        Command::SteerSnake { player, heading } => {
            if let Some(player) = world.roster.get_mut(player).filter(|_| active) {
                player.snake.queue_heading(heading);
            }
        }
        Command::FireSpecial { player } => {
            if active {
                let factor = world.rules.projectile_speed_factor;
                if let Some(heading) = world.roster.get(player).map(|p| p.snake.heading()) {
                    world.fire(player, &[heading.vector().scaled(factor)], out_events);
                }
            }
        }
        Command::FireVolley { player, directions } => {
            if active {
                world.fire(player, &directions, out_events);
            }
        }
        Command::AdvanceEntities => {
            if active {
                frame::advance_entities(world, out_events);
            }
        }
        Command::ResolveCollisions => {
            if active {
                collision::resolve(world, out_events);
            }
        }
        Command::StepSnakes => {
            if active {
                frame::step_snakes(world, out_events);
            }
        }
        Command::SweepEffects => {
            if active {
                frame::sweep_effects(world, out_events);
            }
        }
        Command::SpawnEnemy { cell, kind } => {
            if active {
                world.place_enemy(cell, kind, out_events);
            }
        }
        Command::SpawnItem { cell, kind } => {
            if active {
                world.place_item(cell, kind, out_events);
            }
        }
        Command::SpawnPortal { cell, event } => {
            if active && world.portal.is_none() && world.is_free(cell) {
                portal::open(world, cell, event, out_events);
            }
        }
        Command::SpawnZone {
            center,
            kind,
            source,
        } => {
            if active {
                world.place_zone(center, kind, source, out_events);
            }
        }
        Command::StartBossFight => {
            if active {
                let _ = encounter::start_boss_fight(world, out_events);
            }
        }
        Command::SetLeaderboardFloor { floor } => {
            world.leaderboard_floor = floor;
        }
        Command::SubmitLeaderboardName { name } => {
            if world.mode == (GameMode::GameOver { awaiting_name: true }) {
                let trimmed: String = name.trim().chars().take(MAX_LEADERBOARD_NAME).collect();
                let name = if trimmed.is_empty() {
                    "Anonymous".to_string()
                } else {
                    trimmed
                };
                let score = world.progress.score;
                info!(%name, score, "leaderboard entry submitted");
                out_events.push(Event::LeaderboardEntrySubmitted { name, score });
                world.set_mode(GameMode::Intro, out_events);
            }
        }
        Command::LoadBackdrop { backdrop } => {
            out_events.push(Event::BackdropLoaded {
                columns: backdrop.columns(),
                rows: backdrop.rows(),
            });
            world.backdrop = Some(backdrop);
        }
        Command::Admin(admin) => {
            if active {
                apply_admin(world, admin, out_events);
            }
        }
    }
}

fn apply_admin(world: &mut World, admin: AdminCommand, out_events: &mut Vec<Event>) {
    debug!(?admin, "admin command");
    match admin {
        AdminCommand::SpawnBoss => {
            let _ = encounter::start_boss_fight(world, out_events);
        }
        AdminCommand::FullHeal => {
            for player in world.roster.iter_mut() {
                player.health = MAX_HEALTH;
            }
        }
        AdminCommand::DamageZoneAtHead { player } => {
            if let Some(head) = world.head_of(player) {
                world.place_zone(head, ZoneKind::Damage, Faction::Player(player), out_events);
            }
        }
        AdminCommand::SlowZoneAtHead { player } => {
            if let Some(head) = world.head_of(player) {
                world.place_zone(head, ZoneKind::Slow, Faction::Environment, out_events);
            }
        }
        AdminCommand::GrantMultiShot { player } => {
            pickup::apply_effect(world, player, ItemKind::MultiShot, out_events);
            pickup::check_level_up(world, out_events);
        }
        AdminCommand::DropItem { kind } => world.drop_item(Some(kind), out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dark_snake_core::{
        Backdrop, BossSnapshot, EffectKind, EnemyView, FrameSnapshot, GameMode, GridCell,
        HudSnapshot, ItemSnapshot, PlayerSnapshot, Players, PortalSnapshot, ProjectileSnapshot,
        Rules, SpawnView, ZoneKind, ZoneSnapshot,
    };

    use super::{hostiles::Hostile, World};

    /// Active game mode.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Simulated time since the game started.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Tunables currently in force.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Number of snakes in the current game.
    #[must_use]
    pub fn players(world: &World) -> Players {
        world.roster.players()
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.progress.score
    }

    /// Snake speed after timed effects and slowing zones.
    #[must_use]
    pub fn effective_speed(world: &World) -> f32 {
        world.effective_speed()
    }

    /// Score, progression and pacing figures.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        HudSnapshot {
            score: world.progress.score,
            level: world.progress.level,
            experience: world.progress.experience,
            next_threshold: world.progress.threshold,
            lives: world.lives,
            speed: world.effective_speed(),
        }
    }

    /// Snapshots of every player in identifier order.
    #[must_use]
    pub fn player_snapshots(world: &World) -> Vec<PlayerSnapshot> {
        world
            .roster
            .iter()
            .map(|player| player.snapshot(world.now))
            .collect()
    }

    /// Captures a read-only view of the enemies on the field.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| enemy.snapshot(world.now))
                .collect(),
        )
    }

    /// Snapshot of the boss, if one is on the field.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.boss.as_ref().map(|boss| boss.snapshot(world.now))
    }

    /// Items in identifier order.
    #[must_use]
    pub fn items(world: &World) -> Vec<ItemSnapshot> {
        world.items.iter().map(|item| item.snapshot()).collect()
    }

    /// Projectiles in identifier order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Zones in identifier order.
    #[must_use]
    pub fn zones(world: &World) -> Vec<ZoneSnapshot> {
        world
            .zones
            .iter()
            .map(|zone| zone.snapshot(world.now))
            .collect()
    }

    /// The open portal, if any.
    #[must_use]
    pub fn portal(world: &World) -> Option<PortalSnapshot> {
        world
            .portal
            .as_ref()
            .map(|portal| portal.snapshot(world.now))
    }

    /// Installed background map, if any.
    #[must_use]
    pub fn backdrop(world: &World) -> Option<&Backdrop> {
        world.backdrop.as_ref()
    }

    /// Figures the spawner needs to decide what to create this frame.
    #[must_use]
    pub fn spawn_view(world: &World) -> SpawnView {
        let mut occupied: Vec<_> = world
            .roster
            .iter()
            .flat_map(|player| player.snake.cells())
            .chain(world.items.iter().map(|item| item.cell))
            .chain(world.portal.as_ref().map(|portal| portal.cell))
            .collect();
        let footprints = world
            .enemies
            .iter()
            .map(|enemy| enemy.footprint())
            .chain(world.boss.as_ref().map(|boss| boss.footprint()));
        for footprint in footprints {
            let origin = footprint.origin();
            for row in origin.row()..origin.row() + footprint.side() {
                for column in origin.column()..origin.column() + footprint.side() {
                    occupied.push(GridCell::new(column, row));
                }
            }
        }
        occupied.sort_unstable();
        occupied.dedup();

        SpawnView {
            mode: world.mode,
            columns: world.rules.columns,
            rows: world.rules.rows,
            difficulty: world.rules.difficulty,
            enemy_spawn_rate: world.rules.enemy_spawn_rate,
            enemies: world.enemies.len(),
            items: world.items.len(),
            roaming_zones: world
                .zones
                .iter()
                .filter(|zone| zone.kind != ZoneKind::BossPulse)
                .count(),
            portal_open: world.portal.is_some(),
            portal_ready: world.now >= world.portal_ready_at,
            portal_armed: world.portal_armed,
            boss_due: world.mode == GameMode::Playing
                && world.boss.is_none()
                && world.now >= world.next_boss_at,
            boss_loot: world
                .effects
                .is_active(EffectKind::BossLoot, world.now),
            occupied,
        }
    }

    /// Everything a renderer needs to draw the current frame.
    #[must_use]
    pub fn frame_snapshot(world: &World) -> FrameSnapshot {
        let now = world.now;
        FrameSnapshot {
            mode: world.mode,
            now,
            hud: hud(world),
            players: player_snapshots(world),
            enemies: enemy_view(world).into_vec(),
            boss: boss(world),
            items: items(world),
            projectiles: projectiles(world),
            zones: zones(world),
            portal: portal(world),
            effects: world.effects.snapshots(now),
            achievements: world
                .achievements
                .iter()
                .filter(|achievement| now < achievement.expires_at)
                .map(|achievement| achievement.text.clone())
                .collect(),
            dice: world
                .dice_display
                .filter(|(_, until)| now < *until)
                .map(|(roll, _)| roll),
            backdrop: world.backdrop.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(players: Players) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame { players, seed: 7 }, &mut events);
        (world, events)
    }

    #[test]
    fn configure_rules_clamps_out_of_range_values() {
        let mut world = World::new();
        let mut events = Vec::new();
        let rules = Rules {
            initial_speed: 0.0,
            difficulty: 9.0,
            columns: 2,
            ..Rules::default()
        };
        apply(&mut world, Command::ConfigureRules { rules }, &mut events);

        let rules = query::rules(&world);
        assert_eq!(rules.initial_speed, MIN_SPEED);
        assert_eq!(rules.difficulty, 2.0);
        assert_eq!(rules.columns, 8);
        assert!(events.is_empty());
    }

    #[test]
    fn start_game_places_snakes_and_the_first_food() {
        let (world, events) = started(Players::Two);

        assert_eq!(query::mode(&world), GameMode::Playing);
        assert_eq!(query::players(&world), Players::Two);
        assert_eq!(query::hud(&world).lives, STARTING_LIVES);
        let items = query::items(&world);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ItemKind::Food);
        assert!(matches!(
            events.first(),
            Some(Event::GameStarted {
                players: Players::Two
            })
        ));
    }

    #[test]
    fn paused_world_ignores_ticks_and_resumes_into_the_boss_fight() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        apply(&mut world, Command::StartBossFight, &mut events);
        apply(&mut world, Command::Pause, &mut events);
        assert_eq!(query::mode(&world), GameMode::Paused { during_boss: true });

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::now(&world), Duration::ZERO);

        apply(&mut world, Command::Resume, &mut events);
        assert_eq!(query::mode(&world), GameMode::BossFight);
    }

    #[test]
    fn commands_on_the_title_screen_are_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Admin(AdminCommand::SpawnBoss), &mut events);
        apply(
            &mut world,
            Command::SpawnItem {
                cell: GridCell::new(1, 1),
                kind: ItemKind::Food,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::boss(&world).is_none());
        assert!(query::items(&world).is_empty());
    }

    #[test]
    fn leaderboard_names_are_trimmed_and_capped() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        world.mode = GameMode::GameOver {
            awaiting_name: true,
        };
        apply(
            &mut world,
            Command::SubmitLeaderboardName {
                name: "   a very long player name   ".to_string(),
            },
            &mut events,
        );
        assert!(events.contains(&Event::LeaderboardEntrySubmitted {
            name: "a very long pla".to_string(),
            score: 0,
        }));
        assert_eq!(query::mode(&world), GameMode::Intro);

        events.clear();
        apply(
            &mut world,
            Command::SubmitLeaderboardName {
                name: "late".to_string(),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn blank_names_become_anonymous() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        world.mode = GameMode::GameOver {
            awaiting_name: true,
        };
        apply(
            &mut world,
            Command::SubmitLeaderboardName {
                name: "  ".to_string(),
            },
            &mut events,
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::LeaderboardEntrySubmitted { name, .. } if name == "Anonymous"
        )));
    }

    #[test]
    fn backdrop_is_stored_but_never_occupies_cells() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        let backdrop = Backdrop::from_rows(vec![vec![Some("wall".to_string()); 37]; 27]);
        apply(&mut world, Command::LoadBackdrop { backdrop }, &mut events);

        assert_eq!(
            events,
            vec![Event::BackdropLoaded {
                columns: 37,
                rows: 27
            }]
        );
        assert!(query::frame_snapshot(&world).backdrop.is_some());
        let view = query::spawn_view(&world);
        assert_eq!(view.occupied.len(), 2);
    }

    #[test]
    fn spawn_view_lists_occupied_cells_once_in_order() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                cell: GridCell::new(3, 3),
                kind: EnemyKind::Bolbu,
            },
            &mut events,
        );
        let view = query::spawn_view(&world);
        let mut sorted = view.occupied.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(view.occupied, sorted);
        assert!(view.occupied.contains(&GridCell::new(3, 3)));
        assert_eq!(view.enemies, 1);
    }

    #[test]
    fn boss_becomes_due_after_the_first_minute() {
        let (mut world, _) = started(Players::Single);
        assert!(!query::spawn_view(&world).boss_due);
        world.now = FIRST_BOSS_DELAY;
        assert!(query::spawn_view(&world).boss_due);
    }

    #[test]
    fn speed_pickups_stack_until_the_window_closes() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        world.speed = 5.0;

        world.stack_speed_effect(EffectKind::SpeedBoost, &mut events);
        world.stack_speed_effect(EffectKind::SpeedBoost, &mut events);
        assert!((world.effective_speed() - 11.0).abs() < f32::EPSILON);

        world.stack_speed_effect(EffectKind::SpeedBoost, &mut events);
        world.stack_speed_effect(EffectKind::SpeedBoost, &mut events);
        assert!((world.effective_speed() - MAX_SPEED).abs() < f32::EPSILON);

        world.now = Duration::from_secs(6);
        frame::sweep_effects(&mut world, &mut events);
        assert_eq!(world.boost_stacks, 0);
        assert!((world.effective_speed() - 5.0).abs() < f32::EPSILON);

        world.stack_speed_effect(EffectKind::SpeedBoost, &mut events);
        assert!((world.effective_speed() - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn slow_pickups_stack_down_to_the_floor() {
        let (mut world, _) = started(Players::Single);
        let mut events = Vec::new();
        world.speed = 5.0;

        world.stack_speed_effect(EffectKind::SpeedReduction, &mut events);
        assert!((world.effective_speed() - 2.0).abs() < f32::EPSILON);
        world.stack_speed_effect(EffectKind::SpeedReduction, &mut events);
        assert!((world.effective_speed() - MIN_SPEED).abs() < f32::EPSILON);
    }
}
