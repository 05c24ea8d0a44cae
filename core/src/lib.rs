#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game vocabulary for Dark Snake: commands, events, snapshots and tunables.
//!
//! Every change to a running game is a [`Command`]. Player input becomes
//! `SteerSnake`, `FireSpecial` or `Pause`; the frame clock becomes `Tick`. The timing
//! systems answer with `StepSnakes` when a movement interval elapses,
//! `FireVolley` for automatic shots and `SpawnItem` or `SpawnEnemy` from the
//! spawner. The world applies each command and reports what happened as
//! [`Event`] values such as `SnakeStepped`, `ItemCollected` or `BossSpawned`.
//!
//! A session drives one frame in a fixed order: intents, `Tick`, spawning,
//! auto-fire, `AdvanceEntities`, `ResolveCollisions`, snake movement and
//! finally `SweepEffects`. Renderers read a [`FrameSnapshot`] after the frame
//! and the spawner reads a [`SpawnView`]. Neither holds a reference into the
//! world.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of columns on the playing field.
pub const FIELD_COLUMNS: u32 = 37;

/// Default number of rows on the playing field.
pub const FIELD_ROWS: u32 = 27;

/// Frame rate every per-frame probability and projectile velocity is expressed against.
pub const FRAME_RATE: u32 = 60;

/// Duration of a single reference frame.
pub const REFERENCE_FRAME: Duration = Duration::from_nanos(1_000_000_000 / FRAME_RATE as u64);

/// Snake speed at the start of a game, in cells per second.
pub const START_SPEED: f32 = 8.0;

/// Slowest speed a snake may travel, in cells per second.
pub const MIN_SPEED: f32 = 1.0;

/// Fastest speed a snake may travel, in cells per second.
pub const MAX_SPEED: f32 = 15.0;

/// Size of each player's health pool.
pub const MAX_HEALTH: f32 = 100.0;

/// Lives shared by all players at the start of a game.
pub const STARTING_LIVES: u32 = 3;

/// Upper bound on companion projectiles fired with each auto-fire volley.
pub const MAX_EXTRA_SHOTS: u32 = 6;

/// Number of entries retained on the leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Longest name accepted for a leaderboard entry.
pub const MAX_LEADERBOARD_NAME: usize = 15;

/// Top-level mode gating which subsystems run each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen; nothing simulates.
    Intro,
    /// Ordinary play.
    Playing,
    /// Play while a boss is on the field.
    BossFight,
    /// Simulation frozen until resumed.
    Paused {
        /// Whether the game resumes into a boss fight.
        during_boss: bool,
    },
    /// Terminal state reached when the shared lives run out.
    GameOver {
        /// Whether the score qualified and the core awaits a leaderboard name.
        awaiting_name: bool,
    },
}

impl GameMode {
    /// Reports whether the simulation advances in this mode.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::BossFight)
    }
}

/// Number of snakes participating in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Players {
    /// One snake.
    Single,
    /// Two snakes sharing the field and the lives pool.
    Two,
}

/// Identifies one of the player snakes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    /// The first player.
    One,
    /// The second player, present only in two-player games.
    Two,
}

impl PlayerId {
    /// Zero-based index of the player.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the simulation tunables. Values are clamped into range.
    ConfigureRules {
        /// Tunables to adopt.
        rules: Rules,
    },
    /// Resets the world and begins a new game.
    StartGame {
        /// Number of participating snakes.
        players: Players,
        /// Seed for every random draw the world performs during the game.
        seed: u64,
    },
    /// Returns to the title screen.
    ReturnToIntro,
    /// Freezes the simulation.
    Pause,
    /// Resumes a paused simulation.
    Resume,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Queues a heading change applied at the snake's next movement step.
    SteerSnake {
        /// Player steering.
        player: PlayerId,
        /// Requested heading.
        heading: Heading,
    },
    /// Fires a single projectile along the player's heading if the shot cooldown allows.
    FireSpecial {
        /// Player firing.
        player: PlayerId,
    },
    /// Fires a volley from the player's head if the shot cooldown allows.
    FireVolley {
        /// Player firing.
        player: PlayerId,
        /// One direction per projectile, already scaled by the speed factor.
        directions: Vec<FieldVector>,
    },
    /// Updates enemies, the boss, projectiles, zones and the portal for one frame.
    AdvanceEntities,
    /// Runs the collision and damage resolver for one frame.
    ResolveCollisions,
    /// Advances every snake by one cell.
    StepSnakes,
    /// Expires timed effects whose windows have closed.
    SweepEffects,
    /// Requests a new enemy anchored at the provided cell.
    SpawnEnemy {
        /// Upper-left cell of the enemy footprint.
        cell: GridCell,
        /// Variant to spawn.
        kind: EnemyKind,
    },
    /// Requests a new item at the provided cell.
    SpawnItem {
        /// Cell the item occupies.
        cell: GridCell,
        /// Item type.
        kind: ItemKind,
    },
    /// Requests a portal at the provided cell.
    SpawnPortal {
        /// Cell the portal occupies.
        cell: GridCell,
        /// Event triggered when a snake enters the portal.
        event: PortalEvent,
    },
    /// Requests a roaming area-of-effect zone.
    SpawnZone {
        /// Centre of the zone in field units.
        center: FieldPoint,
        /// Effect the zone applies.
        kind: ZoneKind,
        /// Faction exempt from the zone's effect.
        source: Faction,
    },
    /// Starts a boss encounter if none is running.
    StartBossFight,
    /// Records the lowest score on a full leaderboard, or `None` while it has free slots.
    SetLeaderboardFloor {
        /// Score a new result must beat to enter the leaderboard.
        floor: Option<u32>,
    },
    /// Records the name entered after a qualifying game over.
    SubmitLeaderboardName {
        /// Name typed by the player.
        name: String,
    },
    /// Installs a purely visual background map.
    LoadBackdrop {
        /// Tile grid to install.
        backdrop: Backdrop,
    },
    /// Operator hooks used for debugging sessions.
    Admin(AdminCommand),
}

/// Operator hooks dispatched through [`Command::Admin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminCommand {
    /// Starts a boss fight immediately.
    SpawnBoss,
    /// Restores every player's health pool.
    FullHeal,
    /// Drops a damage zone owned by the player at its head.
    DamageZoneAtHead {
        /// Player whose head anchors the zone.
        player: PlayerId,
    },
    /// Drops a slowing zone at the player's head.
    SlowZoneAtHead {
        /// Player whose head anchors the zone.
        player: PlayerId,
    },
    /// Applies a multi-shot pickup without an item.
    GrantMultiShot {
        /// Player receiving the buff.
        player: PlayerId,
    },
    /// Drops an item of the given kind on a free cell.
    DropItem {
        /// Item type to drop.
        kind: ItemKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulated time since the game started.
        now: Duration,
    },
    /// Announces that a new game began.
    GameStarted {
        /// Number of participating snakes.
        players: Players,
    },
    /// Announces that the simulation entered a new mode.
    ModeChanged {
        /// Mode that became active.
        mode: GameMode,
    },
    /// Confirms that a snake advanced by one cell.
    SnakeStepped {
        /// Player that moved.
        player: PlayerId,
        /// Cell now occupied by the head.
        head: GridCell,
        /// Length of the snake after the step.
        length: usize,
    },
    /// Reports that a snake ran into its own body.
    SelfCollision {
        /// Player that collided.
        player: PlayerId,
    },
    /// Confirms that an item appeared on the field.
    ItemSpawned {
        /// Identifier assigned to the item.
        item: ItemId,
        /// Cell the item occupies.
        cell: GridCell,
        /// Item type.
        kind: ItemKind,
    },
    /// Confirms that a player picked up an item.
    ItemCollected {
        /// Player that collected the item.
        player: PlayerId,
        /// Identifier of the collected item.
        item: ItemId,
        /// Item type.
        kind: ItemKind,
    },
    /// Reports the reward drawn from a loot box.
    LootBoxOpened {
        /// Player that opened the box.
        player: PlayerId,
        /// Item effect that was applied in its place.
        reward: ItemKind,
    },
    /// Reports a dice roll and the score it paid out.
    DiceRolled {
        /// Face rolled.
        roll: u8,
        /// Score awarded for the roll.
        score: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant spawned.
        kind: EnemyKind,
        /// Cells covered by the enemy.
        footprint: CellRect,
    },
    /// Announces that an enemy was destroyed.
    EnemyDefeated {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
    },
    /// Confirms that a boss encounter began.
    BossSpawned {
        /// Identifier assigned to the boss.
        boss: BossId,
        /// Boss variant.
        kind: BossKind,
        /// Cells covered by the boss.
        footprint: CellRect,
        /// Starting health of the boss.
        health: f32,
    },
    /// Reports that the boss launched an attack.
    BossAttacked {
        /// Identifier of the attacking boss.
        boss: BossId,
        /// Attack that fired.
        attack: BossAttack,
    },
    /// Reports damage dealt to the boss.
    BossDamaged {
        /// Identifier of the damaged boss.
        boss: BossId,
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        remaining: f32,
    },
    /// Announces that the boss was destroyed.
    BossDefeated {
        /// Identifier of the destroyed boss.
        boss: BossId,
        /// Level at which the boss fell.
        level: u32,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Projectile type.
        kind: ProjectileKind,
        /// Faction that launched it.
        origin: Faction,
    },
    /// Reports that a homing flame detonated.
    FlameExploded {
        /// Identifier of the flame.
        projectile: ProjectileId,
        /// Point of impact.
        at: FieldPoint,
    },
    /// Confirms that an area-of-effect zone appeared.
    ZoneSpawned {
        /// Identifier assigned to the zone.
        zone: ZoneId,
        /// Zone effect.
        kind: ZoneKind,
        /// Faction exempt from the zone.
        source: Faction,
    },
    /// Reports that a zone's window closed.
    ZoneExpired {
        /// Identifier of the expired zone.
        zone: ZoneId,
    },
    /// Confirms that a portal appeared.
    PortalSpawned {
        /// Identifier assigned to the portal.
        portal: PortalId,
        /// Cell the portal occupies.
        cell: GridCell,
        /// Event behind the portal.
        event: PortalEvent,
    },
    /// Reports that a player entered the portal.
    PortalEntered {
        /// Player that entered.
        player: PlayerId,
        /// Event that fired.
        event: PortalEvent,
    },
    /// Reports that a portal vanished unused.
    PortalExpired {
        /// Identifier of the expired portal.
        portal: PortalId,
    },
    /// Requests a cosmetic palette change from the renderer.
    PaletteShuffled,
    /// Confirms that a timed effect was armed or refreshed.
    EffectArmed {
        /// Effect armed.
        kind: EffectKind,
        /// Owning player for per-player effects.
        player: Option<PlayerId>,
        /// Window length.
        duration: Duration,
    },
    /// Reports that a timed effect expired.
    EffectExpired {
        /// Effect that expired.
        kind: EffectKind,
        /// Owning player for per-player effects.
        player: Option<PlayerId>,
    },
    /// Reports damage dealt to a player.
    PlayerDamaged {
        /// Player hit.
        player: PlayerId,
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        health: f32,
    },
    /// Reports that the shared lives pool decreased.
    LifeLost {
        /// Player whose death cost the life.
        player: PlayerId,
        /// Lives left.
        lives: u32,
    },
    /// Confirms that a player re-entered the field after losing a life.
    PlayerRespawned {
        /// Player that respawned.
        player: PlayerId,
        /// Cell of the fresh head.
        head: GridCell,
    },
    /// Announces that experience crossed the level threshold.
    LevelUp {
        /// Level reached.
        level: u32,
        /// Experience required for the next level.
        next_threshold: u32,
    },
    /// Short message for the achievement feed.
    Achievement {
        /// Message text.
        text: String,
    },
    /// Announces the end of the game.
    GameOver {
        /// Final score.
        score: u32,
        /// Whether the score earned a leaderboard entry.
        awaiting_name: bool,
    },
    /// Confirms a leaderboard entry for the adapter to persist.
    LeaderboardEntrySubmitted {
        /// Name entered.
        name: String,
        /// Score recorded.
        score: u32,
    },
    /// Confirms that a backdrop was installed.
    BackdropLoaded {
        /// Columns in the backdrop grid.
        columns: usize,
        /// Rows in the backdrop grid.
        rows: usize,
    },
}

/// Cardinal directions available to snakes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Heading {
    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn reverse(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn delta(&self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Unit vector pointing along the heading.
    #[must_use]
    pub fn vector(&self) -> FieldVector {
        let (dx, dy) = self.delta();
        FieldVector::new(dx as f32, dy as f32)
    }
}

/// Location of a single cell on the toroidal field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Centre of the cell in field units.
    #[must_use]
    pub fn center(&self) -> FieldPoint {
        FieldPoint::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Neighbouring cell one step along `heading`, wrapping around the field edges.
    #[must_use]
    pub fn wrapped_step(&self, heading: Heading, columns: u32, rows: u32) -> Self {
        let (dx, dy) = heading.delta();
        let column = (i64::from(self.column) + dx).rem_euclid(i64::from(columns.max(1)));
        let row = (i64::from(self.row) + dy).rem_euclid(i64::from(rows.max(1)));
        Self::new(column as u32, row as u32)
    }

    /// Reports whether the cell lies within a field of the provided dimensions.
    #[must_use]
    pub const fn within(&self, columns: u32, rows: u32) -> bool {
        self.column < columns && self.row < rows
    }
}

/// Square block of cells covered by an enemy or boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: GridCell,
    side: u32,
}

impl CellRect {
    /// Creates a square footprint anchored at its upper-left cell.
    #[must_use]
    pub const fn square(origin: GridCell, side: u32) -> Self {
        Self { origin, side }
    }

    /// Upper-left cell of the footprint.
    #[must_use]
    pub const fn origin(&self) -> GridCell {
        self.origin
    }

    /// Edge length of the footprint in cells.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether the cell is covered by the footprint.
    #[must_use]
    pub const fn contains_cell(&self, cell: GridCell) -> bool {
        cell.column >= self.origin.column
            && cell.column < self.origin.column + self.side
            && cell.row >= self.origin.row
            && cell.row < self.origin.row + self.side
    }

    /// Reports whether a point in field units lies inside the footprint.
    #[must_use]
    pub fn contains_point(&self, point: FieldPoint) -> bool {
        let left = self.origin.column as f32;
        let top = self.origin.row as f32;
        let side = self.side as f32;
        point.x >= left && point.x < left + side && point.y >= top && point.y < top + side
    }

    /// Centre of the footprint in field units.
    #[must_use]
    pub fn center(&self) -> FieldPoint {
        let half = self.side as f32 / 2.0;
        FieldPoint::new(
            self.origin.column as f32 + half,
            self.origin.row as f32 + half,
        )
    }
}

/// Continuous position on the field measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl FieldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(&self, other: FieldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Vector pointing from this point toward `other`.
    #[must_use]
    pub fn toward(&self, other: FieldPoint) -> FieldVector {
        FieldVector::new(other.x - self.x, other.y - self.y)
    }

    /// Point displaced by `vector` scaled by `scale`.
    #[must_use]
    pub fn offset(&self, vector: FieldVector, scale: f32) -> Self {
        Self::new(self.x + vector.dx * scale, self.y + vector.dy * scale)
    }

    /// Cell containing the point, if the point lies on a field of the given size.
    #[must_use]
    pub fn cell(&self, columns: u32, rows: u32) -> Option<GridCell> {
        if self.x < 0.0 || self.y < 0.0 || !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        let cell = GridCell::new(self.x as u32, self.y as u32);
        cell.within(columns, rows).then_some(cell)
    }
}

/// Direction and magnitude measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldVector {
    /// Horizontal component.
    pub dx: f32,
    /// Vertical component.
    pub dy: f32,
}

impl FieldVector {
    /// Creates a new vector.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Unit vector with the same direction, or `None` for a zero vector.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return None;
        }
        Some(Self::new(self.dx / length, self.dy / length))
    }

    /// Vector multiplied by a scalar.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }

    /// Vector rotated by `radians`.
    #[must_use]
    pub fn rotated(&self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.dx * cos - self.dy * sin, self.dx * sin + self.dy * cos)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BossId(u32);

impl BossId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an area-of-effect zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortalId(u32);

impl PortalId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of pickups that may appear on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Grows the snake and spawns a replacement.
    Food,
    /// Temporarily raises speed.
    SpeedUp,
    /// Temporarily lowers speed.
    SpeedDown,
    /// Flat score bonus.
    ScoreBoost,
    /// Temporary immunity to damage and self-collision.
    Invincibility,
    /// Applies a random other item's effect.
    LootBox,
    /// Temporarily sheds tail cells.
    LengthShortener,
    /// Temporarily grows the snake toward twice its length.
    LengthDoubler,
    /// Rolls a twenty-sided die for a tiered reward.
    Dice,
    /// Deals a burst of damage to the active boss.
    SpecialDamage,
    /// Enables auto-fire and adds a companion shot.
    MultiShot,
    /// Releases a handful of enemies.
    EnemyPack,
}

impl ItemKind {
    /// Every item kind in declaration order.
    pub const ALL: [ItemKind; 12] = [
        ItemKind::Food,
        ItemKind::SpeedUp,
        ItemKind::SpeedDown,
        ItemKind::ScoreBoost,
        ItemKind::Invincibility,
        ItemKind::LootBox,
        ItemKind::LengthShortener,
        ItemKind::LengthDoubler,
        ItemKind::Dice,
        ItemKind::SpecialDamage,
        ItemKind::MultiShot,
        ItemKind::EnemyPack,
    ];

    /// Relative weight of the kind in the spawn draw.
    #[must_use]
    pub const fn spawn_weight(&self) -> u32 {
        match self {
            Self::Food => 45,
            Self::SpeedUp | Self::SpeedDown => 10,
            Self::Dice => 8,
            Self::ScoreBoost | Self::Invincibility => 5,
            Self::LootBox => 4,
            Self::LengthShortener | Self::LengthDoubler | Self::MultiShot => 3,
            Self::SpecialDamage | Self::EnemyPack => 2,
        }
    }

    /// Maps a roll in `0..total_weight(include)` onto the weighted kinds accepted by `include`.
    ///
    /// Rolls past the total fall back to the last eligible kind.
    #[must_use]
    pub fn weighted_pick(roll: u32, include: impl Fn(ItemKind) -> bool) -> Option<ItemKind> {
        let mut remaining = roll;
        let mut last = None;
        for kind in Self::ALL.into_iter().filter(|kind| include(*kind)) {
            let weight = kind.spawn_weight();
            if remaining < weight {
                return Some(kind);
            }
            remaining -= weight;
            last = Some(kind);
        }
        last
    }

    /// Sum of the weights of every kind accepted by `include`.
    #[must_use]
    pub fn total_weight(include: impl Fn(ItemKind) -> bool) -> u32 {
        Self::ALL
            .into_iter()
            .filter(|kind| include(*kind))
            .map(|kind| kind.spawn_weight())
            .sum()
    }
}

/// Enemy variants, each backed by a parameter table in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Wanders and sprints at random.
    Normal,
    /// Wanders, sprints and shoots at the nearest head.
    Bolbu,
}

/// Boss variants, each backed by a parameter table in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    /// Baseline boss.
    Standard,
    /// Larger boss that halves projectile damage and adds homing flames to its volleys.
    Shielded,
}

impl BossKind {
    /// Variant encountered at the given level.
    #[must_use]
    pub const fn for_level(level: u32) -> Self {
        if level % 2 == 0 {
            Self::Shielded
        } else {
            Self::Standard
        }
    }
}

/// Attack tokens produced by the boss attack schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossAttack {
    /// Growing damage pulse centred on the boss.
    Aoe,
    /// Projectile volley aimed at the nearest head.
    Volley,
}

/// Projectile variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Auto-fire or manual shot from a player head.
    PlayerShot,
    /// Straight boss shot.
    BossShot,
    /// Homing boss flame that explodes on impact.
    Flame,
    /// Shot fired by a shooting enemy.
    EnemyShot,
}

/// Effects applied by area-of-effect zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Drains health while inside.
    Damage,
    /// Restores health while inside.
    Heal,
    /// Halves snake speed while a head is inside.
    Slow,
    /// Cosmetic only.
    Aura,
    /// Boss pulse that grows over its lifetime and drains health.
    BossPulse,
}

/// Origin tag used to exempt entities from their own faction's damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// A player snake.
    Player(PlayerId),
    /// The boss.
    Boss,
    /// Ordinary enemies.
    Enemy,
    /// The field itself, used by roaming zones.
    Environment,
}

impl Faction {
    /// Reports whether damage originating from this faction may hurt `target`.
    #[must_use]
    pub const fn harms(&self, target: Faction) -> bool {
        match (self, target) {
            (Self::Player(_), Self::Boss | Self::Enemy) => true,
            (Self::Boss | Self::Enemy | Self::Environment, Self::Player(_)) => true,
            _ => false,
        }
    }
}

/// Events that fire when a snake enters a portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalEvent {
    /// Moves the snake to a random free cell.
    Teleport,
    /// Starts a boss fight and drops bonus items.
    BossTrigger,
    /// Doubles score gains for a while.
    LootBoost,
    /// Cosmetic palette change.
    ColorShift,
    /// Rolls a twenty-sided die for score.
    DiceRoll,
}

impl PortalEvent {
    /// Every portal event in declaration order.
    pub const ALL: [PortalEvent; 5] = [
        PortalEvent::Teleport,
        PortalEvent::BossTrigger,
        PortalEvent::LootBoost,
        PortalEvent::ColorShift,
        PortalEvent::DiceRoll,
    ];
}

/// Timed effects tracked by absolute expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    /// Raises the shared snake speed.
    SpeedBoost,
    /// Lowers the shared snake speed.
    SpeedReduction,
    /// Doubles score gains.
    ScoreBoost,
    /// Extra item spawns after a boss defeat.
    BossLoot,
    /// Visual aura after entering a portal.
    PortalAura,
    /// Immunity to damage and self-collision for one player.
    Invincibility,
    /// Sheds tail cells from one player's snake.
    LengthShortener,
    /// Grows one player's snake.
    LengthDoubler,
    /// Auto-fire for one player.
    MultiShot,
}

impl EffectKind {
    /// Reports whether the effect is tracked per player rather than globally.
    #[must_use]
    pub const fn per_player(&self) -> bool {
        matches!(
            self,
            Self::Invincibility | Self::LengthShortener | Self::LengthDoubler | Self::MultiShot
        )
    }
}

/// Simulation tunables supplied by the settings collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Field width in cells.
    pub columns: u32,
    /// Field height in cells.
    pub rows: u32,
    /// Snake speed at the start of a game, in cells per second.
    pub initial_speed: f32,
    /// Multiplier on item spawn probability.
    pub difficulty: f32,
    /// Multiplier on player projectile velocity.
    pub projectile_speed_factor: f32,
    /// Multiplier on enemy spawn probability.
    pub enemy_spawn_rate: f32,
    /// Multiplier on boss health.
    pub boss_health_multiplier: f32,
    /// Minimum delay between two volleys from the same head.
    pub auto_fire_interval: Duration,
}

impl Rules {
    /// Returns a copy with every field clamped into its legal range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            columns: self.columns.clamp(8, 200),
            rows: self.rows.clamp(8, 200),
            initial_speed: clamp_finite(self.initial_speed, MIN_SPEED, MAX_SPEED, START_SPEED),
            difficulty: clamp_finite(self.difficulty, 0.5, 2.0, 1.0),
            projectile_speed_factor: clamp_finite(self.projectile_speed_factor, 0.25, 3.0, 1.0),
            enemy_spawn_rate: clamp_finite(self.enemy_spawn_rate, 0.0, 3.0, 1.0),
            boss_health_multiplier: clamp_finite(self.boss_health_multiplier, 1.0, 3.0, 1.0),
            auto_fire_interval: self
                .auto_fire_interval
                .clamp(Duration::from_millis(100), Duration::from_secs(5)),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            columns: FIELD_COLUMNS,
            rows: FIELD_ROWS,
            initial_speed: START_SPEED,
            difficulty: 1.0,
            projectile_speed_factor: 1.0,
            enemy_spawn_rate: 1.0,
            boss_health_multiplier: 1.0,
            auto_fire_interval: Duration::from_millis(500),
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Visual background map. Never consulted for collision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Backdrop {
    tiles: Vec<Vec<Option<String>>>,
}

impl Backdrop {
    /// Creates a backdrop from rows of optional tile identifiers.
    #[must_use]
    pub fn from_rows(tiles: Vec<Vec<Option<String>>>) -> Self {
        Self { tiles }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    /// Width of the widest row.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.tiles.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Tile identifier at the provided cell, if any.
    #[must_use]
    pub fn tile(&self, cell: GridCell) -> Option<&str> {
        self.tiles
            .get(cell.row() as usize)
            .and_then(|row| row.get(cell.column() as usize))
            .and_then(|tile| tile.as_deref())
    }
}

/// Remaining window of an active timed effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EffectSnapshot {
    /// Effect in force.
    pub kind: EffectKind,
    /// Time left before the effect expires.
    pub remaining: Duration,
}

/// Read-only state of a player snake.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: PlayerId,
    /// Body cells, head first.
    pub cells: Vec<GridCell>,
    /// Current heading.
    pub heading: Heading,
    /// Remaining health.
    pub health: f32,
    /// Whether the player ignores damage and self-collision.
    pub invincible: bool,
    /// Whether the auto-fire buff is active.
    pub auto_fire: bool,
    /// Companion shots added to each volley.
    pub extra_shots: u32,
    /// Whether the shot cooldown has elapsed.
    pub shot_ready: bool,
    /// Per-player effects with their remaining time.
    pub effects: Vec<EffectSnapshot>,
}

impl PlayerSnapshot {
    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> Option<GridCell> {
        self.cells.first().copied()
    }
}

/// Read-only state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnemySnapshot {
    /// Enemy identifier.
    pub id: EnemyId,
    /// Enemy variant.
    pub kind: EnemyKind,
    /// Cells covered by the enemy.
    pub footprint: CellRect,
    /// Remaining health.
    pub health: f32,
    /// Whether the post-spawn grace window is still open.
    pub in_grace: bool,
    /// Whether a sprint is in progress.
    pub sprinting: bool,
}

/// Read-only view of every enemy, sorted by identifier.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Builds a view from unordered snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only state of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BossSnapshot {
    /// Boss identifier.
    pub id: BossId,
    /// Boss variant.
    pub kind: BossKind,
    /// Cells covered by the boss.
    pub footprint: CellRect,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Whether the post-spawn grace window is still open.
    pub in_grace: bool,
}

/// Read-only state of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    /// Item identifier.
    pub id: ItemId,
    /// Cell the item occupies.
    pub cell: GridCell,
    /// Item type.
    pub kind: ItemKind,
}

/// Read-only state of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjectileSnapshot {
    /// Projectile identifier.
    pub id: ProjectileId,
    /// Projectile variant.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: FieldPoint,
    /// Faction that launched it.
    pub origin: Faction,
    /// Frames left before the projectile fizzles.
    pub lifetime_frames: u32,
}

/// Read-only state of an area-of-effect zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ZoneSnapshot {
    /// Zone identifier.
    pub id: ZoneId,
    /// Zone effect.
    pub kind: ZoneKind,
    /// Centre of the zone.
    pub center: FieldPoint,
    /// Current radius.
    pub radius: f32,
    /// Faction exempt from the zone.
    pub source: Faction,
    /// Time left before the zone expires.
    pub remaining: Duration,
}

/// Read-only state of the portal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PortalSnapshot {
    /// Portal identifier.
    pub id: PortalId,
    /// Cell the portal occupies.
    pub cell: GridCell,
    /// Event behind the portal.
    pub event: PortalEvent,
    /// Time left before the portal vanishes.
    pub remaining: Duration,
}

/// Score, progression and pacing figures shown on the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HudSnapshot {
    /// Current score.
    pub score: u32,
    /// Current level.
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u32,
    /// Experience required for the next level.
    pub next_threshold: u32,
    /// Shared lives left.
    pub lives: u32,
    /// Effective snake speed in cells per second.
    pub speed: f32,
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Active mode.
    pub mode: GameMode,
    /// Simulated time since the game started.
    pub now: Duration,
    /// HUD figures.
    pub hud: HudSnapshot,
    /// Player snakes in identifier order.
    pub players: Vec<PlayerSnapshot>,
    /// Enemies in identifier order.
    pub enemies: Vec<EnemySnapshot>,
    /// The boss, if one is on the field.
    pub boss: Option<BossSnapshot>,
    /// Items in identifier order.
    pub items: Vec<ItemSnapshot>,
    /// Projectiles in identifier order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Zones in identifier order.
    pub zones: Vec<ZoneSnapshot>,
    /// The portal, if one is open.
    pub portal: Option<PortalSnapshot>,
    /// Global effects with their remaining time.
    pub effects: Vec<EffectSnapshot>,
    /// Achievement messages still on display, oldest first.
    pub achievements: Vec<String>,
    /// Last dice face while it is still on display.
    pub dice: Option<u8>,
    /// Installed background map.
    pub backdrop: Option<Backdrop>,
}

/// Figures the spawner needs to decide what to create this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnView {
    /// Active mode.
    pub mode: GameMode,
    /// Field width in cells.
    pub columns: u32,
    /// Field height in cells.
    pub rows: u32,
    /// Item spawn multiplier.
    pub difficulty: f32,
    /// Enemy spawn multiplier.
    pub enemy_spawn_rate: f32,
    /// Live enemies.
    pub enemies: usize,
    /// Live items.
    pub items: usize,
    /// Live zones excluding boss pulses.
    pub roaming_zones: usize,
    /// Whether a portal is open.
    pub portal_open: bool,
    /// Whether the portal cooldown elapsed.
    pub portal_ready: bool,
    /// Whether a guaranteed portal was earned.
    pub portal_armed: bool,
    /// Whether the boss timer elapsed while no boss is present.
    pub boss_due: bool,
    /// Whether the post-boss loot window is open.
    pub boss_loot: bool,
    /// Cells covered by snakes, items, the portal and hostiles.
    pub occupied: Vec<GridCell>,
}
