//! Player snakes and the tagged single/two-player roster.

use std::{collections::VecDeque, time::Duration};

use dark_snake_core::{
    EffectKind, GridCell, Heading, PlayerId, PlayerSnapshot, Players, MAX_HEALTH,
};

use crate::effects::TimedEffectSet;

/// Ordered body cells (head first) plus the heading state.
#[derive(Clone, Debug)]
pub(crate) struct Snake {
    body: VecDeque<GridCell>,
    heading: Heading,
    pending: Option<Heading>,
}

impl Snake {
    pub(crate) fn spawn(head: GridCell, heading: Heading) -> Self {
        Self {
            body: VecDeque::from([head]),
            heading,
            pending: None,
        }
    }

    pub(crate) fn head(&self) -> GridCell {
        // The body never drops below one cell.
        self.body.front().copied().unwrap_or(GridCell::new(0, 0))
    }

    pub(crate) fn heading(&self) -> Heading {
        self.heading
    }

    pub(crate) fn len(&self) -> usize {
        self.body.len()
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.body.iter().copied()
    }

    pub(crate) fn occupies(&self, cell: GridCell) -> bool {
        self.body.contains(&cell)
    }

    /// Queues a heading for the next step. The latest request wins.
    pub(crate) fn queue_heading(&mut self, heading: Heading) {
        self.pending = Some(heading);
    }

    /// Adopts the queued heading unless it reverses the current one, then
    /// returns the wrapped cell one step ahead.
    pub(crate) fn next_head(&mut self, columns: u32, rows: u32) -> GridCell {
        if let Some(pending) = self.pending.take() {
            if pending != self.heading.reverse() {
                self.heading = pending;
            }
        }
        self.head().wrapped_step(self.heading, columns, rows)
    }

    /// Reports whether `cell` hits the body, ignoring the tail cell that is about to vacate.
    pub(crate) fn collides_with_body(&self, cell: GridCell) -> bool {
        let keep = self.body.len().saturating_sub(1);
        self.body.iter().take(keep).any(|segment| *segment == cell)
    }

    /// Moves the head to `head`, dropping the tail unless `grow` is set.
    pub(crate) fn advance(&mut self, head: GridCell, grow: bool) {
        self.body.push_front(head);
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Drops the tail cell while more than `floor` cells remain.
    pub(crate) fn shed_tail(&mut self, floor: usize) {
        if self.body.len() > floor.max(1) {
            let _ = self.body.pop_back();
        }
    }

    /// Shifts every cell so the head lands on `head`, keeping the body's shape.
    pub(crate) fn relocate(&mut self, head: GridCell, columns: u32, rows: u32) {
        let origin = self.head();
        let dx = i64::from(head.column()) - i64::from(origin.column());
        let dy = i64::from(head.row()) - i64::from(origin.row());
        for cell in self.body.iter_mut() {
            let column = (i64::from(cell.column()) + dx).rem_euclid(i64::from(columns.max(1)));
            let row = (i64::from(cell.row()) + dy).rem_euclid(i64::from(rows.max(1)));
            *cell = GridCell::new(column as u32, row as u32);
        }
    }
}

/// A player's snake together with its health pool and personal effects.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) id: PlayerId,
    pub(crate) snake: Snake,
    pub(crate) health: f32,
    pub(crate) effects: TimedEffectSet,
    pub(crate) extra_shots: u32,
    pub(crate) shot_ready_at: Duration,
    pub(crate) hurt_ready_at: Duration,
    pub(crate) length_target: Option<usize>,
    pub(crate) length_floor: Option<usize>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, columns: u32, rows: u32) -> Self {
        Self {
            id,
            snake: Snake::spawn(spawn_cell(id, columns, rows), Heading::Right),
            health: MAX_HEALTH,
            effects: TimedEffectSet::default(),
            extra_shots: 0,
            shot_ready_at: Duration::ZERO,
            hurt_ready_at: Duration::ZERO,
            length_target: None,
            length_floor: None,
        }
    }

    /// Resets the snake to its spawn cell with a full health pool.
    ///
    /// Length effects are dropped; other personal effects keep running.
    pub(crate) fn respawn(&mut self, columns: u32, rows: u32) {
        self.snake = Snake::spawn(spawn_cell(self.id, columns, rows), Heading::Right);
        self.health = MAX_HEALTH;
        self.length_target = None;
        self.length_floor = None;
        self.effects.disarm(EffectKind::LengthDoubler);
        self.effects.disarm(EffectKind::LengthShortener);
    }

    pub(crate) fn is_invincible(&self, now: Duration) -> bool {
        self.effects.is_active(EffectKind::Invincibility, now)
    }

    pub(crate) fn snapshot(&self, now: Duration) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            cells: self.snake.cells().collect(),
            heading: self.snake.heading(),
            health: self.health,
            invincible: self.is_invincible(now),
            auto_fire: self.effects.is_active(EffectKind::MultiShot, now),
            extra_shots: self.extra_shots,
            shot_ready: now >= self.shot_ready_at,
            effects: self.effects.snapshots(now),
        }
    }
}

/// Field centre for player one; player two starts two rows lower.
pub(crate) fn spawn_cell(id: PlayerId, columns: u32, rows: u32) -> GridCell {
    let row_offset = match id {
        PlayerId::One => 0,
        PlayerId::Two => 2,
    };
    GridCell::new(columns / 2, (rows / 2 + row_offset) % rows.max(1))
}

/// Roster of players with a fixed shape per mode.
#[derive(Clone, Debug)]
pub(crate) enum PlayerMode {
    Single { one: Player },
    Two { one: Player, two: Player },
}

impl PlayerMode {
    pub(crate) fn new(players: Players, columns: u32, rows: u32) -> Self {
        let one = Player::new(PlayerId::One, columns, rows);
        match players {
            Players::Single => Self::Single { one },
            Players::Two => Self::Two {
                one,
                two: Player::new(PlayerId::Two, columns, rows),
            },
        }
    }

    pub(crate) fn players(&self) -> Players {
        match self {
            Self::Single { .. } => Players::Single,
            Self::Two { .. } => Players::Two,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Player> {
        let (one, two) = match self {
            Self::Single { one } => (one, None),
            Self::Two { one, two } => (one, Some(two)),
        };
        std::iter::once(one).chain(two)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        let (one, two) = match self {
            Self::Single { one } => (one, None),
            Self::Two { one, two } => (one, Some(two)),
        };
        std::iter::once(one).chain(two)
    }

    pub(crate) fn get(&self, id: PlayerId) -> Option<&Player> {
        self.iter().find(|player| player.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.iter_mut().find(|player| player.id == id)
    }

    pub(crate) fn ids(&self) -> Vec<PlayerId> {
        self.iter().map(|player| player.id).collect()
    }

    /// Reports whether any snake covers `cell`.
    pub(crate) fn occupies(&self, cell: GridCell) -> bool {
        self.iter().any(|player| player.snake.occupies(cell))
    }
}
