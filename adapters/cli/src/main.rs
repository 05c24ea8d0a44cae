#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that plays Dark Snake with a scripted autopilot.

mod autopilot;
mod backdrop;
mod clock;
mod leaderboard;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dark_snake_core::{Command, Event, FrameSnapshot, GameMode, HudSnapshot, Players};
use dark_snake_system_session::{Config, Session};
use dark_snake_world::query;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{clock::Clock, leaderboard::Leaderboard, settings::Settings};

/// Runs a game without a renderer and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "dark-snake", version)]
struct Args {
    /// Number of snakes on the field.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    players: u8,
    /// Seed for every random stream in the game.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Frames to simulate before stopping.
    #[arg(long, default_value_t = 3_600)]
    frames: u32,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// `key=value` settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Writes the effective settings back to this path.
    #[arg(long)]
    save_settings: Option<PathBuf>,
    /// Leaderboard file read at startup and updated on a qualifying game over.
    #[arg(long)]
    leaderboard: Option<PathBuf>,
    /// JSON background map.
    #[arg(long)]
    backdrop: Option<PathBuf>,
    /// Name entered on the leaderboard.
    #[arg(long, default_value = "Autopilot")]
    player_name: String,
    /// Prints the final frame snapshot as JSON.
    #[arg(long)]
    snapshot: bool,
    /// Log filter; defaults to `RUST_LOG`, then `warn`.
    #[arg(long)]
    log_level: Option<String>,
    /// Paces frames with the wall clock instead of a fixed step.
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    frames: u64,
    kills: u32,
    bosses_defeated: u32,
    items_collected: u32,
    lives_lost: u32,
    portals_entered: u32,
}

impl RunSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyDefeated { .. } => self.kills += 1,
                Event::BossDefeated { .. } => self.bosses_defeated += 1,
                Event::ItemCollected { .. } => self.items_collected += 1,
                Event::LifeLost { .. } => self.lives_lost += 1,
                Event::PortalEntered { .. } => self.portals_entered += 1,
                _ => {}
            }
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    summary: &'a RunSummary,
    leaderboard: &'a [leaderboard::Entry],
    snapshot: FrameSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut leaderboard = match &args.leaderboard {
        Some(path) => Leaderboard::load(path)?,
        None => Leaderboard::default(),
    };

    let mut session = Session::new(Config::new(args.seed));
    let mut events = Vec::new();
    session.apply(
        Command::ConfigureRules {
            rules: settings.rules,
        },
        &mut events,
    );
    session.apply(
        Command::SetLeaderboardFloor {
            floor: leaderboard.floor(),
        },
        &mut events,
    );
    if let Some(path) = &args.backdrop {
        if let Some(backdrop) = backdrop::load(path)? {
            session.apply(Command::LoadBackdrop { backdrop }, &mut events);
        }
    }
    let players = if args.players == 2 {
        Players::Two
    } else {
        Players::Single
    };
    session.apply(
        Command::StartGame {
            players,
            seed: args.seed,
        },
        &mut events,
    );

    let mut summary = RunSummary::default();
    let mut clock = Clock::new(args.fps, args.realtime);
    for _ in 0..args.frames {
        let world = session.world();
        let rules = query::rules(world);
        let intents = autopilot::intents(
            &query::player_snapshots(world),
            &query::items(world),
            rules.columns,
            rules.rows,
        );
        events.clear();
        session.frame(clock.next_frame(), &intents, &mut events);
        summary.record(&events);
        if matches!(query::mode(session.world()), GameMode::GameOver { .. }) {
            break;
        }
    }
    summary.frames = session.frames();

    if query::mode(session.world()) == (GameMode::GameOver { awaiting_name: true }) {
        events.clear();
        session.apply(
            Command::SubmitLeaderboardName {
                name: args.player_name.clone(),
            },
            &mut events,
        );
        for event in &events {
            if let Event::LeaderboardEntrySubmitted { name, score } = event {
                leaderboard.insert(name.clone(), *score);
            }
        }
        match &args.leaderboard {
            Some(path) => leaderboard.save(path)?,
            None => warn!("qualifying score not saved without --leaderboard"),
        }
    }

    if let Some(path) = &args.save_settings {
        settings.save(path)?;
    }

    let hud = query::hud(session.world());
    info!(score = hud.score, level = hud.level, frames = summary.frames, "run finished");
    if args.snapshot {
        let report = Report {
            seed: args.seed,
            summary: &summary,
            leaderboard: leaderboard.entries(),
            snapshot: query::frame_snapshot(session.world()),
        };
        let json = serde_json::to_string_pretty(&report).context("failed to encode snapshot")?;
        println!("{json}");
    } else {
        print_summary(&summary, &hud, &leaderboard);
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log filter: {level}"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_summary(summary: &RunSummary, hud: &HudSnapshot, leaderboard: &Leaderboard) {
    println!("Score:     {}", hud.score);
    println!("Level:     {}", hud.level);
    println!("Lives:     {}", hud.lives);
    println!("Frames:    {}", summary.frames);
    println!("Kills:     {}", summary.kills);
    println!("Bosses:    {}", summary.bosses_defeated);
    println!("Items:     {}", summary.items_collected);
    println!("Portals:   {}", summary.portals_entered);
    println!("Lives lost {}", summary.lives_lost);
    for (rank, entry) in leaderboard.entries().iter().enumerate() {
        println!("{:>2}. {:<15} {}", rank + 1, entry.name, entry.score);
    }
}
