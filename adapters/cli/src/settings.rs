//! Operator settings stored as `key=value` lines.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use dark_snake_core::Rules;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to read or write a settings file.
#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    /// The file exists but could not be read.
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("failed to write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Simulation tunables plus the audio and cosmetic values the renderer owns.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) rules: Rules,
    pub(crate) music_volume: f32,
    pub(crate) sfx_volume: f32,
    pub(crate) bg_music_volume: f32,
    /// Per-player head and body skin names, keyed by setting name.
    pub(crate) cosmetics: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            music_volume: 0.5,
            sfx_volume: 0.5,
            bg_music_volume: 0.3,
            cosmetics: BTreeMap::new(),
        }
    }
}

const COSMETIC_KEYS: [&str; 4] = [
    "custom_head_p1",
    "custom_body_p1",
    "custom_head_p2",
    "custom_body_p2",
];

impl Settings {
    /// Loads settings from `path`, falling back to defaults when it does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "settings loaded");
                Ok(Self::parse(&text))
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses `key=value` lines, skipping unknown keys and bad values.
    pub(crate) fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = number + 1, "settings line without '='");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if !settings.assign(key, value) {
                warn!(line = number + 1, key, value, "skipping setting");
            }
        }
        settings.rules = settings.rules.clamped();
        settings
    }

    fn assign(&mut self, key: &str, value: &str) -> bool {
        if COSMETIC_KEYS.contains(&key) {
            let _ = self.cosmetics.insert(key.to_string(), value.to_string());
            return true;
        }
        let rules = &mut self.rules;
        match key {
            "initial_speed" => set(&mut rules.initial_speed, value),
            "difficulty" => set(&mut rules.difficulty, value),
            "projectile_speed_factor" => set(&mut rules.projectile_speed_factor, value),
            "enemy_spawn_rate" => set(&mut rules.enemy_spawn_rate, value),
            "boss_health_multiplier" => set(&mut rules.boss_health_multiplier, value),
            "field_columns" => set(&mut rules.columns, value),
            "field_rows" => set(&mut rules.rows, value),
            "auto_fire_interval" => match value.parse::<f32>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                    rules.auto_fire_interval = Duration::from_secs_f32(secs);
                    true
                }
                _ => false,
            },
            "music_volume" => set(&mut self.music_volume, value),
            "sfx_volume" => set(&mut self.sfx_volume, value),
            "bg_music_volume" => set(&mut self.bg_music_volume, value),
            _ => false,
        }
    }

    /// Renders the settings in the format [`Settings::parse`] reads.
    pub(crate) fn render(&self) -> String {
        let rules = &self.rules;
        let mut text = String::new();
        let _ = writeln!(text, "initial_speed={}", rules.initial_speed);
        let _ = writeln!(text, "difficulty={}", rules.difficulty);
        let _ = writeln!(text, "projectile_speed_factor={}", rules.projectile_speed_factor);
        let _ = writeln!(text, "enemy_spawn_rate={}", rules.enemy_spawn_rate);
        let _ = writeln!(text, "boss_health_multiplier={}", rules.boss_health_multiplier);
        let _ = writeln!(text, "field_columns={}", rules.columns);
        let _ = writeln!(text, "field_rows={}", rules.rows);
        let _ = writeln!(
            text,
            "auto_fire_interval={}",
            rules.auto_fire_interval.as_secs_f32()
        );
        let _ = writeln!(text, "music_volume={}", self.music_volume);
        let _ = writeln!(text, "sfx_volume={}", self.sfx_volume);
        let _ = writeln!(text, "bg_music_volume={}", self.bg_music_volume);
        for (key, value) in &self.cosmetics {
            let _ = writeln!(text, "{key}={value}");
        }
        text
    }

    /// Writes the settings to `path`.
    pub(crate) fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.render()).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn set<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}
