//! Top-ten leaderboard persisted as `name,score` lines.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use dark_snake_core::LEADERBOARD_CAPACITY;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to read or write the leaderboard file.
#[derive(Debug, Error)]
pub(crate) enum LeaderboardError {
    /// The file exists but could not be read.
    #[error("failed to read leaderboard from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("failed to write leaderboard to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) score: u32,
}

/// Entries sorted by descending score, never more than the capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Leaderboard {
    entries: Vec<Entry>,
}

impl Leaderboard {
    pub(crate) fn load(path: &Path) -> Result<Self, LeaderboardError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no leaderboard yet");
                Ok(Self::default())
            }
            Err(source) => Err(LeaderboardError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub(crate) fn parse(text: &str) -> Self {
        let mut board = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line
                .rsplit_once(',')
                .and_then(|(name, score)| Some((name.trim(), score.trim().parse().ok()?)));
            match parsed {
                Some((name, score)) if !name.is_empty() => board.insert(name.to_string(), score),
                _ => warn!(line = number + 1, "skipping malformed leaderboard line"),
            }
        }
        board
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Lowest score still on a full board; `None` while there is room.
    pub(crate) fn floor(&self) -> Option<u32> {
        if self.entries.len() < LEADERBOARD_CAPACITY {
            None
        } else {
            self.entries.last().map(|entry| entry.score)
        }
    }

    /// Inserts an entry after existing entries of equal score and drops the overflow.
    pub(crate) fn insert(&mut self, name: String, score: u32) {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.score < score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, Entry { name, score });
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }

    pub(crate) fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{},{}\n", entry.name, entry.score))
            .collect()
    }

    pub(crate) fn save(&self, path: &Path) -> Result<(), LeaderboardError> {
        fs::write(path, self.render()).map_err(|source| LeaderboardError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(board: &Leaderboard) -> Vec<u32> {
        board.entries().iter().map(|entry| entry.score).collect()
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let board = Leaderboard::parse("ann,40\nbroken\n,12\nbob,abc\ncy,90\n");
        assert_eq!(scores(&board), vec![90, 40]);
        assert_eq!(board.entries()[0].name, "cy");
    }

    #[test]
    fn board_keeps_the_ten_best() {
        let mut board = Leaderboard::default();
        for score in 0..15 {
            board.insert(format!("p{score}"), score * 10);
        }
        assert_eq!(board.entries().len(), LEADERBOARD_CAPACITY);
        assert_eq!(scores(&board)[0], 140);
        assert_eq!(board.floor(), Some(50));
    }

    #[test]
    fn floor_is_open_while_the_board_has_room() {
        let board = Leaderboard::parse("ann,40\n");
        assert_eq!(board.floor(), None);
    }

    #[test]
    fn names_with_commas_keep_their_score() {
        let board = Leaderboard::parse("smith, j,70\n");
        assert_eq!(board.entries()[0].name, "smith, j");
        assert_eq!(Leaderboard::parse(&board.render()), board);
    }

    #[test]
    fn saved_board_loads_back() {
        let path = std::env::temp_dir().join(format!(
            "dark-snake-leaderboard-{}.txt",
            std::process::id()
        ));
        let mut board = Leaderboard::default();
        board.insert("ann".to_string(), 30);
        board.insert("bob".to_string(), 30);
        assert!(board.save(&path).is_ok());
        let loaded = Leaderboard::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(loaded, Ok(loaded) if loaded == board));
        assert_eq!(board.entries()[1].name, "bob");
    }
}
