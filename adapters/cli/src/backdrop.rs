//! Background map loading.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use dark_snake_core::Backdrop;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum BackdropError {
    #[error("failed to read backdrop from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("backdrop {path} is not a grid of tile names")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON grid of optional tile identifiers; a missing file means no backdrop.
pub(crate) fn load(path: &Path) -> Result<Option<Backdrop>, BackdropError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BackdropError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let backdrop: Backdrop = serde_json::from_str(&text).map_err(|source| BackdropError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(columns = backdrop.columns(), rows = backdrop.rows(), "backdrop loaded");
    Ok(Some(backdrop))
}

#[cfg(test)]
mod tests {
    use dark_snake_core::GridCell;

    use super::*;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dark-snake-backdrop-{name}-{}.json",
            std::process::id()
        ));
        assert!(fs::write(&path, contents).is_ok());
        path
    }

    #[test]
    fn grid_with_gaps_loads() {
        let path = scratch("ok", r#"[["grass", null], ["stone"]]"#);
        let loaded = load(&path);
        let _ = fs::remove_file(&path);
        let backdrop = match loaded {
            Ok(Some(backdrop)) => backdrop,
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!((backdrop.columns(), backdrop.rows()), (2, 2));
        assert_eq!(backdrop.tile(GridCell::new(0, 1)), Some("stone"));
        assert_eq!(backdrop.tile(GridCell::new(1, 0)), None);
    }

    #[test]
    fn malformed_json_reports_the_path() {
        let path = scratch("bad", "{ not a grid");
        let loaded = load(&path);
        let _ = fs::remove_file(&path);
        match loaded {
            Err(error @ BackdropError::Parse { .. }) => {
                assert!(error.to_string().contains("dark-snake-backdrop-bad"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_means_no_backdrop() {
        let path = std::env::temp_dir().join("dark-snake-no-such-backdrop.json");
        assert!(matches!(load(&path), Ok(None)));
    }
}
