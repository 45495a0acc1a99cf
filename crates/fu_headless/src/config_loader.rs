//! Loading simulation config and faction tables from RON files.
//!
//! Both files are optional on the command line; without them the built-in
//! balance is used.

use std::fs;
use std::path::{Path, PathBuf};

use fu_core::config::SimConfig;
use fu_core::data::FactionRegistry;
use fu_core::error::GameError;
use thiserror::Error;

/// Errors that can occur while loading data files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file.
    #[error("IO error reading '{}': {source}", .path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but did not parse or validate.
    #[error("Invalid data in '{}': {source}", .path.display())]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// Parse or validation failure.
        #[source]
        source: GameError,
    },
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a [`SimConfig`] from a RON file. Missing sections keep their defaults.
pub fn load_sim_config(path: &Path) -> Result<SimConfig, LoadError> {
    let config = SimConfig::from_ron_str(&read(path)?).map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Loaded simulation config");
    Ok(config)
}

/// Load faction tables from a RON list holding one entry per faction.
pub fn load_factions(path: &Path) -> Result<FactionRegistry, LoadError> {
    let registry =
        FactionRegistry::from_ron_str(&read(path)?).map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), "Loaded faction tables");
    Ok(registry)
}

/// Resolve optional file arguments, falling back to built-in data.
pub fn load_or_default(
    config: Option<&Path>,
    factions: Option<&Path>,
) -> Result<(SimConfig, FactionRegistry), LoadError> {
    let config = config.map(load_sim_config).transpose()?.unwrap_or_default();
    let factions = factions.map(load_factions).transpose()?.unwrap_or_default();
    Ok((config, factions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fu_core::factions::FactionId;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.ron");
        fs::write(&path, "(galaxy: (total_planets: 60), combat: (jitter: 0.2))").unwrap();

        let config = load_sim_config(&path).unwrap();
        assert_eq!(config.galaxy.total_planets, 60);
        assert!((config.combat.jitter - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.tick, SimConfig::default().tick);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sim_config(&dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_out_of_range_config_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.ron");
        fs::write(&path, "(ai: (move_chance: 1.5))").unwrap();

        let err = load_sim_config(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: GameError::InvalidConfig(_),
                ..
            }
        ));
    }

    #[test]
    fn test_bad_ron_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factions.ron");
        fs::write(&path, "[ not ron").unwrap();

        let err = load_factions(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: GameError::DataParseError { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("factions.ron"));
    }

    #[test]
    fn test_faction_tables_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factions.ron");
        let text = ron::ser::to_string_pretty(&FactionRegistry::builtin(), Default::default()).unwrap();
        fs::write(&path, text).unwrap();

        let registry = load_factions(&path).unwrap();
        assert_eq!(registry, FactionRegistry::builtin());
        assert_eq!(registry.get(FactionId::Korai).name, "Kor'ai Empire");
    }

    #[test]
    fn test_no_paths_uses_builtin() {
        let (config, factions) = load_or_default(None, None).unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(factions, FactionRegistry::builtin());
    }
}
