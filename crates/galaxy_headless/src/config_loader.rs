//! Galaxy config loading for headless runs.
//!
//! Configs are RON files holding any subset of [`GalaxyConfig`]; sections
//! left out fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use galaxy_core::config::GalaxyConfig;

use crate::error::{HeadlessError, Result};

/// Path of the config shipped with this crate.
#[must_use]
pub fn default_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("galaxy.ron")
}

/// Load and validate a config from a RON file.
pub fn load_config(path: &Path) -> Result<GalaxyConfig> {
    let content = fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))?;
    let config = GalaxyConfig::from_ron_str(&content).map_err(|source| HeadlessError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        planets = config.world.planet_count,
        "Loaded galaxy config"
    );
    Ok(config)
}

/// Load `path` if given, otherwise use the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<GalaxyConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(GalaxyConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_shipped_config_loads() {
        let config = load_config(&default_config_path()).expect("shipped config");
        assert!(config.world.planet_count >= 2);
        assert!(!config.world.spawn_player);
    }

    #[test]
    fn test_partial_config() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "(world: (planet_count: 7), rules: (fuel_reserve: 9))").expect("write");

        let config = load_config(file.path()).expect("config");
        assert_eq!(config.world.planet_count, 7);
        assert_eq!(config.rules.fuel_reserve, 9);
        assert_eq!(config.rules.fuel_cost, GalaxyConfig::default().rules.fuel_cost);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, HeadlessError::Io { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "(world: (planet_count: 1))").expect("write");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, HeadlessError::Config { .. }));
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn test_default_when_no_path() {
        assert_eq!(load_or_default(None).expect("default"), GalaxyConfig::default());
    }
}
