use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "dagger.toml";
pub const DEFAULT_SNAPSHOT: &str = "libdeps.json";

/// Configuration loaded from `dagger.toml` in the working directory.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DaggerConfig {
    /// Snapshot to query when a command is given none.
    pub snapshot: Option<PathBuf>,
    /// Default log filter (e.g. "debug" or "dagger=trace").
    pub level: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Keep a binary copy of the parsed snapshot under `.dagger/`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

impl DaggerConfig {
    /// Read `dagger.toml` from `root`.
    ///
    /// A missing file yields the default configuration. Unreadable or invalid files are
    /// errors; callers log them and fall back to defaults once logging is up.
    pub fn read(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str::<Self>(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))
    }

    /// The snapshot to use: the command line's, then the configured one, then the default.
    pub fn snapshot_path(&self, cli: Option<&PathBuf>) -> PathBuf {
        cli.or(self.snapshot.as_ref())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaggerConfig::read(dir.path()).unwrap();
        assert_eq!(config, DaggerConfig::default());
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "snapshot = \"build/libdeps.json\"\nlevel = \"debug\"\n\n[cache]\nenabled = false\n",
        )
        .unwrap();
        let config = DaggerConfig::read(dir.path()).unwrap();
        assert_eq!(config.snapshot, Some(PathBuf::from("build/libdeps.json")));
        assert_eq!(config.level.as_deref(), Some("debug"));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "snapshot = [").unwrap();
        assert!(DaggerConfig::read(dir.path()).is_err());

        std::fs::write(dir.path().join(CONFIG_FILE), "colour = \"red\"").unwrap();
        assert!(DaggerConfig::read(dir.path()).is_err());
    }

    #[test]
    fn test_snapshot_path_precedence() {
        let configured = DaggerConfig {
            snapshot: Some(PathBuf::from("conf.json")),
            ..Default::default()
        };
        let cli = PathBuf::from("cli.json");
        assert_eq!(configured.snapshot_path(Some(&cli)), cli);
        assert_eq!(configured.snapshot_path(None), PathBuf::from("conf.json"));
        assert_eq!(
            DaggerConfig::default().snapshot_path(None),
            PathBuf::from(DEFAULT_SNAPSHOT)
        );
    }
}
