// Configuration loading and validation (config/league.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::stats::LeaderboardRules;

const CONFIG_DIR: &str = "config";
const DEFAULTS_DIR: &str = "defaults";
const CONFIG_FILE: &str = "league.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub league: LeagueSection,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub draw: DrawConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSection {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured database path, or `fantabet.db` in the platform
    /// data directory.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("", "", "fantabet")
            .map(|dirs| dirs.data_dir().join("fantabet.db"))
            .ok_or_else(|| ConfigError::ValidationError {
                field: "store.path".into(),
                message: "no home directory found; set an explicit path".into(),
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub admin_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl DrawConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

fn default_reveal_delay_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_matchday_offset")]
    pub matchday_offset: i64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default = "default_min_appearances")]
    pub leaderboard_min_appearances: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            matchday_offset: default_matchday_offset(),
            leaderboard_size: default_leaderboard_size(),
            leaderboard_min_appearances: default_min_appearances(),
        }
    }
}

fn default_matchday_offset() -> i64 {
    2
}

fn default_leaderboard_size() -> usize {
    3
}

fn default_min_appearances() -> f64 {
    3.0
}

impl From<&StatsConfig> for LeaderboardRules {
    fn from(stats: &StatsConfig) -> Self {
        LeaderboardRules {
            size: stats.leaderboard_size,
            min_appearances: stats.leaderboard_min_appearances,
            matchday_offset: stats.matchday_offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` relative to `base_dir`, without
/// copying defaults first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/league.toml` from the shipped `defaults/league.toml` on
/// first run. An existing config is left untouched. Returns the path that
/// was written, if any.
pub fn seed_league_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join(DEFAULTS_DIR).join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {} and no shipped {} to seed it from; run from the league directory",
                target.display(),
                source.display()
            ),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;
    Ok(Some(target))
}

/// Seed the league config if missing, then load it relative to the
/// working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(path) = seed_league_config(&cwd)? {
        info!("seeded {} from defaults", path.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.access.admin_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "access.admin_ids".into(),
            message: "ids must not be blank".into(),
        });
    }

    if config.store.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "store.path".into(),
            message: "must not be empty when set".into(),
        });
    }

    if config.stats.leaderboard_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "stats.leaderboard_size".into(),
            message: "must be at least 1".into(),
        });
    }

    let min = config.stats.leaderboard_min_appearances;
    if !min.is_finite() || min < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "stats.leaderboard_min_appearances".into(),
            message: format!("must be a non-negative number, got {min}"),
        });
    }

    if config.stats.matchday_offset < 0 {
        return Err(ConfigError::ValidationError {
            field: "stats.matchday_offset".into(),
            message: format!("must not be negative, got {}", config.stats.matchday_offset),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root holding `defaults/`.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// Temp dir with `config/league.toml` containing `body`.
    fn config_dir_with(body: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config/league.toml"), body).unwrap();
        tmp
    }

    fn expect_validation_error(body: &str, expected_field: &str) {
        let tmp = config_dir_with(body);
        match load_config_from(tmp.path()) {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected ValidationError for {expected_field}, got: {other:?}"),
        }
    }

    #[test]
    fn load_valid_config_from_project_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::copy(
            project_root().join("defaults/league.toml"),
            tmp.path().join("defaults/league.toml"),
        )
        .unwrap();

        let seeded = seed_league_config(tmp.path()).expect("should seed from defaults");
        assert_eq!(seeded, Some(tmp.path().join("config/league.toml")));
        let config = load_config_from(tmp.path()).expect("should load valid config");

        assert_eq!(config.league.name, "Fantabet Serie A");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert!(config.store.path.is_none());
        assert_eq!(config.access.admin_ids, vec!["admin".to_string()]);
        assert_eq!(config.draw.reveal_delay(), Duration::from_secs(5));
        assert_eq!(config.stats.matchday_offset, 2);
        assert_eq!(config.stats.leaderboard_size, 3);

        let rules = LeaderboardRules::from(&config.stats);
        assert_eq!(rules, LeaderboardRules::default());
    }

    #[test]
    fn optional_sections_take_defaults() {
        let tmp = config_dir_with("[league]\nname = \"Minima\"\n");
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert!(config.access.admin_ids.is_empty());
        assert_eq!(config.draw.reveal_delay_ms, 5000);
        assert_eq!(config.stats.leaderboard_size, 3);
    }

    #[test]
    fn memory_backend_and_explicit_path() {
        let tmp = config_dir_with(
            "[league]\nname = \"X\"\n[store]\nbackend = \"memory\"\npath = \"data/x.db\"\n",
        );
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.resolved_path().unwrap(), PathBuf::from("data/x.db"));
    }

    #[test]
    fn rejects_empty_league_name() {
        expect_validation_error("[league]\nname = \"  \"\n", "league.name");
    }

    #[test]
    fn rejects_blank_admin_id() {
        expect_validation_error(
            "[league]\nname = \"X\"\n[access]\nadmin_ids = [\"ok\", \"\"]\n",
            "access.admin_ids",
        );
    }

    #[test]
    fn rejects_zero_leaderboard_size() {
        expect_validation_error(
            "[league]\nname = \"X\"\n[stats]\nleaderboard_size = 0\n",
            "stats.leaderboard_size",
        );
    }

    #[test]
    fn rejects_negative_min_appearances() {
        expect_validation_error(
            "[league]\nname = \"X\"\n[stats]\nleaderboard_min_appearances = -1.0\n",
            "stats.leaderboard_min_appearances",
        );
    }

    #[test]
    fn rejects_negative_matchday_offset() {
        expect_validation_error(
            "[league]\nname = \"X\"\n[stats]\nmatchday_offset = -2\n",
            "stats.matchday_offset",
        );
    }

    #[test]
    fn parse_error_for_unknown_backend() {
        let tmp = config_dir_with("[league]\nname = \"X\"\n[store]\nbackend = \"postgres\"\n");
        let err = load_config_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(tmp.path()).unwrap_err();
        match err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn seeding_keeps_existing_config() {
        let tmp = config_dir_with("# custom\n");
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::write(tmp.path().join("defaults/league.toml"), "[league]\nname = \"D\"\n").unwrap();

        assert_eq!(seed_league_config(tmp.path()).unwrap(), None);
        let content = fs::read_to_string(tmp.path().join("config/league.toml")).unwrap();
        assert_eq!(content, "# custom\n");
    }

    #[test]
    fn seeding_only_copies_the_league_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("defaults")).unwrap();
        fs::write(tmp.path().join("defaults/league.toml"), "[league]\nname = \"D\"\n").unwrap();
        fs::write(tmp.path().join("defaults/notes.txt"), "ignored").unwrap();

        seed_league_config(tmp.path()).unwrap();
        assert!(!tmp.path().join("config/notes.txt").exists());
        assert_eq!(load_config_from(tmp.path()).unwrap().league.name, "D");
    }

    #[test]
    fn seeding_errors_without_defaults_or_config() {
        let tmp = tempfile::tempdir().unwrap();
        match seed_league_config(tmp.path()).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("to seed it from"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.path().join("config").exists());
    }
}
