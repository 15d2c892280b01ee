// Configuration loading and parsing (simulation.toml).

use dingercast_core::{ShareRange, SimError, TrialConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const SIMULATION_FILE: &str = "simulation.toml";

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
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub trials: TrialConfig,
    /// Base seed for every model's random stream. `None` draws a fresh one
    /// per run.
    pub seed: Option<u64>,
    pub season_games: u32,
    pub baseline: BaselineRates,
    pub park: ParkConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// simulation.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire simulation.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SimulationFile {
    trials: TrialsSection,
    splits: SplitsSection,
    thresholds: ThresholdsSection,
    season: SeasonSection,
    baseline: BaselineRates,
    park: ParkConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct TrialsSection {
    num_trials: u32,
    pa_low: u32,
    pa_high: u32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct SplitsSection {
    home_share_low: f64,
    home_share_high: f64,
    rhp_share_low: f64,
    rhp_share_high: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ThresholdsSection {
    home_runs: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    season_games: u32,
}

/// Historical HR/PA rates used whenever a current-season rate is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineRates {
    pub hr_per_pa: f64,
    pub home_hr_per_pa: f64,
    pub away_hr_per_pa: f64,
    pub vs_left_hr_per_pa: f64,
    pub vs_right_hr_per_pa: f64,
}

/// Park factors are published on a 100 scale. `baseline_factor` is the
/// player's home park, which maps to a multiplier of 1.0.
#[derive(Debug, Clone, Deserialize)]
pub struct ParkConfig {
    pub baseline_factor: f64,
    /// Factor assumed for venues missing from the park-factor table.
    pub neutral_factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub season: String,
    pub schedule: String,
    pub park_factors: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/simulation.toml` relative
/// to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(SIMULATION_FILE);
    let text = read_file(&path)?;
    let file: SimulationFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let trials = TrialConfig {
        num_trials: file.trials.num_trials,
        pa_low: file.trials.pa_low,
        pa_high: file.trials.pa_high,
        home_share: ShareRange::between(file.splits.home_share_low, file.splits.home_share_high),
        rhp_share: ShareRange::between(file.splits.rhp_share_low, file.splits.rhp_share_high),
        thresholds: file.thresholds.home_runs,
    };

    let config = Config {
        trials,
        seed: file.trials.seed,
        season_games: file.season.season_games,
        baseline: file.baseline,
        park: file.park,
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/simulation.toml` from `defaults/simulation.toml` on first run.
///
/// An existing `config/simulation.toml` is left untouched. Returns the path
/// written, or `None` when nothing needed copying.
pub fn init_simulation_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(SIMULATION_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(SIMULATION_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} does not exist and there is no {} to seed it from",
                target.display(),
                source.display()
            ),
        });
    }

    std::fs::create_dir_all(base_dir.join("config")).map_err(|e| {
        ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        }
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    info!("Seeded {} from defaults", target.display());
    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory,
/// seeding `config/simulation.toml` from defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    init_simulation_config(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.trials.validate().map_err(|e| match e {
        SimError::InvalidConfiguration { field, message }
        | SimError::InvalidArgument { field, message } => ConfigError::ValidationError {
            field: format!("trials.{field}"),
            message,
        },
    })?;

    if config.season_games == 0 {
        return Err(ConfigError::ValidationError {
            field: "season.season_games".into(),
            message: "must be greater than 0".into(),
        });
    }

    let b = &config.baseline;
    let rate_fields: &[(&str, f64)] = &[
        ("baseline.hr_per_pa", b.hr_per_pa),
        ("baseline.home_hr_per_pa", b.home_hr_per_pa),
        ("baseline.away_hr_per_pa", b.away_hr_per_pa),
        ("baseline.vs_left_hr_per_pa", b.vs_left_hr_per_pa),
        ("baseline.vs_right_hr_per_pa", b.vs_right_hr_per_pa),
    ];
    for (name, val) in rate_fields {
        if !(0.0..=1.0).contains(val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            });
        }
    }

    let park_fields: &[(&str, f64)] = &[
        ("park.baseline_factor", config.park.baseline_factor),
        ("park.neutral_factor", config.park.neutral_factor),
    ];
    for (name, val) in park_fields {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
