// Season input loading: the stats, remaining schedule and park factors the
// data provider hands off on disk.
//
// season.toml carries counting stats; rates are derived later so a missing
// or empty split can fall back to the configured baseline.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::config::{Config, DataPaths};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Home runs over plate appearances for one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StatLine {
    pub home_runs: u32,
    pub plate_appearances: u32,
}

impl StatLine {
    /// HR/PA, or `None` when there are no plate appearances to divide by.
    pub fn hr_per_pa(&self) -> Option<f64> {
        if self.plate_appearances == 0 {
            None
        } else {
            Some(self.home_runs as f64 / self.plate_appearances as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CurrentStats {
    pub home_runs: u32,
    pub plate_appearances: u32,
    pub games_played: u32,
}

impl CurrentStats {
    pub fn line(&self) -> StatLine {
        StatLine {
            home_runs: self.home_runs,
            plate_appearances: self.plate_appearances,
        }
    }

    pub fn hr_per_pa(&self) -> Option<f64> {
        self.line().hr_per_pa()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SplitStats {
    #[serde(default)]
    pub home: Option<StatLine>,
    #[serde(default)]
    pub away: Option<StatLine>,
    #[serde(default)]
    pub vs_left: Option<StatLine>,
    #[serde(default)]
    pub vs_right: Option<StatLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeasonStats {
    pub current: CurrentStats,
    #[serde(default)]
    pub splits: SplitStats,
}

/// One remaining game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub venue_name: String,
    pub is_home: bool,
    pub opponent: String,
}

/// Everything the forecast needs from the data provider.
#[derive(Debug, Clone)]
pub struct SeasonInputs {
    pub stats: SeasonStats,
    pub schedule: Vec<ScheduledGame>,
    /// Venue name -> park factor on the 100 scale.
    pub park_factors: HashMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawParkFactor {
    venue: String,
    factor: f64,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_schedule_from_reader<R: Read>(rdr: R) -> Result<Vec<ScheduledGame>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut games = Vec::new();
    for result in reader.deserialize::<ScheduledGame>() {
        match result {
            Ok(mut game) => {
                game.venue_name = game.venue_name.trim().to_string();
                game.opponent = game.opponent.trim().to_string();
                if game.venue_name.is_empty() {
                    warn!("skipping game on {}: empty venue name", game.date);
                    continue;
                }
                games.push(game);
            }
            Err(e) => {
                warn!("skipping malformed schedule row: {}", e);
            }
        }
    }
    Ok(games)
}

fn load_park_factors_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, f64>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut map = HashMap::new();
    for result in reader.deserialize::<RawParkFactor>() {
        match result {
            Ok(raw) => {
                let venue = raw.venue.trim().to_string();
                if !raw.factor.is_finite() || raw.factor <= 0.0 {
                    warn!("skipping park factor for '{}': {} is not positive", venue, raw.factor);
                    continue;
                }
                if map.contains_key(&venue) {
                    warn!("duplicate park factor for '{}', using latest value", venue);
                }
                map.insert(venue, raw.factor);
            }
            Err(e) => {
                warn!("skipping malformed park factor row: {}", e);
            }
        }
    }
    Ok(map)
}

fn parse_season_stats(text: &str) -> Result<SeasonStats, toml::de::Error> {
    toml::from_str(text)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

pub fn load_season_stats(path: &Path) -> Result<SeasonStats, InputError> {
    let text = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let stats = parse_season_stats(&text).map_err(|e| InputError::Toml {
        path: path.display().to_string(),
        source: e,
    })?;
    if stats.current.home_runs > stats.current.plate_appearances {
        return Err(InputError::Validation(format!(
            "{}: {} home runs in {} plate appearances",
            path.display(),
            stats.current.home_runs,
            stats.current.plate_appearances
        )));
    }
    Ok(stats)
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduledGame>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_schedule_from_reader(file).map_err(|e| InputError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_park_factors(path: &Path) -> Result<HashMap<String, f64>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_park_factors_from_reader(file).map_err(|e| InputError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load all season inputs using paths from the config.
pub fn load_all(config: &Config) -> Result<SeasonInputs, InputError> {
    load_all_from_paths(&config.data_paths)
}

/// Load all season inputs from explicit paths. Exposed for testing and flexibility.
pub fn load_all_from_paths(paths: &DataPaths) -> Result<SeasonInputs, InputError> {
    let stats = load_season_stats(Path::new(&paths.season))?;
    let schedule = load_schedule(Path::new(&paths.schedule))?;
    let park_factors = load_park_factors(Path::new(&paths.park_factors))?;

    if schedule.is_empty() {
        warn!("schedule is empty; ballpark model will have no games to simulate");
    }

    Ok(SeasonInputs {
        stats,
        schedule,
        park_factors,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_line_rate() {
        let line = StatLine {
            home_runs: 41,
            plate_appearances: 500,
        };
        assert!((line.hr_per_pa().unwrap() - 0.082).abs() < 1e-12);
    }

    #[test]
    fn stat_line_zero_pa_has_no_rate() {
        let line = StatLine {
            home_runs: 0,
            plate_appearances: 0,
        };
        assert_eq!(line.hr_per_pa(), None);
    }

    #[test]
    fn season_stats_full() {
        let text = r#"
[current]
home_runs = 37
plate_appearances = 492
games_played = 114

[splits.home]
home_runs = 20
plate_appearances = 241

[splits.vs_left]
home_runs = 10
plate_appearances = 118
"#;
        let stats = parse_season_stats(text).unwrap();
        assert_eq!(stats.current.games_played, 114);
        assert_eq!(stats.splits.home.unwrap().home_runs, 20);
        assert!(stats.splits.away.is_none());
        assert_eq!(stats.splits.vs_left.unwrap().plate_appearances, 118);
        assert!(stats.splits.vs_right.is_none());
    }

    #[test]
    fn season_stats_without_splits() {
        let text = "[current]\nhome_runs = 0\nplate_appearances = 0\ngames_played = 0\n";
        let stats = parse_season_stats(text).unwrap();
        assert_eq!(stats.splits, SplitStats::default());
        assert_eq!(stats.current.hr_per_pa(), None);
    }

    #[test]
    fn season_stats_missing_current_is_error() {
        let text = "[splits.home]\nhome_runs = 1\nplate_appearances = 4\n";
        assert!(parse_season_stats(text).is_err());
    }

    #[test]
    fn schedule_csv_parses_rows() {
        let csv_data = "\
date,venue_name,is_home,opponent
2025-08-15,Yankee Stadium,true,Boston Red Sox
2025-08-16, Fenway Park ,false,Boston Red Sox";

        let games = load_schedule_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
        assert!(games[0].is_home);
        assert_eq!(games[1].venue_name, "Fenway Park");
        assert!(!games[1].is_home);
    }

    #[test]
    fn schedule_csv_skips_malformed_rows() {
        let csv_data = "\
date,venue_name,is_home,opponent
2025-08-15,Yankee Stadium,true,Boston Red Sox
not-a-date,Fenway Park,false,Boston Red Sox
2025-08-17,Fenway Park,maybe,Boston Red Sox
2025-08-18,,false,Boston Red Sox
2025-08-19,Rogers Centre,false,Toronto Blue Jays";

        let games = load_schedule_from_reader(csv_data.as_bytes()).unwrap();
        let venues: Vec<&str> = games.iter().map(|g| g.venue_name.as_str()).collect();
        assert_eq!(venues, vec!["Yankee Stadium", "Rogers Centre"]);
    }

    #[test]
    fn park_factor_csv_parses_and_trims() {
        let csv_data = "\
venue,factor
Yankee Stadium,101
 Coors Field ,112.5";

        let factors = load_park_factors_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(factors.len(), 2);
        assert_eq!(factors["Yankee Stadium"], 101.0);
        assert_eq!(factors["Coors Field"], 112.5);
    }

    #[test]
    fn park_factor_csv_skips_invalid_and_keeps_latest_duplicate() {
        let csv_data = "\
venue,factor
Fenway Park,96
Oracle Park,-3
Tropicana Field,abc
Fenway Park,97";

        let factors = load_park_factors_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(factors.len(), 1);
        assert_eq!(factors["Fenway Park"], 97.0);
    }

    #[test]
    fn load_season_stats_missing_file_is_io_error() {
        let err = load_season_stats(Path::new("/nonexistent/season.toml")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[test]
    fn load_season_stats_rejects_impossible_counts() {
        let tmp = std::env::temp_dir().join("dingercast_inputs_impossible");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("season.toml");
        std::fs::write(
            &path,
            "[current]\nhome_runs = 10\nplate_appearances = 5\ngames_played = 2\n",
        )
        .unwrap();

        let err = load_season_stats(&path).unwrap_err();
        assert!(matches!(err, InputError::Validation(_)));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
