// JSON report assembled from model outcomes.

use chrono::{DateTime, Utc};
use dingercast_core::SimulationSummary;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::inputs::CurrentStats;
use crate::runner::ModelOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentStatsReport {
    pub home_runs: u32,
    pub plate_appearances: u32,
    pub games_played: u32,
    pub hr_per_pa: f64,
}

impl From<&CurrentStats> for CurrentStatsReport {
    fn from(stats: &CurrentStats) -> Self {
        CurrentStatsReport {
            home_runs: stats.home_runs,
            plate_appearances: stats.plate_appearances,
            games_played: stats.games_played,
            hr_per_pa: stats.hr_per_pa().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    #[serde(flatten)]
    pub summary: SimulationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub generated_at: DateTime<Utc>,
    pub trials: u32,
    pub seed: u64,
    pub current_stats: CurrentStatsReport,
    pub models: BTreeMap<String, ModelReport>,
    /// Models whose inputs were rejected, keyed by model name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl ForecastReport {
    pub fn build(
        outcomes: &[ModelOutcome],
        current: &CurrentStats,
        trials: u32,
        seed: u64,
        include_distribution: bool,
    ) -> Self {
        let mut models = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for outcome in outcomes {
            let name = outcome.model.as_str().to_string();
            match &outcome.result {
                Ok(result) => {
                    models.insert(
                        name,
                        ModelReport {
                            summary: result.summary(),
                            distribution: include_distribution
                                .then(|| result.distribution().to_vec()),
                        },
                    );
                }
                Err(e) => {
                    errors.insert(name, e.to_string());
                }
            }
        }

        ForecastReport {
            generated_at: Utc::now(),
            trials,
            seed,
            current_stats: CurrentStatsReport::from(current),
            models,
            errors,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
