// Turns season inputs into per-model rate estimates.
//
// Missing or empty splits fall back to the configured historical baseline;
// the engine itself only ever sees complete, validated rates.

use dingercast_core::{
    CombinedEstimate, ModelKind, PlatoonFactors, RateEstimate, ShareRange, TrialConfig,
    VenueGames,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::config::{BaselineRates, Config, ParkConfig};
use crate::inputs::{ScheduledGame, SeasonInputs, StatLine};

/// Rate from `line`, or `baseline` when the line is absent or has no PAs.
fn rate_or_baseline(label: &str, line: Option<StatLine>, baseline: f64) -> f64 {
    match line.and_then(|l| l.hr_per_pa()) {
        Some(rate) => rate,
        None => {
            warn!("no {} plate appearances; using baseline rate {:.4}", label, baseline);
            baseline
        }
    }
}

/// Current-season HR/PA rates per context, with baseline fallbacks applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedRates {
    pub overall: f64,
    pub home: f64,
    pub away: f64,
    pub vs_left: f64,
    pub vs_right: f64,
}

impl ObservedRates {
    pub fn from_inputs(inputs: &SeasonInputs, baseline: &BaselineRates) -> Self {
        let stats = &inputs.stats;
        ObservedRates {
            overall: rate_or_baseline("overall", Some(stats.current.line()), baseline.hr_per_pa),
            home: rate_or_baseline("home", stats.splits.home, baseline.home_hr_per_pa),
            away: rate_or_baseline("away", stats.splits.away, baseline.away_hr_per_pa),
            vs_left: rate_or_baseline("vs LHP", stats.splits.vs_left, baseline.vs_left_hr_per_pa),
            vs_right: rate_or_baseline(
                "vs RHP",
                stats.splits.vs_right,
                baseline.vs_right_hr_per_pa,
            ),
        }
    }

    /// Handedness rates as multipliers on the overall rate, scaled so that
    /// `rhp * vs_right + (1 - rhp) * vs_left == 1` at the midpoint of
    /// `rhp_share`. The platoon layer then moves PAs between pitcher hands
    /// without shifting the expected rate. `None` when no ratio exists.
    pub fn platoon_factors(&self, rhp_share: &ShareRange) -> Option<PlatoonFactors> {
        if self.overall <= 0.0 {
            return None;
        }
        let vs_left = self.vs_left / self.overall;
        let vs_right = self.vs_right / self.overall;
        let rhp = (rhp_share.low + rhp_share.high) / 2.0;
        let expected = rhp * vs_right + (1.0 - rhp) * vs_left;
        if expected <= 0.0 {
            return None;
        }
        Some(PlatoonFactors {
            vs_left: vs_left / expected,
            vs_right: vs_right / expected,
        })
    }
}

/// Park factor on the 100 scale, normalized so the baseline park is 1.0.
pub fn park_multiplier(venue: &str, factors: &HashMap<String, f64>, park: &ParkConfig) -> f64 {
    let factor = match factors.get(venue) {
        Some(f) => *f,
        None => {
            warn!("no park factor for '{}'; assuming {}", venue, park.neutral_factor);
            park.neutral_factor
        }
    };
    factor / park.baseline_factor
}

/// Group remaining games by venue. Venues come back sorted by name so the
/// segment order, and therefore the random stream, is stable across runs.
pub fn venue_games(
    schedule: &[ScheduledGame],
    factors: &HashMap<String, f64>,
    park: &ParkConfig,
) -> Vec<VenueGames> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for game in schedule {
        *counts.entry(game.venue_name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(venue, games)| VenueGames {
            venue: venue.to_string(),
            games,
            park_factor: park_multiplier(venue, factors, park),
        })
        .collect()
}

/// Fraction of the remaining games played at home, or `None` with no schedule.
pub fn schedule_home_share(schedule: &[ScheduledGame]) -> Option<f64> {
    if schedule.is_empty() {
        return None;
    }
    let home = schedule.iter().filter(|g| g.is_home).count();
    Some(home as f64 / schedule.len() as f64)
}

/// Trial settings for this season. The home/away split follows the remaining
/// schedule when there is one; otherwise the configured share stands.
pub fn season_trial_config(inputs: &SeasonInputs, config: &Config) -> TrialConfig {
    let mut trials = config.trials.clone();
    if let Some(share) = schedule_home_share(&inputs.schedule) {
        info!(
            "Home share {:.3} from {} remaining games",
            share,
            inputs.schedule.len()
        );
        trials.home_share = ShareRange::fixed(share);
    }
    trials
}

/// Build the rate estimate for one model.
pub fn build_estimate(kind: ModelKind, inputs: &SeasonInputs, config: &Config) -> RateEstimate {
    let rates = ObservedRates::from_inputs(inputs, &config.baseline);
    build_from_rates(kind, &rates, inputs, config)
}

/// Build estimates for each requested model, in the order given.
pub fn build_estimates(
    kinds: &[ModelKind],
    inputs: &SeasonInputs,
    config: &Config,
) -> Vec<RateEstimate> {
    let rates = ObservedRates::from_inputs(inputs, &config.baseline);
    kinds
        .iter()
        .map(|kind| build_from_rates(*kind, &rates, inputs, config))
        .collect()
}

fn build_from_rates(
    kind: ModelKind,
    rates: &ObservedRates,
    inputs: &SeasonInputs,
    config: &Config,
) -> RateEstimate {
    match kind {
        ModelKind::Basic => RateEstimate::Basic {
            hr_per_pa: rates.overall,
        },
        ModelKind::HomeAway => RateEstimate::HomeAway {
            home: rates.home,
            away: rates.away,
        },
        ModelKind::PitcherHandedness => RateEstimate::PitcherHandedness {
            vs_left: rates.vs_left,
            vs_right: rates.vs_right,
        },
        ModelKind::BallparkFactors => RateEstimate::BallparkFactors {
            base_hr_per_pa: rates.overall,
            venues: venue_games(&inputs.schedule, &inputs.park_factors, &config.park),
        },
        ModelKind::AdvancedCombined => RateEstimate::AdvancedCombined(CombinedEstimate {
            current_hr_per_pa: rates.overall,
            baseline_hr_per_pa: config.baseline.hr_per_pa,
            games_played: inputs.stats.current.games_played,
            season_games: config.season_games,
            venues: venue_games(&inputs.schedule, &inputs.park_factors, &config.park),
            platoon: rates.platoon_factors(&config.trials.rhp_share),
        }),
    }
}
