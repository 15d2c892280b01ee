// Model selectors and the per-model rate inputs handed to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::blend::blend_rate;
use crate::error::{check_probability, SimError};

// ---------------------------------------------------------------------------
// ModelKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Basic,
    HomeAway,
    PitcherHandedness,
    BallparkFactors,
    AdvancedCombined,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Basic,
        ModelKind::HomeAway,
        ModelKind::PitcherHandedness,
        ModelKind::BallparkFactors,
        ModelKind::AdvancedCombined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Basic => "basic",
            ModelKind::HomeAway => "home_away",
            ModelKind::PitcherHandedness => "pitcher_handedness",
            ModelKind::BallparkFactors => "ballpark_factors",
            ModelKind::AdvancedCombined => "advanced_combined",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SimError::argument("model", format!("unknown model '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Rate inputs
// ---------------------------------------------------------------------------

/// Remaining games at one venue and that venue's home-run multiplier
/// (1.0 = baseline park).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueGames {
    pub venue: String,
    pub games: u32,
    pub park_factor: f64,
}

/// Multipliers applied to the blended rate against each pitcher hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatoonFactors {
    pub vs_left: f64,
    pub vs_right: f64,
}

/// Inputs for the advanced combined model.
///
/// The base rate is [`blend_rate`] of the current and baseline rates. The
/// venue and platoon layers are optional: an empty `venues` list and a
/// `None` platoon reduce the model to the basic model at the blended rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedEstimate {
    pub current_hr_per_pa: f64,
    pub baseline_hr_per_pa: f64,
    pub games_played: u32,
    pub season_games: u32,
    #[serde(default)]
    pub venues: Vec<VenueGames>,
    #[serde(default)]
    pub platoon: Option<PlatoonFactors>,
}

impl CombinedEstimate {
    pub fn blended_rate(&self) -> f64 {
        blend_rate(
            self.current_hr_per_pa,
            self.baseline_hr_per_pa,
            self.games_played,
            self.season_games,
        )
    }
}

/// Home-run-per-PA inputs, one variant per model. The variant doubles as
/// the model selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RateEstimate {
    Basic {
        hr_per_pa: f64,
    },
    HomeAway {
        home: f64,
        away: f64,
    },
    PitcherHandedness {
        vs_left: f64,
        vs_right: f64,
    },
    BallparkFactors {
        base_hr_per_pa: f64,
        venues: Vec<VenueGames>,
    },
    AdvancedCombined(CombinedEstimate),
}

impl RateEstimate {
    pub fn model(&self) -> ModelKind {
        match self {
            RateEstimate::Basic { .. } => ModelKind::Basic,
            RateEstimate::HomeAway { .. } => ModelKind::HomeAway,
            RateEstimate::PitcherHandedness { .. } => ModelKind::PitcherHandedness,
            RateEstimate::BallparkFactors { .. } => ModelKind::BallparkFactors,
            RateEstimate::AdvancedCombined(_) => ModelKind::AdvancedCombined,
        }
    }

    /// Check every raw input. Adjusted rates (after park and platoon
    /// multipliers) are checked when the engine builds its trial plan.
    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            RateEstimate::Basic { hr_per_pa } => check_probability("hr_per_pa", *hr_per_pa),
            RateEstimate::HomeAway { home, away } => {
                check_probability("home", *home)?;
                check_probability("away", *away)
            }
            RateEstimate::PitcherHandedness { vs_left, vs_right } => {
                check_probability("vs_left", *vs_left)?;
                check_probability("vs_right", *vs_right)
            }
            RateEstimate::BallparkFactors {
                base_hr_per_pa,
                venues,
            } => {
                check_probability("base_hr_per_pa", *base_hr_per_pa)?;
                if venues.iter().map(|v| v.games).sum::<u32>() == 0 {
                    return Err(SimError::config("venues", "schedule contains no games"));
                }
                validate_venues(venues)
            }
            RateEstimate::AdvancedCombined(c) => {
                check_probability("current_hr_per_pa", c.current_hr_per_pa)?;
                check_probability("baseline_hr_per_pa", c.baseline_hr_per_pa)?;
                if c.season_games == 0 {
                    return Err(SimError::config("season_games", "must be greater than 0"));
                }
                if !c.venues.is_empty() && c.venues.iter().map(|v| v.games).sum::<u32>() == 0 {
                    return Err(SimError::config("venues", "schedule contains no games"));
                }
                validate_venues(&c.venues)?;
                if let Some(p) = &c.platoon {
                    check_multiplier("platoon.vs_left", p.vs_left)?;
                    check_multiplier("platoon.vs_right", p.vs_right)?;
                }
                Ok(())
            }
        }
    }
}

fn validate_venues(venues: &[VenueGames]) -> Result<(), SimError> {
    for v in venues {
        check_multiplier(&format!("park_factor[{}]", v.venue), v.park_factor)?;
    }
    Ok(())
}

fn check_multiplier(field: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::config(
            field,
            format!("must be a finite non-negative multiplier, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(name: &str, games: u32, park_factor: f64) -> VenueGames {
        VenueGames {
            venue: name.into(),
            games,
            park_factor,
        }
    }

    #[test]
    fn model_names_round_trip_through_from_str() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.as_str().parse::<ModelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_model_name_is_invalid_argument() {
        let err = "poisson".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument { .. }));
    }

    #[test]
    fn serde_names_match_as_str() {
        let json = serde_json::to_string(&ModelKind::PitcherHandedness).unwrap();
        assert_eq!(json, "\"pitcher_handedness\"");
    }

    #[test]
    fn variant_selects_model() {
        let est = RateEstimate::HomeAway {
            home: 0.09,
            away: 0.07,
        };
        assert_eq!(est.model(), ModelKind::HomeAway);
    }

    #[test]
    fn rate_above_one_rejected() {
        let err = RateEstimate::Basic { hr_per_pa: 1.5 }.validate().unwrap_err();
        match err {
            SimError::InvalidConfiguration { field, .. } => assert_eq!(field, "hr_per_pa"),
            other => panic!("expected InvalidConfiguration, got: {other}"),
        }
    }

    #[test]
    fn negative_split_rate_rejected() {
        let est = RateEstimate::PitcherHandedness {
            vs_left: -0.01,
            vs_right: 0.08,
        };
        assert!(matches!(
            est.validate(),
            Err(SimError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn nan_rate_rejected() {
        let est = RateEstimate::HomeAway {
            home: f64::NAN,
            away: 0.07,
        };
        assert!(est.validate().is_err());
    }

    #[test]
    fn empty_ballpark_schedule_rejected() {
        let est = RateEstimate::BallparkFactors {
            base_hr_per_pa: 0.08,
            venues: vec![venue("Fenway Park", 0, 0.95)],
        };
        let err = est.validate().unwrap_err();
        match err {
            SimError::InvalidConfiguration { field, .. } => assert_eq!(field, "venues"),
            other => panic!("expected InvalidConfiguration, got: {other}"),
        }
    }

    #[test]
    fn negative_park_factor_rejected() {
        let est = RateEstimate::BallparkFactors {
            base_hr_per_pa: 0.08,
            venues: vec![venue("Coors Field", 3, -1.0)],
        };
        assert!(est.validate().is_err());
    }

    #[test]
    fn combined_without_layers_is_valid() {
        let est = RateEstimate::AdvancedCombined(CombinedEstimate {
            current_hr_per_pa: 0.09,
            baseline_hr_per_pa: 0.0824,
            games_played: 100,
            season_games: 162,
            venues: vec![],
            platoon: None,
        });
        assert!(est.validate().is_ok());
    }

    #[test]
    fn combined_zero_season_rejected() {
        let est = RateEstimate::AdvancedCombined(CombinedEstimate {
            current_hr_per_pa: 0.09,
            baseline_hr_per_pa: 0.0824,
            games_played: 0,
            season_games: 0,
            venues: vec![],
            platoon: None,
        });
        let err = est.validate().unwrap_err();
        match err {
            SimError::InvalidConfiguration { field, .. } => assert_eq!(field, "season_games"),
            other => panic!("expected InvalidConfiguration, got: {other}"),
        }
    }

    #[test]
    fn combined_blended_rate_uses_games_played() {
        let est = CombinedEstimate {
            current_hr_per_pa: 0.10,
            baseline_hr_per_pa: 0.06,
            games_played: 81,
            season_games: 162,
            venues: vec![],
            platoon: None,
        };
        assert!((est.blended_rate() - 0.08).abs() < 1e-12);
    }
}
