// Trial configuration: how many trials, how many plate appearances per
// trial, and how plate appearances split across contexts.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_probability, SimError};

pub const DEFAULT_NUM_TRIALS: u32 = 2500;
pub const DEFAULT_PA_LOW: u32 = 600;
pub const DEFAULT_PA_HIGH: u32 = 700;
pub const DEFAULT_HOME_SHARE: f64 = 0.5;
pub const DEFAULT_RHP_SHARE: f64 = 0.75;
pub const DEFAULT_THRESHOLDS: [u32; 3] = [40, 50, 60];

// ---------------------------------------------------------------------------
// ShareRange
// ---------------------------------------------------------------------------

/// Fraction of a trial's plate appearances assigned to one side of a split.
///
/// When `low == high` the share is fixed. Otherwise a fresh share is drawn
/// uniformly from `[low, high]` for every trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareRange {
    pub low: f64,
    pub high: f64,
}

impl ShareRange {
    pub fn fixed(share: f64) -> Self {
        ShareRange {
            low: share,
            high: share,
        }
    }

    pub fn between(low: f64, high: f64) -> Self {
        ShareRange { low, high }
    }

    pub fn is_fixed(&self) -> bool {
        self.low == self.high
    }

    pub(crate) fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.is_fixed() {
            self.low
        } else {
            rng.gen_range(self.low..=self.high)
        }
    }

    fn validate(&self, field: &str) -> Result<(), SimError> {
        check_probability(&format!("{field}.low"), self.low)?;
        check_probability(&format!("{field}.high"), self.high)?;
        if self.low > self.high {
            return Err(SimError::config(
                field,
                format!("low ({}) must not exceed high ({})", self.low, self.high),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TrialConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    pub num_trials: u32,
    /// Inclusive lower bound of the per-trial plate-appearance draw.
    pub pa_low: u32,
    /// Inclusive upper bound of the per-trial plate-appearance draw.
    pub pa_high: u32,
    pub home_share: ShareRange,
    pub rhp_share: ShareRange,
    /// Home-run totals reported as "probability of exceeding".
    pub thresholds: Vec<u32>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        TrialConfig {
            num_trials: DEFAULT_NUM_TRIALS,
            pa_low: DEFAULT_PA_LOW,
            pa_high: DEFAULT_PA_HIGH,
            home_share: ShareRange::fixed(DEFAULT_HOME_SHARE),
            rhp_share: ShareRange::fixed(DEFAULT_RHP_SHARE),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl TrialConfig {
    pub fn with_trials(mut self, num_trials: u32) -> Self {
        self.num_trials = num_trials;
        self
    }

    pub fn with_pa_range(mut self, pa_low: u32, pa_high: u32) -> Self {
        self.pa_low = pa_low;
        self.pa_high = pa_high;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_trials == 0 {
            return Err(SimError::config("num_trials", "must be greater than 0"));
        }
        if self.pa_low > self.pa_high {
            return Err(SimError::config(
                "pa_range",
                format!(
                    "empty plate-appearance range [{}, {}]",
                    self.pa_low, self.pa_high
                ),
            ));
        }
        self.home_share.validate("home_share")?;
        self.rhp_share.validate("rhp_share")?;
        Ok(())
    }
}
