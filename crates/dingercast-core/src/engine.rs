// Monte Carlo trial generation.
//
// Every model reduces to the same trial shape:
// 1. Draw a plate-appearance total uniformly from the configured range
// 2. Allocate it across weighted segments (venues, home/away, pitcher hand)
// 3. Draw a binomial per segment at that segment's rate and sum
//
// Models differ only in how their segments are built.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution};
use tracing::debug;

use crate::config::{ShareRange, TrialConfig};
use crate::error::{check_probability, SimError};
use crate::estimate::{ModelKind, RateEstimate, VenueGames};
use crate::result::SimulationResult;

// ---------------------------------------------------------------------------
// Trial plan
// ---------------------------------------------------------------------------

/// Fixed-weight slice of a trial's plate appearances.
#[derive(Debug, Clone, Copy)]
struct Segment {
    weight: f64,
    rate: f64,
}

/// Two-way split whose share is drawn per trial. `first` and `second`
/// multiply each base segment's rate.
#[derive(Debug, Clone, Copy)]
struct SplitLayer {
    share: ShareRange,
    first: f64,
    second: f64,
}

#[derive(Debug, Clone)]
struct TrialPlan {
    base: Vec<Segment>,
    split: Option<SplitLayer>,
}

impl TrialPlan {
    fn build(estimate: &RateEstimate, config: &TrialConfig) -> Result<Self, SimError> {
        let plan = match estimate {
            RateEstimate::Basic { hr_per_pa } => TrialPlan {
                base: vec![Segment {
                    weight: 1.0,
                    rate: *hr_per_pa,
                }],
                split: None,
            },
            RateEstimate::HomeAway { home, away } => TrialPlan {
                base: unit_segment(),
                split: Some(SplitLayer {
                    share: config.home_share,
                    first: *home,
                    second: *away,
                }),
            },
            RateEstimate::PitcherHandedness { vs_left, vs_right } => TrialPlan {
                base: unit_segment(),
                split: Some(SplitLayer {
                    share: config.rhp_share,
                    first: *vs_right,
                    second: *vs_left,
                }),
            },
            RateEstimate::BallparkFactors {
                base_hr_per_pa,
                venues,
            } => TrialPlan {
                base: venue_segments(*base_hr_per_pa, venues),
                split: None,
            },
            RateEstimate::AdvancedCombined(c) => {
                let blended = c.blended_rate();
                let base = if c.venues.is_empty() {
                    vec![Segment {
                        weight: 1.0,
                        rate: blended,
                    }]
                } else {
                    venue_segments(blended, &c.venues)
                };
                TrialPlan {
                    base,
                    split: c.platoon.map(|p| SplitLayer {
                        share: config.rhp_share,
                        first: p.vs_right,
                        second: p.vs_left,
                    }),
                }
            }
        };
        plan.check_adjusted_rates()?;
        Ok(plan)
    }

    /// Every rate a trial could sample must be a probability.
    fn check_adjusted_rates(&self) -> Result<(), SimError> {
        for seg in &self.base {
            match &self.split {
                Some(split) => {
                    check_probability("adjusted_rate", seg.rate * split.first)?;
                    check_probability("adjusted_rate", seg.rate * split.second)?;
                }
                None => check_probability("adjusted_rate", seg.rate)?,
            }
        }
        Ok(())
    }

    fn run_trial<R: Rng + ?Sized>(&self, pa: u32, rng: &mut R) -> Result<u32, SimError> {
        let segments: Vec<Segment> = match &self.split {
            None => self.base.clone(),
            Some(split) => {
                let share = split.share.draw(rng);
                self.base
                    .iter()
                    .flat_map(|seg| {
                        [
                            Segment {
                                weight: seg.weight * share,
                                rate: seg.rate * split.first,
                            },
                            Segment {
                                weight: seg.weight * (1.0 - share),
                                rate: seg.rate * split.second,
                            },
                        ]
                    })
                    .collect()
            }
        };

        let weights: Vec<f64> = segments.iter().map(|s| s.weight).collect();
        let mut total = 0u32;
        for (seg, seg_pa) in segments.iter().zip(allocate_pa(pa, &weights)) {
            total += sample_home_runs(seg_pa, seg.rate, rng)?;
        }
        Ok(total)
    }
}

fn unit_segment() -> Vec<Segment> {
    vec![Segment {
        weight: 1.0,
        rate: 1.0,
    }]
}

fn venue_segments(base_rate: f64, venues: &[VenueGames]) -> Vec<Segment> {
    venues
        .iter()
        .map(|v| Segment {
            weight: v.games as f64,
            rate: base_rate * v.park_factor,
        })
        .collect()
}

/// Split `pa` across `weights` by cumulative rounding. The parts always
/// sum to `pa`; an exact half rounds toward the earlier segment.
fn allocate_pa(pa: u32, weights: &[f64]) -> Vec<u32> {
    let total_weight: f64 = weights.iter().sum();
    if weights.is_empty() || total_weight <= 0.0 {
        return vec![0; weights.len()];
    }

    let mut parts = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    let mut assigned = 0u32;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        let target = if i + 1 == weights.len() {
            pa
        } else {
            ((cumulative / total_weight) * pa as f64).round().min(pa as f64) as u32
        };
        let part = target.saturating_sub(assigned);
        parts.push(part);
        assigned += part;
    }
    parts
}

fn sample_home_runs<R: Rng + ?Sized>(pa: u32, rate: f64, rng: &mut R) -> Result<u32, SimError> {
    if pa == 0 {
        return Ok(0);
    }
    let binomial = Binomial::new(pa as u64, rate)
        .map_err(|e| SimError::config("adjusted_rate", e.to_string()))?;
    Ok(binomial.sample(rng) as u32)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run `config.num_trials` independent trials of the model selected by
/// `estimate`, drawing from `rng`.
///
/// All validation happens before the first draw, so an error never leaves
/// the random source partially consumed.
pub fn run_trials<R: Rng + ?Sized>(
    estimate: &RateEstimate,
    config: &TrialConfig,
    rng: &mut R,
) -> Result<SimulationResult, SimError> {
    config.validate()?;
    estimate.validate()?;
    let plan = TrialPlan::build(estimate, config)?;

    let mut totals = Vec::with_capacity(config.num_trials as usize);
    for _ in 0..config.num_trials {
        let pa = rng.gen_range(config.pa_low..=config.pa_high);
        totals.push(plan.run_trial(pa, rng)?);
    }

    let result = SimulationResult::from_totals(totals, &config.thresholds);
    debug!(
        model = %estimate.model(),
        trials = config.num_trials,
        mean = result.mean(),
        "simulation complete"
    );
    Ok(result)
}

/// Seed for `model`'s private random stream, derived from a shared base
/// seed. Streams for different models never coincide for the same base.
pub fn derive_seed(base: u64, model: ModelKind) -> u64 {
    let index = ModelKind::ALL
        .iter()
        .position(|k| *k == model)
        .unwrap_or_default() as u64;
    // SplitMix64 finalizer over base + index
    let mut z = base.wrapping_add((index + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A simulation engine that owns its configuration and random source.
pub struct Simulator {
    config: TrialConfig,
    rng: StdRng,
}

impl Simulator {
    pub fn new(config: TrialConfig, rng: StdRng) -> Self {
        Simulator { config, rng }
    }

    /// Reproducible engine: equal seeds give bit-identical results.
    pub fn seeded(config: TrialConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn run(&mut self, estimate: &RateEstimate) -> Result<SimulationResult, SimError> {
        run_trials(estimate, &self.config, &mut self.rng)
    }

    /// Run each estimate in order against the shared random source.
    pub fn run_all(
        &mut self,
        estimates: &[RateEstimate],
    ) -> Result<Vec<(ModelKind, SimulationResult)>, SimError> {
        estimates
            .iter()
            .map(|est| Ok((est.model(), self.run(est)?)))
            .collect()
    }
}
