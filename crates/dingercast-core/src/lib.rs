// Home-run forecasting core: Monte Carlo trial generation and distribution
// summaries. Inputs arrive as plain rates and counts; no I/O happens here.

pub mod blend;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod result;

pub use blend::{blend_rate, current_season_weight};
pub use config::{ShareRange, TrialConfig};
pub use engine::{derive_seed, run_trials, Simulator};
pub use error::SimError;
pub use estimate::{CombinedEstimate, ModelKind, PlatoonFactors, RateEstimate, VenueGames};
pub use result::{SimulationResult, SimulationSummary};
