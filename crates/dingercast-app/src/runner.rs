// Runs the requested models concurrently, one blocking task per model.
//
// Each task owns its estimate, a clone of the trial config, and a random
// stream seeded by `derive_seed(base_seed, model)`, so nothing is shared
// between tasks and a fixed base seed reproduces the whole report.

use dingercast_core::{
    derive_seed, ModelKind, RateEstimate, SimError, SimulationResult, Simulator, TrialConfig,
};
use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("simulation task for model `{model}` did not complete: {source}")]
    TaskFailed {
        model: ModelKind,
        source: tokio::task::JoinError,
    },
}

/// Outcome of one model's simulation. Invalid inputs for one model do not
/// prevent the others from reporting.
#[derive(Debug)]
pub struct ModelOutcome {
    pub model: ModelKind,
    pub result: Result<SimulationResult, SimError>,
}

/// Simulate every estimate on the blocking pool and return outcomes in the
/// order the estimates were given.
pub async fn run_models(
    estimates: Vec<RateEstimate>,
    trials: &TrialConfig,
    base_seed: u64,
) -> Result<Vec<ModelOutcome>, RunnerError> {
    info!(
        "Running {} model(s), {} trials each, base seed {}",
        estimates.len(),
        trials.num_trials,
        base_seed
    );

    let tasks = estimates.into_iter().map(|estimate| {
        let model = estimate.model();
        let config = trials.clone();
        let seed = derive_seed(base_seed, model);
        let handle = tokio::task::spawn_blocking(move || {
            debug!(%model, seed, "simulation task started");
            Simulator::seeded(config, seed).run(&estimate)
        });
        async move { (model, handle.await) }
    });

    let mut outcomes = Vec::new();
    for (model, joined) in join_all(tasks).await {
        let result = joined.map_err(|source| RunnerError::TaskFailed { model, source })?;
        outcomes.push(ModelOutcome { model, result });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimates() -> Vec<RateEstimate> {
        vec![
            RateEstimate::Basic { hr_per_pa: 0.0824 },
            RateEstimate::HomeAway {
                home: 0.0909,
                away: 0.0744,
            },
            RateEstimate::PitcherHandedness {
                vs_left: 0.0870,
                vs_right: 0.0808,
            },
        ]
    }

    #[tokio::test]
    async fn outcomes_follow_input_order() {
        let trials = TrialConfig::default().with_trials(200);
        let outcomes = run_models(estimates(), &trials, 42).await.unwrap();
        let models: Vec<ModelKind> = outcomes.iter().map(|o| o.model).collect();
        assert_eq!(
            models,
            vec![
                ModelKind::Basic,
                ModelKind::HomeAway,
                ModelKind::PitcherHandedness
            ]
        );
        for outcome in &outcomes {
            assert_eq!(outcome.result.as_ref().unwrap().num_trials(), 200);
        }
    }

    #[tokio::test]
    async fn concurrent_run_matches_sequential_seeded_run() {
        let trials = TrialConfig::default().with_trials(300);
        let outcomes = run_models(estimates(), &trials, 7).await.unwrap();
        for (outcome, estimate) in outcomes.iter().zip(estimates()) {
            let expected = Simulator::seeded(trials.clone(), derive_seed(7, estimate.model()))
                .run(&estimate)
                .unwrap();
            assert_eq!(outcome.result.as_ref().unwrap(), &expected);
        }
    }

    #[tokio::test]
    async fn invalid_model_reports_error_without_failing_others() {
        let trials = TrialConfig::default().with_trials(100);
        let estimates = vec![
            RateEstimate::Basic { hr_per_pa: 0.08 },
            RateEstimate::BallparkFactors {
                base_hr_per_pa: 0.08,
                venues: vec![],
            },
        ];
        let outcomes = run_models(estimates, &trials, 1).await.unwrap();
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(SimError::InvalidConfiguration { .. })
        ));
    }
}
