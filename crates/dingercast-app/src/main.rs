// Season home-run forecast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the report)
// 2. Parse arguments
// 3. Load config
// 4. Load season inputs, build rate estimates
// 5. Run models concurrently
// 6. Print the JSON report

use dingercast::cli::CliArgs;
use dingercast::config;
use dingercast::estimates;
use dingercast::inputs;
use dingercast::report::ForecastReport;
use dingercast::runner;

use anyhow::Context;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("dingercast starting up");

    // 2. Parse arguments
    let args = CliArgs::parse(std::env::args().skip(1)).context("invalid arguments")?;

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} trials, PA range [{}, {}], thresholds {:?}",
        config.trials.num_trials,
        config.trials.pa_low,
        config.trials.pa_high,
        config.trials.thresholds
    );

    // 4. Load season inputs and build estimates
    let season = inputs::load_all(&config).context("failed to load season inputs")?;
    info!(
        "Loaded season stats ({} HR in {} PA over {} games), {} remaining games, {} park factors",
        season.stats.current.home_runs,
        season.stats.current.plate_appearances,
        season.stats.current.games_played,
        season.schedule.len(),
        season.park_factors.len()
    );
    let estimates = estimates::build_estimates(&args.models, &season, &config);
    let trials = estimates::season_trial_config(&season, &config);

    // 5. Run models
    let seed = config.seed.unwrap_or_else(rand::random);
    let outcomes = runner::run_models(estimates, &trials, seed)
        .await
        .context("simulation run failed")?;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => info!(
                "{}: mean {:.1} HR, 90% interval [{:.1}, {:.1}]",
                outcome.model,
                result.mean(),
                result.percentile_5(),
                result.percentile_95()
            ),
            Err(e) => error!("{} rejected its inputs: {}", outcome.model, e),
        }
    }

    // 6. Print the report
    let report = ForecastReport::build(
        &outcomes,
        &season.stats.current,
        trials.num_trials,
        seed,
        args.include_distribution,
    );
    println!("{}", report.to_json_pretty().context("failed to serialize report")?);

    info!("dingercast finished");
    Ok(())
}

/// Initialize tracing to log to a file so stdout only carries the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("dingercast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dingercast=info,dingercast_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
