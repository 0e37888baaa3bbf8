//! Headless host for the Dynasty simulation kernel.
//!
//! Wires configuration, world generation and the initial population into a
//! [`SimulationContext`], then advances it on a wall-clock cadence until a
//! termination condition is met. There is no renderer; every kernel event
//! is logged as structured JSON instead.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$DYNASTY_CONFIG` (default
//!    `dynasty-config.yaml`), falling back to defaults when absent
//! 2. Initialize structured logging (tracing), honouring `RUST_LOG`
//! 3. Generate the grid from the world seed
//! 4. Create the simulation context and spawn the configured characters
//! 5. Run the tick loop (paced, or unpaced when `tick_interval_ms` is 0)
//! 6. Audit the legacy ledger and log the result

mod error;
mod reporter;
mod spawner;

use std::path::PathBuf;
use std::time::Duration;

use dynasty_core::config::LogFormat;
use dynasty_core::runner::log_simulation_end;
use dynasty_core::{
    SimulationConfig, SimulationContext, SimulationEndReason, SimulationResult, TickCallback,
    TickReport, step,
};
use dynasty_ledger::ConservationResult;
use dynasty_world::GridMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::reporter::LogReporter;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "DYNASTY_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "dynasty-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or a tick fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!(
        source = source.as_deref().map(|path| path.display().to_string()),
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        tick_delta_ms = config.world.tick_delta_ms,
        "Configuration loaded"
    );

    // 3-4. Build the world and populate it.
    let mut context = build_context(&config)?;
    spawner::spawn_initial(&config, &mut context)?;

    // 5. Run.
    let mut reporter = LogReporter::new(
        config.simulation.leaderboard_every,
        config.simulation.leaderboard_size,
    );
    let result = run_loop(&config, &mut context, &mut reporter).await?;

    // 6. Final accounting.
    reporter.log_leaderboard(&context);
    match context.audit_legacy() {
        ConservationResult::Balanced => info!("Legacy ledger balanced"),
        ConservationResult::Anomaly(anomaly) => warn!(%anomaly, "Legacy ledger anomaly"),
    }
    log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "dynasty-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration named by [`CONFIG_ENV`], or the default path.
///
/// A missing file yields defaults (with environment overrides applied);
/// the returned path is `None` in that case.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &SimulationConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_unset) => {
            EnvFilter::try_new(&config.logging.level).map_err(|error| EngineError::Logging {
                message: format!("invalid log level {:?}: {error}", config.logging.level),
            })?
        }
    };

    let installed = match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };
    installed.map_err(|error| EngineError::Logging {
        message: error.to_string(),
    })
}

/// Generate the grid and wrap it in a fresh context.
fn build_context(config: &SimulationConfig) -> Result<SimulationContext, EngineError> {
    let world = &config.world;
    let mut rng = StdRng::seed_from_u64(world.seed);
    let grid = GridMap::scattered(
        world.name.clone(),
        world.rows,
        world.cols,
        world.blocked_density,
        &mut rng,
    )?;
    info!(
        rows = world.rows,
        cols = world.cols,
        blocked = grid.blocked_count(),
        "World generated"
    );
    Ok(SimulationContext::new(
        Box::new(grid),
        config.kernel_settings(),
    ))
}

/// Advance `context` until the tick limit, extinction or Ctrl-C.
async fn run_loop(
    config: &SimulationConfig,
    context: &mut SimulationContext,
    reporter: &mut dyn TickCallback,
) -> Result<SimulationResult, EngineError> {
    let max_ticks = config.simulation.max_ticks;
    let delta_ms = config.world.tick_delta_ms;
    let mut interval = (config.world.tick_interval_ms > 0).then(|| {
        let mut interval =
            tokio::time::interval(Duration::from_millis(config.world.tick_interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_summary: Option<TickReport> = None;
    let mut total_ticks: u64 = 0;
    info!(max_ticks, delta_ms, alive = context.alive_count(), "Entering tick loop");

    let end_reason = loop {
        if max_ticks != 0 && total_ticks >= max_ticks {
            break SimulationEndReason::TickLimit;
        }

        if let Some(interval) = interval.as_mut() {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => break SimulationEndReason::Interrupted,
            }
        } else {
            tokio::select! {
                biased;
                _ = &mut shutdown => break SimulationEndReason::Interrupted,
                () = tokio::task::yield_now() => {}
            }
        }

        let report = step(context, delta_ms, reporter)?;
        total_ticks = total_ticks.saturating_add(1);
        last_summary = Some(report);

        if report.is_extinct() {
            break SimulationEndReason::Extinction;
        }
    };

    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
    })
}
