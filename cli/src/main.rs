//! CLI entrypoint for pact-coordinator
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::Parser;
use pact_application::{
    AdaptIntentsUseCase, CoordinateAgentsUseCase, FailureDetector, HistoryStore, InMemoryHistory,
    IntentHealthMonitor, MissionControl, NotificationSink,
};
use pact_domain::{AgentId, MissionId};
use pact_infrastructure::{
    AlertBusError, BroadcastAlertSink, ConfigLoader, FanoutAlertSink, FileConfig, HistoryBackend,
    JsonlHistoryStore, ScenarioFile, ScenarioLoader, TracingAlertSink, TracingTelemetrySink,
};
use pact_presentation::{Cli, Command, OutputFormat, formatter_for};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting pact-coordinator");

    if cli.command == Command::ShowConfig {
        show_config(cli.config.as_deref());
        return Ok(());
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    // === Dependency Injection ===
    let bus = Arc::new(BroadcastAlertSink::new(config.alerts.broadcast_capacity));
    let log_sink: Arc<dyn NotificationSink> = Arc::new(TracingAlertSink);
    let bus_sink: Arc<dyn NotificationSink> = bus.clone();
    let alerts = Arc::new(FanoutAlertSink::new(vec![log_sink, bus_sink]));
    let control = Arc::new(
        MissionControl::new(config.to_control_params())
            .with_history(open_history(&config)?)
            .with_alerts(alerts)
            .with_telemetry(Arc::new(TracingTelemetrySink)),
    );

    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::load(path)?,
        None => {
            warn!("No scenario given (--scenario); starting with an empty world");
            ScenarioFile::default()
        }
    };
    ScenarioLoader::seed(&scenario, &control, Utc::now()).await?;

    let formatter = formatter_for(cli.output);

    match cli.command {
        Command::Coordinate { name, repeat } => {
            let request = ScenarioLoader::coordination(&scenario, &name)?.clone();
            let use_case = CoordinateAgentsUseCase::new(control.clone());

            let mut tasks = JoinSet::new();
            for _ in 0..repeat.max(1) {
                let use_case = use_case.clone();
                let request = request.clone();
                tasks.spawn(async move {
                    use_case
                        .execute(
                            &request.agent_a,
                            &request.agent_b,
                            &request.task,
                            &request.mission,
                        )
                        .await
                });
            }
            while let Some(joined) = tasks.join_next().await {
                let outcome = joined.context("Coordination task panicked")?;
                println!("{}", formatter.format_coordination(&outcome));
            }
            println!("{}", formatter.format_metrics(&control.performance_metrics()));
        }
        Command::SimulateFailure { agent } => {
            let detector = FailureDetector::new(control.clone());
            let responses = detector
                .simulate_failure(&AgentId::new(agent), Utc::now())
                .await?;
            println!("{}", formatter.format_failures(&responses));
        }
        Command::Adapt {
            trigger,
            mission,
            assets,
        } => {
            let assets: Vec<AgentId> = assets.into_iter().map(AgentId::new).collect();
            let mission = mission.map(MissionId::new);
            let outcome = AdaptIntentsUseCase::new(control.clone())
                .trigger_adaptation(&trigger, &assets, mission.as_ref())
                .await?;
            println!("{}", formatter.format_adaptation(&outcome));
        }
        Command::Health => {
            let report = IntentHealthMonitor::new(control.clone())
                .sweep(Utc::now())
                .await;
            println!("{}", formatter.format_health(&report));
        }
        Command::Monitor { for_secs } => {
            monitor(control, &bus, cli.output, for_secs).await?;
        }
        Command::ShowConfig => {}
    }

    Ok(())
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_file {
        Some(path) => {
            let Some(file_name) = path.file_name() else {
                bail!("--log-file must name a file: {}", path.display());
            };
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

fn open_history(config: &FileConfig) -> Result<Arc<dyn HistoryStore>> {
    match config.history.parse_backend()? {
        HistoryBackend::Memory => Ok(Arc::new(InMemoryHistory::new())),
        HistoryBackend::Jsonl => {
            let path = config
                .history
                .resolved_path()
                .context("No data directory available; set history.path")?;
            let store = JsonlHistoryStore::open(&path)
                .with_context(|| format!("Failed to open history at {}", path.display()))?;
            info!("Recording plan history to {}", path.display());
            Ok(Arc::new(store))
        }
    }
}

fn show_config(explicit: Option<&Path>) {
    println!("Configuration files (in priority order):");
    for (label, path, exists) in ConfigLoader::config_sources(explicit) {
        let marker = if exists { "found" } else { "not found" };
        println!("  {:<9} {} ({})", format!("{label}:"), path.display(), marker);
    }
}

/// Run the background loops, printing alerts as they arrive.
async fn monitor(
    control: Arc<MissionControl>,
    bus: &BroadcastAlertSink,
    output: OutputFormat,
    for_secs: Option<u64>,
) -> Result<()> {
    let cancel = control.shutdown_token();

    let mut alerts = bus.subscribe();
    let printer_cancel = cancel.clone();
    let printer = tokio::spawn(async move {
        let formatter = formatter_for(output);
        loop {
            tokio::select! {
                _ = printer_cancel.cancelled() => break,
                received = alerts.recv() => match received {
                    Ok(alert) => println!("{}", formatter.format_alert(&alert)),
                    Err(AlertBusError::Lagged(_)) => continue,
                    Err(_) => break,
                },
            }
        }
    });

    let detector = Arc::new(FailureDetector::new(control.clone()));
    let health = Arc::new(IntentHealthMonitor::new(control.clone()));
    let detector_task = tokio::spawn(detector.run(cancel.clone()));
    let health_task = tokio::spawn(health.run(cancel.clone()));

    match for_secs {
        Some(secs) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => result?,
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            }
        }
        None => {
            eprintln!("Monitoring; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("Shutting down monitor");
    control.shutdown();
    detector_task.await.context("Failure detector panicked")?;
    health_task.await.context("Health monitor panicked")?;
    printer.await.context("Alert printer panicked")?;

    let formatter = formatter_for(output);
    println!("{}", formatter.format_metrics(&control.performance_metrics()));
    Ok(())
}
