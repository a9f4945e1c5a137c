//! CLI entrypoint for planning-poker
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use poker_application::{
    LocalConnector, RunSimulationInput, RunSimulationUseCase, SessionRegistry, SimulationProgress,
};
use poker_infrastructure::{ConfigLoader, FileConfig, SystemClock, build_router, serve};
use poker_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_ITEMS: [&str; 3] = ["Login page", "Password reset", "Profile settings"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init_logging(cli.verbose, cli.log_format, cli.log_file.as_deref())?;

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_isolated(cli.config.as_deref())
    } else {
        ConfigLoader::load(cli.config.as_ref())
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Command::Serve { host, port } => run_server(config, host, port).await,
        Command::Simulate {
            voters,
            items,
            session,
            seed,
            max_think_ms,
            output,
            quiet,
        } => {
            let items = if items.is_empty() {
                DEFAULT_ITEMS.iter().map(|s| s.to_string()).collect()
            } else {
                items
            };
            let input = RunSimulationInput::new(session, items)
                .with_voters(voters)
                .with_seed(seed)
                .with_think_time_ms(max_think_ms.min(50)..=max_think_ms);
            run_simulation(config, input, output, quiet).await
        }
        Command::Config { show_sources } => {
            if show_sources {
                ConfigLoader::print_config_sources(cli.config.as_ref());
            } else {
                let rendered =
                    toml::to_string_pretty(&config).context("Failed to render configuration")?;
                print!("{}", rendered);
            }
            Ok(())
        }
    }
}

fn registry_for(config: &FileConfig) -> Arc<SessionRegistry> {
    Arc::new(SessionRegistry::new(
        config.session.to_defaults(),
        config.sync.to_options(),
        Arc::new(SystemClock),
    ))
}

async fn run_server(mut config: FileConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().context("Invalid configuration")?;

    // === Dependency Injection ===
    let registry = registry_for(&config);
    let router = build_router(registry, &config.server.allowed_origins);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => warn!("Could not listen for ctrl-c: {}", e),
        }
        signal.cancel();
    });

    let address = config.server.bind_address();
    info!(%address, "Starting planning-poker server");
    serve(&address, router, shutdown).await?;
    Ok(())
}

async fn run_simulation(
    config: FileConfig,
    input: RunSimulationInput,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let threshold = config.session.consensus_threshold;
    let connector = Arc::new(LocalConnector::new(registry_for(&config)));
    let use_case = RunSimulationUseCase::new(connector, threshold);

    // No progress lines around JSON so stdout stays parseable
    let progress: Option<Box<dyn SimulationProgress>> = match (quiet, output) {
        (true, _) => None,
        (false, OutputFormat::Json) => None,
        (false, OutputFormat::Summary) => Some(Box::new(SimpleProgress)),
        (false, OutputFormat::Full) => Some(Box::new(ProgressReporter::new())),
    };

    let report = match progress {
        Some(progress) => use_case.execute_with_progress(input, progress.as_ref()).await?,
        None => use_case.execute(input).await?,
    };

    let rendered = match output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", rendered);

    Ok(())
}
