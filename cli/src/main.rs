//! CLI entrypoint for prompt-arena
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use arena_application::{
    CheckHealthUseCase, CircuitBreaker, Dispatcher, ResilientClient, RunBattleInput,
    RunBattleUseCase,
};
use arena_domain::{PromptText, RolePair};
use arena_infrastructure::{ConfigLoader, FileConfig, HttpCompletionGateway, JsonlBattleLogger};
use arena_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;

    info!("Starting prompt-arena");

    let issues = config.validate();
    if !issues.is_empty() {
        let list = issues
            .iter()
            .map(|issue| format!("  - {}", issue))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Invalid configuration:\n{}", list);
    }

    ConsoleFormatter::set_color(config.output.color && !cli.no_color);
    let format = cli
        .output
        .or(config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Full);

    // === Dependency Injection ===
    let client = Arc::new(build_client(&config)?);

    if let Some(models) = cli.health_models() {
        let reports = CheckHealthUseCase::new(client).check_all(&models).await;
        let output = match format {
            OutputFormat::Json => ConsoleFormatter::format_health_json(&reports),
            _ => ConsoleFormatter::format_health(&reports),
        };
        println!("{}", output);
        return Ok(());
    }

    let Some(prompt) = cli.prompt.as_deref() else {
        bail!("A prompt is required. Use --health to check models instead.");
    };

    let mut params = config.battle.to_params();
    if let Some(max_rounds) = cli.max_rounds {
        params = params.with_max_rounds(max_rounds);
    }

    let mut input = RunBattleInput::new(PromptText::try_new(prompt)?);
    if let Some(category) = cli.category {
        input = input.with_category(category);
    }
    if let Some((improver, reviewer)) = cli.role_models() {
        input = input.with_models(RolePair::new(improver, reviewer)?);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; the battle stops after the current round");
            ctrl_c.cancel();
        }
    });

    let mut use_case = RunBattleUseCase::new(client, params).with_cancellation(cancel);

    let battle_log = cli
        .battle_log
        .clone()
        .or_else(|| config.logging.battle_log.as_ref().map(PathBuf::from));
    if let Some(path) = battle_log {
        match JsonlBattleLogger::open(&path) {
            Some(logger) => use_case = use_case.with_logger(Arc::new(logger)),
            None => warn!("Battle log disabled: cannot open {}", path.display()),
        }
    }

    if !cli.quiet && format == OutputFormat::Full {
        eprintln!();
        eprintln!("+============================================================+");
        eprintln!("|              Prompt Arena - Prompt Battle                  |");
        eprintln!("+============================================================+");
        eprintln!();
        eprintln!("Prompt: {}", prompt);
        eprintln!();
    }

    let result = if cli.quiet {
        use_case.execute(input).await?
    } else {
        let progress = ProgressReporter::new();
        let result = use_case.execute_with_progress(input, &progress).await;
        progress.finish_and_clear();
        result?
    };

    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Prompt => ConsoleFormatter::format_prompt_only(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    Ok(())
}

/// Install the tracing subscriber: stderr always, plus an optional log file
fn init_logging(verbose: u8, file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let path = Path::new(path);
            let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
                bail!("Invalid log file path: {}", path.display());
            };
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Build the resilient call stack shared by battles and health checks
fn build_client(config: &FileConfig) -> Result<ResilientClient<HttpCompletionGateway>> {
    let gateway = Arc::new(HttpCompletionGateway::from_config(&config.endpoint)?);
    info!("Completion endpoint: {}", gateway.url());

    let dispatcher = Arc::new(Dispatcher::new(config.dispatcher.to_dispatcher_config()));
    let breaker = Arc::new(CircuitBreaker::new(config.breaker.to_breaker_config()));

    Ok(ResilientClient::new(
        gateway,
        dispatcher,
        breaker,
        config.retry.to_retry_config(),
    ))
}
