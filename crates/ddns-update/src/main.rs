// # ddns-update - one-shot DDNS updater
//
// Thin integration layer: parse the command line, load the configuration,
// wire the HTTP resolver and the LiveDNS client into the
// `ReconciliationEngine`, run it once and report the outcome.
//
// DNS logic lives in ddns-core. Scheduling (cron, systemd timers) is left to
// the host; this binary performs exactly one pass and exits.
//
// ## Usage
//
// ```bash
// ddns-update -c /etc/ddns/config.toml --log /var/log/ddns.log
// ddns-update --dry-run
// ```
//
// ## Environment
//
// - `DDNS_API_KEY`: overrides `api.key` from the configuration file
// - `DDNS_LOG_LEVEL`: overrides the diagnostic level (trace..error)

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsConfig, IpFile, Outcome, ReconciliationEngine};
use ddns_ip_http::HttpIpResolver;
use ddns_provider_livedns::LiveDnsClient;
use report::RunReport;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Configuration file used when `--conf` is not given
const DEFAULT_CONFIG: &str = "config.toml";

/// Template shipped next to the binary
const CONFIG_TEMPLATE: &str = "config.toml-dist";

/// Environment variable overriding the diagnostic level
const LOG_LEVEL_ENV: &str = "DDNS_LOG_LEVEL";

/// Exit codes for the different ways a run can end
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Records up to date or updated
    Success = 0,
    /// The run ended with an error outcome
    RunFailed = 1,
    /// Configuration, logging or runtime setup failed
    StartupError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "ddns-update")]
#[command(about = "Point DNS records of a LiveDNS zone at the current public IP", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long = "conf", default_value = DEFAULT_CONFIG)]
    conf: PathBuf,

    /// Show the changes without performing them
    #[arg(long)]
    dry_run: bool,

    /// Append the result line to this file
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Write the resolved IP to this file when it changes
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,

    /// Log requests and responses
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Diagnostic level selected by the flags
    fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose || self.dry_run {
            Level::INFO
        } else {
            Level::WARN
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match std::env::var(LOG_LEVEL_ENV) {
        Ok(value) => match parse_level(&value) {
            Some(level) => level,
            None => {
                eprintln!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    LOG_LEVEL_ENV, value
                );
                return DdnsExitCode::StartupError.into();
            }
        },
        Err(_) => args.log_level(),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::StartupError.into();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::StartupError.into();
        }
    };

    debug!("Configuration loaded: {:?}", config);

    // A single pass with a handful of sequential requests
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::StartupError.into();
        }
    };

    let result = rt.block_on(async {
        match run_once(&args, &config).await {
            Ok(outcome) if outcome.is_success() => DdnsExitCode::Success,
            Ok(_) => DdnsExitCode::RunFailed,
            Err(e) => {
                eprintln!("{:#}", e);
                DdnsExitCode::StartupError
            }
        }
    });

    result.into()
}

/// Load, override, normalize and validate the configuration
fn load_config(args: &Args) -> Result<DdnsConfig> {
    if !args.conf.exists() && args.conf == Path::new(DEFAULT_CONFIG) {
        anyhow::bail!(
            "{} not found. Copy {} to {} and fill in your API key and domain",
            DEFAULT_CONFIG,
            CONFIG_TEMPLATE,
            DEFAULT_CONFIG
        );
    }

    let content = std::fs::read_to_string(&args.conf)
        .with_context(|| format!("Failed to read {}", args.conf.display()))?;

    let config = DdnsConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid configuration in {}", args.conf.display()))?
        .with_env_overrides()
        .with_dry_run(args.dry_run)
        .normalize_domain();

    config.validate()?;
    Ok(config)
}

/// Run one reconciliation pass and report it
///
/// Errors returned here are setup failures; run failures come back as an
/// `Outcome::Error`.
async fn run_once(args: &Args, config: &DdnsConfig) -> Result<Outcome> {
    let resolver = HttpIpResolver::from_config(&config.ip)?;
    let client = LiveDnsClient::from_config(&config.api)?;

    let (engine, mut events) =
        ReconciliationEngine::new(Box::new(resolver), Box::new(client), config)?;

    if config.dry_run {
        info!("[DRY-RUN] No record will be modified");
    }

    let outcome = engine.run().await;

    // The engine is done: drop it so the channel closes once drained
    drop(engine);
    let mut report = RunReport::new(config.dry_run);
    while let Some(event) = events.recv().await {
        report.observe(event);
    }

    if let (Some(path), Some(ip)) = (&args.out, report.ip()) {
        let ip_file = IpFile::new(path);
        if let Err(e) = ip_file.record(ip).await {
            warn!("Could not write IP file {}: {}", ip_file.path().display(), e);
        }
    }

    if config.dry_run {
        for line in report.plan_lines() {
            println!("[DRY-RUN] {}", line);
        }
        if let Some(line) = report.unchanged_line() {
            println!("[DRY-RUN] {}", line);
        }
    }

    let line = report::log_line(chrono::Local::now(), &report.message(&outcome), &outcome);
    println!("{}", line);

    if let Some(path) = &args.log
        && let Err(e) = report::append_line(path, &line).await
    {
        error!("Could not append to log file {}: {}", path.display(), e);
    }

    Ok(outcome)
}

fn parse_level(value: &str) -> Option<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
