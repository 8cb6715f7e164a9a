//! Recipient CLI: classify input, resolve domains, build URIs, drive an address field.

mod logging;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use is_terminal::IsTerminal;
use serde_json::json;
use tracing::debug;

use recipient_core::{
    resolve_with_timeout, AgentError, Classification, Network, OutputMode, PaymentRequest,
    RecipientConfig, RecipientError, Ticker,
};

use logging::LogFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Auto,
    Json,
    Human,
}

/// CLI-only enum to satisfy clap's ValueEnum without adding clap to core.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNetwork {
    Mainnet,
    Testnet,
}

impl CliNetwork {
    fn to_core(self) -> Network {
        match self {
            CliNetwork::Mainnet => Network::Mainnet,
            CliNetwork::Testnet => Network::Testnet,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "recipient", version)]
#[command(about = "Classify recipient input, resolve blockchain domains, build payment URIs")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Network override (mainnet/testnet).
    #[arg(long, value_enum, global = true)]
    network: Option<CliNetwork>,

    /// Output format: auto (tty=human, pipe=agent), json (agent), human (operator).
    #[arg(long, value_enum, default_value = "auto", global = true)]
    output: OutputFormat,

    /// Accept resolved domain addresses without waiting for confirmation.
    #[arg(long, global = true)]
    yes: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decide whether INPUT is a payment request, a domain name, or literal text.
    Classify { input: String },
    /// Resolve a blockchain domain to an address.
    Resolve {
        domain: String,
        /// Currency ticker whose address record to read (defaults to config).
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Build a litecoin: payment URI.
    Uri {
        #[arg(long)]
        address: String,
        /// Amount in LTC.
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Drive an address field from stdin, one action per line.
    Session,
}

/// Detect output mode based on CLI flags and TTY detection.
fn detect_output_mode(output: OutputFormat) -> OutputMode {
    match output {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Agent,
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputMode::Human
            } else {
                OutputMode::Agent
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<RecipientConfig> {
    let mut config = match &cli.config {
        Some(path) => RecipientConfig::load(path).map_err(RecipientError::from)?,
        None => RecipientConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network.to_core();
    }
    debug!(
        path = ?cli.config,
        network = %config.network,
        provider = ?config.resolver.provider,
        "configuration loaded"
    );
    Ok(config)
}

fn emit_json(value: &serde_json::Value) -> Result<()> {
    let json = serde_json::to_string(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn classify(mode: OutputMode, config: &RecipientConfig, input: &str) -> Result<i32> {
    let classification = config.classifier().classify(input);

    match mode {
        OutputMode::Human => render::print_classification(input, &classification),
        OutputMode::Agent => emit_json(&json!({
            "input": input,
            "network": config.network.as_str(),
            "classification": classification,
        }))?,
    }

    Ok(match classification {
        Classification::Literal => 1,
        Classification::PaymentRequest(_) | Classification::Domain(_) => 0,
    })
}

async fn resolve(
    mode: OutputMode,
    config: &RecipientConfig,
    domain: &str,
    ticker: Option<&str>,
) -> Result<i32> {
    let name = config
        .suffixes()
        .match_domain(domain)
        .ok_or_else(|| RecipientError::NotADomain(domain.trim().to_string()))?;
    let ticker = ticker.map(Ticker::new).unwrap_or_else(|| config.ticker.clone());
    let resolver = config.build_resolver().map_err(RecipientError::from)?;

    let pb = render::spinner(mode, &format!("Resolving {name}…"));
    let result = resolve_with_timeout(resolver.as_ref(), &name, &ticker, config.resolver_timeout())
        .await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let address = result.map_err(RecipientError::from)?;

    match mode {
        OutputMode::Human => {
            render::human_header("RECIPIENT — Domain Resolved");
            println!("{} {} → {}", "✓".green(), name.as_str().bold(), address.green());
            println!(
                "{}",
                format!("{} record via {} resolver", ticker, resolver.name()).bright_black()
            );
        }
        OutputMode::Agent => emit_json(&json!({
            "domain": name,
            "ticker": ticker,
            "address": address,
            "provider": resolver.name(),
        }))?,
    }

    Ok(0)
}

fn build_uri(
    mode: OutputMode,
    config: &RecipientConfig,
    address: &str,
    amount: Option<&str>,
    label: Option<&str>,
    message: Option<&str>,
) -> Result<i32> {
    let request = PaymentRequest::build(address, amount, label, message, config.network)?;
    let uri = request.to_uri();

    match mode {
        OutputMode::Human => {
            render::human_header("RECIPIENT — Payment URI");
            println!("{}", render::request_table(&request));
            println!();
            println!("{}", uri.bright_white().bold());
        }
        OutputMode::Agent => emit_json(&json!({ "uri": uri, "request": request }))?,
    }

    Ok(0)
}

async fn run(cli: &Cli, mode: OutputMode) -> Result<i32> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Classify { input } => classify(mode, &config, input),
        Command::Resolve { domain, ticker } => {
            resolve(mode, &config, domain, ticker.as_deref()).await
        }
        Command::Uri {
            address,
            amount,
            label,
            message,
        } => build_uri(
            mode,
            &config,
            address,
            amount.as_deref(),
            label.as_deref(),
            message.as_deref(),
        ),
        Command::Session => session::run(mode, &config, cli.yes).await,
    }
}

fn report_error(mode: OutputMode, err: &anyhow::Error) -> i32 {
    let io_failure = err
        .chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some());
    let (kind, code) = match err.downcast_ref::<RecipientError>() {
        Some(core) => (core.kind(), core.exit_code()),
        None if io_failure => ("io_error", 3),
        None => ("internal_error", 1),
    };

    match mode {
        OutputMode::Human => {
            eprintln!("{} {}", "✗".red(), format!("{err:#}").red());
        }
        OutputMode::Agent => {
            let payload = AgentError {
                error: kind.to_string(),
                code,
                message: format!("{err:#}"),
            };
            match serde_json::to_string(&payload) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err:#}"),
            }
        }
    }
    code
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mode = detect_output_mode(cli.output);
    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    logging::init_logging(log_format, "warn");

    let code = match run(&cli, mode).await {
        Ok(code) => code,
        Err(err) => report_error(mode, &err),
    };
    std::process::exit(code);
}
