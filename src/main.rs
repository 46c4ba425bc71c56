//! procscrape - Remote Process Diagnostics Scraper Binary
//!
//! Connects to a diagnostics agent, prints the process metadata and then
//! streams runtime stats until interrupted.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use procscrape::{
    fetch_meta, start_with_config, Meta, ScrapeConfig, Stats, DEFAULT_AGENT_ADDRESS,
    DEFAULT_BUFFER, DEFAULT_INTERVAL_MS,
};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "procscrape")]
#[command(about = "Scrape process metadata and runtime stats from a diagnostics agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Austin Couch")]
#[command(long_about = "Connects to a diagnostics agent over TCP, fetches the process metadata once and polls runtime stats on a fixed interval")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Agent address (host:port)
    #[arg(default_value = DEFAULT_AGENT_ADDRESS)]
    address: String,

    /// Stats poll interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Number of stats snapshots the stream may hold before polling stalls
    #[arg(short, long, default_value_t = DEFAULT_BUFFER)]
    buffer: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream stats until interrupted (default)
    Watch(WatchArgs),

    /// Fetch the process metadata once and exit
    Meta(MetaArgs),
}

#[derive(Args)]
struct WatchArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Stop after this many snapshots
    #[arg(short, long)]
    count: Option<u64>,
}

#[derive(Args)]
struct MetaArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Watch(args)) => watch_command(&cli, args).await,
        Some(Commands::Meta(args)) => meta_command(&cli, args).await,
        None => {
            let watch_args = WatchArgs {
                format: OutputFormat::Pretty,
                count: None,
            };
            watch_command(&cli, &watch_args).await
        }
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn scrape_config(cli: &Cli) -> ScrapeConfig {
    ScrapeConfig::new(&cli.address)
        .with_interval_ms(cli.interval)
        .with_buffer(cli.buffer)
}

async fn watch_command(cli: &Cli, args: &WatchArgs) -> anyhow::Result<()> {
    let config = scrape_config(cli);
    let mut session = start_with_config(&config)
        .await
        .with_context(|| format!("failed to start scraping {}", config.address))?;

    print_meta(session.meta(), args.format)?;

    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, cancelling scrape session");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for interrupt: {}", e),
        }
    });

    let mut received = 0u64;
    while let Some(stats) = session.recv().await {
        print_stats(&stats, args.format)?;
        received += 1;
        if args.count.is_some_and(|count| received >= count) {
            break;
        }
    }

    let summary = session.shutdown().await?;
    info!(
        ticks = summary.ticks,
        delivered = summary.delivered,
        failures = summary.failures,
        "Scrape session finished"
    );

    Ok(())
}

async fn meta_command(cli: &Cli, args: &MetaArgs) -> anyhow::Result<()> {
    let meta = fetch_meta(&cli.address)
        .await
        .with_context(|| format!("failed to fetch metadata from {}", cli.address))?;
    print_meta(&meta, args.format)
}

fn print_meta(meta: &Meta, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(meta)?),
        OutputFormat::Pretty => {
            println!("Process:");
            println!("  PID: {}", meta.pid);
            println!("  Name: {}", meta.name);
            for (key, value) in &meta.attributes {
                println!("  {}: {}", key, value);
            }
            println!();
        }
    }
    Ok(())
}

fn print_stats(stats: &Stats, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(stats)?),
        OutputFormat::Pretty => {
            let fields: Vec<String> = stats
                .fields()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            println!(
                "[{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                fields.join(" ")
            );
        }
    }
    Ok(())
}
