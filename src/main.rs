//! procwatch - proc module metrics exporter binary
//!
//! Serves the readings of the CPU, RAM and process-table kernel modules over HTTP.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use procwatch::{
    CombinedSnapshot, MonitorAgent, SourceConfig, WebConfig, DEFAULT_CPU_SOURCE,
    DEFAULT_PROCESOS_SOURCE, DEFAULT_RAM_SOURCE, DEFAULT_WEB_PORT,
};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "procwatch")]
#[command(about = "Exports proc module metrics as JSON over HTTP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    long_about = "Polls the CPU, RAM and process-table kernel modules every 5 seconds and republishes their readings over HTTP"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Proc file written by the CPU module
    #[arg(long, default_value = DEFAULT_CPU_SOURCE)]
    cpu_source: PathBuf,

    /// Proc file written by the RAM module
    #[arg(long, default_value = DEFAULT_RAM_SOURCE)]
    ram_source: PathBuf,

    /// Proc file written by the process-table module
    #[arg(long, default_value = DEFAULT_PROCESOS_SOURCE)]
    procesos_source: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the exporter (default)
    Serve(ServeArgs),

    /// Read every module once, print the combined record and exit
    Snapshot(SnapshotArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Answer 503 on raw endpoints while their module is failing
    #[arg(long)]
    strict_status: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args).await,
        None => serve_command(&cli, &ServeArgs::default()).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::TRACE
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn source_config(cli: &Cli) -> SourceConfig {
    SourceConfig {
        cpu: cli.cpu_source.clone(),
        memory: cli.ram_source.clone(),
        process_table: cli.procesos_source.clone(),
    }
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let web_config = WebConfig::new(&cli.host, cli.port)
        .with_cors(!args.no_cors)
        .with_strict_raw_status(args.strict_status);

    info!("Web server configuration:");
    info!("  - Bind address: {}", web_config.bind_address());
    info!("  - CORS enabled: {}", web_config.enable_cors);
    info!("  - Strict raw status: {}", web_config.strict_raw_status);

    let agent = MonitorAgent::new(source_config(cli), web_config);
    agent
        .run(shutdown_signal())
        .await
        .context("monitoring agent stopped")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let agent = MonitorAgent::new(source_config(cli), WebConfig::default());
    let snapshot = agent
        .snapshot_once()
        .await
        .context("failed to collect snapshot")?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "pretty" => print_pretty_snapshot(&snapshot),
        other => anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_pretty_snapshot(snapshot: &CombinedSnapshot) {
    println!("Snapshot ({})", snapshot.hora);
    println!("==============================");
    println!();

    println!("CPU:");
    println!("  Usage: {:.1}%", snapshot.porcentaje_cpu_uso);
    println!("  Idle: {:.1}%", snapshot.porcentaje_cpu_libre);
    println!();

    println!("RAM:");
    println!("  Total: {}", snapshot.total_ram);
    println!("  Free: {}", snapshot.ram_libre);
    println!("  Used: {}", snapshot.uso_ram);
    println!("  Usage: {:.1}%", snapshot.porcentaje_ram);
    println!();

    println!("Processes:");
    println!("  Total: {}", snapshot.total_procesos);
    println!("  Running: {}", snapshot.procesos_corriendo);
    println!("  Sleeping: {}", snapshot.procesos_durmiendo);
    println!("  Zombie: {}", snapshot.procesos_zombie);
    println!("  Stopped: {}", snapshot.procesos_parados);
}
