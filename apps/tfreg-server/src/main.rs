mod server;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use module_registry::{MODULE_NAME, RegistryConfig};
use tfreg_bootstrap::host::expand_tilde;
use tfreg_bootstrap::{AppConfig, CliArgs};

/// tfreg - private Terraform module registry
#[derive(Parser)]
#[command(name = "tfreg-server")]
#[command(about = "tfreg - private Terraform module registry")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Registry root directory (overrides config)
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref()
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (TFREG__*) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliArgs {
        port: cli.port,
        verbose: cli.verbose,
    });
    if let Some(dir) = cli.storage_dir.as_deref() {
        config.set_module_value(
            MODULE_NAME,
            "storage_dir",
            serde_json::Value::String(dir.to_string_lossy().into_owned()),
        );
    }

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    tfreg_bootstrap::logging::init_logging(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tfreg server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let registry = registry_config(config)?;
    server::parse_bind_address(&config.server.bind_addr)?;
    println!("Configuration is valid");
    println!("{}", config.to_json_pretty()?);
    tracing::debug!(storage_dir = %registry.storage_dir.display(), "Registry root resolved");
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    let registry = registry_config(config)?;
    let addr = server::parse_bind_address(&config.server.bind_addr)?;
    let app = server::build_app(&registry);
    server::serve(addr, app).await
}

/// Typed registry section with `~` expanded and values validated.
fn registry_config(config: &AppConfig) -> Result<RegistryConfig> {
    let mut registry: RegistryConfig = config.module_config(MODULE_NAME)?;
    registry.storage_dir = expand_tilde(&registry.storage_dir.to_string_lossy())?;
    registry.validate()?;
    ensure_storage_dir_usable(&registry.storage_dir)?;
    Ok(registry)
}

/// The registry root may be absent (it is created on first upload), but it
/// must not be something other than a directory.
fn ensure_storage_dir_usable(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        anyhow::bail!("storage_dir is not a directory: {}", dir.display());
    }
    Ok(())
}
