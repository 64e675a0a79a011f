//! Cappella CLI - Command-line client for the baby profile service
//!
//! Provides `cappella show`, `cappella update`, and `cappella config`.

mod commands;

use anyhow::Context;
use cappella_core::ClientConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::profile::UpdateArgs;

#[derive(Parser)]
#[command(name = "cappella")]
#[command(about = "Cappella - view and edit a baby profile")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.cappella/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the profile service base URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and display the profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit profile fields and upload a new picture
    Update(UpdateArgs),
    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "cappella=debug,cappella_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.base_url {
        config.base_url.clone_from(url);
        config.validate().context("Invalid --base-url")?;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Show { json } => commands::profile::show(&config, json).await,
        Commands::Update(args) => commands::profile::update(&config, args).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
