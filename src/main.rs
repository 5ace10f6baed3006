use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use coachbot::cli::{self, ProfileArgs};

#[derive(Parser)]
#[command(name = "coachbot", version)]
#[command(about = "Personalised training, nutrition and tactical plans for athletes", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one module (training, nutrition, tactical) or all of them
    Generate {
        #[arg(default_value = "all")]
        module: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Save each plan as markdown into this directory
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        /// Path to config file (defaults to ./coachbot.toml or ~/.config/coachbot/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the model name from config
        #[arg(long)]
        model: Option<String>,

        /// Use canned answers instead of calling the generation service
        #[arg(long)]
        dry_run: bool,
    },
    /// Interactive session with a per-profile plan cache
    Session {
        #[command(flatten)]
        profile: ProfileArgs,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        dry_run: bool,
    },
    /// List sports, positions and the other accepted profile values
    Sports,
    /// Validate configuration and credentials
    ConfigCheck {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "coachbot=debug"
    } else {
        "coachbot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            module,
            profile,
            output_dir,
            config,
            model,
            dry_run,
        } => cli::generate::run(module, profile, output_dir, config, model, dry_run).await,
        Commands::Session {
            profile,
            config,
            model,
            dry_run,
        } => cli::session::run(profile, config, model, dry_run).await,
        Commands::Sports => cli::sports::run(),
        Commands::ConfigCheck { config } => cli::config_check::run(config).await,
    }
}
