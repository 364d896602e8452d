//! scorm - inspect, launch and track SCORM content packages

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scorm_rte::{FileStorage, ScormApi, Session};
use std::io;
use std::path::PathBuf;

mod config;
mod inspect;
mod session;

use config::ViewerConfig;

#[derive(Parser)]
#[command(name = "scorm")]
#[command(version)]
#[command(about = "SCORM content package viewer", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./scorm.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the metadata, resources and outline of a package
    Inspect {
        /// Zip archive or imsmanifest.xml
        path: PathBuf,

        /// Print the parsed manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the starting resource of a package archive
    Launch {
        /// Zip archive
        path: PathBuf,
    },

    /// Start an interactive tracking session
    Session {
        /// Directory for tracking state (overrides the configuration)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ViewerConfig::load(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Inspect { path, json } => {
            inspect::inspect(&path, json, config.launch_policy(), &mut stdout)?;
        }

        Commands::Launch { path } => {
            inspect::launch(&path, config.launch_policy(), &mut stdout)?;
        }

        Commands::Session { store } => {
            drop(stdout);
            let dir = match store {
                Some(dir) => dir,
                None => config.storage_dir()?,
            };
            log::info!("tracking state in {}", dir.display());
            let storage = FileStorage::new(&dir);
            let api = ScormApi::from_session(Session::with_key(storage, config.storage_key()));
            let mut shell = session::Shell::new(api);
            session::run(&mut shell)
                .with_context(|| format!("Session with state in '{}' failed", dir.display()))?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
