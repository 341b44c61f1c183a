//! # RedPack (`redpack`)
//!
//! Terminal front-end for a personal library of drum and FX samples. The
//! library is rebuilt from the configured folders on every run.
//!
//! ```bash
//! # Print the first page of hi-hats under ~/Samples
//! redpack list ~/Samples --category Hi-Hat
//!
//! # Browse interactively: j/k move and play, space replays, n/p page
//! redpack browse ~/Samples
//!
//! # Copy the third kick to the desktop
//! redpack export ~/Samples --category Kick --index 2 --desktop
//! ```

mod browse;
mod commands;
mod logging;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use redpack_core::{AppConfig, CategoryFilter, ExportTarget, SystemPlayer, config_file_path};
use tracing::{error, info};

use commands::{AppState, CliResult};
use logging::LoggingConfig;

/// Browse, audition and export drum samples from the terminal.
#[derive(Parser)]
#[command(name = "redpack", version, about)]
struct Cli {
    /// Configuration file. Defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging on the console.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for log files. Defaults to the platform data directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Folders to import and how to filter them.
#[derive(Args)]
struct LibraryArgs {
    /// Folders to import. Defaults to `library_roots` from the config.
    roots: Vec<PathBuf>,

    /// Also import the built-in kit from the bundle root.
    #[arg(long)]
    kit: bool,

    /// Only show this category ("All", "Kick", "Hi-Hat", "808", ...).
    #[arg(short, long)]
    category: Option<CategoryFilter>,

    /// Only show samples whose name contains this text.
    #[arg(short, long)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import folders and print one page of samples.
    List {
        #[command(flatten)]
        library: LibraryArgs,

        /// Page to print, starting at 1. Clamped to the last page.
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Print the page as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Import folders and browse them with the keyboard.
    Browse {
        #[command(flatten)]
        library: LibraryArgs,
    },

    /// Import folders and copy one sample out.
    Export {
        #[command(flatten)]
        library: LibraryArgs,

        /// Index of the sample in the filtered list.
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Destination folder. Defaults to `export_target` from the config.
        #[arg(long, conflicts_with = "desktop")]
        to: Option<PathBuf>,

        /// Copy to the desktop.
        #[arg(long)]
        desktop: bool,
    },

    /// Add a single audio file and show its category.
    ImportFile {
        /// Audio file to add.
        path: PathBuf,
    },

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Write a default configuration file if none exists.
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging_config = LoggingConfig::auto(cli.verbose);
    if let Some(dir) = cli.log_dir.clone() {
        logging_config = logging_config.with_log_directory(dir);
    }
    let _guard = match logging::init(&logging_config) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: file logging disabled: {err}");
            None
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.unwrap_or_else(config_file_path);
    let mut stdout = std::io::stdout().lock();

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Path => {
                writeln!(stdout, "{}", config_path.display())?;
                Ok(())
            }
            ConfigAction::Init => commands::init_config(&config_path, &mut stdout),
            ConfigAction::Show => {
                commands::show_config(&AppConfig::load_from(&config_path)?, &mut stdout)
            }
        };
    }

    let config = AppConfig::load_from(&config_path)?;
    info!("Starting RedPack with config {}", config_path.display());
    let mut state = AppState::new(config);

    match cli.command {
        Commands::List {
            library,
            page,
            json,
        } => {
            let query = commands::query_from_args(library.category, library.search);
            commands::list(
                &mut state,
                &library.roots,
                library.kit,
                query,
                page,
                json,
                &mut stdout,
            )
            .await
        }
        Commands::Browse { library } => {
            let query = commands::query_from_args(library.category, library.search);
            state.session_mut().set_query(query);
            state.import_in_background(&library.roots, library.kit);
            browse::run(&mut state, tokio::io::stdin(), &SystemPlayer, &mut stdout).await
        }
        Commands::Export {
            library,
            index,
            to,
            desktop,
        } => {
            let target = if desktop {
                Some(ExportTarget::Desktop)
            } else {
                to.map(ExportTarget::Folder)
            };
            let query = commands::query_from_args(library.category, library.search);
            commands::export(
                &mut state,
                &library.roots,
                library.kit,
                query,
                index,
                target,
                &mut stdout,
            )
            .await
        }
        Commands::ImportFile { path } => commands::import_file(&mut state, &path, &mut stdout),
        Commands::Config { .. } => Ok(()),
    }
}
