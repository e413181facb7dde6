//! esp8266-build: validate an ESP8266 device configuration and emit its
//! build directives.

mod commands;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use esp8266_boards::parse::{catalog_with_dir, load_boards_toml};
use esp8266_boards::BoardCatalog;
use esp8266_platform::{ConfigDocument, DEFAULT_CONFIG_FILE};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "esp8266-build", version, about = "ESP8266 platform build directives")]
struct Cli {
    /// Extra board definitions: a .boards.toml file or a directory of them
    #[arg(long, global = true)]
    boards: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and print the normalized esp8266 block
    Validate {
        /// Configuration file (default: nearest device.toml)
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run the full pipeline and print the build directives
    Emit {
        /// Configuration file (default: nearest device.toml)
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Also write generated and bundled files into this directory
        #[arg(long)]
        build_dir: Option<PathBuf>,
    },
    /// Inspect the board catalog
    Boards {
        #[command(subcommand)]
        action: BoardsAction,
    },
    /// List the firmware files offered for download
    DownloadTypes {
        /// Configuration file (default: nearest device.toml)
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Subcommand)]
enum BoardsAction {
    /// List known boards
    List,
    /// Show details of a board
    Describe {
        /// Board identifier
        id: String,
    },
}

/// Output format shared by every command that prints data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Validate { config, format } => {
            let (document, base_dir) = load_config(&cwd, config.as_deref())?;
            commands::validate::run(&document, &base_dir, format)
        }

        Commands::Emit {
            config,
            format,
            build_dir,
        } => {
            let (document, base_dir) = load_config(&cwd, config.as_deref())?;
            let boards = load_boards(cli.boards.as_deref())?;
            commands::emit::run(&document, &base_dir, &boards, format, build_dir.as_deref())
        }

        Commands::Boards { action } => {
            let boards = load_boards(cli.boards.as_deref())?;
            match action {
                BoardsAction::List => commands::boards::list(&boards),
                BoardsAction::Describe { id } => commands::boards::describe(&boards, &id),
            }
        }

        Commands::DownloadTypes { config, format } => {
            let (document, _) = load_config(&cwd, config.as_deref())?;
            commands::download::run(&document, format)
        }
    }
}

/// Load the configuration named on the command line, or the nearest
/// `device.toml` above `cwd`. Returns the document and the directory that
/// relative paths inside it resolve against.
fn load_config(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<(ConfigDocument, PathBuf)> {
    match explicit {
        Some(path) => {
            let document = ConfigDocument::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            let base_dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => cwd.to_path_buf(),
            };
            Ok((document, base_dir))
        }
        None => match ConfigDocument::find_and_load(cwd)? {
            Some((document, dir)) => Ok((document, dir)),
            None => anyhow::bail!(
                "no {DEFAULT_CONFIG_FILE} found in {} or any parent directory",
                cwd.display()
            ),
        },
    }
}

/// Builtin board catalog, extended with `--boards` when given.
///
/// A directory contributes every `*.boards.toml` file inside it.
fn load_boards(extra: Option<&Path>) -> anyhow::Result<BoardCatalog> {
    let Some(path) = extra else {
        return Ok(BoardCatalog::builtin());
    };
    let context = || format!("loading boards from {}", path.display());
    if path.is_dir() {
        return catalog_with_dir(path).with_context(context);
    }
    let mut catalog = BoardCatalog::builtin();
    catalog.merge(load_boards_toml(path).with_context(context)?);
    Ok(catalog)
}
