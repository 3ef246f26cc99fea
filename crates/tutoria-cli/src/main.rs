//! tutoria CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use tutoria_core::traits::ListingKind;

mod commands;

#[derive(Parser)]
#[command(name = "tutoria", version, about = "Tutor marketplace scenario runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Students,
    Tutors,
}

impl From<Kind> for ListingKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Students => ListingKind::Students,
            Kind::Tutors => ListingKind::Tutors,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario against a fresh marketplace
    Run {
        /// Path to .toml scenario file
        #[arg(long)]
        scenario: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Summary format printed to stdout
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Directory to write a JSON run report into
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save the final listings to the configured data directory
        #[arg(long)]
        save: bool,
    },

    /// Validate scenario TOML files
    Validate {
        /// Path to scenario file or directory
        #[arg(long)]
        scenario: PathBuf,
    },

    /// Print a saved listing from the data directory
    Listing {
        /// Which listing to print
        #[arg(long, value_enum)]
        kind: Kind,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Empty the saved listings in the data directory
    Clear {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example scenario
    Init,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "tutoria=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            config,
            format,
            output,
            save,
        } => commands::run::execute(
            scenario,
            config,
            matches!(format, OutputFormat::Json),
            output,
            save,
        ),
        Commands::Validate { scenario } => commands::validate::execute(scenario),
        Commands::Listing { kind, config } => commands::listing::execute(kind.into(), config),
        Commands::Clear { config } => commands::clear::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
