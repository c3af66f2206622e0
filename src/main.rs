use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use repo_graph::app::config::EngineConfig;
use repo_graph::app::engine::Session;
use repo_graph::cli;
use tracing_subscriber::EnvFilter;

/// Structural graph of a Python source tree.
#[derive(Parser)]
#[command(name = "repograph", about = "Structural graph of a Python source tree")]
struct Cli {
    /// Root directory of the source tree.
    root: PathBuf,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print node and edge counts per kind.
    Stats,

    /// Print the textual graph summary sent to the oracle.
    Summary,

    /// Print the whole graph as JSON.
    Dump,

    /// Re-analyse one file (relative to the root) and merge it into the graph.
    Update { file: PathBuf },

    /// Print the neighborhood of one or more nodes.
    Neighbors {
        #[arg(required = true)]
        nodes: Vec<String>,

        /// Neighborhood radius (default from config).
        #[arg(short, long)]
        radius: Option<usize>,
    },

    /// Modify a node's attributes and synchronize its dependents.
    Sync {
        node: String,

        /// New parameter list, comma separated.
        #[arg(long, value_delimiter = ',')]
        parameters: Option<Vec<String>>,

        /// New type name.
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Record a change-log entry on the node.
        #[arg(long)]
        log: bool,
    },

    /// Check that a node's direct successors agree with it.
    Check { node: String },

    /// Rank suspicious nodes for a problem statement using the oracle.
    Localize {
        #[arg(short, long)]
        problem: String,

        /// Oracle command line (overrides config), whitespace separated.
        #[arg(long)]
        oracle: Option<String>,
    },

    /// Run the configured test command.
    Test {
        /// Single test file, relative to the root.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };
    process::exit(exit_code);
}

fn run(args: Cli) -> anyhow::Result<bool> {
    let config = EngineConfig::load_or_default(args.config.as_deref())?;
    let mut session = Session::open(&args.root, config)?;

    match args.command {
        Commands::Stats => cli::print_stats(&session),
        Commands::Summary => cli::print_summary(&session),
        Commands::Dump => cli::dump_graph(&session),
        Commands::Update { file } => cli::update_file(&mut session, &file),
        Commands::Neighbors { nodes, radius } => cli::print_neighbors(&session, &nodes, radius),
        Commands::Sync {
            node,
            parameters,
            type_name,
            log,
        } => cli::sync_node(&mut session, &node, parameters, type_name, log),
        Commands::Check { node } => cli::check_node(&session, &node),
        Commands::Localize { problem, oracle } => {
            cli::localize(&session, &problem, oracle.as_deref())
        }
        Commands::Test { file } => Ok(cli::run_tests(&session, file.as_deref())),
    }
}
