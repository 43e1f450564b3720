//! Treeline CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "treeline")]
#[command(about = "Per-unit dependency graphs for incremental rebuild scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency graph for one unit summary
    Build {
        /// Unit summary file (JSON), as emitted by the front end
        summary: PathBuf,

        /// Where to write the graph
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a Graphviz dot file next to the output
        #[arg(long)]
        dot: bool,

        /// Include declarations that cannot affect other units
        #[arg(long)]
        include_private: bool,

        /// Keep uses of same-file private declarations
        #[arg(long)]
        intrafile: bool,

        /// Per-declaration fingerprinting is enabled (forces the two
        /// flags above)
        #[arg(long)]
        type_fingerprints: bool,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("treeline={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Build {
            summary,
            output,
            dot,
            include_private,
            intrafile,
            type_fingerprints,
        } => {
            let options = treeline_builder::BuildOptions {
                include_private_declarations: include_private,
                include_intrafile_dependencies: intrafile,
                type_fingerprints,
            };
            commands::build(summary, output, dot, options)
        }
        Commands::Version => {
            println!("Treeline v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
