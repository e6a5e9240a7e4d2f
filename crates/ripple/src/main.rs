//! Ripple CLI - change-impact tracing from the command line.
//!
//! Ripple scans Java and Python sources, builds dependency and call graphs,
//! and reports what a change to a class, file or function ripples into.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::OutputFormat;

/// Ripple: static dependency graphs and change-impact tracing.
#[derive(Parser)]
#[command(name = "ripple")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/.ripple.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace what depends on, and what is depended on by, changed items
    Impact {
        /// Class names, interface names or file paths
        #[arg(required = true)]
        items: Vec<String>,

        /// Maximum traversal depth (defaults to max-depth from config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the function-level call graph of one file
    Calls {
        /// Source file to analyze
        file: PathBuf,

        /// Trace call chains from and to this function
        #[arg(long)]
        function: Option<String>,

        /// Maximum chain depth (defaults to max-depth from config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Print a Mermaid diagram instead of the summary
        #[arg(long, conflicts_with = "report")]
        mermaid: bool,

        /// Print the full Markdown call-chain report
        #[arg(long)]
        report: bool,
    },

    /// Summarize the dependency graph and its cycles
    Graph {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Map a unified diff onto changed items and trace their impact
    Diff {
        /// Patch file, or "-" to read standard input
        patch: PathBuf,

        /// Maximum traversal depth (defaults to max-depth from config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Export files, classes, methods and their relations as JSON Lines
    Export {
        /// Output file
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.root {
        Some(r) => r,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Impact {
            items,
            depth,
            format,
        } => cli::impact::run(&root, config, &items, depth, format),
        Commands::Calls {
            file,
            function,
            depth,
            mermaid,
            report,
        } => cli::calls::run(
            &root,
            config,
            &file,
            &cli::calls::CallsOptions {
                function,
                depth,
                mermaid,
                report,
            },
        ),
        Commands::Graph { format } => cli::graph::run(&root, config, format),
        Commands::Diff {
            patch,
            depth,
            format,
        } => cli::diff::run(&root, config, &patch, depth, format),
        Commands::Export { output } => cli::export::run(&root, config, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
