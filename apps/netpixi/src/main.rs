//! # netpixi
//!
//! Command line front end for `.net.gz` graph files.

use clap::{Parser, Subcommand};
use netpixi::cli::{
    CliResult, Metric, Model, cmd_check, cmd_component, cmd_convert, cmd_metrics, render,
};
use netpixi_core::options::DEFAULT_COMPRESSION;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "netpixi", version, about = "Inspect and convert netpixi graph files")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a file and report its size.
    Check {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = Model::Keyed)]
        model: Model,
    },

    /// Load a file and write it back out, normalized.
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Model::Keyed)]
        model: Model,
        /// Gzip level, 0 to 9.
        #[arg(long, default_value_t = DEFAULT_COMPRESSION)]
        level: u32,
    },

    /// Compute a per-vertex metric.
    Metrics {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = Metric::Degree)]
        metric: Metric,
    },

    /// Keep only the largest weakly connected component.
    Component {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_COMPRESSION)]
        level: u32,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> CliResult<String> {
    match &cli.command {
        Commands::Check { path, model } => render(&cmd_check(path, *model)?, cli.json),
        Commands::Convert {
            input,
            output,
            model,
            level,
        } => render(&cmd_convert(input, output, *model, *level)?, cli.json),
        Commands::Metrics { path, metric } => render(&cmd_metrics(path, *metric)?, cli.json),
        Commands::Component {
            input,
            output,
            level,
        } => render(&cmd_component(input, output, *level)?, cli.json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
