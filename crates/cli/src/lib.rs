//! CLI for benchboard.
//!
//! One subcommand-free invocation: point it at a benchmarks directory and a
//! results tree, get a standalone HTML leaderboard.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use benchboard_report::{CommandStrategy, Options, PlotRegistry};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Benchboard leaderboard generator.
#[derive(Parser, Debug)]
#[command(name = "benchboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of benchmark definitions.
    #[arg(long, default_value = "benchmarks")]
    pub benchmarks: PathBuf,

    /// Root of the result tree.
    #[arg(long, default_value = "results")]
    pub results: PathBuf,

    /// Destination directory for the document and plot images.
    #[arg(short, long, default_value = "html")]
    pub output: PathBuf,

    /// Logo asset to copy beside the document.
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Plot program per benchmark, as `<test>=<program>`. The program is
    /// invoked with the input and output directories and must produce
    /// `result.png`. May be repeated.
    #[arg(long = "plot", value_name = "TEST=PROGRAM")]
    pub plots: Vec<String>,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build the plot registry from repeated `--plot test=program` flags.
fn plot_registry(specs: &[String]) -> anyhow::Result<PlotRegistry> {
    let mut registry = PlotRegistry::new();
    for spec in specs {
        let Some((test, program)) = spec.split_once('=') else {
            bail!("--plot expects <test>=<program>, got {spec:?}");
        };
        if test.is_empty() || program.is_empty() {
            bail!("--plot expects <test>=<program>, got {spec:?}");
        }
        registry.register(test, Box::new(CommandStrategy::new(program)));
    }
    Ok(registry)
}

/// Run the CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let plots = plot_registry(&cli.plots)?;
    let options = Options {
        benchmarks_dir: cli.benchmarks,
        results_dir: cli.results,
        output_dir: cli.output,
        logo: cli.logo,
    };

    let summary = benchboard_report::run(&options, &plots)
        .context("failed to build the leaderboard")?;

    println!(
        "Wrote {} ({} tests, {} results, {} codes, {} machines)",
        summary.output_file.display(),
        summary.tests,
        summary.records,
        summary.codes,
        summary.machines
    );
    Ok(())
}
