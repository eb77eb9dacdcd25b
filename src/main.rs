use anyhow::{Context, Result};
use clap::Parser;
use solver_runtime_plot::aggregate::{aggregate, AggregateConfig, DEFAULT_MAX_SIZE};
use solver_runtime_plot::chart::render_chart;
use solver_runtime_plot::report::{print_summary, write_json};
use solver_runtime_plot::source::{DirectoryLayout, Manifest, RunSource};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "solver-runtime-plot")]
#[command(about = "Average solver benchmark logs and plot runtimes per heuristic")]
struct Cli {
    /// Benchmark output tree: <input>/<heuristic>/<class>/<size label>
    #[arg(short, long, default_value = "output")]
    input: PathBuf,

    /// JSON manifest listing run logs, used instead of walking --input
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Chart image to write
    #[arg(short, long, default_value = "result.png")]
    output: PathBuf,

    /// Largest number of variables to include
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u32,

    /// Also write the aggregated series as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, default_value = "false", conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solver_runtime_plot={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    debug!("Arguments: {:?}", cli);

    let source: Box<dyn RunSource> = match &cli.manifest {
        Some(manifest) => Box::new(Manifest::new(manifest)),
        None => Box::new(DirectoryLayout::new(&cli.input)),
    };

    let config = AggregateConfig {
        max_size: cli.max_size,
    };

    let series = aggregate(source.as_ref(), &config)
        .with_context(|| format!("Failed to aggregate runs from {}", source.describe()))?;

    if !cli.quiet {
        print_summary(&series);
    }

    if let Some(json_path) = &cli.json {
        write_json(&series, json_path).context("Failed to write JSON series")?;
        println!("Generated: {}", json_path.display());
    }

    render_chart(&series, &cli.output).context("Failed to generate chart")?;
    println!("Generated: {}", cli.output.display());

    Ok(())
}
