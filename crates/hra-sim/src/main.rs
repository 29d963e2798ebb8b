use std::env;
use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    expand::{self, ExpandArgs},
    generate::{self, CensusArgs, GenerateArgs},
    run::{self, AggregateArgs, RunArgs, SampleArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "hra-sim",
    version,
    about = "Enumerate and expand heritable regulatory architectures"
)]
struct Cli {
    /// Log per-item progress (overridden by HRA_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate every canonical HRA with a given node count.
    Generate(GenerateArgs),
    /// Count topologies, architectures and HRAs for a range of sizes.
    Census(CensusArgs),
    /// Grow one base graph of a container to the target size.
    Expand(ExpandArgs),
    /// Expand every base graph of a container in parallel and aggregate.
    Run(RunArgs),
    /// Expand a seeded random selection of base graphs and aggregate.
    Sample(SampleArgs),
    /// Aggregate the artefacts already present in a results directory.
    Aggregate(AggregateArgs),
}

impl Cli {
    /// Whether `--verbose` or a positional verbose flag of 1 was given.
    fn verbose(&self) -> bool {
        let positional = match &self.command {
            Command::Generate(args) => args.verbosity,
            Command::Run(args) => args.common.verbosity,
            Command::Sample(args) => args.common.verbosity,
            _ => None,
        };
        self.verbose || positional == Some(1)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose());
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Census(args) => generate::census(&args),
        Command::Expand(args) => expand::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Sample(args) => run::sample(&args),
        Command::Aggregate(args) => run::aggregate(&args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HRA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "hra=debug,info"
        } else {
            "hra=info,warn"
        })
    });
    if env::var("HRA_LOG_FORMAT").is_ok_and(|format| format == "compact") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
