use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use hra_land::{
    collect_artifacts, load_config, report_artifacts, run_evolution, run_sampled, ReportOutcome,
    RunConfig, RunOutcome,
};

use super::StrategyArgs;

/// Campaign parameters; explicit values override those of `--config`.
#[derive(Args, Debug, Clone)]
pub struct CampaignArgs {
    /// Worker threads (1-16, anything else falls back to 4).
    pub workers: Option<usize>,
    /// Log per-item progress when 1, same as `--verbose`.
    #[arg(value_name = "VERBOSE", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub verbosity: Option<u8>,
    /// Node count of the base graphs.
    pub start_size: Option<usize>,
    /// Node count of the expanded graphs.
    pub target_size: Option<usize>,
    /// YAML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory receiving artefacts and reports.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Exhaustive enumeration of the target size used for coverage.
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Frequency export path.
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,
    #[command(flatten)]
    pub strategy: StrategyArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Container holding the base graphs.
    pub input: PathBuf,
    #[command(flatten)]
    pub common: CampaignArgs,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Container holding the base graphs.
    pub input: PathBuf,
    /// Master seed of the selection.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Number of base graphs to expand.
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    #[command(flatten)]
    pub common: CampaignArgs,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory holding `worker_*.dot` artefacts.
    pub dir: PathBuf,
    /// Node count of the artefacts' base graphs.
    #[arg(long, default_value_t = 3)]
    pub start_size: usize,
    /// Node count of the artefacts' graphs.
    #[arg(long, default_value_t = 4)]
    pub target_size: usize,
    /// Exhaustive enumeration of the target size used for coverage.
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Frequency export path.
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args.common)?;
    let outcome = run_evolution(&args.input, &config)?;
    print_run(&outcome);
    Ok(())
}

pub fn sample(args: &SampleArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args.common)?;
    let outcome = run_sampled(&args.input, &config, args.seed, args.count)?;
    print_run(&outcome);
    Ok(())
}

pub fn aggregate(args: &AggregateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig {
        start_size: args.start_size,
        target_size: args.target_size,
        out_dir: args.dir.clone(),
        reference: args.reference.clone(),
        ..RunConfig::default()
    };
    if let Some(stats_csv) = &args.stats_csv {
        config.stats_csv = stats_csv.clone();
    }
    config.validate()?;
    let paths = collect_artifacts(&args.dir)?;
    let report = report_artifacts(&paths, &args.dir.display().to_string(), &config)?;
    print_report(&report);
    Ok(())
}

fn resolve_config(args: &CampaignArgs) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(start_size) = args.start_size {
        config.start_size = start_size;
    }
    if let Some(target_size) = args.target_size {
        config.target_size = target_size;
    }
    if let Some(out_dir) = &args.out_dir {
        config.out_dir = out_dir.clone();
    }
    if let Some(reference) = &args.reference {
        config.reference = Some(reference.clone());
    }
    if let Some(stats_csv) = &args.stats_csv {
        config.stats_csv = stats_csv.clone();
    }
    if let Some(strategy) = args.strategy.resolve() {
        config.strategy = strategy;
    }
    if args.strategy.timeout_secs.is_some() {
        config.timeout_secs = args.strategy.timeout_secs;
    }
    config.validate()?;
    Ok(config)
}

fn print_run(outcome: &RunOutcome) {
    let dispatch = &outcome.dispatch;
    println!(
        "Expanded {} of {} base graphs with {} workers ({} skipped)",
        dispatch.artifacts.len(),
        dispatch.base_graphs,
        dispatch.workers,
        dispatch.skipped.len()
    );
    for skipped in &dispatch.skipped {
        println!(
            "  skipped graph {} (worker {}): {}",
            skipped.index, skipped.worker, skipped.error
        );
    }
    print_report(&outcome.report);
}

fn print_report(report: &ReportOutcome) {
    let summary = &report.summary;
    println!("Artifacts processed: {}", summary.files_processed);
    if summary.files_failed > 0 {
        println!("Artifacts unreadable: {}", summary.files_failed);
    }
    println!("Graphs parsed: {}", summary.graphs_parsed);
    if summary.graphs_skipped > 0 {
        println!("Graphs skipped: {}", summary.graphs_skipped);
    }
    println!("Total unique HRAs found: {}", summary.unique_total);
    println!("HRAs found via expansion: {}", summary.via_expansion);
    match &summary.reference {
        Some(reference) => {
            if let Some(coverage) = reference.coverage {
                println!(
                    "Coverage: {:.2}% ({}/{})",
                    coverage * 100.0,
                    reference.found_in_reference,
                    reference.reference_total
                );
            }
            if reference.outside_reference > 0 {
                println!(
                    "Not in reference {}: {}",
                    reference.path.display(),
                    reference.outside_reference
                );
            }
        }
        None => println!("Coverage: no reference enumeration found"),
    }
    println!("HRAs reached from multiple sources: {}", summary.multi_source);
    println!("HRAs reached from a single source: {}", summary.singletons);
    println!("Frequency table: {}", report.csv_path.display());
    println!("Summary: {}", report.summary_path.display());
}
