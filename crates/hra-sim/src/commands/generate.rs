use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use hra_enum::{census as run_census, generate_hras, write_generation};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Node count to enumerate.
    pub node_count: usize,
    /// Log per-item progress when 1, same as `--verbose`.
    #[arg(value_name = "VERBOSE", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub verbosity: Option<u8>,
    /// Output container (default `hras_dot_files/hras_n<node_count>.dot`).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CensusArgs {
    /// Smallest node count.
    #[arg(long, default_value_t = 2)]
    pub min: usize,
    /// Largest node count.
    #[arg(long, default_value_t = 5)]
    pub max: usize,
    /// Also write the rows as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let out = args.out.clone().unwrap_or_else(|| {
        PathBuf::from("hras_dot_files").join(format!("hras_n{}.dot", args.node_count))
    });
    if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let report = generate_hras(args.node_count)?;
    write_generation(&report, &out)?;

    println!("Nodes: {}", report.node_count);
    println!("Canonical topologies: {}", report.topologies);
    println!(
        "Regulatory architectures: {}",
        report.regulatory_architectures
    );
    println!("Unique HRAs: {}", report.hras.len());
    println!("Elapsed: {:.3}s", report.elapsed.as_secs_f64());
    println!("Written to {}", out.display());
    Ok(())
}

pub fn census(args: &CensusArgs) -> Result<(), Box<dyn Error>> {
    if args.min > args.max {
        return Err(format!("--min {} exceeds --max {}", args.min, args.max).into());
    }
    let rows = run_census(args.min..=args.max)?;
    println!("{:>5} {:>10} {:>14} {:>8} {:>10}", "nodes", "topologies", "architectures", "hras", "ms");
    for row in &rows {
        println!(
            "{:>5} {:>10} {:>14} {:>8} {:>10}",
            row.node_count, row.topologies, row.regulatory_architectures, row.hras, row.elapsed_ms
        );
    }
    if let Some(path) = &args.json {
        fs::write(path, serde_json::to_vec_pretty(&rows)?)?;
    }
    Ok(())
}
