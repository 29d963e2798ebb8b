use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use hra_enum::{expand_from_container, write_expansion, ExpandOpts};

use super::StrategyArgs;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Container holding the base graphs.
    pub input: PathBuf,
    /// Zero-based index of the base graph.
    pub index: usize,
    /// Output container.
    pub output: PathBuf,
    /// Node count of the base graph.
    pub start_size: usize,
    /// Node count of the results.
    pub target_size: usize,
    #[command(flatten)]
    pub strategy: StrategyArgs,
}

pub fn run(args: &ExpandArgs) -> Result<(), Box<dyn Error>> {
    let opts = ExpandOpts {
        strategy: args.strategy.resolve().unwrap_or_default(),
        timeout: args.strategy.timeout_secs.map(Duration::from_secs),
        cancel: None,
    };
    let result = expand_from_container(
        &args.input,
        args.index,
        args.start_size,
        args.target_size,
        &opts,
    )?;
    let written = write_expansion(&result, &args.output)?;
    println!(
        "Base graph {} ({}): {} unique HRAs with {} nodes from {} candidates in {:.3}s",
        result.source,
        result.base_rep,
        written,
        result.target_size,
        result.candidates,
        result.elapsed.as_secs_f64()
    );
    Ok(())
}
