pub mod expand;
pub mod generate;
pub mod run;

use clap::{Args, ValueEnum};
use hra_enum::ExpansionStrategy;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Every existing node links in, out, both ways or not at all.
    Exhaustive,
    /// Limited in- and out-degree for each new node.
    Bounded,
}

/// Strategy flags shared by the expansion commands.
#[derive(Args, Debug, Clone)]
pub struct StrategyArgs {
    /// Edge selection strategy for new nodes.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,
    /// Maximum incoming edges per new node (bounded strategy).
    #[arg(long, default_value_t = 3)]
    pub max_in: usize,
    /// Maximum outgoing edges per new node (bounded strategy).
    #[arg(long, default_value_t = 2)]
    pub max_out: usize,
    /// Abandon a base graph after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl StrategyArgs {
    pub fn resolve(&self) -> Option<ExpansionStrategy> {
        self.strategy.map(|kind| match kind {
            StrategyKind::Exhaustive => ExpansionStrategy::Exhaustive,
            StrategyKind::Bounded => ExpansionStrategy::Bounded {
                max_in: self.max_in,
                max_out: self.max_out,
            },
        })
    }
}
