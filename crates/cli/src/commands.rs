use clap::{Subcommand, ValueEnum};
use planner::split::SplitMode;

#[derive(Subcommand)]
pub enum Commands {
    /// Split an inclusive id range into contiguous half-open sub-ranges
    SplitRange {
        #[arg(long, allow_hyphen_values = true, help = "Lowest id in the range")]
        min: String,

        #[arg(long, allow_hyphen_values = true, help = "Highest id in the range")]
        max: String,

        #[arg(long, help = "Number of sub-ranges, overrides the settings file")]
        parallelism: Option<usize>,

        #[arg(long, help = "Significant digits kept for range bounds")]
        precision: Option<u64>,

        #[arg(long, help = "If set, prints the ranges as JSON instead of a table")]
        json: bool,
    },
    /// Split an explicit row key list between workers
    SplitList {
        #[arg(long, value_delimiter = ',', help = "Comma separated row keys")]
        items: Vec<String>,

        #[arg(long, help = "Number of sub-lists, overrides the settings file")]
        parallelism: Option<usize>,

        #[arg(long, value_enum, help = "Split mode, overrides the settings file")]
        mode: Option<ListMode>,

        #[arg(long, help = "Render each sub-list as comma separated tokens")]
        delimited: bool,

        #[arg(long, help = "If set, prints the sub-lists as JSON instead of a table")]
        json: bool,
    },
    /// Show the chunk records of a run
    Chunks {
        #[arg(long, help = "Execution id of the run to inspect")]
        execution: String,

        #[arg(
            long,
            help = "If set, prints the chunk records as JSON instead of a table"
        )]
        json: bool,
    },
}

/// How `split-list` distributes keys between workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListMode {
    RoundRobin,
    Contiguous,
}

impl From<ListMode> for SplitMode {
    fn from(mode: ListMode) -> Self {
        match mode {
            ListMode::RoundRobin => SplitMode::RoundRobin,
            ListMode::Contiguous => SplitMode::Contiguous,
        }
    }
}
