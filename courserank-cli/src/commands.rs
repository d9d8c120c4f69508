//! Command line definition

use crate::args::MatchArgs;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "courserank-cli")]
#[command(about = "Match courses to a query and rank them by consensus", long_about = None)]
#[command(version = courserank::VERSION)]
pub struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub output: OutputFormat,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors are logged)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display version information
    Version,

    /// Match a query against a catalog snapshot and rank the results
    #[command(
        alias = "search",
        long_about = r#"
Match a free-text query against a catalog snapshot.

The query is translated into the catalog language when needed, matched
fuzzily, scored semantically, filtered by budget and ranked. That ranking
is reconciled with the platform's preference ranking (occupancy, minimum
enrollment, gender balance and the selected target groups) into a single
consensus order.

Examples:
  courserank-cli match "Yoga für Anfänger" --catalog courses.json --gender female
  courserank-cli match pottery -c courses.json -g male -b 120 -t "Older adults / older people"
  courserank-cli match spanisch -c courses.json -g f --strategy greedy --output json
"#
    )]
    Match(MatchArgs),

    /// List the target group labels accepted by --target-group
    TargetGroups,
}
