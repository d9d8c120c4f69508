pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use context::CourseRankCliContext;
pub use output::{
    CliColors, OutputFormat, error_code, format_error, format_info, format_success,
    format_warning, output_error, print_json, print_report, print_target_groups,
};
