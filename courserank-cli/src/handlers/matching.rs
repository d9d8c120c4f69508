use crate::args::MatchArgs;
use crate::context::CourseRankCliContext;
use crate::output::{OutputFormat, print_json, print_report};
use tracing::debug;

pub async fn handle_match_command(
    args: &MatchArgs,
    ctx: &CourseRankCliContext,
    output_format: OutputFormat,
) -> courserank::Result<()> {
    let matcher = ctx.matcher().await?;
    debug!(matcher = ?matcher, "Matcher ready");

    let report = matcher.run(&args.to_request()).await?;

    match output_format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}
