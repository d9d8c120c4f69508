use crate::context::CourseRankCliContext;
use crate::output::{OutputFormat, print_json, print_target_groups};
use serde_json::json;

pub fn handle_target_groups_command(
    ctx: &CourseRankCliContext,
    output_format: OutputFormat,
) -> courserank::Result<()> {
    let platform = &ctx.config.platform;
    match output_format {
        OutputFormat::Json => print_json(&json!({
            "target_groups": platform.target_groups,
            "women_group_label": platform.women_group_label,
        })),
        OutputFormat::Table => print_target_groups(platform),
    }
    Ok(())
}
