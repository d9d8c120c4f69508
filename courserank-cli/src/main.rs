use clap::{Parser, ValueEnum};
use courserank_cli::handlers::{handle_match_command, handle_target_groups_command};
use courserank_cli::{Cli, Commands, CourseRankCliContext, OutputFormat, output_error, print_json};
use serde_json::json;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: env var > cli arg > default
    let output_format = std::env::var("COURSERANK_OUTPUT")
        .ok()
        .and_then(|value| OutputFormat::from_str(&value, true).ok())
        .unwrap_or(cli.output);

    match run(cli, output_format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output_error(&err, output_format);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output_format: OutputFormat) -> courserank::Result<()> {
    match cli.command {
        Commands::Version => {
            match output_format {
                OutputFormat::Json => print_json(&json!({
                    "name": "courserank-cli",
                    "version": courserank::VERSION,
                })),
                OutputFormat::Table => println!("courserank CLI v{}", courserank::VERSION),
            }
            Ok(())
        }

        Commands::TargetGroups => {
            let ctx = CourseRankCliContext::load(cli.config.as_deref())?;
            handle_target_groups_command(&ctx, output_format)
        }

        Commands::Match(args) => {
            let mut ctx = CourseRankCliContext::load(cli.config.as_deref())?;
            ctx.set_verbosity(cli.verbose, cli.quiet, output_format);
            args.apply_to(&mut ctx.config);
            handle_match_command(&args, &ctx, output_format).await
        }
    }
}
