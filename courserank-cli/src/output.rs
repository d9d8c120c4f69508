use colored::*;
use courserank::CourseRankError;
use courserank::config::PlatformConfig;
use courserank::pipeline::{MatchReport, RankedCourse};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }
}

/// Stable machine-readable code for each error kind.
pub fn error_code(error: &CourseRankError) -> &'static str {
    match error {
        CourseRankError::InvalidQuery(_) => "INVALID_QUERY",
        CourseRankError::TranslationFailed { .. } => "TRANSLATION_FAILED",
        CourseRankError::NoMatches { .. } => "NO_MATCHES",
        CourseRankError::SemanticTooDistant { .. } => "SEMANTIC_TOO_DISTANT",
        CourseRankError::NoPriceMatches { .. } => "NO_PRICE_MATCHES",
        CourseRankError::MissingPreferences(_) => "MISSING_PREFERENCES",
        CourseRankError::MismatchedCandidateSets(_) => "MISMATCHED_CANDIDATE_SETS",
        CourseRankError::SolverInfeasible(_) => "SOLVER_INFEASIBLE",
        CourseRankError::Solver(_) => "SOLVER_ERROR",
        CourseRankError::Encoder(_) => "ENCODER_ERROR",
        CourseRankError::Catalog(_) => "CATALOG_ERROR",
        CourseRankError::Configuration(_) => "CONFIGURATION_ERROR",
        CourseRankError::Logging(_) => "LOGGING_ERROR",
    }
}

/// Output an error as a JSON document on stdout, or a colored line on stderr
pub fn output_error(error: &CourseRankError, output_format: OutputFormat) {
    match output_format {
        OutputFormat::Json => {
            let details = match error {
                CourseRankError::TranslationFailed {
                    source_language,
                    target_language,
                    ..
                } => Some(json!({
                    "source_language": source_language,
                    "target_language": target_language,
                })),
                CourseRankError::NoMatches { query } => Some(json!({ "query": query })),
                CourseRankError::SemanticTooDistant { query, threshold } => Some(json!({
                    "query": query,
                    "threshold": threshold,
                })),
                CourseRankError::NoPriceMatches { budget } => Some(json!({
                    "budget": budget,
                    "hint": "Remove the budget filter to see all matches"
                })),
                _ => None,
            };

            let mut error_response = json!({
                "error": true,
                "code": error_code(error),
                "message": error.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            if let Some(details) = details {
                error_response["details"] = details;
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&error_response).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => eprintln!("{}", format_error(&error.to_string())),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

/// Cut `text` to at most `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn format_rank_shift(course: &RankedCourse) -> ColoredString {
    let label = format!("{}/{}", course.user_rank, course.platform_rank);
    if course.user_rank == course.platform_rank {
        label.color(CliColors::muted())
    } else {
        label.normal()
    }
}

pub fn print_report(report: &MatchReport) {
    println!(
        "{}",
        format_success(&format!(
            "{} courses for '{}' ({})",
            report.courses.len(),
            report.query,
            report.language
        ))
    );
    if report.translated {
        println!(
            "{}",
            format_info(&format!("Matched the translation '{}'", report.matched_text))
        );
    }
    println!(
        "{}: {}  {}: {}  {}: {:.2}",
        "Semantic".color(CliColors::muted()),
        report.semantic_mode.color(CliColors::info()),
        "Strategy".color(CliColors::muted()),
        report.strategy.to_string().color(CliColors::info()),
        "Disagreement".color(CliColors::muted()),
        report.consensus_cost
    );
    println!();

    println!(
        "{:<4} {:<42} {:>9} {:>9} {:>7} {:>8}",
        "#".color(CliColors::muted()).bold(),
        "Course".color(CliColors::muted()).bold(),
        "Price".color(CliColors::muted()).bold(),
        "User/Plt".color(CliColors::muted()).bold(),
        "Score".color(CliColors::muted()).bold(),
        "Platform".color(CliColors::muted()).bold(),
    );
    println!("{}", "─".repeat(84).color(CliColors::muted()));

    for course in &report.courses {
        println!(
            "{:<4} {:<42} {:>9.2} {:>9} {:>7.3} {:>8.3}",
            course.consensus_rank.to_string().color(CliColors::accent()).bold(),
            truncate(&course.course.name_native, 42),
            course.course.price,
            format_rank_shift(course),
            course.final_score,
            course.platform_score,
        );
    }
}

pub fn print_target_groups(config: &PlatformConfig) {
    if config.target_groups.is_empty() {
        println!("{}", format_warning("No target groups configured."));
        return;
    }

    println!(
        "{:<36} {}",
        "Label".color(CliColors::muted()).bold(),
        "Catalog column".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(70).color(CliColors::muted()));
    for (label, column) in &config.target_groups {
        let marker = if config.women_group_label.as_deref() == Some(label.as_str()) {
            " (added for female callers)".color(CliColors::muted())
        } else {
            "".normal()
        };
        println!(
            "{:<36} {}{}",
            label.color(CliColors::accent()),
            column,
            marker
        );
    }
}
