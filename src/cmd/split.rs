use super::{load_source, parse_mode, write_output};
use schemars::JsonSchema;
use serde::Serialize;
use sql_seed::sanitizer::{strip_comments_with_stats, CommentStats};
use sql_seed::source::SqlSource;
use sql_seed::splitter::{split_statements_with_mode, SplitMode};
use std::path::PathBuf;
use std::time::Instant;

/// JSON output for the split command
#[derive(Serialize, JsonSchema)]
pub(crate) struct SplitJsonOutput {
    input: String,
    split_mode: SplitMode,
    comments_stripped: bool,
    statistics: SplitStatistics,
    statements: Vec<String>,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct SplitStatistics {
    statement_count: usize,
    input_bytes: u64,
    comments: CommentStats,
    elapsed_secs: f64,
}

pub fn run(
    source: &SqlSource,
    output: Option<PathBuf>,
    mode: Option<String>,
    no_strip: bool,
    json: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let mode = parse_mode(mode)?.unwrap_or_default();
    let start_time = Instant::now();
    let raw = load_source(source, progress && !json)?;

    let (cleaned, comments) = if no_strip {
        (raw.clone(), CommentStats::default())
    } else {
        strip_comments_with_stats(&raw)
    };
    let statements = split_statements_with_mode(&cleaned, mode);
    let elapsed = start_time.elapsed();

    if json {
        let out = SplitJsonOutput {
            input: source.label(),
            split_mode: mode,
            comments_stripped: !no_strip,
            statistics: SplitStatistics {
                statement_count: statements.len(),
                input_bytes: raw.len() as u64,
                comments,
                elapsed_secs: elapsed.as_secs_f64(),
            },
            statements,
        };
        let mut rendered = serde_json::to_string_pretty(&out)?;
        rendered.push('\n');
        return write_output(output.as_deref(), &rendered);
    }

    let mut script = String::with_capacity(cleaned.len());
    for stmt in &statements {
        script.push_str(stmt);
        script.push('\n');
    }
    write_output(output.as_deref(), &script)?;

    eprintln!(
        "Split {} statements from {} [mode: {}] in {:.3?}",
        statements.len(),
        source.label(),
        mode,
        elapsed
    );

    Ok(())
}
