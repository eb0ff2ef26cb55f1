use super::inputs::{expand_inputs, BatchOutcome};
use super::{load_source, parse_mode};
use schemars::JsonSchema;
use serde::Serialize;
use sql_seed::analyzer::{Analyzer, SeedStats};
use sql_seed::source::SqlSource;
use sql_seed::splitter::SplitMode;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// JSON output for analyze command
#[derive(Serialize, JsonSchema)]
pub(crate) struct AnalyzeJsonOutput {
    total_files: usize,
    succeeded: usize,
    failed: usize,
    elapsed_secs: f64,
    results: Vec<AnalyzeFileResult>,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct AnalyzeFileResult {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SeedStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(
    files: &[PathBuf],
    mode: Option<String>,
    json: bool,
    fail_fast: bool,
) -> anyhow::Result<()> {
    let mode = parse_mode(mode)?.unwrap_or_default();
    let inputs = expand_inputs(files)?;
    let start_time = Instant::now();

    let mut outcome = BatchOutcome::default();
    let mut results = Vec::with_capacity(inputs.sources.len());

    for source in &inputs.sources {
        let label = source.label();
        match analyze_source(source, mode) {
            Ok(stats) => {
                outcome.record_success();
                if !json {
                    print_stats(&label, &stats);
                }
                results.push(AnalyzeFileResult {
                    file: label,
                    stats: Some(stats),
                    error: None,
                });
            }
            Err(e) => {
                warn!(source = %label, error = %e, "analysis failed");
                outcome.record_failure(label.clone(), format!("{e:#}"));
                results.push(AnalyzeFileResult {
                    file: label,
                    stats: None,
                    error: Some(format!("{e:#}")),
                });
                if fail_fast {
                    break;
                }
            }
        }
    }

    if json {
        let out = AnalyzeJsonOutput {
            total_files: outcome.total(),
            succeeded: outcome.succeeded,
            failed: outcome.failed(),
            elapsed_secs: start_time.elapsed().as_secs_f64(),
            results,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if inputs.batch {
        println!(
            "Analyzed {} files: {} succeeded, {} failed",
            outcome.total(),
            outcome.succeeded,
            outcome.failed()
        );
        for (label, error) in &outcome.failures {
            eprintln!("  {}: {}", label, error);
        }
    }

    if outcome.failed() > 0 {
        if inputs.batch {
            anyhow::bail!("{} of {} files failed", outcome.failed(), outcome.total());
        }
        let (_, error) = &outcome.failures[0];
        anyhow::bail!("{}", error);
    }

    Ok(())
}

fn analyze_source(source: &SqlSource, mode: SplitMode) -> anyhow::Result<SeedStats> {
    let raw = load_source(source, false)?;
    Ok(Analyzer::new().with_mode(mode).analyze_sql(&raw))
}

fn print_stats(label: &str, stats: &SeedStats) {
    println!(
        "{}: {} statements ({:.2} KB) [mode: {}]",
        label,
        stats.statement_count,
        stats.total_bytes as f64 / 1024.0,
        stats.split_mode
    );
    println!(
        "  Comments removed: {} line, {} block",
        stats.comments.line_comments, stats.comments.block_comments
    );

    if !stats.statement_types.is_empty() {
        let types: Vec<String> = stats
            .statement_types
            .iter()
            .map(|c| format!("{}={}", c.statement_type, c.count))
            .collect();
        println!("  Statement types: {}", types.join(", "));
    }

    if stats.tables.is_empty() {
        println!("  No tables found.");
        println!();
        return;
    }

    println!();
    println!(
        "  {:<40} {:>10} {:>10} {:>12}",
        "Table Name", "INSERTs", "Stmts", "Size (KB)"
    );
    println!("  {}", "─".repeat(76));
    for table in &stats.tables {
        println!(
            "  {:<40} {:>10} {:>10} {:>12.2}",
            truncate_string(&table.table_name, 40),
            table.insert_count,
            table.statement_count,
            table.total_bytes as f64 / 1024.0
        );
    }
    println!();
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
