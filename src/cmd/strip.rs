use super::{load_source, write_output};
use sql_seed::sanitizer::strip_comments_with_stats;
use sql_seed::source::SqlSource;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub fn run(
    source: &SqlSource,
    output: Option<PathBuf>,
    stats: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let raw = load_source(source, progress)?;

    let (cleaned, comment_stats) = strip_comments_with_stats(&raw);
    write_output(output.as_deref(), &cleaned)?;

    info!(
        source = %source.label(),
        comments = comment_stats.comments_removed(),
        elapsed = ?start_time.elapsed(),
        "stripped comments"
    );

    if stats {
        eprintln!("Comment summary for {}:", source.label());
        eprintln!("  Line comments:  {}", comment_stats.line_comments);
        eprintln!("  Block comments: {}", comment_stats.block_comments);
        if comment_stats.unterminated_block_comments > 0 {
            eprintln!(
                "  Unterminated:   {} (rest of input discarded)",
                comment_stats.unterminated_block_comments
            );
        }
        eprintln!("  Bytes removed:  {}", comment_stats.bytes_removed);
    }

    Ok(())
}
