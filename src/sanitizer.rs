//! Comment stripping for SQL seed files.
//!
//! Removes `--` line comments and `/* */` block comments while leaving quoted
//! literals untouched. The newline that ends a line comment is kept, so line
//! numbers of the surviving statements do not shift.

use crate::scanner::{Scanner, SpanKind};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, warn};

/// Counters describing what [`strip_comments_with_stats`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CommentStats {
    pub line_comments: u64,
    pub block_comments: u64,
    /// Block comments with no closing `*/`; each swallowed the rest of the input.
    pub unterminated_block_comments: u64,
    /// Literals with no closing quote; kept verbatim to end of input.
    pub unterminated_literals: u64,
    pub bytes_removed: u64,
}

impl CommentStats {
    pub fn comments_removed(&self) -> u64 {
        self.line_comments + self.block_comments
    }
}

/// Strip every comment span from `input`.
///
/// Total: malformed input never fails. An unterminated block comment discards
/// the remainder of the input.
pub fn strip_comments(input: &str) -> String {
    strip_comments_with_stats(input).0
}

/// Same as [`strip_comments`], also reporting what was removed.
pub fn strip_comments_with_stats(input: &str) -> (String, CommentStats) {
    let (output, stats) = Scanner::new(input).fold(
        (String::with_capacity(input.len()), CommentStats::default()),
        |(mut out, mut stats), span| {
            match span.kind {
                SpanKind::Code => out.push_str(span.text),
                SpanKind::Literal { terminated, .. } => {
                    if !terminated {
                        stats.unterminated_literals += 1;
                    }
                    out.push_str(span.text);
                }
                SpanKind::LineComment => {
                    stats.line_comments += 1;
                    stats.bytes_removed += span.text.len() as u64;
                }
                SpanKind::BlockComment { terminated } => {
                    stats.block_comments += 1;
                    if !terminated {
                        stats.unterminated_block_comments += 1;
                    }
                    stats.bytes_removed += span.text.len() as u64;
                }
            }
            (out, stats)
        },
    );

    if stats.unterminated_block_comments > 0 {
        warn!("unterminated block comment; discarded the rest of the input");
    }
    if stats.unterminated_literals > 0 {
        warn!("unterminated string literal at end of input");
    }
    debug!(
        line_comments = stats.line_comments,
        block_comments = stats.block_comments,
        bytes_removed = stats.bytes_removed,
        "stripped comments"
    );

    (output, stats)
}
