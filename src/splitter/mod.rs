//! Statement splitting for cleaned SQL text.
//!
//! The default [`SplitMode::LineAnchored`] splits only where a `;` ends a line
//! (or the input). It assumes seed-file formatting: one statement per
//! line-terminated block. A mid-line `;` does not split, and a `;` followed by a
//! line break inside a string literal does. [`SplitMode::QuoteAware`] walks the
//! input with the lexical scanner instead and splits on every `;` outside
//! literals and comments.

use crate::sanitizer::strip_comments;
use crate::scanner::{Scanner, SpanKind};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

static STATEMENT_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";\s*(?:\r?\n|$)").unwrap());

/// How statement boundaries are found.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMode {
    /// Split on `;` followed by optional whitespace and a line break or end of input
    #[default]
    LineAnchored,
    /// Split on every `;` outside string literals and comments
    QuoteAware,
}

impl std::str::FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "line-anchored" => Ok(SplitMode::LineAnchored),
            "quote" | "quote-aware" => Ok(SplitMode::QuoteAware),
            _ => Err(format!(
                "Unknown split mode: {}. Valid options: line-anchored, quote-aware",
                s
            )),
        }
    }
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitMode::LineAnchored => write!(f, "line-anchored"),
            SplitMode::QuoteAware => write!(f, "quote-aware"),
        }
    }
}

/// Split `sql` with the default line-anchored mode.
///
/// Every returned statement is trimmed, non-empty, and ends in exactly one `;`.
pub fn split_statements(sql: &str) -> Vec<String> {
    split_statements_with_mode(sql, SplitMode::LineAnchored)
}

pub fn split_statements_with_mode(sql: &str, mode: SplitMode) -> Vec<String> {
    let statements = match mode {
        SplitMode::LineAnchored => split_line_anchored(sql),
        SplitMode::QuoteAware => split_quote_aware(sql),
    };
    debug!(%mode, count = statements.len(), "split statements");
    statements
}

/// Strip comments from raw SQL and split the result.
pub fn sanitize_and_split(raw: &str, mode: SplitMode) -> Vec<String> {
    let cleaned = strip_comments(raw);
    split_statements_with_mode(&cleaned, mode)
}

/// Reusable splitter carrying its configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementSplitter {
    mode: SplitMode,
    strip_comments: bool,
}

impl StatementSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the comment stripper before splitting.
    pub fn with_comment_stripping(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn split(&self, sql: &str) -> Vec<String> {
        if self.strip_comments {
            sanitize_and_split(sql, self.mode)
        } else {
            split_statements_with_mode(sql, self.mode)
        }
    }
}

fn split_line_anchored(sql: &str) -> Vec<String> {
    STATEMENT_BOUNDARY_RE
        .split(sql)
        .filter_map(finish_statement)
        .collect()
}

fn split_quote_aware(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for span in Scanner::new(sql) {
        match span.kind {
            SpanKind::Code => {
                let mut pieces = span.text.split(';');
                if let Some(first) = pieces.next() {
                    current.push_str(first);
                }
                for piece in pieces {
                    statements.extend(finish_statement(&current));
                    current.clear();
                    current.push_str(piece);
                }
            }
            SpanKind::Literal { .. } => current.push_str(span.text),
            SpanKind::LineComment | SpanKind::BlockComment { .. } => {}
        }
    }
    statements.extend(finish_statement(&current));

    statements
}

/// Trim a raw segment and terminate it with a single `;`.
///
/// Returns `None` for segments holding nothing but whitespace and semicolons.
fn finish_statement(segment: &str) -> Option<String> {
    let body = segment
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if body.is_empty() {
        return None;
    }
    Some(format!("{};", body))
}
