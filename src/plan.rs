//! The ordered statement list an import driver would execute.
//!
//! A plan is built from raw SQL: comments are stripped, statements are split,
//! the table filter is applied, and an optional truncate prelude empties every
//! table the seed inserts into. Nothing here talks to a database; `dry_run` is
//! carried so the caller can report it.

use crate::parser::{parse_table_ref, SqlDialect, StatementType, TableRef};
use crate::sanitizer::{strip_comments_with_stats, CommentStats};
use crate::splitter::{split_statements_with_mode, SplitMode};
use ahash::AHashSet;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub split_mode: SplitMode,
    /// Empty every inserted-into table before the seed statements run
    pub truncate_before: bool,
    pub dry_run: bool,
    pub dialect: SqlDialect,
    /// When set, only statements targeting these tables are kept
    pub tables: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

impl ImportOptions {
    /// Whether a statement targeting `table` survives the table filter.
    ///
    /// Statements without a target table (`SET ...`, `BEGIN`) always do.
    pub fn includes_table(&self, table: &str) -> bool {
        if table.is_empty() {
            return true;
        }
        if self.exclude.iter().any(|t| t.eq_ignore_ascii_case(table)) {
            return false;
        }
        match &self.tables {
            Some(tables) => tables.iter().any(|t| t.eq_ignore_ascii_case(table)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementOrigin {
    /// Generated by the truncate prelude
    Truncate,
    /// Taken from the seed source
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PlannedStatement {
    /// 1-based execution order
    pub index: usize,
    pub kind: StatementType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub origin: StatementOrigin,
    pub sql: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ImportPlan {
    pub dialect: SqlDialect,
    pub split_mode: SplitMode,
    pub dry_run: bool,
    pub truncate_before: bool,
    pub comments: CommentStats,
    /// Statements dropped by the table filter
    pub skipped: usize,
    pub statements: Vec<PlannedStatement>,
}

impl ImportPlan {
    pub fn build(raw_sql: &str, options: &ImportOptions) -> Self {
        let (cleaned, comments) = strip_comments_with_stats(raw_sql);
        let split = split_statements_with_mode(&cleaned, options.split_mode);

        let mut skipped = 0;
        let mut source = Vec::with_capacity(split.len());
        for sql in split {
            let (kind, table) = parse_table_ref(&sql);
            let name = table.as_ref().map(|t| t.to_string()).unwrap_or_default();
            if !options.includes_table(&name) {
                skipped += 1;
                continue;
            }
            source.push((kind, table, sql));
        }

        let mut statements = Vec::with_capacity(source.len());
        if options.truncate_before {
            for table in truncate_order(&source, options.dialect) {
                statements.push(PlannedStatement {
                    index: 0,
                    kind: StatementType::Truncate,
                    sql: options.dialect.truncate_statement(table),
                    table: Some(options.dialect.canonical_name(table)),
                    origin: StatementOrigin::Truncate,
                });
            }
        }

        statements.extend(source.iter().map(|(kind, table, sql)| PlannedStatement {
            index: 0,
            kind: *kind,
            table: table.as_ref().map(|t| t.to_string()).filter(|t| !t.is_empty()),
            origin: StatementOrigin::Source,
            sql: sql.clone(),
        }));

        for (i, stmt) in statements.iter_mut().enumerate() {
            stmt.index = i + 1;
        }

        debug!(skipped, "applied table filter");
        info!(
            statements = statements.len(),
            truncate_before = options.truncate_before,
            dry_run = options.dry_run,
            "built import plan"
        );

        Self {
            dialect: options.dialect,
            split_mode: options.split_mode,
            dry_run: options.dry_run,
            truncate_before: options.truncate_before,
            comments,
            skipped,
            statements,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn truncate_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| s.origin == StatementOrigin::Truncate)
            .count()
    }

    /// The plan as one executable script, each statement followed by a newline.
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for stmt in &self.statements {
            script.push_str(&stmt.sql);
            script.push('\n');
        }
        script
    }
}

/// Tables receiving INSERTs, in reverse order of first appearance.
///
/// Seeds usually insert parents before children, so reversing empties
/// children first. References the dialect resolves to the same table count
/// once, under the spelling seen first.
fn truncate_order(
    source: &[(StatementType, Option<TableRef>, String)],
    dialect: SqlDialect,
) -> Vec<&TableRef> {
    let mut seen = AHashSet::new();
    let mut order = Vec::new();
    for (kind, table, _) in source {
        if *kind != StatementType::Insert {
            continue;
        }
        if let Some(table) = table.as_ref().filter(|t| !t.to_string().is_empty()) {
            if seen.insert(dialect.table_key(table)) {
                order.push(table);
            }
        }
    }
    order.reverse();
    order
}
