use crate::parser::{parse_statement, StatementType};
use crate::sanitizer::{strip_comments_with_stats, CommentStats};
use crate::splitter::{split_statements_with_mode, SplitMode};
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableStats {
    pub table_name: String,
    pub insert_count: u64,
    pub create_count: u64,
    pub total_bytes: u64,
    pub statement_count: u64,
}

impl TableStats {
    fn new(table_name: String) -> Self {
        Self {
            table_name,
            insert_count: 0,
            create_count: 0,
            total_bytes: 0,
            statement_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TypeCount {
    pub statement_type: StatementType,
    pub count: u64,
}

/// Everything known about a seed file after sanitizing and splitting it.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SeedStats {
    pub split_mode: SplitMode,
    pub statement_count: u64,
    pub total_bytes: u64,
    pub comments: CommentStats,
    pub statement_types: Vec<TypeCount>,
    pub tables: Vec<TableStats>,
}

impl SeedStats {
    pub fn table(&self, name: &str) -> Option<&TableStats> {
        self.tables.iter().find(|t| t.table_name == name)
    }

    pub fn count_of(&self, statement_type: StatementType) -> u64 {
        self.statement_types
            .iter()
            .find(|c| c.statement_type == statement_type)
            .map_or(0, |c| c.count)
    }
}

#[derive(Default)]
pub struct Analyzer {
    mode: SplitMode,
    stats: AHashMap<String, TableStats>,
    type_counts: AHashMap<StatementType, u64>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Strip comments from `raw`, split it, and analyze the statements.
    pub fn analyze_sql(self, raw: &str) -> SeedStats {
        let (cleaned, comments) = strip_comments_with_stats(raw);
        let statements = split_statements_with_mode(&cleaned, self.mode);
        let mut stats = self.analyze_statements(&statements);
        stats.comments = comments;
        stats
    }

    pub fn analyze_statements(mut self, statements: &[String]) -> SeedStats {
        let mut total_bytes = 0;

        for stmt in statements {
            let (stmt_type, table_name) = parse_statement(stmt);
            *self.type_counts.entry(stmt_type).or_insert(0) += 1;
            total_bytes += stmt.len() as u64;

            if stmt_type == StatementType::Unknown || table_name.is_empty() {
                continue;
            }

            self.update_stats(&table_name, stmt_type, stmt.len() as u64);
        }

        SeedStats {
            split_mode: self.mode,
            statement_count: statements.len() as u64,
            total_bytes,
            comments: CommentStats::default(),
            statement_types: self.get_sorted_type_counts(),
            tables: self.get_sorted_stats(),
        }
    }

    fn update_stats(&mut self, table_name: &str, stmt_type: StatementType, bytes: u64) {
        let stats = self
            .stats
            .entry(table_name.to_string())
            .or_insert_with(|| TableStats::new(table_name.to_string()));

        stats.statement_count += 1;
        stats.total_bytes += bytes;

        match stmt_type {
            StatementType::CreateTable => stats.create_count += 1,
            StatementType::Insert => stats.insert_count += 1,
            _ => {}
        }
    }

    fn get_sorted_stats(&self) -> Vec<TableStats> {
        let mut result: Vec<TableStats> = self.stats.values().cloned().collect();
        result.sort_by(|a, b| {
            b.insert_count
                .cmp(&a.insert_count)
                .then_with(|| a.table_name.cmp(&b.table_name))
        });
        result
    }

    fn get_sorted_type_counts(&self) -> Vec<TypeCount> {
        let mut result: Vec<TypeCount> = self
            .type_counts
            .iter()
            .map(|(&statement_type, &count)| TypeCount {
                statement_type,
                count,
            })
            .collect();
        result.sort_by_key(|c| c.statement_type);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_basic() {
        let sql = "CREATE TABLE users (id INT);\nINSERT INTO users VALUES (1);\nINSERT INTO users VALUES (2);\nCREATE TABLE posts (id INT);\nINSERT INTO posts VALUES (1);";

        let stats = Analyzer::new().analyze_sql(sql);

        assert_eq!(stats.statement_count, 5);
        assert_eq!(stats.tables.len(), 2);

        let users_stats = stats.table("users").unwrap();
        assert_eq!(users_stats.insert_count, 2);
        assert_eq!(users_stats.create_count, 1);
        assert_eq!(users_stats.statement_count, 3);

        let posts_stats = stats.table("posts").unwrap();
        assert_eq!(posts_stats.insert_count, 1);
        assert_eq!(posts_stats.create_count, 1);
        assert_eq!(posts_stats.statement_count, 2);
    }

    #[test]
    fn test_analyzer_sorted_by_insert_count() {
        let sql = "CREATE TABLE a (id INT);\nINSERT INTO a VALUES (1);\nCREATE TABLE b (id INT);\nINSERT INTO b VALUES (1);\nINSERT INTO b VALUES (2);\nINSERT INTO b VALUES (3);";

        let stats = Analyzer::new().analyze_sql(sql);

        assert_eq!(stats.tables[0].table_name, "b");
        assert_eq!(stats.tables[0].insert_count, 3);
        assert_eq!(stats.tables[1].table_name, "a");
        assert_eq!(stats.tables[1].insert_count, 1);
    }

    #[test]
    fn test_analyzer_counts_types_and_comments() {
        let sql = "-- seed\nSET NAMES utf8mb4;\n/* users */\nINSERT INTO users VALUES (1);\n";

        let stats = Analyzer::new().analyze_sql(sql);

        assert_eq!(stats.comments.comments_removed(), 2);
        assert_eq!(stats.count_of(StatementType::Unknown), 1);
        assert_eq!(stats.count_of(StatementType::Insert), 1);
        assert_eq!(stats.count_of(StatementType::CreateTable), 0);
        assert_eq!(stats.tables.len(), 1);
    }

    #[test]
    fn test_analyzer_respects_split_mode() {
        let sql = "INSERT INTO a VALUES (1); INSERT INTO a VALUES (2);\n";

        let line = Analyzer::new().analyze_sql(sql);
        let quote = Analyzer::new()
            .with_mode(SplitMode::QuoteAware)
            .analyze_sql(sql);

        assert_eq!(line.statement_count, 1);
        assert_eq!(quote.statement_count, 2);
        assert_eq!(quote.split_mode, SplitMode::QuoteAware);
    }
}
