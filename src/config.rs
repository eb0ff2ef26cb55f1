//! YAML configuration for seed imports.
//!
//! ```yaml
//! dialect: postgres
//! split_mode: quote-aware
//! truncate_before: true
//! tables: [users, posts]
//! exclude: [migrations]
//! ```

use crate::parser::SqlDialect;
use crate::plan::ImportOptions;
use crate::splitter::SplitMode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub dialect: SqlDialect,
    pub split_mode: SplitMode,
    /// Empty target tables before the seed runs
    pub truncate_before: bool,
    /// Parse and plan without executing
    pub dry_run: bool,
    /// Only import these tables
    pub tables: Option<Vec<String>>,
    /// Never import these tables
    pub exclude: Vec<String>,
}

impl SeedConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SeedConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    pub fn into_options(self) -> ImportOptions {
        ImportOptions {
            split_mode: self.split_mode,
            truncate_before: self.truncate_before,
            dry_run: self.dry_run,
            dialect: self.dialect,
            tables: self.tables.filter(|t| !t.is_empty()),
            exclude: self.exclude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let yaml = r#"
dialect: postgres
split_mode: quote-aware
truncate_before: true
dry_run: true
tables: [users, posts]
exclude:
  - migrations
"#;
        let options = SeedConfig::from_yaml(yaml).unwrap().into_options();

        assert_eq!(options.dialect, SqlDialect::Postgres);
        assert_eq!(options.split_mode, SplitMode::QuoteAware);
        assert!(options.truncate_before);
        assert!(options.dry_run);
        assert_eq!(
            options.tables,
            Some(vec!["users".to_string(), "posts".to_string()])
        );
        assert_eq!(options.exclude, vec!["migrations".to_string()]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = SeedConfig::from_yaml("dialect: sqlite\n").unwrap();
        assert_eq!(config.dialect, SqlDialect::Sqlite);
        assert_eq!(config.split_mode, SplitMode::LineAnchored);
        assert!(!config.truncate_before);
        assert_eq!(config.tables, None);
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(SeedConfig::from_yaml("").unwrap(), SeedConfig::default());
    }

    #[test]
    fn test_empty_table_list_means_all_tables() {
        let options = SeedConfig::from_yaml("tables: []\n").unwrap().into_options();
        assert_eq!(options.tables, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(SeedConfig::from_yaml("truncate: true\n").is_err());
    }

    #[test]
    fn test_bad_dialect_rejected() {
        assert!(SeedConfig::from_yaml("dialect: oracle\n").is_err());
    }
}
