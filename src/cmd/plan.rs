use super::{load_source, parse_mode, parse_table_list, write_output};
use schemars::JsonSchema;
use serde::Serialize;
use sql_seed::config::SeedConfig;
use sql_seed::parser::SqlDialect;
use sql_seed::plan::{ImportOptions, ImportPlan};
use sql_seed::source::SqlSource;
use std::path::PathBuf;
use tracing::debug;

pub struct PlanArgs {
    pub source: SqlSource,
    pub config: Option<PathBuf>,
    pub dialect: Option<String>,
    pub mode: Option<String>,
    pub truncate: bool,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub dry_run: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub progress: bool,
}

/// JSON output for plan command
#[derive(Serialize, JsonSchema)]
pub(crate) struct PlanJsonOutput {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<String>,
    plan: ImportPlan,
}

pub fn run(args: PlanArgs) -> anyhow::Result<()> {
    let options = resolve_options(&args)?;
    debug!(?options, "resolved import options");

    let raw = load_source(&args.source, args.progress && !args.json)?;
    let plan = ImportPlan::build(&raw, &options);

    if args.json {
        let out = PlanJsonOutput {
            input: args.source.label(),
            config: args.config.as_ref().map(|p| p.display().to_string()),
            plan,
        };
        let mut rendered = serde_json::to_string_pretty(&out)?;
        rendered.push('\n');
        return write_output(args.output.as_deref(), &rendered);
    }

    write_output(args.output.as_deref(), &plan.to_script())?;

    eprintln!(
        "Import plan for {} [dialect: {}]",
        args.source.label(),
        plan.dialect
    );
    eprintln!("  Split mode:         {}", plan.split_mode);
    eprintln!("  Statements:         {}", plan.len());
    eprintln!("  Truncate prelude:   {}", plan.truncate_count());
    eprintln!("  Filtered out:       {}", plan.skipped);
    eprintln!("  Comments removed:   {}", plan.comments.comments_removed());
    if plan.dry_run {
        eprintln!("  Dry run: nothing will be executed");
    }

    Ok(())
}

/// Config file values, overridden by any flag given on the command line.
fn resolve_options(args: &PlanArgs) -> anyhow::Result<ImportOptions> {
    let config = match &args.config {
        Some(path) => SeedConfig::load(path)?,
        None => SeedConfig::default(),
    };
    let mut options = config.into_options();

    if let Some(d) = &args.dialect {
        options.dialect = d
            .parse::<SqlDialect>()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(mode) = parse_mode(args.mode.clone())? {
        options.split_mode = mode;
    }
    if args.truncate {
        options.truncate_before = true;
    }
    if args.dry_run {
        options.dry_run = true;
    }
    if let Some(tables) = parse_table_list(args.tables.clone()) {
        options.tables = Some(tables).filter(|t| !t.is_empty());
    }
    if let Some(exclude) = parse_table_list(args.exclude.clone()) {
        options.exclude.extend(exclude);
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_seed::splitter::SplitMode;
    use tempfile::TempDir;

    fn args() -> PlanArgs {
        PlanArgs {
            source: SqlSource::Inline("SELECT 1;".to_string()),
            config: None,
            dialect: None,
            mode: None,
            truncate: false,
            tables: None,
            exclude: None,
            dry_run: false,
            json: false,
            output: None,
            progress: false,
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let options = resolve_options(&args()).unwrap();
        assert_eq!(options, ImportOptions::default());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("seed.yaml");
        std::fs::write(
            &config,
            "dialect: postgres\nsplit_mode: quote-aware\nexclude: [audit]\n",
        )
        .unwrap();

        let options = resolve_options(&PlanArgs {
            config: Some(config),
            dialect: Some("sqlite".to_string()),
            truncate: true,
            exclude: Some("logs".to_string()),
            ..args()
        })
        .unwrap();

        assert_eq!(options.dialect, SqlDialect::Sqlite);
        assert_eq!(options.split_mode, SplitMode::QuoteAware);
        assert!(options.truncate_before);
        assert_eq!(options.exclude, vec!["audit".to_string(), "logs".to_string()]);
    }

    #[test]
    fn test_bad_dialect_flag() {
        let err = resolve_options(&PlanArgs {
            dialect: Some("oracle".to_string()),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Unknown dialect"));
    }
}
