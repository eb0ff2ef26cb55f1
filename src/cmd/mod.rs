pub(crate) mod analyze;
mod inputs;
pub(crate) mod plan;
mod schema;
pub(crate) mod split;
mod strip;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use sql_seed::source::SqlSource;
use sql_seed::splitter::SplitMode;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sql-seed")]
#[command(version)]
#[command(
    about = "Sanitize SQL seed files and split them into executable statements",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log filter directive, e.g. "debug" (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a single-input command reads its SQL from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Input SQL file, or - for stdin
    /// Supports .gz, .bz2, .xz, .zst compression
    #[arg(required_unless_present = "sql")]
    pub file: Option<PathBuf>,

    /// SQL text to process instead of a file
    #[arg(long, conflicts_with = "file")]
    pub sql: Option<String>,
}

impl SourceArgs {
    pub fn source(&self) -> anyhow::Result<SqlSource> {
        match (&self.sql, &self.file) {
            (Some(text), _) => Ok(SqlSource::Inline(text.clone())),
            (None, Some(path)) => Ok(SqlSource::from_arg(path)),
            (None, None) => anyhow::bail!("no input given: pass a FILE or --sql"),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove -- and /* */ comments, leaving string literals untouched
    Strip {
        #[command(flatten)]
        input: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print what was removed to stderr
        #[arg(long)]
        stats: bool,

        /// Show progress while reading
        #[arg(short, long)]
        progress: bool,
    },

    /// Strip comments and split a SQL file into statements
    ///
    /// Statements are written one after another, each followed by a newline.
    /// A statement that spans several lines keeps its line breaks.
    Split {
        #[command(flatten)]
        input: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Split mode: line-anchored (default) or quote-aware
        #[arg(short, long)]
        mode: Option<String>,

        /// Split the text as-is, without stripping comments first
        #[arg(long)]
        no_strip: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Show progress while reading
        #[arg(short, long)]
        progress: bool,
    },

    /// Show statement and per-table statistics for seed files
    Analyze {
        /// Input SQL files or glob patterns (e.g., seeds/*.sql), or - for stdin
        /// Supports .gz, .bz2, .xz, .zst compression
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Split mode: line-anchored (default) or quote-aware
        #[arg(short, long)]
        mode: Option<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Stop on first file that fails (for glob patterns)
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the ordered statements an import would execute
    Plan {
        #[command(flatten)]
        input: SourceArgs,

        /// YAML config file with import defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// SQL dialect for generated statements: mysql, postgres, sqlite
        #[arg(short, long)]
        dialect: Option<String>,

        /// Split mode: line-anchored or quote-aware
        #[arg(short, long)]
        mode: Option<String>,

        /// Empty every inserted-into table before the seed runs
        #[arg(long)]
        truncate: bool,

        /// Only import specific tables (comma-separated)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude specific tables (comma-separated)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Mark the plan as a dry run
        #[arg(long)]
        dry_run: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Output file for the plan script (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show progress while reading
        #[arg(short, long)]
        progress: bool,
    },

    /// Print JSON Schemas for --json output
    Schema {
        /// Only the schema for this command
        #[arg(short, long)]
        command: Option<String>,

        /// List available schema names
        #[arg(long)]
        list: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Strip {
            input,
            output,
            stats,
            progress,
        } => strip::run(&input.source()?, output, stats, progress),
        Commands::Split {
            input,
            output,
            mode,
            no_strip,
            json,
            progress,
        } => split::run(&input.source()?, output, mode, no_strip, json, progress),
        Commands::Analyze {
            files,
            mode,
            json,
            fail_fast,
        } => analyze::run(&files, mode, json, fail_fast),
        Commands::Plan {
            input,
            config,
            dialect,
            mode,
            truncate,
            tables,
            exclude,
            dry_run,
            json,
            output,
            progress,
        } => plan::run(plan::PlanArgs {
            source: input.source()?,
            config,
            dialect,
            mode,
            truncate,
            tables,
            exclude,
            dry_run,
            json,
            output,
            progress,
        }),
        Commands::Schema { command, list } => schema::run(command, list),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sql-seed", &mut io::stdout());
            Ok(())
        }
    }
}

fn parse_mode(mode: Option<String>) -> anyhow::Result<Option<SplitMode>> {
    mode.map(|m| m.parse().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()
}

fn parse_table_list(list: Option<String>) -> Option<Vec<String>> {
    list.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}

/// Read a seed source, optionally behind a byte progress bar on stderr.
fn load_source(source: &SqlSource, progress: bool) -> anyhow::Result<String> {
    match (progress, source.size_hint()) {
        (true, Some(total)) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )?
                .progress_chars("#>-"),
            );
            let bar = pb.clone();
            let text = source.read_with_progress(move |bytes| bar.set_position(bytes))?;
            pb.finish_and_clear();
            Ok(text)
        }
        _ => source.read_to_string(),
    }
}

fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(None).unwrap(), None);
        assert_eq!(
            parse_mode(Some("quote-aware".to_string())).unwrap(),
            Some(SplitMode::QuoteAware)
        );
        assert!(parse_mode(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_table_list() {
        assert_eq!(parse_table_list(None), None);
        assert_eq!(
            parse_table_list(Some(" users, posts ,,".to_string())),
            Some(vec!["users".to_string(), "posts".to_string()])
        );
    }

    #[test]
    fn test_inline_sql_flag() {
        let cli = Cli::try_parse_from(["sql-seed", "split", "--sql", "SELECT 1;"]).unwrap();
        let Commands::Split { input, .. } = cli.command else {
            panic!("expected split");
        };
        assert_eq!(
            input.source().unwrap(),
            SqlSource::Inline("SELECT 1;".to_string())
        );
    }

    #[test]
    fn test_source_requires_file_or_sql() {
        assert!(Cli::try_parse_from(["sql-seed", "strip"]).is_err());
        assert!(Cli::try_parse_from(["sql-seed", "strip", "a.sql", "--sql", "SELECT 1;"]).is_err());

        let cli = Cli::try_parse_from(["sql-seed", "strip", "-"]).unwrap();
        let Commands::Strip { input, .. } = cli.command else {
            panic!("expected strip");
        };
        assert_eq!(input.source().unwrap(), SqlSource::Stdin);
    }

    #[test]
    fn test_analyze_accepts_several_inputs() {
        let cli = Cli::try_parse_from(["sql-seed", "analyze", "a.sql", "seeds/*.sql"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyze { ref files, .. } if files.len() == 2));
        assert!(Cli::try_parse_from(["sql-seed", "analyze"]).is_err());
    }

    #[test]
    fn test_plan_flags_parse() {
        let cli = Cli::try_parse_from([
            "sql-seed", "-vv", "plan", "seed.sql", "--truncate", "-d", "sqlite", "-t", "users",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Plan { truncate: true, ref dialect, .. } if dialect.as_deref() == Some("sqlite")
        ));
    }
}
