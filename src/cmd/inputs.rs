//! Input resolution for commands that accept several seed files.
//!
//! Each argument is `-` (stdin), a literal path, or a glob pattern. The
//! arguments resolve to a single ordered list of [`SqlSource`]s: glob matches
//! are sorted, and a file reached through more than one argument is read once.

use ahash::AHashSet;
use sql_seed::source::SqlSource;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct InputSet {
    pub sources: Vec<SqlSource>,
    /// More than one argument or any glob; results are reported as a batch
    pub batch: bool,
}

pub fn is_glob_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Resolve every argument, in order.
///
/// Fails on an invalid pattern, a pattern with no matching files, or a
/// literal path that does not exist.
pub fn expand_inputs(args: &[PathBuf]) -> anyhow::Result<InputSet> {
    let mut sources = Vec::new();
    let mut seen: AHashSet<PathBuf> = AHashSet::new();
    let mut batch = args.len() > 1;
    let mut stdin_taken = false;

    for arg in args {
        let arg_str = arg.to_string_lossy();

        if arg_str == "-" {
            if !stdin_taken {
                stdin_taken = true;
                sources.push(SqlSource::Stdin);
            }
            continue;
        }

        let files = if is_glob_pattern(&arg_str) {
            batch = true;
            glob_files(&arg_str)?
        } else {
            if !arg.exists() {
                anyhow::bail!("input file does not exist: {}", arg.display());
            }
            vec![arg.clone()]
        };

        for file in files {
            if seen.insert(dedupe_key(&file)) {
                sources.push(SqlSource::File(file));
            }
        }
    }

    Ok(InputSet { sources, batch })
}

fn glob_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| anyhow::anyhow!("invalid glob pattern '{}': {}", pattern, e))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry
            .map_err(|e| anyhow::anyhow!("error reading path for pattern '{}': {}", pattern, e))?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        anyhow::bail!("no files match pattern: {}", pattern);
    }
    files.sort();
    Ok(files)
}

fn dedupe_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Per-source success/failure tally for batch runs.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failures: Vec<(String, String)>,
}

impl BatchOutcome {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, label: String, error: String) {
        self.failures.push((label, error));
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn files(inputs: &InputSet) -> Vec<PathBuf> {
        inputs
            .sources
            .iter()
            .filter_map(|s| match s {
                SqlSource::File(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(!is_glob_pattern("seed.sql"));
        assert!(!is_glob_pattern("/path/to/seed.sql"));
        assert!(is_glob_pattern("*.sql"));
        assert!(is_glob_pattern("seeds/**/*.sql"));
        assert!(is_glob_pattern("seed?.sql"));
        assert!(is_glob_pattern("[ab].sql"));
    }

    #[test]
    fn test_dash_is_stdin_once() {
        let inputs = expand_inputs(&[PathBuf::from("-"), PathBuf::from("-")]).unwrap();
        assert_eq!(inputs.sources, vec![SqlSource::Stdin]);
        assert!(inputs.batch);
    }

    #[test]
    fn test_single_literal_path_is_not_a_batch() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("seed.sql");
        fs::write(&file, "SELECT 1;").unwrap();

        let inputs = expand_inputs(&[file.clone()]).unwrap();
        assert!(!inputs.batch);
        assert_eq!(inputs.sources, vec![SqlSource::File(file)]);
    }

    #[test]
    fn test_missing_literal_path() {
        let err = expand_inputs(&[PathBuf::from("/nonexistent/seed.sql")]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_glob_sorted_and_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("a.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("notes.txt"), "not sql").unwrap();
        fs::create_dir(dir.path().join("dir.sql")).unwrap();

        let inputs = expand_inputs(&[dir.path().join("*.sql")]).unwrap();
        assert!(inputs.batch);
        assert_eq!(
            files(&inputs),
            vec![dir.path().join("a.sql"), dir.path().join("b.sql")]
        );
    }

    #[test]
    fn test_overlapping_arguments_read_each_file_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("b.sql"), "SELECT 2;").unwrap();

        let inputs = expand_inputs(&[
            dir.path().join("b.sql"),
            dir.path().join("*.sql"),
        ])
        .unwrap();

        assert_eq!(
            files(&inputs),
            vec![dir.path().join("b.sql"), dir.path().join("a.sql")]
        );
    }

    #[test]
    fn test_glob_without_matches() {
        let dir = TempDir::new().unwrap();
        let err = expand_inputs(&[dir.path().join("*.sql")]).unwrap_err();
        assert!(err.to_string().contains("no files match"));
    }

    #[test]
    fn test_batch_outcome() {
        let mut outcome = BatchOutcome::default();
        outcome.record_success();
        outcome.record_failure("bad.sql".to_string(), "not valid UTF-8".to_string());

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.total(), 2);
    }
}
