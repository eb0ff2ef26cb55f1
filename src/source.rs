//! Where raw seed SQL comes from: inline text, stdin, or a (compressed) file.

use crate::progress::ProgressReader;
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const UTF8_BOM: &str = "\u{feff}";

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(
        &self,
        reader: Box<dyn Read + 'a>,
    ) -> std::io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// A provider of raw SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlSource {
    Inline(String),
    Stdin,
    File(PathBuf),
}

impl SqlSource {
    /// `-` means stdin; anything else is a file path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            SqlSource::Stdin
        } else {
            SqlSource::File(arg.to_path_buf())
        }
    }

    /// Human-readable name for messages and JSON output.
    pub fn label(&self) -> String {
        match self {
            SqlSource::Inline(_) => "<inline>".to_string(),
            SqlSource::Stdin => "<stdin>".to_string(),
            SqlSource::File(path) => path.display().to_string(),
        }
    }

    pub fn compression(&self) -> Compression {
        match self {
            SqlSource::File(path) => Compression::from_path(path),
            _ => Compression::None,
        }
    }

    /// On-disk size in bytes, for sizing progress bars.
    pub fn size_hint(&self) -> Option<u64> {
        match self {
            SqlSource::Inline(text) => Some(text.len() as u64),
            SqlSource::Stdin => None,
            SqlSource::File(path) => std::fs::metadata(path).ok().map(|m| m.len()),
        }
    }

    pub fn read_to_string(&self) -> anyhow::Result<String> {
        match self {
            SqlSource::Inline(text) => Ok(strip_bom(text.clone())),
            SqlSource::Stdin => {
                let reader: Box<dyn Read> = Box::new(std::io::stdin().lock());
                self.decode(reader)
            }
            SqlSource::File(path) => {
                let file = open_input(path)?;
                let reader = self.compression().wrap_reader(Box::new(file))?;
                self.decode(reader)
            }
        }
    }

    /// Read the source, reporting compressed bytes consumed to `callback`.
    pub fn read_with_progress<F>(&self, callback: F) -> anyhow::Result<String>
    where
        F: Fn(u64) + 'static,
    {
        match self {
            SqlSource::File(path) => {
                let file = open_input(path)?;
                let progress = ProgressReader::new(file, callback);
                let reader = self.compression().wrap_reader(Box::new(progress))?;
                self.decode(reader)
            }
            _ => self.read_to_string(),
        }
    }

    fn decode(&self, mut reader: Box<dyn Read + '_>) -> anyhow::Result<String> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {}", self.label()))?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", self.label()))?;
        debug!(source = %self.label(), bytes = text.len(), "loaded SQL source");
        Ok(strip_bom(text))
    }
}

fn open_input(path: &Path) -> anyhow::Result<File> {
    if !path.exists() {
        anyhow::bail!("input file does not exist: {}", path.display());
    }
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
