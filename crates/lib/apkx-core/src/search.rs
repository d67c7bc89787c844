//! Literal substring search over an extracted tree.
//!
//! The walk is synchronous. Matches are handed to the caller in batches of
//! [`SEARCH_BATCH_SIZE`] through a callback, with one final short batch after the
//! walk if anything is left over.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::{error::Error, fmt};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Matches per progress emission.
pub const SEARCH_BATCH_SIZE: usize = 5;

/// File extensions that are scanned; everything else is skipped.
pub const SEARCHABLE_EXTENSIONS: [&str; 4] = ["java", "smali", "xml", "txt"];

/// One line that contains one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Path relative to the search root, `/`-separated.
    pub relative_path: String,
    /// 1-based.
    pub line_number: usize,
    pub line: String,
}

impl fmt::Display for SearchMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.relative_path, self.line_number, self.line)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub total_matches: usize,
    pub files_scanned: usize,
    pub batches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    EmptyQuery,
    NoSearchRoot,
    BlankDirectory,
    RootNotFound(PathBuf),
    NotADirectory(PathBuf),
    Worker(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => f.write_str("queryStrings must contain at least one non-empty string"),
            Self::NoSearchRoot => f.write_str(
                "no directory given and no previous extraction; run extract first or pass directory",
            ),
            Self::BlankDirectory => f.write_str("directory must not be blank when given"),
            Self::RootNotFound(path) => {
                write!(f, "search directory does not exist: {}", path.display())
            }
            Self::NotADirectory(path) => {
                write!(f, "search path is not a directory: {}", path.display())
            }
            Self::Worker(message) => write!(f, "search worker failed: {message}"),
        }
    }
}

impl Error for SearchError {}

/// Walks `root` depth-first in file-name order and reports every line containing
/// one of `queries`.
///
/// `on_batch` receives full batches as they fill and one trailing partial batch.
/// Unreadable entries are logged and skipped.
pub fn search_tree<F>(root: &Path, queries: &[String], mut on_batch: F) -> SearchReport
where
    F: FnMut(Vec<SearchMatch>),
{
    let mut report = SearchReport::default();
    let mut batch = Vec::with_capacity(SEARCH_BATCH_SIZE);

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry during search: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_searchable(entry.path()) {
            continue;
        }

        let bytes = match std::fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("skipping {}: {err}", entry.path().display());
                continue;
            }
        };
        report.files_scanned += 1;

        let text = String::from_utf8_lossy(&bytes);
        let relative_path = relative_display(root, entry.path());
        for (index, line) in split_lines(&text).enumerate() {
            for query in queries {
                if !line.contains(query.as_str()) {
                    continue;
                }
                report.total_matches += 1;
                batch.push(SearchMatch {
                    relative_path: relative_path.clone(),
                    line_number: index + 1,
                    line: line.to_string(),
                });
                if batch.len() >= SEARCH_BATCH_SIZE {
                    report.batches += 1;
                    on_batch(std::mem::replace(
                        &mut batch,
                        Vec::with_capacity(SEARCH_BATCH_SIZE),
                    ));
                }
            }
        }
    }

    if !batch.is_empty() {
        report.batches += 1;
        on_batch(batch);
    }

    debug!(
        root = %root.display(),
        files = report.files_scanned,
        matches = report.total_matches,
        "search walk finished"
    );
    report
}

/// Whether the file extension is one of [`SEARCHABLE_EXTENSIONS`].
#[must_use]
pub fn is_searchable(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SEARCHABLE_EXTENSIONS.contains(&ext))
}

/// Splits on `\r\n`, `\n`, and lone `\r`.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .flat_map(|line| line.split('\r'))
}

fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
