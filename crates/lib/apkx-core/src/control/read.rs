use std::path::{Component, Path, PathBuf};
use std::{error::Error, fmt, io};

use tracing::debug;

use super::ApkxControlPlane;

#[derive(Debug)]
pub enum ReadError {
    InvalidPath(String),
    NoExtraction,
    NotFound(String),
    Io { path: String, source: io::Error },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath(message) => write!(f, "invalid relativePath: {message}"),
            Self::NoExtraction => f.write_str("no extraction available; run extract first"),
            Self::NotFound(path) => write!(f, "file not found in extraction: {path}"),
            Self::Io { path, source } => write!(f, "failed to read {path}: {source}"),
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A file read from the current extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub relative_path: String,
    pub path: PathBuf,
    pub text: String,
}

impl ApkxControlPlane {
    /// Reads a file relative to the last extraction's output root.
    ///
    /// # Errors
    /// Returns `ReadError::NoExtraction` before any successful extraction and
    /// `ReadError::NotFound` for paths that do not name a file inside the root.
    pub async fn read_file(&self, relative_path: &str) -> Result<FileContent, ReadError> {
        let Some(root) = self.session.output_root().await else {
            return Err(ReadError::NoExtraction);
        };
        let relative_path = relative_path.trim();
        if relative_path.is_empty() {
            return Err(ReadError::InvalidPath("path is empty".to_string()));
        }
        if !stays_inside_root(Path::new(relative_path)) {
            debug!("rejecting path outside the extraction: {relative_path}");
            return Err(ReadError::NotFound(relative_path.to_string()));
        }

        let path = root.join(relative_path);
        let is_file = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|metadata| metadata.is_file());
        if !is_file {
            return Err(ReadError::NotFound(relative_path.to_string()));
        }

        let bytes = tokio::fs::read(&path).await.map_err(|source| ReadError::Io {
            path: relative_path.to_string(),
            source,
        })?;
        Ok(FileContent {
            relative_path: relative_path.to_string(),
            path,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn stays_inside_root(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
