use std::path::{Path, PathBuf};
use std::{error::Error, fmt, io};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::engine::{EngineInvocation, EngineKind, ProcessOutput, engine_output_dir};
use crate::manifest::{MANIFEST_FILE, ManifestInfo, read_manifest_summary};

use super::ApkxControlPlane;

#[derive(Debug)]
pub enum ExtractError {
    InvalidArtifact(String),
    ArtifactNotFound(PathBuf),
    PrepareOutput { path: PathBuf, source: io::Error },
    EngineLaunch { engine: EngineKind, source: io::Error },
    EngineFailed {
        engine: EngineKind,
        exit_code: Option<i32>,
        diagnostics: String,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArtifact(message) => write!(f, "invalid artifactPath: {message}"),
            Self::ArtifactNotFound(path) => {
                write!(f, "artifact not found: {}", path.display())
            }
            Self::PrepareOutput { path, source } => write!(
                f,
                "failed to prepare output directory {}: {source}",
                path.display()
            ),
            Self::EngineLaunch { engine, source } => {
                write!(f, "{engine} could not be started: {source}")
            }
            Self::EngineFailed {
                engine,
                exit_code,
                diagnostics,
            } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |code| code.to_string());
                write!(f, "{engine} failed (exit {code}): {diagnostics}")
            }
        }
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PrepareOutput { source, .. } | Self::EngineLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub artifact: PathBuf,
    pub output_root: PathBuf,
    pub jadx_dir: PathBuf,
    pub apktool_dir: PathBuf,
    /// `false` when jadx exited non-zero or never started; apktool output is still valid.
    pub jadx_succeeded: bool,
    pub manifest: ManifestInfo,
}

impl ApkxControlPlane {
    /// Decompiles `artifact_path` with jadx, then apktool, and records the output root
    /// as the current session on success.
    ///
    /// # Errors
    /// Returns `ExtractError` if the artifact is missing, the output directories cannot
    /// be created, or apktool fails. A jadx failure is logged and tolerated.
    pub async fn extract(&self, artifact_path: &str) -> Result<ExtractionReport, ExtractError> {
        let trimmed = artifact_path.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::InvalidArtifact("path is empty".to_string()));
        }
        let artifact = PathBuf::from(trimmed);
        let is_file = tokio::fs::metadata(&artifact)
            .await
            .is_ok_and(|metadata| metadata.is_file());
        if !is_file {
            return Err(ExtractError::ArtifactNotFound(artifact));
        }

        let output_root = self.output_root_for(&artifact)?;
        let jadx_dir = engine_output_dir(&output_root, EngineKind::Jadx);
        let apktool_dir = engine_output_dir(&output_root, EngineKind::Apktool);
        for dir in [&jadx_dir, &apktool_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| ExtractError::PrepareOutput {
                    path: dir.clone(),
                    source,
                })?;
        }

        info!(artifact = %artifact.display(), "starting extraction");

        let jadx_succeeded = match self.run(EngineKind::Jadx, &artifact, &jadx_dir).await {
            Ok(output) if output.success() => true,
            Ok(output) => {
                warn!(
                    exit_code = ?output.exit_code,
                    "jadx failed, continuing with apktool: {}",
                    output.diagnostics()
                );
                false
            }
            Err(err) => {
                warn!("jadx could not be started, continuing with apktool: {err}");
                false
            }
        };

        let apktool = self
            .run(EngineKind::Apktool, &artifact, &apktool_dir)
            .await
            .map_err(|source| {
                error!("apktool could not be started: {source}");
                ExtractError::EngineLaunch {
                    engine: EngineKind::Apktool,
                    source,
                }
            })?;
        if !apktool.success() {
            let diagnostics = apktool.diagnostics();
            error!(exit_code = ?apktool.exit_code, "apktool failed: {diagnostics}");
            return Err(ExtractError::EngineFailed {
                engine: EngineKind::Apktool,
                exit_code: apktool.exit_code,
                diagnostics,
            });
        }

        let manifest_path = apktool_dir.join(MANIFEST_FILE);
        let manifest = match read_manifest_summary(&manifest_path).await {
            Ok(summary) => ManifestInfo::Parsed(summary),
            Err(err) => {
                warn!(path = %manifest_path.display(), "manifest summary unavailable: {err}");
                ManifestInfo::Unavailable {
                    reason: err.to_string(),
                }
            }
        };

        self.session.record_extraction(output_root.clone()).await;
        info!(output_root = %output_root.display(), jadx_succeeded, "extraction finished");

        Ok(ExtractionReport {
            artifact,
            output_root,
            jadx_dir,
            apktool_dir,
            jadx_succeeded,
            manifest,
        })
    }

    /// `<scratch>/<artifact file stem>`; stable across runs for the same file name.
    fn output_root_for(&self, artifact: &Path) -> Result<PathBuf, ExtractError> {
        let stem = artifact
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| ExtractError::InvalidArtifact("path has no file name".to_string()))?;
        Ok(self.scratch_dir.join(stem))
    }

    async fn run(
        &self,
        kind: EngineKind,
        artifact: &Path,
        output_dir: &Path,
    ) -> io::Result<ProcessOutput> {
        (self.run_engine)(EngineInvocation {
            kind,
            artifact: artifact.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        })
        .await
    }
}
