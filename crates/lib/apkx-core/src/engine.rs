//! External decompiler invocation.
//!
//! Each engine call is a single awaited step that resolves to a [`ProcessOutput`].
//! The control plane only sees a [`RunEngineFn`], so tests can swap the real
//! processes for closures that write fixture output.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::debug;

pub const JADX_OUTPUT_DIR: &str = "jadx_output";
pub const APKTOOL_OUTPUT_DIR: &str = "apktool_output";

/// The two decompilers, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Structural decompiler producing Java sources. Failure is tolerated.
    Jadx,
    /// Resource decoder producing the manifest and smali. Failure is fatal.
    Apktool,
}

impl EngineKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jadx => "jadx",
            Self::Apktool => "apktool",
        }
    }

    #[must_use]
    pub const fn output_dir_name(self) -> &'static str {
        match self {
            Self::Jadx => JADX_OUTPUT_DIR,
            Self::Apktool => APKTOOL_OUTPUT_DIR,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single request to run one engine against one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInvocation {
    pub kind: EngineKind,
    pub artifact: PathBuf,
    pub output_dir: PathBuf,
}

/// Exit status and captured streams of a finished engine process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Best diagnostic text for a failed run: stderr, falling back to stdout.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

pub type EngineFuture = Pin<Box<dyn Future<Output = io::Result<ProcessOutput>> + Send + 'static>>;
pub type RunEngineFn = Arc<dyn Fn(EngineInvocation) -> EngineFuture + Send + Sync + 'static>;

/// Executable locations for the real decompilers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommands {
    pub jadx: PathBuf,
    pub apktool: PathBuf,
}

impl Default for EngineCommands {
    fn default() -> Self {
        Self {
            jadx: PathBuf::from("jadx"),
            apktool: PathBuf::from("apktool"),
        }
    }
}

impl EngineCommands {
    #[must_use]
    pub fn new(jadx: impl Into<PathBuf>, apktool: impl Into<PathBuf>) -> Self {
        Self {
            jadx: jadx.into(),
            apktool: apktool.into(),
        }
    }

    /// Builds the command line for an invocation without spawning it.
    #[must_use]
    pub fn command_for(&self, invocation: &EngineInvocation) -> Command {
        match invocation.kind {
            EngineKind::Jadx => {
                let mut command = Command::new(&self.jadx);
                command
                    .arg("-d")
                    .arg(&invocation.output_dir)
                    .arg(&invocation.artifact);
                command
            }
            EngineKind::Apktool => {
                let mut command = Command::new(&self.apktool);
                command
                    .arg("d")
                    .arg("-f")
                    .arg("-o")
                    .arg(&invocation.output_dir)
                    .arg(&invocation.artifact);
                command
            }
        }
    }

    /// Converts the command table into a runner that spawns real processes.
    #[must_use]
    pub fn into_runner(self) -> RunEngineFn {
        let commands = Arc::new(self);
        Arc::new(move |invocation: EngineInvocation| {
            let command = commands.command_for(&invocation);
            Box::pin(async move {
                debug!(
                    engine = %invocation.kind,
                    artifact = %invocation.artifact.display(),
                    "spawning engine"
                );
                run_command(command).await
            })
        })
    }
}

/// Runs a command to completion with stdin closed and both streams captured.
///
/// # Errors
/// Returns the spawn error if the executable cannot be started.
pub async fn run_command(mut command: Command) -> io::Result<ProcessOutput> {
    let output = command
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;
    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Output directory for `kind` beneath an extraction's output root.
#[must_use]
pub fn engine_output_dir(output_root: &Path, kind: EngineKind) -> PathBuf {
    output_root.join(kind.output_dir_name())
}
