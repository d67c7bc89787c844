//! Operations exposed to the MCP layer.
//!
//! [`ApkxControlPlane`] owns the engine runner, the scratch directory, and a
//! handle to the shared [`SessionState`]. Every tool call goes through one of
//! its methods.

mod extract;
mod read;
mod search;

use std::path::{Path, PathBuf};

use crate::engine::{EngineCommands, RunEngineFn};
use crate::session::SessionState;

pub use extract::{ExtractError, ExtractionReport};
pub use read::{FileContent, ReadError};
pub use search::{MatchSender, SearchRequest};

#[derive(Clone)]
pub struct ApkxControlPlane {
    run_engine: RunEngineFn,
    scratch_dir: PathBuf,
    session: SessionState,
}

impl ApkxControlPlane {
    #[must_use]
    pub fn new(run_engine: RunEngineFn, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_engine,
            scratch_dir: scratch_dir.into(),
            session: SessionState::new(),
        }
    }

    /// Creates a control plane that spawns the real decompilers.
    #[must_use]
    pub fn with_engines(commands: EngineCommands, scratch_dir: impl Into<PathBuf>) -> Self {
        Self::new(commands.into_runner(), scratch_dir)
    }

    /// Replaces the session handle, e.g. to share one slot across several services.
    #[must_use]
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}
