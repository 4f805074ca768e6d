use std::path::PathBuf;

use thiserror::Error;

pub type AlignResult<T> = Result<T, AlignError>;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing model artifact `{0}`")]
    MissingArtifact(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed recipe `{path}` line {line}: token `{token}`")]
    RecipeFormat {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("batch {batch} workspace error: {message}")]
    Resource { batch: u32, message: String },

    #[error("missing command `{command}` on PATH")]
    CommandMissing { command: String },

    #[error("command failed: `{command}` (status: {status}){stderr_suffix}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AlignError {
    #[must_use]
    pub fn from_command_failure(command: String, status: i32, stderr: String) -> Self {
        let trimmed = stderr.trim();
        let stderr_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("; stderr: {trimmed}")
        };
        Self::CommandFailed {
            command,
            status,
            stderr_suffix,
        }
    }

    /// Stable, unique, machine-readable code for every variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "FA-IO",
            Self::Json(_) => "FA-JSON",
            Self::MissingArtifact(_) => "FA-MISSING-ARTIFACT",
            Self::Config(_) => "FA-CONFIG",
            Self::RecipeFormat { .. } => "FA-RECIPE-FORMAT",
            Self::Resource { .. } => "FA-RESOURCE",
            Self::CommandMissing { .. } => "FA-CMD-MISSING",
            Self::CommandFailed { .. } => "FA-CMD-FAILED",
            Self::InvalidRequest(_) => "FA-INVALID-REQUEST",
        }
    }

    /// Process exit code for a fatal occurrence of this error.
    ///
    /// Configuration problems (2) and recipe format problems (3) abort the
    /// run before any batch is scheduled; everything else maps to the
    /// generic failure code (1).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArtifact(_) | Self::Config(_) | Self::InvalidRequest(_) => 2,
            Self::RecipeFormat { .. } => 3,
            _ => 1,
        }
    }
}
