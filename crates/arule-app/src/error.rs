//! Error types for the arule-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the definition and output
/// crates and adds the engine and configuration failures of a full run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Definitions(#[from] arule_defs::DefsError),

    #[error(transparent)]
    Output(#[from] arule_output::OutputError),

    #[error("Failed to read study file: {path}")]
    StudyFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse study file {path}: {source}")]
    StudyParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Study validation failed: {0}")]
    Validation(String),

    #[error("Failed to launch engine {executable}")]
    EngineLaunch {
        executable: PathBuf,
        source: std::io::Error,
    },

    #[error("Engine run for system '{system}' failed with {}", exit_description(.code))]
    EngineInvocationFailed { system: String, code: Option<i32> },

    #[error("Failed to write file: {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Run log not found: {path}")]
    LogNotFound { path: PathBuf },

    #[error("Node not found in system '{system}': {node}")]
    NodeNotFound { system: String, node: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type for arule-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<arule_defs::ValidationError> for AppError {
    fn from(err: arule_defs::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}
