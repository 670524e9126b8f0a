//! arule-output: reading the engine's per-node run output.

pub mod markers;
pub mod parse;
pub mod path;
pub mod types;

pub use markers::{DegradationMarkers, MarkerMatch, locate_degradation_markers, nearest_time_index};
pub use parse::{parse, parse_str};
pub use path::{compute_output_path, output_file_name};
pub use types::*;

use std::path::PathBuf;

pub type OutputResult<T> = Result<T, OutputError>;

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("Run output not found: {path}")]
    OutputNotFound { path: PathBuf },

    #[error("Malformed run output {path}: {source}")]
    MalformedOutput {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Failed to read run output: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why output text failed to parse. Wrapped with the file path in
/// [`OutputError::MalformedOutput`] when it comes from disk.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("file is empty, expected a header row")]
    MissingHeader,

    #[error("missing column {column}")]
    MissingColumn { column: &'static str },

    #[error("row on line {line} has {found} fields, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("non-numeric {column} value '{value}' on line {line}")]
    InvalidCell {
        column: &'static str,
        value: String,
        line: usize,
    },
}
