//! arule-defs: SDEF/NDEF definition file formats, validation and resolution.

pub mod grammar;
pub mod ndef;
pub mod resolve;
pub mod sdef;
pub mod store;
pub mod validate;

pub use ndef::{FailureModel, FileType, NodeDefinition, NDEF_KEYS};
pub use resolve::{ResolvedNodeRecord, resolve};
pub use sdef::{NodeRef, SystemDefinition};
pub use store::DefinitionStore;
pub use validate::{ValidationError, validate_node, validate_system};

use std::path::PathBuf;

/// Sentinel closing every definition record.
pub const DEFAULT_TERMINATOR: i32 = -9;

pub type DefsResult<T> = Result<T, DefsError>;

#[derive(thiserror::Error, Debug)]
pub enum DefsError {
    #[error("Malformed definition {path}: {source}")]
    MalformedDefinition {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Definition not found: {path}")]
    DefinitionNotFound { path: PathBuf },

    #[error("Failed to read definition file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write definition file: {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Why definition text failed to decode. Wrapped with the file path in
/// [`DefsError::MalformedDefinition`] when it comes from disk.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no KEY = VALUE; entries found")]
    NoEntries,

    #[error("missing required key {key}")]
    MissingKey { key: &'static str },

    #[error("duplicate key {key} on line {line}")]
    DuplicateKey { key: String, line: usize },

    #[error("invalid value for {key} on line {line}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        line: usize,
        reason: &'static str,
    },

    #[error("NDFNAME '{name}' on line {line} has no preceding NDNUMID")]
    UnpairedName { name: String, line: usize },

    #[error("NDNUMID {id} on line {line} has no following NDFNAME")]
    UnpairedId { id: u32, line: usize },

    #[error("node id {id} repeated on line {line}")]
    DuplicateNodeId { id: u32, line: usize },
}
