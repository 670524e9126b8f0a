//! Shared application service layer for ARULE runs.
//!
//! The CLI drives everything through this crate: loading studies, generating
//! definition files, invoking the engine, and reading back per-node output.

pub mod engine;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod study;
pub mod study_service;

// Re-export key types for convenience
pub use engine::{EngineConfig, EngineInvocation, PrognosticsEngine, ProcessEngine};
pub use error::{AppError, AppResult};
pub use progress::{NodeProgress, PipelineProgressEvent, PipelineStage};
pub use query::{OutputSummary, extract_series, find_node, summarize_output};
pub use run_service::{
    NodeErrorPolicy, NodeReport, PipelineOptions, PipelineRequest, PipelineResponse, SkippedNode,
    collect_reports, prepare_layout, read_run_log, run_pipeline, run_pipeline_with_progress,
};
pub use study::{Study, StudyConfig, StudyNode};
pub use study_service::{
    GeneratedDefinitions, generate_definitions, load_study, save_study, validate_study,
};
