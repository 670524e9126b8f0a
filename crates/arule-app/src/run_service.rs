//! Run pipeline: definitions, engine, resolution, output.
//!
//! ```text
//! prepare dirs -> generate SDEF/NDEF -> run engine -> resolve -> read outputs
//! ```
//!
//! Every stage works from the explicit root of an [`AruleLayout`].

use std::path::PathBuf;
use std::time::Instant;

use arule_core::AruleLayout;
use arule_defs::{DefinitionStore, ResolvedNodeRecord, resolve};
use arule_output::{RunOutputRecord, compute_output_path};

use crate::engine::{EngineInvocation, PrognosticsEngine};
use crate::error::{AppError, AppResult};
use crate::progress::{NodeProgress, PipelineProgressEvent, PipelineStage};
use crate::query::{OutputSummary, summarize_output};
use crate::study::StudyConfig;
use crate::study_service;

/// What to do when one node's output cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeErrorPolicy {
    /// Fail the whole pass.
    #[default]
    Abort,
    /// Record the node as skipped and continue.
    Skip,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Write SDEF/NDEF files from the study. Ignored for pre-packaged studies.
    pub generate_definitions: bool,
    pub invoke_engine: bool,
    pub on_node_error: NodeErrorPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            generate_definitions: true,
            invoke_engine: true,
            on_node_error: NodeErrorPolicy::Abort,
        }
    }
}

pub struct PipelineRequest<'a> {
    pub study: &'a StudyConfig,
    pub layout: &'a AruleLayout,
    pub options: PipelineOptions,
}

/// One node's resolved parameters joined with its run output.
#[derive(Debug, Clone)]
pub struct NodeReport {
    pub record: ResolvedNodeRecord,
    pub output_path: PathBuf,
    /// Where a rendered plot for this node belongs.
    pub plot_path: PathBuf,
    pub output: RunOutputRecord,
    pub summary: OutputSummary,
}

#[derive(Debug, Clone)]
pub struct SkippedNode {
    pub id: u32,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub system: String,
    /// RFC 3339 timestamp of the start of the run.
    pub started_at: String,
    pub generated_definitions: bool,
    pub engine_invoked: bool,
    pub nodes: Vec<NodeReport>,
    pub skipped: Vec<SkippedNode>,
    pub total_time_s: f64,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(PipelineProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    stage: PipelineStage,
    started: Instant,
    message: Option<String>,
    node: Option<NodeProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(PipelineProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            node,
        });
    }
}

/// Run every pipeline stage for the study.
pub fn run_pipeline(
    request: &PipelineRequest,
    engine: &dyn PrognosticsEngine,
) -> AppResult<PipelineResponse> {
    run_pipeline_with_progress(request, engine, None)
}

/// Run every pipeline stage and stream progress events.
pub fn run_pipeline_with_progress(
    request: &PipelineRequest,
    engine: &dyn PrognosticsEngine,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<PipelineResponse> {
    let started = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();
    let system = request.study.system.as_str();
    let layout = request.layout;

    emit_progress(
        &mut progress_cb,
        PipelineStage::PreparingDirectories,
        started,
        Some(format!("Preparing {}", layout.root().display())),
        None,
    );
    prepare_layout(layout)?;

    let store = DefinitionStore::new(layout.clone());

    let generate = request.options.generate_definitions && !request.study.pre_packaged;
    if generate {
        emit_progress(
            &mut progress_cb,
            PipelineStage::GeneratingDefinitions,
            started,
            Some("Writing SDEF/NDEF files".to_string()),
            None,
        );
        study_service::generate_definitions(&store, request.study)?;
    } else {
        tracing::info!(system, "Using existing definition files");
    }

    if request.options.invoke_engine {
        emit_progress(
            &mut progress_cb,
            PipelineStage::InvokingEngine,
            started,
            Some("Running engine".to_string()),
            None,
        );
        engine.run(&EngineInvocation {
            system,
            root: layout.root(),
        })?;
    }

    let (nodes, skipped) = collect_reports_with_progress(
        &store,
        system,
        request.options.on_node_error,
        &mut progress_cb,
        started,
    )?;

    let total_time_s = started.elapsed().as_secs_f64();
    emit_progress(
        &mut progress_cb,
        PipelineStage::Completed,
        started,
        Some(format!("{} nodes read, {} skipped", nodes.len(), skipped.len())),
        None,
    );

    Ok(PipelineResponse {
        system: system.to_string(),
        started_at,
        generated_definitions: generate,
        engine_invoked: request.options.invoke_engine,
        nodes,
        skipped,
        total_time_s,
    })
}

/// Create the run directory tree under the layout root.
pub fn prepare_layout(layout: &AruleLayout) -> AppResult<()> {
    layout.ensure_dirs()?;
    tracing::debug!(root = %layout.root().display(), "Run directories ready");
    Ok(())
}

/// Resolve a system and read every node's output, without touching the engine.
pub fn collect_reports(
    store: &DefinitionStore,
    system: &str,
    policy: NodeErrorPolicy,
) -> AppResult<(Vec<NodeReport>, Vec<SkippedNode>)> {
    collect_reports_with_progress(store, system, policy, &mut None, Instant::now())
}

fn collect_reports_with_progress(
    store: &DefinitionStore,
    system: &str,
    policy: NodeErrorPolicy,
    progress_cb: &mut ProgressCallback<'_>,
    started: Instant,
) -> AppResult<(Vec<NodeReport>, Vec<SkippedNode>)> {
    emit_progress(
        progress_cb,
        PipelineStage::ResolvingDefinitions,
        started,
        Some(format!("Resolving {}", system)),
        None,
    );
    let records = resolve(store, system)?;

    let total = records.len();
    let mut reports = Vec::with_capacity(total);
    let mut skipped = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        emit_progress(
            progress_cb,
            PipelineStage::ReadingOutput,
            started,
            None,
            Some(NodeProgress {
                index,
                total,
                name: record.name().to_string(),
            }),
        );

        let (id, name) = (record.id(), record.name().to_string());
        match read_node_report(store.layout(), system, record) {
            Ok(report) => reports.push(report),
            Err(err) => match policy {
                NodeErrorPolicy::Abort => return Err(err),
                NodeErrorPolicy::Skip => {
                    tracing::warn!(node = %name, error = %err, "Skipping node");
                    skipped.push(SkippedNode {
                        id,
                        name,
                        error: err.to_string(),
                    });
                }
            },
        }
    }

    Ok((reports, skipped))
}

fn read_node_report(
    layout: &AruleLayout,
    system: &str,
    record: ResolvedNodeRecord,
) -> AppResult<NodeReport> {
    let output_path = compute_output_path(layout, &record, system);
    let output = arule_output::parse(&output_path)?;
    let summary = summarize_output(&output);
    let plot_path = layout.plot_path(record.name());

    tracing::info!(
        node = record.name(),
        rows = output.len(),
        final_rul = ?summary.final_rul,
        "Read node output"
    );
    Ok(NodeReport {
        record,
        output_path,
        plot_path,
        output,
        summary,
    })
}

/// Text of the engine's run log for `system`.
pub fn read_run_log(layout: &AruleLayout, system: &str) -> AppResult<String> {
    let path = layout.run_log_path(system);
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::LogNotFound { path }),
        Err(e) => Err(AppError::Io(e)),
    }
}
