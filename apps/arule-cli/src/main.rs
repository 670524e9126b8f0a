use arule_app::{
    AppError, AppResult, NodeErrorPolicy, PipelineOptions, PipelineProgressEvent, PipelineRequest,
    PipelineStage, ProcessEngine, StudyConfig, StudyNode, query, run_service, study_service,
};
use arule_core::AruleLayout;
use arule_defs::{DefinitionStore, FailureModel, FileType, NodeDefinition, ResolvedNodeRecord};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arule-cli")]
#[command(about = "ARULE CLI - Remaining useful life runs from SDEF/NDEF definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the run directory tree and a starter study file
    Init {
        /// Run root directory
        root: PathBuf,
        /// System name for the starter study
        #[arg(long, default_value = "DEMO1")]
        system: String,
    },
    /// Write SDEF/NDEF files from a study
    Generate {
        /// Path to the study YAML file
        study_path: PathBuf,
        /// Run root (overrides the study's root)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Generate definitions, run the engine and read every node's output
    Run {
        /// Path to the study YAML file
        study_path: PathBuf,
        /// Run root (overrides the study's root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Keep the definition files already on disk
        #[arg(long)]
        skip_generate: bool,
        /// Read existing output without running the engine
        #[arg(long)]
        skip_engine: bool,
        /// Skip nodes whose output is missing or malformed
        #[arg(long)]
        skip_missing: bool,
    },
    /// List the systems defined under a run root
    List {
        /// Run root directory
        root: PathBuf,
    },
    /// Show the resolved node definitions of a system
    Show {
        /// Run root directory
        root: PathBuf,
        /// System name (SDEF file stem)
        system: String,
    },
    /// Summarise every node's run output
    Report {
        /// Run root directory
        root: PathBuf,
        /// System name (SDEF file stem)
        system: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Skip nodes whose output is missing or malformed
        #[arg(long)]
        skip_missing: bool,
    },
    /// Print the engine's run log for a system
    Log {
        /// Run root directory
        root: PathBuf,
        /// System name
        system: String,
    },
    /// Export one output column of a node as CSV
    ExportSeries {
        /// Run root directory
        root: PathBuf,
        /// System name
        system: String,
        /// Node name or numeric id
        node: String,
        /// Output column (e.g., RUL, SOH, FD)
        column: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Progress lines own stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { root, system } => cmd_init(&root, &system),
        Commands::Generate { study_path, root } => cmd_generate(&study_path, root.as_deref()),
        Commands::Run {
            study_path,
            root,
            skip_generate,
            skip_engine,
            skip_missing,
        } => cmd_run(
            &study_path,
            root.as_deref(),
            PipelineOptions {
                generate_definitions: !skip_generate,
                invoke_engine: !skip_engine,
                on_node_error: error_policy(skip_missing),
            },
        ),
        Commands::List { root } => cmd_list(&root),
        Commands::Show { root, system } => cmd_show(&root, &system),
        Commands::Report {
            root,
            system,
            json,
            skip_missing,
        } => cmd_report(&root, &system, json, error_policy(skip_missing)),
        Commands::Log { root, system } => cmd_log(&root, &system),
        Commands::ExportSeries {
            root,
            system,
            node,
            column,
            output,
        } => cmd_export_series(&root, &system, &node, &column, output.as_deref()),
    }
}

fn error_policy(skip_missing: bool) -> NodeErrorPolicy {
    if skip_missing {
        NodeErrorPolicy::Skip
    } else {
        NodeErrorPolicy::Abort
    }
}

fn cmd_init(root: &Path, system: &str) -> AppResult<()> {
    let layout = AruleLayout::new(root);
    run_service::prepare_layout(&layout)?;

    let study_path = root.join(format!("{}.yaml", system));
    if study_path.exists() {
        return Err(AppError::InvalidInput(format!(
            "Study file already exists: {}",
            study_path.display()
        )));
    }

    study_service::save_study(&study_path, &starter_study(system))?;
    tracing::debug!(root = %root.display(), system, "Initialised run root");
    println!("✓ Created run tree under {}", layout.arule_dir().display());
    println!("✓ Wrote starter study {}", study_path.display());
    Ok(())
}

fn starter_study(system: &str) -> StudyConfig {
    StudyConfig {
        system: system.to_string(),
        root: None,
        terminator: arule_defs::DEFAULT_TERMINATOR,
        pre_packaged: false,
        engine: Default::default(),
        nodes: vec![StudyNode {
            id: 1,
            name: format!("{}_NODE1", system),
            params: NodeDefinition {
                feature_dc: 24.0,
                nominal_fd0: 0.0,
                noise_margin_pct: 5.0,
                avg_points_fdc: 10,
                avg_points_fd: 5,
                degradation_power: 1.275,
                functional_failure_margin_pct: 70.0,
                default_ttff: 220.0,
                failure_model: FailureModel::Linear,
                input_file_stem: "SP4000_1".to_string(),
                input_file_type: FileType::Txt,
                output_file_type: FileType::Csv,
                terminator: arule_defs::DEFAULT_TERMINATOR,
            },
        }],
    }
}

fn cmd_generate(study_path: &Path, root: Option<&Path>) -> AppResult<()> {
    let study = study_service::load_study(study_path, root)?;
    let store = DefinitionStore::new(study.layout.clone());
    let generated = study_service::generate_definitions(&store, &study.config)?;

    println!("✓ SDEF: {}", generated.system_path.display());
    for path in &generated.node_paths {
        println!("✓ NDEF: {}", path.display());
    }
    Ok(())
}

fn cmd_run(study_path: &Path, root: Option<&Path>, options: PipelineOptions) -> AppResult<()> {
    let study = study_service::load_study(study_path, root)?;
    println!(
        "Running system {} under {}",
        study.config.system,
        study.layout.root().display()
    );

    let engine = ProcessEngine::new(study.config.engine.clone());
    let request = PipelineRequest {
        study: &study.config,
        layout: &study.layout,
        options,
    };

    let mut last_emit = Instant::now();
    let mut last_stage: Option<PipelineStage> = None;
    let response = run_service::run_pipeline_with_progress(
        &request,
        &engine,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    println!("✓ Run completed ({})", response.started_at);
    if !response.generated_definitions {
        println!("  Definitions: existing files");
    }
    if !response.engine_invoked {
        println!("  Engine: skipped");
    }
    for report in &response.nodes {
        print_node_summary(&report.record, &report.summary);
    }
    for skipped in &response.skipped {
        println!("  ✗ {} (ID {}): {}", skipped.name, skipped.id, skipped.error);
    }
    println!("  Total: {:.3}s", response.total_time_s);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineProgressEvent) {
    match (&event.stage, &event.node) {
        (PipelineStage::ReadingOutput, Some(node)) => {
            let width = 28usize;
            let fraction = (node.index + 1) as f64 / node.total.max(1) as f64;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {}/{}  {}  elapsed={:.1}s",
                bar,
                node.index + 1,
                node.total,
                node.name,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_node_summary(record: &ResolvedNodeRecord, summary: &query::OutputSummary) {
    println!("\n  {} (ID {})", record.name(), record.id());
    println!("    Rows: {}", summary.record_count);
    if let Some((start, end)) = summary.time_range {
        println!("    Time range: {:.3} - {:.3}", start, end);
    }
    if let Some(rul) = summary.final_rul {
        println!("    Final RUL: {:.3}", rul);
    }
    if let Some(soh) = summary.final_soh {
        println!("    Final SOH: {:.3}", soh);
    }
    if let Some(code) = summary.max_return_code {
        println!("    Max return code: {}", code);
    }
    match &summary.markers {
        Some(markers) => {
            println!(
                "    Degradation begins: {:.3} (row {}, t={:.3}{})",
                markers.begin.estimate,
                markers.begin.index,
                markers.begin.time,
                if markers.begin.exact { "" } else { ", nearest" }
            );
            println!(
                "    End of life:        {:.3} (row {}, t={:.3}{})",
                markers.end.estimate,
                markers.end.index,
                markers.end.time,
                if markers.end.exact { "" } else { ", nearest" }
            );
        }
        None => println!("    Degradation markers: none"),
    }
}

fn cmd_list(root: &Path) -> AppResult<()> {
    let store = DefinitionStore::new(AruleLayout::new(root));
    let systems = store.list_systems()?;

    if systems.is_empty() {
        println!("No systems found under {}", root.display());
    } else {
        println!("Systems under {}:", root.display());
        for system in systems {
            println!("  {}", system);
        }
    }
    Ok(())
}

fn cmd_show(root: &Path, system: &str) -> AppResult<()> {
    let store = DefinitionStore::new(AruleLayout::new(root));
    let records = arule_defs::resolve(&store, system)?;

    println!("System {} ({} nodes):", system, records.len());
    let header: Vec<&str> = ResolvedNodeRecord::column_names().collect();
    println!("  {}", header.join("\t"));
    for record in &records {
        println!("  {}", record.columns().join("\t"));
    }
    Ok(())
}

fn cmd_report(root: &Path, system: &str, json: bool, policy: NodeErrorPolicy) -> AppResult<()> {
    let store = DefinitionStore::new(AruleLayout::new(root));
    let (reports, skipped) = run_service::collect_reports(&store, system, policy)?;

    if json {
        let nodes: Vec<serde_json::Value> = reports
            .iter()
            .map(|report| {
                serde_json::json!({
                    "id": report.record.id(),
                    "name": report.record.name(),
                    "output_path": report.output_path,
                    "plot_path": report.plot_path,
                    "summary": report.summary,
                })
            })
            .collect();
        let skipped: Vec<serde_json::Value> = skipped
            .iter()
            .map(|node| serde_json::json!({ "id": node.id, "name": node.name, "error": node.error }))
            .collect();
        let document = serde_json::json!({
            "system": system,
            "nodes": nodes,
            "skipped": skipped,
        });
        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::InvalidInput(format!("Failed to encode report: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Report for system {}:", system);
    for report in &reports {
        print_node_summary(&report.record, &report.summary);
        println!("    Output: {}", report.output_path.display());
    }
    for node in &skipped {
        println!("  ✗ {} (ID {}): {}", node.name, node.id, node.error);
    }
    Ok(())
}

fn cmd_log(root: &Path, system: &str) -> AppResult<()> {
    let text = run_service::read_run_log(&AruleLayout::new(root), system)?;
    print!("{}", text);
    Ok(())
}

fn cmd_export_series(
    root: &Path,
    system: &str,
    node: &str,
    column: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let layout = AruleLayout::new(root);
    let store = DefinitionStore::new(layout.clone());
    let records = arule_defs::resolve(&store, system)?;
    let record = query::find_node(&records, system, node)?;

    let path = arule_output::compute_output_path(&layout, record, system);
    let run_output = arule_output::parse(&path)?;
    let series = query::extract_series(&run_output, column)?;

    // Build CSV
    let mut csv = format!("DT,{}\n", column.to_ascii_uppercase());
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, csv).map_err(|source| AppError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
