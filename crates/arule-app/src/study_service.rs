//! Study loading, validation, and definition generation.

use std::path::{Path, PathBuf};

use arule_core::AruleLayout;
use arule_defs::{DefinitionStore, validate_node, validate_system};

use crate::error::{AppError, AppResult};
use crate::study::{Study, StudyConfig};

/// Paths written by [`generate_definitions`].
#[derive(Debug, Clone)]
pub struct GeneratedDefinitions {
    pub system_path: PathBuf,
    pub node_paths: Vec<PathBuf>,
}

/// Load a study from YAML and resolve its run root.
///
/// Root precedence: `root_override`, then the study's `root` (relative to the
/// study file), then the study file's directory.
pub fn load_study(path: &Path, root_override: Option<&Path>) -> AppResult<Study> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::StudyFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: StudyConfig =
        serde_yaml::from_str(&content).map_err(|e| AppError::StudyParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    validate_study(&config)?;

    // A bare file name has an empty parent.
    let study_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let root = match (root_override, &config.root) {
        (Some(root), _) => root.to_path_buf(),
        (None, Some(root)) => study_dir.join(root),
        (None, None) => study_dir.to_path_buf(),
    };
    let root = std::path::absolute(&root)?;

    tracing::debug!(system = %config.system, root = %root.display(), "Loaded study");
    Ok(Study {
        config,
        layout: AruleLayout::new(root),
    })
}

/// Save a study back to YAML.
pub fn save_study(path: &Path, config: &StudyConfig) -> AppResult<()> {
    validate_study(config)?;
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize study: {}", e)))?;
    std::fs::write(path, content).map_err(|source| AppError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Check a study before anything is written for it. Pre-packaged studies may
/// omit nodes; their definitions are read from disk instead.
pub fn validate_study(config: &StudyConfig) -> AppResult<()> {
    if config.system.trim().is_empty() {
        return Err(AppError::Validation("Study must name a system".to_string()));
    }
    if config.pre_packaged && config.nodes.is_empty() {
        return Ok(());
    }

    validate_system(&config.system_definition())?;
    for node in &config.nodes {
        validate_node(&node.name, &node.params)?;
    }
    Ok(())
}

/// Write the SDEF and every NDEF of the study, overwriting existing files.
/// Everything is validated before the first file is written.
pub fn generate_definitions(
    store: &DefinitionStore,
    config: &StudyConfig,
) -> AppResult<GeneratedDefinitions> {
    let system = config.system_definition();
    validate_system(&system)?;
    for node in &config.nodes {
        validate_node(&node.name, &node.params)?;
    }

    let system_path = store.write_system(&system)?;
    let node_paths = config
        .nodes
        .iter()
        .map(|node| store.write_node(&node.name, &node.params))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        system = %config.system,
        nodes = node_paths.len(),
        "Generated SDEF/NDEF files"
    );
    Ok(GeneratedDefinitions {
        system_path,
        node_paths,
    })
}
