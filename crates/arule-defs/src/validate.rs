//! Checks applied before definition files are written.
//!
//! Decoding does not repeat these checks: files that already exist on disk are
//! handed to the engine as they are.

use crate::grammar;
use crate::ndef::{MAX_AVG_POINTS_FD, MAX_AVG_POINTS_FDC, NodeDefinition};
use crate::sdef::SystemDefinition;
use arule_core::{ensure_at_most, ensure_finite};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid name '{name}' for {context}: {reason}")]
    InvalidName {
        name: String,
        context: String,
        reason: &'static str,
    },

    #[error("Invalid value in {context}: {source}")]
    InvalidValue {
        context: String,
        #[source]
        source: arule_core::CoreError,
    },

    #[error("System '{system}' has no nodes")]
    EmptySystem { system: String },
}

pub fn validate_system(system: &SystemDefinition) -> Result<(), ValidationError> {
    validate_name(&system.name, "system")?;

    if system.nodes.is_empty() {
        return Err(ValidationError::EmptySystem {
            system: system.name.clone(),
        });
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for node in &system.nodes {
        if !ids.insert(node.id) {
            return Err(ValidationError::DuplicateId {
                id: node.id.to_string(),
                context: format!("system '{}' nodes", system.name),
            });
        }
        if !names.insert(node.ndef_name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.ndef_name.clone(),
                context: format!("system '{}' node names", system.name),
            });
        }
        validate_name(&node.ndef_name, "node")?;
    }
    Ok(())
}

pub fn validate_node(name: &str, node: &NodeDefinition) -> Result<(), ValidationError> {
    validate_name(name, "node")?;

    let context = || format!("node '{}'", name);
    let invalid = |source| ValidationError::InvalidValue {
        context: context(),
        source,
    };

    for (value, what) in [
        (node.feature_dc, "FDC"),
        (node.nominal_fd0, "FDZ"),
        (node.noise_margin_pct, "FDNM"),
        (node.degradation_power, "FDNV"),
        (node.functional_failure_margin_pct, "FFPFAIL"),
        (node.default_ttff, "PITTFF"),
    ] {
        ensure_finite(value, what).map_err(invalid)?;
    }
    ensure_at_most(node.avg_points_fdc, MAX_AVG_POINTS_FDC, "FDCPTS").map_err(invalid)?;
    ensure_at_most(node.avg_points_fd, MAX_AVG_POINTS_FD, "FDPTS").map_err(invalid)?;

    if !grammar::is_bare_token(&node.input_file_stem) {
        return Err(ValidationError::InvalidName {
            name: node.input_file_stem.clone(),
            context: format!("INFILE of {}", context()),
            reason: "must contain only letters, digits, '_', '.' or '-'",
        });
    }
    Ok(())
}

/// Names double as file stems and as quoted SDEF values.
fn validate_name(name: &str, context: &str) -> Result<(), ValidationError> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.contains(['\'', '/', '\\', '\n', '\r']) {
        Some("must not contain quotes, path separators or line breaks")
    } else if name != name.trim() {
        Some("must not start or end with whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidName {
            name: name.to_string(),
            context: context.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
