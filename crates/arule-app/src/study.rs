//! Study file schema.
//!
//! A study describes one system, its nodes and their NDEF parameters, plus how
//! to call the engine. It is the YAML source from which SDEF/NDEF files are
//! generated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use arule_core::AruleLayout;
use arule_defs::{NodeDefinition, NodeRef, SystemDefinition};

use crate::engine::EngineConfig;

fn default_terminator() -> i32 {
    arule_defs::DEFAULT_TERMINATOR
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyConfig {
    /// System name; also the SDEF file stem.
    pub system: String,
    /// Run root. Relative paths are taken from the study file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// `ENDDEF` value of the SDEF.
    #[serde(default = "default_terminator")]
    pub terminator: i32,
    /// Definition files already exist under the root; do not regenerate them.
    #[serde(default)]
    pub pre_packaged: bool,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub nodes: Vec<StudyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyNode {
    pub id: u32,
    /// NDEF file stem.
    pub name: String,
    pub params: NodeDefinition,
}

impl StudyConfig {
    pub fn system_definition(&self) -> SystemDefinition {
        SystemDefinition {
            name: self.system.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeRef::new(node.id, node.name.clone()))
                .collect(),
            terminator: self.terminator,
        }
    }
}

/// A study with its root resolved to an absolute directory.
#[derive(Debug, Clone)]
pub struct Study {
    pub config: StudyConfig,
    pub layout: AruleLayout,
}
