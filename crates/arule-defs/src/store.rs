//! Reading and writing definition files under the engine's `DEFS` tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use arule_core::AruleLayout;

use crate::ndef::NodeDefinition;
use crate::sdef::SystemDefinition;
use crate::validate::{validate_node, validate_system};
use crate::{DecodeError, DefsError, DefsResult};

#[derive(Debug, Clone)]
pub struct DefinitionStore {
    layout: AruleLayout,
}

impl DefinitionStore {
    pub fn new(layout: AruleLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &AruleLayout {
        &self.layout
    }

    pub fn system_path(&self, system_name: &str) -> PathBuf {
        self.layout.system_def_path(system_name)
    }

    pub fn node_path(&self, node_name: &str) -> PathBuf {
        self.layout.node_def_path(node_name)
    }

    /// Validate and write `{system}.txt`, replacing any previous file.
    pub fn write_system(&self, system: &SystemDefinition) -> DefsResult<PathBuf> {
        validate_system(system)?;
        let path = self.system_path(&system.name);
        write_definition(&path, &system.encode())?;
        tracing::debug!(system = %system.name, nodes = system.nodes.len(), path = %path.display(), "Wrote SDEF");
        Ok(path)
    }

    /// Validate and write `{node_name}.txt`, replacing any previous file.
    pub fn write_node(&self, node_name: &str, node: &NodeDefinition) -> DefsResult<PathBuf> {
        validate_node(node_name, node)?;
        let path = self.node_path(node_name);
        write_definition(&path, &node.encode(node_name))?;
        tracing::debug!(node = node_name, path = %path.display(), "Wrote NDEF");
        Ok(path)
    }

    pub fn load_system(&self, system_name: &str) -> DefsResult<SystemDefinition> {
        let path = self.system_path(system_name);
        let text = read_definition(&path)?;
        SystemDefinition::decode(system_name, &text).map_err(|source| malformed(path, source))
    }

    pub fn load_node(&self, node_name: &str) -> DefsResult<NodeDefinition> {
        let path = self.node_path(node_name);
        let text = read_definition(&path)?;
        NodeDefinition::decode(&text).map_err(|source| malformed(path, source))
    }

    /// Names of every SDEF file present, sorted.
    pub fn list_systems(&self) -> DefsResult<Vec<String>> {
        let dir = self.layout.sdef_dir();
        let mut names = Vec::new();
        if !dir.exists() {
            return Ok(names);
        }

        let entries = fs::read_dir(&dir).map_err(|source| DefsError::Read {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| DefsError::Read {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == arule_core::layout::DEFINITION_EXT)
                && let Some(stem) = path.file_stem()
            {
                names.push(stem.to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn malformed(path: PathBuf, source: DecodeError) -> DefsError {
    DefsError::MalformedDefinition { path, source }
}

fn read_definition(path: &Path) -> DefsResult<String> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DefsError::DefinitionNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DefsError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_definition(path: &Path, content: &str) -> DefsResult<()> {
    let write_err = |source| DefsError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}
