//! Resolution of a system into per-node parameter records.

use crate::ndef::{NDEF_KEYS, NodeDefinition};
use crate::store::DefinitionStore;
use crate::DefsResult;

/// A node's identity joined with its NDEF parameters. Built once per
/// reporting pass and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNodeRecord {
    id: u32,
    name: String,
    definition: NodeDefinition,
}

impl ResolvedNodeRecord {
    pub fn new(id: u32, name: impl Into<String>, definition: NodeDefinition) -> Self {
        Self {
            id,
            name: name.into(),
            definition,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    /// Column names of [`Self::columns`].
    pub fn column_names() -> impl Iterator<Item = &'static str> {
        ["ID", "NAME"]
            .into_iter()
            .chain(NDEF_KEYS.into_iter().filter(|key| *key != "ENDDEF"))
    }

    /// `(id, name, FDC, FDZ, FDNM, FDCPTS, FDPTS, FDNV, FFPFAIL, PITTFF,
    /// PIFFSMOD, INFILE, INTYPE, OUTTYPE)` rendered as text.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![self.id.to_string(), self.name.clone()];
        columns.extend(
            self.definition
                .entries()
                .into_iter()
                .filter(|(key, _)| *key != "ENDDEF")
                .map(|(_, value)| value),
        );
        columns
    }
}

/// Decode the SDEF named `system_name` and every NDEF it references, in
/// declared order. Fails as a whole if any file is missing or malformed.
pub fn resolve(store: &DefinitionStore, system_name: &str) -> DefsResult<Vec<ResolvedNodeRecord>> {
    let system = store.load_system(system_name)?;
    tracing::debug!(system = system_name, nodes = system.nodes.len(), "Resolving system");

    system
        .nodes
        .iter()
        .map(|node_ref| {
            let definition = store.load_node(&node_ref.ndef_name)?;
            Ok(ResolvedNodeRecord::new(
                node_ref.id,
                node_ref.ndef_name.clone(),
                definition,
            ))
        })
        .collect()
}
