//! System Definition (SDEF) files: the ordered list of nodes in a system.
//!
//! Each node is written as an adjacent `NDNUMID` / `NDFNAME` pair. The file
//! has no explicit record grouping, so decoding pairs every `NDNUMID` with the
//! `NDFNAME` that follows it and rejects anything that does not pair up.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::DecodeError;
use crate::grammar;

pub const KEY_NODE_ID: &str = "NDNUMID";
pub const KEY_NODE_NAME: &str = "NDFNAME";
pub const KEY_END: &str = "ENDDEF";

const SDEF_RULE: &str =
    "%**************************************************************************";

/// One node reference of a system: numeric id plus NDEF file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: u32,
    pub ndef_name: String,
}

impl NodeRef {
    pub fn new(id: u32, ndef_name: impl Into<String>) -> Self {
        Self {
            id,
            ndef_name: ndef_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDefinition {
    pub name: String,
    pub nodes: Vec<NodeRef>,
    pub terminator: i32,
}

impl SystemDefinition {
    pub fn new(name: impl Into<String>, nodes: Vec<NodeRef>) -> Self {
        Self {
            name: name.into(),
            nodes,
            terminator: crate::DEFAULT_TERMINATOR,
        }
    }

    pub fn encode(&self) -> String {
        let mut content = String::new();
        content.push_str(SDEF_RULE);
        content.push('\n');
        content.push_str(&format!("% {} System Definition (SDEF)\n", self.name));
        content.push_str("% Each line is a maximum of eighty (80) characters!\n");
        content.push_str(SDEF_RULE);
        content.push('\n');
        for node in &self.nodes {
            content.push_str(&format!(
                "{} = {};\t\t\t % Node Definition Number\n",
                KEY_NODE_ID, node.id
            ));
            content.push_str(&format!(
                "{} = '{}';\t % Node Definition Filename\n",
                KEY_NODE_NAME, node.ndef_name
            ));
        }
        content.push_str(SDEF_RULE);
        content.push('\n');
        content.push_str(&format!(
            "{} = {};\t\t\t\t % End of Node Definition\n",
            KEY_END, self.terminator
        ));
        content
    }

    /// Parse SDEF text for the system called `name`.
    pub fn decode(name: &str, text: &str) -> Result<Self, DecodeError> {
        let entries = grammar::parse_entries(text);
        if entries.is_empty() {
            return Err(DecodeError::NoEntries);
        }

        let mut nodes = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut pending: Option<(u32, usize)> = None;
        let mut terminator = None;

        for entry in &entries {
            match entry.key.as_str() {
                KEY_NODE_ID => {
                    if let Some((id, line)) = pending {
                        return Err(DecodeError::UnpairedId { id, line });
                    }
                    let id = entry.value.parse::<u32>().map_err(|_| {
                        DecodeError::InvalidValue {
                            key: KEY_NODE_ID,
                            value: entry.value.clone(),
                            line: entry.line,
                            reason: "expected a non-negative integer",
                        }
                    })?;
                    if !seen_ids.insert(id) {
                        return Err(DecodeError::DuplicateNodeId {
                            id,
                            line: entry.line,
                        });
                    }
                    pending = Some((id, entry.line));
                }
                KEY_NODE_NAME => {
                    let Some((id, _)) = pending.take() else {
                        return Err(DecodeError::UnpairedName {
                            name: entry.value.clone(),
                            line: entry.line,
                        });
                    };
                    nodes.push(NodeRef::new(id, entry.value.clone()));
                }
                KEY_END => {
                    if terminator.is_some() {
                        return Err(DecodeError::DuplicateKey {
                            key: entry.key.clone(),
                            line: entry.line,
                        });
                    }
                    terminator = Some(entry.value.parse::<i32>().map_err(|_| {
                        DecodeError::InvalidValue {
                            key: KEY_END,
                            value: entry.value.clone(),
                            line: entry.line,
                            reason: "expected an integer",
                        }
                    })?);
                }
                _ => {}
            }
        }

        if let Some((id, line)) = pending {
            return Err(DecodeError::UnpairedId { id, line });
        }
        let terminator = terminator.ok_or(DecodeError::MissingKey { key: KEY_END })?;

        Ok(Self {
            name: name.to_string(),
            nodes,
            terminator,
        })
    }
}
