//! Directory layout shared with the ARULE engine.
//!
//! The engine is handed a single root directory and expects this tree below it:
//!
//! ```text
//! {root}/ARULE/DEFS/SDEF/{system}.txt
//! {root}/ARULE/DEFS/NDEF/{node}.txt
//! {root}/ARULE/DATA/DOUT/ND_{id}_DW_{system}_{stem}_OUT{ext}
//! {root}/ARULE/DATA/LOG/UD_ARULE_LOG_{system}.txt
//! {root}/ARULE/DATA/CPT/
//! {root}/PLOTS/{node}_ARULEOut.png
//! ```
//!
//! Every path is derived from the root carried by [`AruleLayout`]; nothing here
//! consults the process working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFINITION_EXT: &str = "txt";
pub const LOG_PREFIX: &str = "UD_ARULE_LOG_";
pub const PLOT_SUFFIX: &str = "_ARULEOut.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AruleLayout {
    root: PathBuf,
}

impl AruleLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn arule_dir(&self) -> PathBuf {
        self.root.join("ARULE")
    }

    pub fn defs_dir(&self) -> PathBuf {
        self.arule_dir().join("DEFS")
    }

    pub fn sdef_dir(&self) -> PathBuf {
        self.defs_dir().join("SDEF")
    }

    pub fn ndef_dir(&self) -> PathBuf {
        self.defs_dir().join("NDEF")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.arule_dir().join("DATA")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir().join("DOUT")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("LOG")
    }

    /// Engine checkpoint directory. Created for the engine, never read here.
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.data_dir().join("CPT")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("PLOTS")
    }

    pub fn system_def_path(&self, system_name: &str) -> PathBuf {
        self.sdef_dir().join(format!("{system_name}.{DEFINITION_EXT}"))
    }

    pub fn node_def_path(&self, node_name: &str) -> PathBuf {
        self.ndef_dir().join(format!("{node_name}.{DEFINITION_EXT}"))
    }

    pub fn run_log_path(&self, system_name: &str) -> PathBuf {
        self.log_dir().join(format!("{LOG_PREFIX}{system_name}.txt"))
    }

    pub fn plot_path(&self, node_name: &str) -> PathBuf {
        self.plots_dir().join(format!("{node_name}{PLOT_SUFFIX}"))
    }

    /// Create every directory of the tree. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            self.sdef_dir(),
            self.ndef_dir(),
            self.output_dir(),
            self.log_dir(),
            self.checkpoint_dir(),
            self.plots_dir(),
        ] {
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
