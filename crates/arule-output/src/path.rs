//! Output file naming: `ND_{id}_DW_{system}_{stem}_OUT{ext}` under `DATA/DOUT`.
//!
//! The engine writes these files; this crate only derives where to find them.

use std::path::PathBuf;

use arule_core::AruleLayout;
use arule_defs::{FileType, ResolvedNodeRecord};

pub fn output_file_name(
    node_id: u32,
    system_name: &str,
    input_file_stem: &str,
    output_file_type: FileType,
) -> String {
    format!(
        "ND_{}_DW_{}_{}_OUT{}",
        node_id,
        system_name,
        input_file_stem,
        output_file_type.extension()
    )
}

pub fn compute_output_path(
    layout: &AruleLayout,
    record: &ResolvedNodeRecord,
    system_name: &str,
) -> PathBuf {
    let definition = record.definition();
    layout.output_dir().join(output_file_name(
        record.id(),
        system_name,
        &definition.input_file_stem,
        definition.output_file_type,
    ))
}
