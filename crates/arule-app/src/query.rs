//! Query helpers for resolved nodes and parsed run output.

use serde::Serialize;

use arule_defs::ResolvedNodeRecord;
use arule_output::{DegradationMarkers, RunOutputRecord, locate_degradation_markers};

use crate::error::{AppError, AppResult};

/// Headline figures of one node's run output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub record_count: usize,
    pub time_range: Option<(f64, f64)>,
    pub final_rul: Option<f64>,
    pub final_ph: Option<f64>,
    pub final_soh: Option<f64>,
    /// Largest `RC0` seen over the run.
    pub max_return_code: Option<f64>,
    pub markers: Option<DegradationMarkers>,
}

pub fn summarize_output(output: &RunOutputRecord) -> OutputSummary {
    let time_range = match (output.dt.first(), output.dt.last()) {
        (Some(&start), Some(&end)) => Some((start, end)),
        _ => None,
    };
    let max_return_code = output
        .rc0
        .iter()
        .copied()
        .filter(|code| code.is_finite())
        .reduce(f64::max);

    OutputSummary {
        record_count: output.len(),
        time_range,
        final_rul: output.rul.last().copied(),
        final_ph: output.ph.last().copied(),
        final_soh: output.soh.last().copied(),
        max_return_code,
        markers: locate_degradation_markers(output),
    }
}

/// `(DT, value)` pairs for the named output column.
pub fn extract_series(output: &RunOutputRecord, column: &str) -> AppResult<Vec<(f64, f64)>> {
    let values = output
        .column(column)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown output column: {}", column)))?;

    Ok(output
        .dt
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect())
}

/// Find a node by name, or by numeric id when `node` parses as one.
pub fn find_node<'a>(
    records: &'a [ResolvedNodeRecord],
    system: &str,
    node: &str,
) -> AppResult<&'a ResolvedNodeRecord> {
    let by_id = node.parse::<u32>().ok();
    records
        .iter()
        .find(|record| record.name() == node)
        .or_else(|| by_id.and_then(|id| records.iter().find(|record| record.id() == id)))
        .ok_or_else(|| AppError::NodeNotFound {
            system: system.to_string(),
            node: node.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arule_defs::{FailureModel, FileType, NodeDefinition};

    fn output() -> RunOutputRecord {
        RunOutputRecord {
            dt: vec![0.0, 1.0, 2.0, 3.0],
            rul: vec![220.0, 200.0, 150.0, 90.0],
            ph: vec![0.0, 0.0, 10.0, 20.0],
            soh: vec![100.0, 98.0, 80.0, 60.0],
            bd: vec![0.0, 0.0, 0.0, 1.0],
            eol: vec![0.0, 0.0, 0.0, 2.6],
            rc0: vec![0.0, 2.0, f64::NAN, 1.0],
            ..Default::default()
        }
    }

    #[test]
    fn summary_reports_final_values_and_markers() {
        let summary = summarize_output(&output());
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.time_range, Some((0.0, 3.0)));
        assert_eq!(summary.final_rul, Some(90.0));
        assert_eq!(summary.final_soh, Some(60.0));
        assert_eq!(summary.max_return_code, Some(2.0));
        assert_eq!(summary.markers.unwrap().indices(), (1, 3));
    }

    #[test]
    fn summary_of_empty_output() {
        let summary = summarize_output(&RunOutputRecord::default());
        assert_eq!(summary.record_count, 0);
        assert!(summary.time_range.is_none());
        assert!(summary.markers.is_none());
        assert!(summary.max_return_code.is_none());
    }

    #[test]
    fn series_pairs_time_with_column() {
        let series = extract_series(&output(), "soh").unwrap();
        assert_eq!(series[2], (2.0, 80.0));
        assert!(matches!(
            extract_series(&output(), "nope"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn find_node_by_name_or_id() {
        let definition = NodeDefinition {
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
            terminator: -9,
        };
        let records = vec![
            ResolvedNodeRecord::new(4, "A", definition.clone()),
            ResolvedNodeRecord::new(7, "B", definition),
        ];

        assert_eq!(find_node(&records, "S", "B").unwrap().id(), 7);
        assert_eq!(find_node(&records, "S", "4").unwrap().name(), "A");
        assert!(matches!(
            find_node(&records, "S", "C"),
            Err(AppError::NodeNotFound { .. })
        ));
    }
}
