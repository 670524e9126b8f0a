//! Comma-delimited output parsing.
//!
//! Columns are located by header name, so extra or reordered columns are
//! tolerated. Every data row must have as many fields as the header; empty
//! cells read as NaN. Fields may be double-quoted, with `""` for a literal
//! quote, so a quoted field can contain commas.

use std::fs;
use std::io;
use std::path::Path;

use crate::types::{OUTPUT_COLUMNS, RunOutputRecord};
use crate::{FormatError, OutputError, OutputResult};

pub fn parse(path: &Path) -> OutputResult<RunOutputRecord> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            OutputError::OutputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OutputError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let record = parse_str(&text).map_err(|source| OutputError::MalformedOutput {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = record.len(), "Parsed run output");
    Ok(record)
}

pub fn parse_str(text: &str) -> Result<RunOutputRecord, FormatError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(FormatError::MissingHeader)?;
    let header = split_fields(header_line.trim_start_matches('\u{feff}'));

    let mut positions = [0usize; OUTPUT_COLUMNS.len()];
    for (slot, column) in positions.iter_mut().zip(OUTPUT_COLUMNS) {
        *slot = header
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .ok_or(FormatError::MissingColumn { column })?;
    }

    let mut columns: [Vec<f64>; OUTPUT_COLUMNS.len()] = Default::default();
    for (idx, line) in lines {
        let fields = split_fields(line);
        if fields.len() != header.len() {
            return Err(FormatError::RaggedRow {
                line: idx + 1,
                expected: header.len(),
                found: fields.len(),
            });
        }

        for ((values, &pos), column) in columns.iter_mut().zip(&positions).zip(OUTPUT_COLUMNS) {
            let cell = fields[pos].as_str();
            let value = parse_cell(cell).ok_or_else(|| FormatError::InvalidCell {
                column,
                value: cell.to_string(),
                line: idx + 1,
            })?;
            values.push(value);
        }
    }

    Ok(RunOutputRecord::from_columns(columns))
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(ch),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        Some(f64::NAN)
    } else {
        cell.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "FLAG,DT,DA,RUL,PH,SOH,BD,EOL,FDNOM,FD,FFP,DPS,FFS,FFIN,RC0,RS0";

    #[test]
    fn parses_columns_by_name() {
        let text = format!(
            "{HEADER}\n0,0.0,1.5,220,200,100,0,0,24,24.1,0,0,0,0,0,0\n1,1.0,1.6,210,190,99.5,0.5,9.0,24,24.3,1,2,3,4,2,7\n"
        );
        let record = parse_str(&text).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.dt, vec![0.0, 1.0]);
        assert_eq!(record.soh, vec![100.0, 99.5]);
        assert_eq!(record.eol, vec![0.0, 9.0]);
        assert_eq!(record.rc0, vec![0.0, 2.0]);
        assert_eq!(record.rs0, vec![0.0, 7.0]);
    }

    #[test]
    fn tolerates_reordered_and_extra_columns() {
        let text = "EXTRA, RS0,RC0,FFIN,FFS,DPS,FFP,FD,FDNOM,EOL,BD,SOH,PH,RUL,DA,DT,FLAG\n\
                    x,16,15,14,13,12,11,10,9,8,7,6,5,4,3,2,1\n";
        let record = parse_str(text).unwrap();
        assert_eq!(record.flag, vec![1.0]);
        assert_eq!(record.dt, vec![2.0]);
        assert_eq!(record.rs0, vec![16.0]);
    }

    #[test]
    fn missing_column_is_named() {
        let text = "FLAG,DT,DA,RUL,PH,SOH,BD,FDNOM,FD,FFP,DPS,FFS,FFIN,RC0,RS0\n";
        let err = parse_str(text).unwrap_err();
        assert_eq!(err, FormatError::MissingColumn { column: "EOL" });
    }

    #[test]
    fn short_row_is_rejected() {
        let text = format!("{HEADER}\n0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0\n0,1,0,0\n");
        let err = parse_str(&text).unwrap_err();
        assert_eq!(
            err,
            FormatError::RaggedRow {
                line: 3,
                expected: 16,
                found: 4
            }
        );
    }

    #[test]
    fn empty_cells_read_as_nan() {
        let text = format!("{HEADER}\n0,0,0,0,0,0,,,0,0,0,0,0,0,0,0\n");
        let record = parse_str(&text).unwrap();
        assert!(record.bd[0].is_nan());
        assert!(record.eol[0].is_nan());
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let text = format!("{HEADER}\n0,abc,0,0,0,0,0,0,0,0,0,0,0,0,0,0\n");
        let err = parse_str(&text).unwrap_err();
        assert!(matches!(err, FormatError::InvalidCell { column: "DT", line: 2, .. }));
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let text = format!(
            "\"NOTE\",{HEADER}\n\"ran, then \"\"stopped\"\"\",0,\"1.5\",0,0,0,0,0,0,0,0,0,0,0,0,0,0\n"
        );
        let record = parse_str(&text).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.dt, vec![1.5]);

        assert_eq!(
            split_fields(r#" "a, b" ,"say ""hi""",c"#),
            ["a, b", "say \"hi\"", "c"]
        );
    }

    #[test]
    fn empty_text_has_no_header() {
        assert_eq!(parse_str("\n\n").unwrap_err(), FormatError::MissingHeader);
    }

    #[test]
    fn header_only_gives_empty_record() {
        let record = parse_str(HEADER).unwrap();
        assert!(record.is_empty());
        assert!(record.rs0.is_empty());
    }
}
