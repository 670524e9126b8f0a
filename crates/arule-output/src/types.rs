//! Run output data types.

use serde::Serialize;

/// Required header columns of an engine output file, in file order.
pub const OUTPUT_COLUMNS: [&str; 16] = [
    "FLAG", "DT", "DA", "RUL", "PH", "SOH", "BD", "EOL", "FDNOM", "FD", "FFP", "DPS", "FFS",
    "FFIN", "RC0", "RS0",
];

/// One node's run output, one entry per logged time step in every column.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunOutputRecord {
    /// Internal engine flag.
    pub flag: Vec<f64>,
    /// Data time.
    pub dt: Vec<f64>,
    /// Data amplitude.
    pub da: Vec<f64>,
    /// Remaining useful life.
    pub rul: Vec<f64>,
    /// Prognostic horizon.
    pub ph: Vec<f64>,
    /// State of health, percent.
    pub soh: Vec<f64>,
    /// Begin-of-degradation time estimate.
    pub bd: Vec<f64>,
    /// End-of-life time estimate.
    pub eol: Vec<f64>,
    /// Nominal feature data (set by FDZ or derived from FDC and FDCPTS).
    pub fd_nom: Vec<f64>,
    /// Feature data.
    pub fd: Vec<f64>,
    pub ffp: Vec<f64>,
    pub dps: Vec<f64>,
    pub ffs: Vec<f64>,
    /// Functional failure input to the prognosis.
    pub ffin: Vec<f64>,
    /// Highest return code.
    pub rc0: Vec<f64>,
    pub rs0: Vec<f64>,
}

impl RunOutputRecord {
    /// Assemble from columns given in [`OUTPUT_COLUMNS`] order.
    pub(crate) fn from_columns(columns: [Vec<f64>; 16]) -> Self {
        let [
            flag,
            dt,
            da,
            rul,
            ph,
            soh,
            bd,
            eol,
            fd_nom,
            fd,
            ffp,
            dps,
            ffs,
            ffin,
            rc0,
            rs0,
        ] = columns;
        Self {
            flag,
            dt,
            da,
            rul,
            ph,
            soh,
            bd,
            eol,
            fd_nom,
            fd,
            ffp,
            dps,
            ffs,
            ffin,
            rc0,
            rs0,
        }
    }

    /// Number of logged time steps.
    pub fn len(&self) -> usize {
        self.dt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dt.is_empty()
    }

    /// Look up a column by its header name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let column = match name.to_ascii_uppercase().as_str() {
            "FLAG" => &self.flag,
            "DT" => &self.dt,
            "DA" => &self.da,
            "RUL" => &self.rul,
            "PH" => &self.ph,
            "SOH" => &self.soh,
            "BD" => &self.bd,
            "EOL" => &self.eol,
            "FDNOM" => &self.fd_nom,
            "FD" => &self.fd,
            "FFP" => &self.ffp,
            "DPS" => &self.dps,
            "FFS" => &self.ffs,
            "FFIN" => &self.ffin,
            "RC0" => &self.rc0,
            "RS0" => &self.rs0,
            _ => return None,
        };
        Some(column.as_slice())
    }

    /// Reason for the highest return code. Backed by `RS0`.
    pub fn reason_for_rc0(&self) -> &[f64] {
        &self.rs0
    }

    /// Reason for the indicated return code. The output format has no column
    /// of its own for this, so it reads `RS0` as well.
    pub fn reason_for_indicated_rc(&self) -> &[f64] {
        &self.rs0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_by_header_name() {
        let record = RunOutputRecord {
            dt: vec![0.0, 1.0],
            fd_nom: vec![3.0, 3.0],
            ..Default::default()
        };

        assert_eq!(record.column("DT"), Some(&[0.0, 1.0][..]));
        assert_eq!(record.column("fdnom"), Some(&[3.0, 3.0][..]));
        assert_eq!(record.column("TEMP"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn both_reason_accessors_read_rs0() {
        let record = RunOutputRecord {
            rs0: vec![4.0],
            ..Default::default()
        };
        assert_eq!(record.reason_for_rc0(), record.reason_for_indicated_rc());
    }

    #[test]
    fn every_output_column_is_addressable() {
        let record = RunOutputRecord::default();
        for name in OUTPUT_COLUMNS {
            assert!(record.column(name).is_some(), "{name}");
        }
    }
}
