//! Node Definition (NDEF) files: one node's degradation model and I/O setup.
//!
//! The engine models feature data as `FD = FDZ * (dP/P)^FDNV + FDC + noise`.
//! Each parameter is written as one `KEY = VALUE;` line in [`NDEF_KEYS`] order.

use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::HashMap;
use std::fmt;

use crate::DecodeError;
use crate::grammar::{self, DefEntry};

/// Keys of an NDEF file, in the order they are written.
pub const NDEF_KEYS: [&str; 13] = [
    "FDC", "FDZ", "FDNM", "FDCPTS", "FDPTS", "FDNV", "FFPFAIL", "PITTFF", "PIFFSMOD", "INFILE",
    "INTYPE", "OUTTYPE", "ENDDEF",
];

/// Largest averaging window the engine accepts for `FDCPTS`.
pub const MAX_AVG_POINTS_FDC: u32 = 25;
/// Largest averaging window the engine accepts for `FDPTS`.
pub const MAX_AVG_POINTS_FD: u32 = 5;

const NDEF_RULE: &str = "%********************************************************************************************************";

const FIELD_COMMENTS: [&str; 12] = [
    "Feature Data, DC",
    "Nominal FD0 value for AC coefficient: 0=use FDC",
    "Percent Noise Margin",
    "Data points to average for FDC: up to 25",
    "Data points to average for FD: up to 5",
    "Degradation Power n",
    "Functional Failure Margin - percent above nominal",
    "Default RUL = TTFF value",
    "Model (1=Convex, 2=Linear, 3=Concave, 4=Convex-Concave, 5=Concave-Convex)",
    "Input Filename (_OUT appended for Output)",
    "Input File Type (.csv/.txt)",
    "Output File Type (.csv/.txt)",
];

/// Shape of the functional-failure signature curve (`PIFFSMOD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureModel {
    Convex,
    Linear,
    Concave,
    ConvexConcave,
    ConcaveConvex,
}

impl FailureModel {
    pub const ALL: [FailureModel; 5] = [
        FailureModel::Convex,
        FailureModel::Linear,
        FailureModel::Concave,
        FailureModel::ConvexConcave,
        FailureModel::ConcaveConvex,
    ];

    /// Integer code written to the NDEF file (1-5).
    pub fn code(self) -> u8 {
        match self {
            FailureModel::Convex => 1,
            FailureModel::Linear => 2,
            FailureModel::Concave => 3,
            FailureModel::ConvexConcave => 4,
            FailureModel::ConcaveConvex => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.code() == code)
    }
}

/// Extension of an engine input or output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileType {
    #[serde(rename = ".txt")]
    Txt,
    #[serde(rename = ".csv")]
    Csv,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Txt => ".txt",
            FileType::Csv => ".csv",
        }
    }

    /// Accepts `.txt`/`.csv`, case-insensitive.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            ".txt" => Some(FileType::Txt),
            ".csv" => Some(FileType::Csv),
            _ => None,
        }
    }
}

// Same case-insensitive reading as NDEF decoding.
impl<'de> Deserialize<'de> for FileType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        FileType::parse(&token).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Str(&token), &"\".txt\" or \".csv\"")
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn default_terminator() -> i32 {
    crate::DEFAULT_TERMINATOR
}

/// Parameters of one NDEF file. The node's name is the file stem and its
/// numeric id comes from the SDEF, so neither is stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// `FDC`
    pub feature_dc: f64,
    /// `FDZ`; 0 means derive the nominal value from `FDC`.
    pub nominal_fd0: f64,
    /// `FDNM`
    pub noise_margin_pct: f64,
    /// `FDCPTS`, at most [`MAX_AVG_POINTS_FDC`].
    pub avg_points_fdc: u32,
    /// `FDPTS`, at most [`MAX_AVG_POINTS_FD`].
    pub avg_points_fd: u32,
    /// `FDNV`
    pub degradation_power: f64,
    /// `FFPFAIL`
    pub functional_failure_margin_pct: f64,
    /// `PITTFF`
    pub default_ttff: f64,
    /// `PIFFSMOD`
    pub failure_model: FailureModel,
    /// `INFILE`
    pub input_file_stem: String,
    /// `INTYPE`
    pub input_file_type: FileType,
    /// `OUTTYPE`
    pub output_file_type: FileType,
    /// `ENDDEF`
    #[serde(default = "default_terminator")]
    pub terminator: i32,
}

impl NodeDefinition {
    /// `(KEY, VALUE)` pairs in file order, values rendered as written.
    pub fn entries(&self) -> [(&'static str, String); 13] {
        [
            (NDEF_KEYS[0], grammar::format_real(self.feature_dc)),
            (NDEF_KEYS[1], grammar::format_real(self.nominal_fd0)),
            (NDEF_KEYS[2], grammar::format_real(self.noise_margin_pct)),
            (NDEF_KEYS[3], self.avg_points_fdc.to_string()),
            (NDEF_KEYS[4], self.avg_points_fd.to_string()),
            (NDEF_KEYS[5], grammar::format_real(self.degradation_power)),
            (
                NDEF_KEYS[6],
                grammar::format_real(self.functional_failure_margin_pct),
            ),
            (NDEF_KEYS[7], grammar::format_real(self.default_ttff)),
            (NDEF_KEYS[8], self.failure_model.code().to_string()),
            (NDEF_KEYS[9], self.input_file_stem.clone()),
            (NDEF_KEYS[10], self.input_file_type.extension().to_string()),
            (NDEF_KEYS[11], self.output_file_type.extension().to_string()),
            (NDEF_KEYS[12], self.terminator.to_string()),
        ]
    }

    /// Render the NDEF file text for the node called `node_name`.
    pub fn encode(&self, node_name: &str) -> String {
        let mut content = String::new();
        content.push_str(NDEF_RULE);
        content.push('\n');
        content.push_str(&format!("% {} Node Definition (NDEF)\n", node_name));
        content.push_str(NDEF_RULE);
        content.push('\n');

        let entries = self.entries();
        let (fields, end) = entries.split_at(FIELD_COMMENTS.len());
        for (idx, ((key, value), comment)) in fields.iter().zip(FIELD_COMMENTS).enumerate() {
            match idx {
                0 => content.push_str("%**Feature Data: FD = FDZ*(dP/P)^FDNV + DC + NOISE\n"),
                7 => content.push_str("%**Prognostic Modeling\n"),
                9 => content.push_str("%**File Dependent Parameters\n"),
                _ => {}
            }
            content.push_str(&format!("{} = {};\t\t\t % {}\n", key, value, comment));
        }

        content.push_str(NDEF_RULE);
        content.push('\n');
        for (key, value) in end {
            content.push_str(&format!("{} = {};\t\t\t % End of Node Definition\n", key, value));
        }
        content
    }

    /// Parse NDEF text. Every key of [`NDEF_KEYS`] must appear exactly once;
    /// unknown keys are ignored.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let entries = grammar::parse_entries(text);
        if entries.is_empty() {
            return Err(DecodeError::NoEntries);
        }

        let mut by_key: HashMap<&str, &DefEntry> = HashMap::new();
        for entry in &entries {
            if NDEF_KEYS.contains(&entry.key.as_str())
                && by_key.insert(entry.key.as_str(), entry).is_some()
            {
                return Err(DecodeError::DuplicateKey {
                    key: entry.key.clone(),
                    line: entry.line,
                });
            }
        }

        let fields = Fields { by_key };
        Ok(Self {
            feature_dc: fields.real(NDEF_KEYS[0])?,
            nominal_fd0: fields.real(NDEF_KEYS[1])?,
            noise_margin_pct: fields.real(NDEF_KEYS[2])?,
            avg_points_fdc: fields.count(NDEF_KEYS[3])?,
            avg_points_fd: fields.count(NDEF_KEYS[4])?,
            degradation_power: fields.real(NDEF_KEYS[5])?,
            functional_failure_margin_pct: fields.real(NDEF_KEYS[6])?,
            default_ttff: fields.real(NDEF_KEYS[7])?,
            failure_model: fields.failure_model(NDEF_KEYS[8])?,
            input_file_stem: fields.get(NDEF_KEYS[9])?.value.clone(),
            input_file_type: fields.file_type(NDEF_KEYS[10])?,
            output_file_type: fields.file_type(NDEF_KEYS[11])?,
            terminator: fields.integer(NDEF_KEYS[12])?,
        })
    }
}

struct Fields<'a> {
    by_key: HashMap<&'a str, &'a DefEntry>,
}

impl<'a> Fields<'a> {
    fn get(&self, key: &'static str) -> Result<&'a DefEntry, DecodeError> {
        self.by_key
            .get(key)
            .copied()
            .ok_or(DecodeError::MissingKey { key })
    }

    fn invalid(key: &'static str, entry: &DefEntry, reason: &'static str) -> DecodeError {
        DecodeError::InvalidValue {
            key,
            value: entry.value.clone(),
            line: entry.line,
            reason,
        }
    }

    fn real(&self, key: &'static str) -> Result<f64, DecodeError> {
        let entry = self.get(key)?;
        entry
            .value
            .parse::<f64>()
            .map_err(|_| Self::invalid(key, entry, "expected a number"))
    }

    fn count(&self, key: &'static str) -> Result<u32, DecodeError> {
        let entry = self.get(key)?;
        entry
            .value
            .parse::<u32>()
            .map_err(|_| Self::invalid(key, entry, "expected a non-negative integer"))
    }

    fn integer(&self, key: &'static str) -> Result<i32, DecodeError> {
        let entry = self.get(key)?;
        entry
            .value
            .parse::<i32>()
            .map_err(|_| Self::invalid(key, entry, "expected an integer"))
    }

    fn failure_model(&self, key: &'static str) -> Result<FailureModel, DecodeError> {
        let entry = self.get(key)?;
        entry
            .value
            .parse::<u8>()
            .ok()
            .and_then(FailureModel::from_code)
            .ok_or_else(|| Self::invalid(key, entry, "expected a model code 1-5"))
    }

    fn file_type(&self, key: &'static str) -> Result<FileType, DecodeError> {
        let entry = self.get(key)?;
        FileType::parse(&entry.value)
            .ok_or_else(|| Self::invalid(key, entry, "expected .txt or .csv"))
    }
}
