use overlap_core::TrialInputs;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("cannot read trial plan: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed trial plan: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed trial table: {0}")]
    Csv(#[from] csv::Error),
    #[error("trial plan has no trials")]
    Empty,
    #[error("trial index must be at least 1")]
    ZeroTrialIndex,
}

/// One row of the label table. CSV tables need `label1` and `label2`
/// columns; `type` is optional and other columns are ignored.
#[derive(Debug, Deserialize)]
struct PlanRow {
    label1: String,
    label2: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Ordered trials a session runs through, one per label row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialPlan {
    trials: Vec<TrialInputs>,
}

impl TrialPlan {
    /// A plan of one trial, for hosts that run trials one at a time.
    pub fn single(inputs: TrialInputs) -> Result<Self, PlanError> {
        if inputs.trial == 0 {
            return Err(PlanError::ZeroTrialIndex);
        }
        Ok(Self {
            trials: vec![inputs],
        })
    }

    fn from_rows(rows: Vec<PlanRow>) -> Result<Self, PlanError> {
        if rows.is_empty() {
            return Err(PlanError::Empty);
        }
        let trials = rows
            .into_iter()
            .zip(1u32..)
            .map(|(row, trial)| TrialInputs::new(trial, row.label1, row.label2, row.kind))
            .collect();
        Ok(Self { trials })
    }

    /// Parses `[{"label1": .., "label2": .., "type": ..}, ..]`. Trials are
    /// numbered by position starting at 1.
    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        Self::from_rows(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PlanError> {
        let json = fs_err::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reads a label table with a header row, numbered like the JSON form.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, PlanError> {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<PlanRow>, _>>()?;
        Self::from_rows(rows)
    }

    pub fn from_csv_file(path: &Path) -> Result<Self, PlanError> {
        Self::from_csv_reader(fs_err::File::open(path)?)
    }

    /// Picks the format by extension: `.csv` is a label table, anything
    /// else is JSON.
    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::from_csv_file(path)
        } else {
            Self::from_json_file(path)
        }
    }

    pub fn trials(&self) -> &[TrialInputs] {
        &self.trials
    }

    pub fn get(&self, index: usize) -> Option<&TrialInputs> {
        self.trials.get(index)
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}
