use crate::labels::LabelAssignment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// What the host hands the core before a trial starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialInputs {
    /// 1-based position of the trial in the session.
    pub trial: u32,
    pub label_1: String,
    pub label_2: String,
    pub kind: String,
}

impl TrialInputs {
    pub fn new(
        trial: u32,
        label_1: impl Into<String>,
        label_2: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            trial,
            label_1: label_1.into(),
            label_2: label_2.into(),
            kind: kind.into(),
        }
    }
}

/// Rounds to two decimal places, the precision every numeric field is kept at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One confirmed trial. Field order is the column order downstream analysis
/// expects, so it must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    trial: u32,
    size_percent: f64,
    overlap_percent: f64,
    response_time: f64,
    order_indicator: u8,
    label_left: String,
    label_right: String,
    label_1: String,
    label_2: String,
    #[serde(rename = "type")]
    kind: String,
}

impl TrialResult {
    pub fn new(
        trial: u32,
        labels: &LabelAssignment,
        kind: &str,
        size_percent: f64,
        overlap_percent: f64,
        response_time: Duration,
    ) -> Self {
        Self {
            trial,
            size_percent: round2(size_percent),
            overlap_percent: round2(overlap_percent),
            response_time: round2(response_time.as_secs_f64()),
            order_indicator: labels.order_indicator(),
            label_left: labels.left().to_string(),
            label_right: labels.right().to_string(),
            label_1: labels.label_1().to_string(),
            label_2: labels.label_2().to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn trial(&self) -> u32 {
        self.trial
    }

    pub fn size_percent(&self) -> f64 {
        self.size_percent
    }

    pub fn overlap_percent(&self) -> f64 {
        self.overlap_percent
    }

    /// Seconds from trial start to confirm.
    pub fn response_time(&self) -> f64 {
        self.response_time
    }

    pub fn order_indicator(&self) -> u8 {
        self.order_indicator
    }

    pub fn label_left(&self) -> &str {
        &self.label_left
    }

    pub fn label_right(&self) -> &str {
        &self.label_right
    }

    pub fn label_1(&self) -> &str {
        &self.label_1
    }

    pub fn label_2(&self) -> &str {
        &self.label_2
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// The append-only sequence of results accumulated over a session.
///
/// Entries are kept as plain JSON values, so earlier records survive an
/// append even when their shape differs from [`TrialResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialLog {
    entries: Vec<Value>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on malformed JSON and on anything that is not an array.
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reads a stored log. Missing, blank or unparsable storage yields an
    /// empty log; corruption is logged and otherwise ignored.
    pub fn parse_or_empty(stored: Option<&str>) -> Self {
        match stored.map(str::trim) {
            None | Some("") => Self::new(),
            Some(json) => Self::parse(json).unwrap_or_else(|e| {
                log::warn!("discarding unreadable trial log: {}", e);
                Self::new()
            }),
        }
    }

    pub fn push(&mut self, result: &TrialResult) -> serde_json::Result<()> {
        self.entries.push(serde_json::to_value(result)?);
        Ok(())
    }

    /// Every stored entry, whatever its shape.
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Entries that read back as trial records, in log order.
    pub fn results(&self) -> Vec<TrialResult> {
        self.entries
            .iter()
            .filter_map(|entry| TrialResult::deserialize(entry).ok())
            .collect()
    }

    pub fn last_result(&self) -> Option<TrialResult> {
        self.entries
            .last()
            .and_then(|entry| TrialResult::deserialize(entry).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(trial: u32, swapped: bool) -> TrialResult {
        let labels = LabelAssignment::new("apple", "banana", swapped);
        TrialResult::new(
            trial,
            &labels,
            "fruit",
            399.996_1,
            25.004,
            Duration::from_millis(2_346),
        )
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(399.9961), 400.0);
        assert_eq!(round2(25.004), 25.0);
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_record_rounds_and_copies_labels() {
        let result = sample(3, true);
        assert_eq!(result.trial(), 3);
        assert_eq!(result.size_percent(), 400.0);
        assert_eq!(result.overlap_percent(), 25.0);
        assert_eq!(result.response_time(), 2.35);
        assert_eq!(result.order_indicator(), 1);
        assert_eq!(result.label_left(), "banana");
        assert_eq!(result.label_right(), "apple");
        assert_eq!(result.label_1(), "apple");
        assert_eq!(result.label_2(), "banana");
        assert_eq!(result.kind(), "fruit");
    }

    #[test]
    fn test_field_order_and_names() {
        let json = serde_json::to_string(&sample(1, false)).unwrap();
        let keys = [
            "\"trial\"",
            "\"size_percent\"",
            "\"overlap_percent\"",
            "\"response_time\"",
            "\"order_indicator\"",
            "\"label_left\"",
            "\"label_right\"",
            "\"label_1\"",
            "\"label_2\"",
            "\"type\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
        assert!(!json.contains("\"kind\""));
    }

    #[test]
    fn test_log_round_trip_is_identity() {
        let mut log = TrialLog::new();
        log.push(&sample(1, false)).unwrap();
        log.push(&sample(2, true)).unwrap();
        let json = log.to_json().unwrap();
        assert!(json.starts_with('['));
        let parsed = TrialLog::parse(&json).unwrap();
        assert_eq!(parsed, log);
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn test_parse_or_empty_recovers() {
        assert!(TrialLog::parse_or_empty(None).is_empty());
        assert!(TrialLog::parse_or_empty(Some("")).is_empty());
        assert!(TrialLog::parse_or_empty(Some("  \n")).is_empty());
        assert!(TrialLog::parse_or_empty(Some("{not json")).is_empty());
        assert!(TrialLog::parse_or_empty(Some("{\"trial\": 1}")).is_empty());

        let mut log = TrialLog::new();
        log.push(&sample(4, false)).unwrap();
        let json = log.to_json().unwrap();
        let restored = TrialLog::parse_or_empty(Some(&json));
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.last_result().map(|r| r.trial()), Some(4));
    }

    #[test]
    fn test_foreign_entries_survive_append() {
        let stored = r#"[{"trial":null,"size_percent":80.0},"note",{"trial":2,"size_percent":50.0,"overlap_percent":10.0,"response_time":1.5,"order_indicator":1,"label_left":"dog","label_right":"cat","label_1":"cat","label_2":"dog","type":"animal"}]"#;
        let mut log = TrialLog::parse_or_empty(Some(stored));
        assert_eq!(log.len(), 3);
        assert!(log.entries()[0]["trial"].is_null());
        assert_eq!(log.entries()[1], "note");
        assert_eq!(log.results().len(), 1);

        log.push(&sample(3, false)).unwrap();
        let json = log.to_json().unwrap();
        let kept = r#"[{"trial":null,"size_percent":80.0},"note",{"trial":2"#;
        assert!(json.starts_with(kept), "{json}");
        let trials: Vec<u32> = log.results().iter().map(TrialResult::trial).collect();
        assert_eq!(trials, vec![2, 3]);
        assert_eq!(log.last_result(), Some(sample(3, false)));
    }
}
