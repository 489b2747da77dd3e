use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Store key the participant identifier is kept under, next to the log.
pub const PARTICIPANT_ID: &str = "participantId";

pub const MAX_PARTICIPANT_ID_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticipantError {
    #[error("participant ID is empty")]
    Empty,
    #[error("participant ID has {0} characters, at most 20 are allowed")]
    TooLong(usize),
    #[error("participant ID may not contain {0:?}")]
    InvalidChar(char),
}

/// Who a session's results belong to. Trimmed, at most
/// [`MAX_PARTICIPANT_ID_LEN`] printable characters and safe to embed in a
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(raw: &str) -> Result<Self, ParticipantError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(ParticipantError::Empty);
        }
        let len = id.chars().count();
        if len > MAX_PARTICIPANT_ID_LEN {
            return Err(ParticipantError::TooLong(len));
        }
        if let Some(c) = id
            .chars()
            .find(|c| c.is_control() || matches!(c, '/' | '\\'))
        {
            return Err(ParticipantError::InvalidChar(c));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default results file for this participant.
    pub fn results_file_name(&self) -> String {
        format!("overlap_results_{}.json", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ParticipantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
