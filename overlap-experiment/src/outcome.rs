use overlap_core::TrialResult;

/// What the host does when the participant tries to move on.
///
/// The controller calls `warn_incomplete` for every premature confirm and
/// `complete` exactly once per trial.
pub trait TrialOutcome {
    fn warn_incomplete(&mut self);
    fn complete(&mut self, result: TrialResult) -> anyhow::Result<()>;
}

/// Keeps every signal in memory. Handy for hosts that collect results
/// themselves, and for tests.
#[derive(Debug, Default)]
pub struct RecordingOutcome {
    pub warnings: usize,
    pub completed: Vec<TrialResult>,
}

impl TrialOutcome for RecordingOutcome {
    fn warn_incomplete(&mut self) {
        self.warnings += 1;
    }

    fn complete(&mut self, result: TrialResult) -> anyhow::Result<()> {
        self.completed.push(result);
        Ok(())
    }
}
