use crate::config::ExperimentConfig;
use crate::controller::{ConfirmOutcome, TrialController, TrialError};
use crate::input::PointerEvent;
use crate::participant::ParticipantId;
use crate::plan::TrialPlan;
use crate::store::{LogRecorder, ResultStore, StoreError};
use overlap_core::{Scene, TrialResult};
use overlap_timing::Timer;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// Nothing the host needs to react to.
    Idle,
    /// Confirm was pressed too early; the warning is showing.
    Warned,
    /// A trial was recorded and the next one has started.
    Advanced(TrialResult),
    /// The last trial was recorded.
    Finished(TrialResult),
}

/// Runs a [`TrialPlan`] one trial after another, appending every result to
/// the store's log.
pub struct Session<S, T, R>
where
    S: ResultStore,
    T: Timer,
    R: Rng,
{
    config: ExperimentConfig,
    plan: TrialPlan,
    recorder: LogRecorder<S>,
    timer: T,
    rng: R,
    index: usize,
    current: Option<TrialController<T>>,
    last_frame: Option<T::Timestamp>,
    participant: Option<ParticipantId>,
}

impl<S, T, R> Session<S, T, R>
where
    S: ResultStore,
    T: Timer,
    R: Rng,
{
    pub fn new(
        config: ExperimentConfig,
        plan: TrialPlan,
        store: S,
        timer: T,
        rng: R,
    ) -> Result<Self, TrialError> {
        let mut session = Self {
            config,
            plan,
            recorder: LogRecorder::new(store),
            timer,
            rng,
            index: 0,
            current: None,
            last_frame: None,
            participant: None,
        };
        session.start_trial()?;
        Ok(session)
    }

    fn start_trial(&mut self) -> Result<(), TrialError> {
        self.current = match self.plan.get(self.index) {
            Some(inputs) => Some(TrialController::new(
                &self.config,
                inputs.clone(),
                self.timer.clone(),
                &mut self.rng,
            )?),
            None => None,
        };
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<SessionStep, TrialError> {
        let Some(controller) = self.current.as_mut() else {
            return Ok(SessionStep::Idle);
        };

        match controller.handle_pointer(event, &mut self.recorder)? {
            None => Ok(SessionStep::Idle),
            Some(ConfirmOutcome::Incomplete) => Ok(SessionStep::Warned),
            Some(ConfirmOutcome::Completed(result)) => {
                self.index += 1;
                self.start_trial()?;
                if self.current.is_some() {
                    Ok(SessionStep::Advanced(result))
                } else {
                    log::info!("session finished after {} trials", self.index);
                    Ok(SessionStep::Finished(result))
                }
            }
        }
    }

    /// Per-frame update. Feeds the interval since the previous tick to the
    /// timer's frame statistics and lets the current trial clear a stale
    /// warning.
    pub fn tick(&mut self) {
        if let Some(previous) = self.last_frame {
            let interval = self.timer.elapsed(previous);
            self.timer.record_frame(interval);
        }
        self.last_frame = Some(self.timer.now());
        if let Some(controller) = self.current.as_mut() {
            controller.tick();
        }
    }

    /// Frame snapshot of the running trial, `None` once the plan is done.
    pub fn scene(&self, cursor: Option<(f64, f64)>) -> Option<Scene> {
        self.current
            .as_ref()
            .map(|controller| controller.scene(cursor, Some((self.index + 1, self.plan.len()))))
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Trials recorded so far in this session.
    pub fn completed(&self) -> usize {
        self.index
    }

    pub fn recorder(&self) -> &LogRecorder<S> {
        &self.recorder
    }

    /// Tags the session with a participant and stores the identifier.
    pub fn set_participant(&mut self, participant: ParticipantId) -> Result<(), StoreError> {
        self.recorder.record_participant(&participant)?;
        log::info!("session belongs to participant {}", participant);
        self.participant = Some(participant);
        Ok(())
    }

    pub fn participant(&self) -> Option<&ParticipantId> {
        self.participant.as_ref()
    }
}
