use crate::config::{ButtonConfig, ExperimentConfig, LayoutConfig};
use crate::outcome::TrialOutcome;
use overlap_core::{
    ButtonView, CirclePair, Control, ControlError, LabelAssignment, Scene, SliderView, TextBlock,
    TrialInputs, TrialResult, wrap_words,
};
use overlap_timing::Timer;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrialError {
    #[error("trial index must be at least 1")]
    InvalidTrialIndex,
    #[error("invalid control: {0}")]
    Control(#[from] ControlError),
    #[error("trial {0} has already been confirmed")]
    AlreadyCompleted(u32),
    #[error(transparent)]
    Outcome(#[from] anyhow::Error),
}

/// Result of a confirm attempt that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// At least one slider was never touched; the warning is now showing.
    Incomplete,
    Completed(TrialResult),
}

/// One trial: two sliders, the label placement, the completion gate and the
/// confirm action.
pub struct TrialController<T: Timer> {
    inputs: TrialInputs,
    labels: LabelAssignment,
    size: Control,
    overlap: Control,
    layout: LayoutConfig,
    confirm_button: ButtonConfig,
    warning_text: String,
    warning: bool,
    completed: bool,
    timer: T,
    started: T::Timestamp,
}

impl<T: Timer> TrialController<T> {
    /// Starts a trial with a freshly drawn, uniformly random label order.
    pub fn new<R: Rng>(
        config: &ExperimentConfig,
        inputs: TrialInputs,
        timer: T,
        rng: &mut R,
    ) -> Result<Self, TrialError> {
        let swapped = rng.random_bool(0.5);
        Self::with_assignment(config, inputs, swapped, timer)
    }

    /// Starts a trial with a predetermined label order.
    pub fn with_assignment(
        config: &ExperimentConfig,
        inputs: TrialInputs,
        swapped: bool,
        timer: T,
    ) -> Result<Self, TrialError> {
        if inputs.trial == 0 {
            return Err(TrialError::InvalidTrialIndex);
        }
        let size = Control::new(config.size.clone())?;
        let overlap = Control::new(config.overlap.clone())?;
        let labels = LabelAssignment::new(inputs.label_1.clone(), inputs.label_2.clone(), swapped);
        let started = timer.now();

        log::info!(
            "trial {} started: left '{}', right '{}' ({})",
            inputs.trial,
            labels.left(),
            labels.right(),
            if swapped { "swapped" } else { "in order" },
        );

        Ok(Self {
            inputs,
            labels,
            size,
            overlap,
            layout: config.layout.clone(),
            confirm_button: config.confirm.clone(),
            warning_text: config.warning_text.clone(),
            warning: false,
            completed: false,
            timer,
            started,
        })
    }

    pub fn inputs(&self) -> &TrialInputs {
        &self.inputs
    }

    pub fn labels(&self) -> &LabelAssignment {
        &self.labels
    }

    pub fn size(&self) -> &Control {
        &self.size
    }

    pub fn overlap(&self) -> &Control {
        &self.overlap
    }

    pub(crate) fn controls_mut(&mut self) -> (&mut Control, &mut Control) {
        (&mut self.size, &mut self.overlap)
    }

    pub(crate) fn confirm_button(&self) -> &ButtonConfig {
        &self.confirm_button
    }

    /// Both sliders have been interacted with at least once.
    pub fn is_ready(&self) -> bool {
        self.size.touched() && self.overlap.touched()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn warning_visible(&self) -> bool {
        self.warning && !self.is_ready()
    }

    /// Per-frame housekeeping: drops the incomplete warning once it no
    /// longer applies.
    pub fn tick(&mut self) {
        if self.warning && self.is_ready() {
            log::debug!("trial {}: warning cleared", self.inputs.trial);
            self.warning = false;
        }
    }

    pub fn geometry(&self) -> CirclePair {
        CirclePair::layout(
            self.layout.circle_anchor.as_tuple(),
            self.layout.base_radius,
            self.size.value(),
            self.overlap.value(),
        )
    }

    /// A confirm attempt. Before both sliders are touched this only raises
    /// the warning. Afterwards it records the trial, hands it to `outcome`
    /// and disables the controller; further attempts are errors.
    pub fn confirm<O: TrialOutcome + ?Sized>(
        &mut self,
        outcome: &mut O,
    ) -> Result<ConfirmOutcome, TrialError> {
        if self.completed {
            return Err(TrialError::AlreadyCompleted(self.inputs.trial));
        }
        if !self.is_ready() {
            self.warning = true;
            outcome.warn_incomplete();
            return Ok(ConfirmOutcome::Incomplete);
        }

        self.warning = false;
        self.completed = true;
        self.size.pointer_up();
        self.overlap.pointer_up();

        let result = TrialResult::new(
            self.inputs.trial,
            &self.labels,
            &self.inputs.kind,
            self.size.value(),
            self.overlap.value(),
            self.timer.elapsed(self.started),
        );
        outcome.complete(result.clone())?;
        Ok(ConfirmOutcome::Completed(result))
    }

    /// Snapshot for the presentation loop. `cursor` only drives the button
    /// hover highlight; `progress` is (current, total), 1-based.
    pub fn scene(&self, cursor: Option<(f64, f64)>, progress: Option<(usize, usize)>) -> Scene {
        let layout = &self.layout;
        let label_block = |text: &str, anchor: (f64, f64)| TextBlock {
            lines: wrap_words(text, layout.words_per_line),
            anchor,
            line_height: layout.label_line_height,
        };
        let button = &self.confirm_button;

        Scene {
            circles: self.geometry(),
            left_label: label_block(self.labels.left(), layout.left_label.as_tuple()),
            right_label: label_block(self.labels.right(), layout.right_label.as_tuple()),
            sliders: vec![SliderView::of(&self.size), SliderView::of(&self.overlap)],
            confirm: ButtonView {
                x: button.x,
                y: button.y,
                width: button.width,
                height: button.height,
                label: button.label.clone(),
                enabled: self.is_ready() && !self.completed,
                hovered: cursor.is_some_and(|(x, y)| button.contains(x, y)),
            },
            warning: self.warning_visible().then(|| {
                TextBlock::single(self.warning_text.clone(), layout.warning_anchor.as_tuple())
            }),
            title: (!layout.title.is_empty())
                .then(|| TextBlock::single(layout.title.clone(), layout.title_anchor.as_tuple())),
            progress: progress.filter(|_| layout.show_progress).map(|(current, total)| {
                TextBlock::single(
                    format!("Trial {} of {}", current, total),
                    layout.progress_anchor.as_tuple(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::RecordingOutcome;
    use overlap_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn controller(swapped: bool) -> (TrialController<ManualTimer>, ManualTimer) {
        let timer = ManualTimer::new();
        let inputs = TrialInputs::new(3, "apple", "banana", "fruit");
        let controller = TrialController::with_assignment(
            &ExperimentConfig::default(),
            inputs,
            swapped,
            timer.clone(),
        )
        .unwrap();
        (controller, timer)
    }

    fn touch_both(controller: &mut TrialController<ManualTimer>) {
        let (size, overlap) = controller.controls_mut();
        assert!(size.pointer_down(600.0, 565.0));
        size.pointer_up();
        assert!(overlap.pointer_down(300.0, 665.0));
        overlap.pointer_up();
    }

    #[test]
    fn test_not_ready_until_both_touched() {
        let (mut controller, _) = controller(false);
        assert!(!controller.is_ready());
        let (size, _) = controller.controls_mut();
        size.pointer_down(600.0, 565.0);
        assert!(!controller.is_ready());
        let (_, overlap) = controller.controls_mut();
        overlap.pointer_down(450.0, 665.0);
        assert!(controller.is_ready());
        let (size, overlap) = controller.controls_mut();
        size.pointer_up();
        overlap.pointer_move(800.0);
        overlap.pointer_up();
        assert!(controller.is_ready());
    }

    #[test]
    fn test_confirm_with_one_slider_only_warns() {
        let (mut controller, _) = controller(false);
        let mut outcome = RecordingOutcome::default();
        let (size, _) = controller.controls_mut();
        size.pointer_down(600.0, 565.0);

        let first = controller.confirm(&mut outcome).unwrap();
        assert_eq!(first, ConfirmOutcome::Incomplete);
        assert!(controller.warning_visible());
        assert!(!controller.is_complete());
        assert_eq!(outcome.warnings, 1);
        assert!(outcome.completed.is_empty());

        controller.tick();
        assert!(controller.warning_visible());
    }

    #[test]
    fn test_warning_clears_once_ready() {
        let (mut controller, _) = controller(false);
        let mut outcome = RecordingOutcome::default();
        controller.confirm(&mut outcome).unwrap();
        assert!(controller.warning_visible());

        touch_both(&mut controller);
        assert!(!controller.warning_visible());
        controller.tick();
        assert!(!controller.warning_visible());
        assert!(controller.scene(None, None).warning.is_none());
    }

    #[test]
    fn test_confirm_produces_exactly_one_result() {
        let (mut controller, timer) = controller(false);
        let mut outcome = RecordingOutcome::default();
        controller.confirm(&mut outcome).unwrap();
        touch_both(&mut controller);
        timer.advance(Duration::from_millis(4_250));

        let confirmed = controller.confirm(&mut outcome).unwrap();
        let ConfirmOutcome::Completed(result) = confirmed else {
            panic!("expected a completed trial");
        };
        assert_eq!(result.trial(), 3);
        assert_eq!(result.response_time(), 4.25);
        assert_eq!(outcome.completed, vec![result]);
        assert!(!controller.warning_visible());
        assert!(controller.is_complete());

        assert!(matches!(
            controller.confirm(&mut outcome),
            Err(TrialError::AlreadyCompleted(3))
        ));
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.warnings, 1);
    }

    #[test]
    fn test_swapped_labels_in_scene_and_record() {
        let (mut controller, _) = controller(true);
        let scene = controller.scene(None, None);
        assert_eq!(scene.left_label.lines, vec!["banana"]);
        assert_eq!(scene.right_label.lines, vec!["apple"]);

        touch_both(&mut controller);
        let mut outcome = RecordingOutcome::default();
        controller.confirm(&mut outcome).unwrap();
        let result = &outcome.completed[0];
        assert_eq!(result.order_indicator(), 1);
        assert_eq!(result.label_left(), "banana");
        assert_eq!(result.label_right(), "apple");
        assert_eq!(result.label_1(), "apple");
        assert_eq!(result.label_2(), "banana");
    }

    #[test]
    fn test_random_assignment_is_reproducible() {
        let config = ExperimentConfig::default();
        let inputs = TrialInputs::new(1, "a", "b", "t");
        let draws: Vec<bool> = (0..2)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(42);
                TrialController::new(&config, inputs.clone(), ManualTimer::new(), &mut rng)
                    .unwrap()
                    .labels()
                    .swapped()
            })
            .collect();
        assert_eq!(draws[0], draws[1]);
    }

    #[test]
    fn test_random_assignment_draws_both_orders() {
        let config = ExperimentConfig::default();
        let inputs = TrialInputs::new(1, "first", "second", "t");
        let mut swapped = 0;
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let controller =
                TrialController::new(&config, inputs.clone(), ManualTimer::new(), &mut rng)
                    .unwrap();
            let labels = controller.labels();
            if labels.swapped() {
                swapped += 1;
                assert_eq!((labels.left(), labels.right()), ("second", "first"));
            } else {
                assert_eq!((labels.left(), labels.right()), ("first", "second"));
            }
        }
        assert!(swapped > 0 && swapped < 64, "{swapped} of 64 draws swapped");
    }

    #[test]
    fn test_rejects_trial_zero_and_bad_controls() {
        let config = ExperimentConfig::default();
        let inputs = TrialInputs::new(0, "a", "b", "t");
        assert!(matches!(
            TrialController::with_assignment(&config, inputs, false, ManualTimer::new()),
            Err(TrialError::InvalidTrialIndex)
        ));

        let mut config = ExperimentConfig::default();
        config.size.min = -1.0;
        let inputs = TrialInputs::new(1, "a", "b", "t");
        assert!(matches!(
            TrialController::with_assignment(&config, inputs, false, ManualTimer::new()),
            Err(TrialError::Control(ControlError::NonPositiveLogMinimum(_)))
        ));
    }

    #[test]
    fn test_scene_reflects_state() {
        let (mut controller, _) = controller(false);
        let scene = controller.scene(Some((1100.0, 740.0)), Some((2, 5)));
        assert!(!scene.confirm.enabled);
        assert!(scene.confirm.hovered);
        assert_eq!(scene.sliders.len(), 2);
        assert_eq!(
            scene.progress.map(|p| p.lines),
            Some(vec!["Trial 2 of 5".to_string()])
        );
        assert_eq!(scene.circles.left.x, 550.0);
        assert_eq!(scene.circles.right.x, 650.0);
        let title = scene.title.unwrap();
        assert_eq!(title.lines, vec!["Circle Overlap Experiment"]);
        assert_eq!(title.anchor, (600.0, 40.0));

        touch_both(&mut controller);
        let scene = controller.scene(Some((10.0, 10.0)), None);
        assert!(scene.confirm.enabled);
        assert!(!scene.confirm.hovered);
        assert!(scene.progress.is_none());

        let mut config = ExperimentConfig::default();
        config.layout.title.clear();
        let inputs = TrialInputs::new(1, "a", "b", "t");
        let untitled =
            TrialController::with_assignment(&config, inputs, false, ManualTimer::new()).unwrap();
        assert!(untitled.scene(None, None).title.is_none());
    }

    #[test]
    fn test_long_labels_wrap() {
        let timer = ManualTimer::new();
        let inputs = TrialInputs::new(1, "one two three four five six", "x", "t");
        let controller =
            TrialController::with_assignment(&ExperimentConfig::default(), inputs, false, timer)
                .unwrap();
        let scene = controller.scene(None, None);
        assert_eq!(
            scene.left_label.lines,
            vec!["one two three four five", "six"]
        );
        assert_eq!(scene.left_label.line_height, 28.0);
    }
}
