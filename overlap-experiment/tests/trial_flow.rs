use overlap_core::{TrialInputs, TrialLog};
use overlap_experiment::{
    ALL_TRIAL_DATA, ConfirmOutcome, ExperimentConfig, LogRecorder, MemoryStore, PointerEvent,
    ResultStore, TrialController,
};
use overlap_timing::ManualTimer;
use std::time::Duration;

const CONFIRM: PointerEvent = PointerEvent::Down { x: 1110.0, y: 745.0 };

fn size_x(value: f64) -> f64 {
    // default size track: x 300..900, log10 range 1..3
    300.0 + 300.0 * (value.log10() - 1.0)
}

fn drive(controller: &mut TrialController<ManualTimer>, recorder: &mut LogRecorder<MemoryStore>) {
    let events = [
        PointerEvent::Down { x: 600.0, y: 565.0 },
        PointerEvent::Move {
            x: size_x(400.0),
            y: 570.0,
        },
        PointerEvent::Up,
        PointerEvent::Down { x: 300.0, y: 665.0 },
        PointerEvent::Move { x: 450.0, y: 700.0 },
        PointerEvent::Up,
    ];
    for event in events {
        assert_eq!(controller.handle_pointer(event, recorder).unwrap(), None);
    }
}

#[test]
fn confirmed_trial_is_appended_to_existing_log() {
    let config = ExperimentConfig::default();
    let timer = ManualTimer::new();

    let mut store = MemoryStore::new();
    let earlier = r#"[{"trial":2,"size_percent":50.0,"overlap_percent":10.0,"response_time":1.5,"order_indicator":1,"label_left":"dog","label_right":"cat","label_1":"cat","label_2":"dog","type":"animal"}]"#;
    store.set(ALL_TRIAL_DATA, earlier.to_string()).unwrap();
    let mut recorder = LogRecorder::new(store);

    let mut controller = TrialController::with_assignment(
        &config,
        TrialInputs::new(3, "apple", "banana", "fruit"),
        false,
        timer.clone(),
    )
    .unwrap();

    // premature confirm only warns
    assert_eq!(
        controller.handle_pointer(CONFIRM, &mut recorder).unwrap(),
        Some(ConfirmOutcome::Incomplete)
    );
    assert!(controller.scene(None, None).warning.is_some());

    drive(&mut controller, &mut recorder);
    controller.tick();
    let scene = controller.scene(None, None);
    assert!(scene.warning.is_none());
    assert!(scene.confirm.enabled);
    assert!((scene.circles.right.radius - 100.0).abs() < 1e-6);
    assert!((scene.circles.separation() - 125.0).abs() < 1e-6);

    timer.advance(Duration::from_millis(2_500));
    let step = controller.handle_pointer(CONFIRM, &mut recorder).unwrap();
    assert!(matches!(step, Some(ConfirmOutcome::Completed(_))));
    assert_eq!(recorder.warnings(), 1);

    let stored = recorder.store().get(ALL_TRIAL_DATA).unwrap().unwrap();
    let log = TrialLog::parse(&stored).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.results()[0].trial(), 2);

    let expected = r#"{"trial":3,"size_percent":400.0,"overlap_percent":25.0,"response_time":2.5,"order_indicator":0,"label_left":"apple","label_right":"banana","label_1":"apple","label_2":"banana","type":"fruit"}"#;
    assert!(stored.ends_with(&format!("{expected}]")), "{stored}");
    assert_eq!(log.last_result().as_ref(), recorder.last_completed());
}

#[test]
fn corrupt_log_is_replaced_by_new_record() {
    let mut store = MemoryStore::new();
    store.set(ALL_TRIAL_DATA, "not a log".to_string()).unwrap();
    let mut recorder = LogRecorder::new(store);

    let mut controller = TrialController::with_assignment(
        &ExperimentConfig::default(),
        TrialInputs::new(1, "apple", "banana", "fruit"),
        true,
        ManualTimer::new(),
    )
    .unwrap();
    drive(&mut controller, &mut recorder);
    controller.handle_pointer(CONFIRM, &mut recorder).unwrap();

    let log = recorder.load_log().unwrap();
    assert_eq!(log.len(), 1);
    let results = log.results();
    let record = &results[0];
    assert_eq!(record.order_indicator(), 1);
    assert_eq!(record.label_left(), "banana");
    assert_eq!(record.size_percent(), 400.0);
    assert_eq!(record.overlap_percent(), 25.0);
    assert_eq!(record.response_time(), 0.0);
}
