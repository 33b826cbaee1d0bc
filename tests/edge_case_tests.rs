//! Edge case tests for frame validation, progress and the session latch


use head_pose_liveness::{
    completion_gate::{CompletionGate, LatchState, SessionLatch},
    config::LivenessConfig,
    movement_tracker::{MotionState, MovementFlags, MovementTracker},
    observation::{BoundingBox, DetectedFace, DetectionFrame, FilterOutcome, PoseObservationFilter, RejectReason},
    progress::ProgressCalculator,
    session::LivenessSession,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use test_helpers::*;

#[test]
fn test_frame_size_frozen_from_first_frame() {
    let mut filter = PoseObservationFilter::new(0.1);
    assert_eq!(filter.frame_size(), None);

    filter.classify(&empty_frame(0));
    assert_eq!(filter.frame_size(), Some((FRAME_WIDTH, FRAME_HEIGHT)));

    // A later frame claiming a bigger sensor does not shrink the ratio
    let frame = DetectionFrame::Faces {
        faces: vec![DetectedFace {
            yaw_degrees: 0.0,
            pitch_degrees: None,
            bbox: BoundingBox::new(0.0, 0.0, 50.0, 50.0),
        }],
        frame_width: 1000,
        frame_height: 1000,
        timestamp_millis: 33,
    };
    match filter.classify(&frame) {
        FilterOutcome::Accepted(observation) => assert!((observation.face_area_ratio - 0.25).abs() < 1e-9),
        other => panic!("Expected accepted observation, got {:?}", other),
    }
    assert_eq!(filter.frame_size(), Some((FRAME_WIDTH, FRAME_HEIGHT)));
}

#[test]
fn test_zero_sized_frame_rejects_as_too_small() {
    let mut filter = PoseObservationFilter::new(0.1);
    let frame = DetectionFrame::Faces {
        faces: vec![DetectedFace {
            yaw_degrees: 0.0,
            pitch_degrees: None,
            bbox: BoundingBox::new(0.0, 0.0, 50.0, 50.0),
        }],
        frame_width: 0,
        frame_height: 0,
        timestamp_millis: 0,
    };

    assert_eq!(filter.classify(&frame), FilterOutcome::Rejected(RejectReason::TooSmall));
    assert_eq!(filter.frame_size(), None);
}

#[test]
fn test_first_face_is_used() {
    let mut filter = PoseObservationFilter::new(0.1);
    let frame = DetectionFrame::Faces {
        faces: vec![
            DetectedFace {
                yaw_degrees: -25.0,
                pitch_degrees: None,
                bbox: BoundingBox::new(0.0, 0.0, 40.0, 40.0),
            },
            DetectedFace {
                yaw_degrees: 25.0,
                pitch_degrees: None,
                bbox: BoundingBox::new(0.0, 0.0, 90.0, 90.0),
            },
        ],
        frame_width: FRAME_WIDTH,
        frame_height: FRAME_HEIGHT,
        timestamp_millis: 0,
    };

    match filter.classify(&frame) {
        FilterOutcome::Accepted(observation) => assert_eq!(observation.yaw_degrees, -25.0),
        other => panic!("Expected accepted observation, got {:?}", other),
    }
}

#[test]
fn test_non_finite_angles() {
    let mut filter = PoseObservationFilter::new(0.1);

    assert_eq!(
        filter.classify(&face_frame(f64::NAN, None, 50.0, 0)),
        FilterOutcome::Rejected(RejectReason::DetectorError)
    );
    assert_eq!(
        filter.classify(&face_frame(f64::INFINITY, None, 50.0, 0)),
        FilterOutcome::Rejected(RejectReason::DetectorError)
    );

    match filter.classify(&face_frame(5.0, Some(f64::NAN), 50.0, 0)) {
        FilterOutcome::Accepted(observation) => assert_eq!(observation.pitch_degrees, None),
        other => panic!("Expected accepted observation, got {:?}", other),
    }
}

#[test]
fn test_degenerate_bounding_box() {
    let mut filter = PoseObservationFilter::new(0.0);
    let frame = DetectionFrame::Faces {
        faces: vec![DetectedFace {
            yaw_degrees: 0.0,
            pitch_degrees: None,
            bbox: BoundingBox::new(0.0, 0.0, -50.0, f64::INFINITY),
        }],
        frame_width: FRAME_WIDTH,
        frame_height: FRAME_HEIGHT,
        timestamp_millis: 0,
    };

    // Zero area still passes a zero minimum
    match filter.classify(&frame) {
        FilterOutcome::Accepted(observation) => assert_eq!(observation.face_area_ratio, 0.0),
        other => panic!("Expected accepted observation, got {:?}", other),
    }
}

#[test]
fn test_too_small_keeps_state() {
    let mut session = LivenessSession::new(&scenario_config(), 0).unwrap();
    session.process(&yaw_frame(-20.0, 0));
    let before = session.state().clone();

    let report = session.process(&face_frame(60.0, None, 10.0, 10));
    assert_eq!(report.rejected, Some(RejectReason::TooSmall));

    let after = session.state();
    assert_eq!(after.motion, before.motion);
    assert_eq!(after.misses, before.misses);
}

#[test]
fn test_movement_inside_deadzone_sets_no_flags() {
    let tracker = MovementTracker::new(10.0, true);
    let mut session = LivenessSession::new(&scenario_config(), 0).unwrap();
    session.process(&yaw_frame(10.0, 0));
    session.process(&yaw_frame(-10.0, 1));

    assert_eq!(session.state().motion.flags, MovementFlags::default());
    assert_eq!(session.state().motion.yaw_span(), 20.0);

    let mut motion = MotionState::default();
    let mut filter = PoseObservationFilter::new(0.1);
    if let FilterOutcome::Accepted(observation) = filter.classify(&pose_frame(0.0, 10.0, 0)) {
        tracker.update(&mut motion, &observation);
    }
    assert!(!motion.flags.up);
    assert_eq!(motion.pitch_span(), 10.0);
}

#[test]
fn test_gate_requires_full_progress() {
    let gate = CompletionGate::new(0, true);
    let both = MovementFlags {
        left: true,
        right: true,
        ..MovementFlags::default()
    };

    assert!(!gate.conditions_met(99, 10_000, &both));
    assert!(gate.conditions_met(100, 0, &both));
    assert!(!gate.conditions_met(100, 0, &MovementFlags::default()));
    assert!(CompletionGate::new(0, false).conditions_met(100, 0, &MovementFlags::default()));
}

#[test]
fn test_gate_ignores_pitch_flags() {
    let gate = CompletionGate::new(0, true);
    let pitch_only = MovementFlags {
        up: true,
        down: true,
        ..MovementFlags::default()
    };
    assert!(!gate.conditions_met(100, 0, &pitch_only));
}

#[test]
fn test_concurrent_gate_single_winner() {
    let latch = SessionLatch::new();
    let gate = Arc::new(CompletionGate::new(0, false));
    let flags = MovementFlags::default();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let latch = latch.clone();
            let gate = gate.clone();
            thread::spawn(move || (0..100).filter(|_| gate.try_complete(&latch, 100, 0, &flags)).count())
        })
        .collect();

    let wins: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();
    assert_eq!(wins, 1);
    assert_eq!(latch.state(), LatchState::ReadyPendingDelay);
}

#[test]
fn test_latch_rejects_backward_and_skipping_moves() {
    let latch = SessionLatch::new();
    assert!(!latch.advance(LatchState::Tracking, LatchState::Completed));
    assert!(!latch.advance(LatchState::Tracking, LatchState::CaptureInProgress));
    assert!(latch.advance(LatchState::Tracking, LatchState::ReadyPendingDelay));
    assert!(!latch.advance(LatchState::Tracking, LatchState::TimedOut));
    assert!(!latch.advance(LatchState::ReadyPendingDelay, LatchState::Tracking));
    assert!(latch.advance(LatchState::ReadyPendingDelay, LatchState::CaptureInProgress));
    assert!(latch.advance(LatchState::CaptureInProgress, LatchState::Completed));
    assert!(latch.state().is_terminal());
}

#[test]
fn test_invalid_target_span_rejected() {
    for target_span_degrees in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        let config = LivenessConfig {
            target_span_degrees,
            ..scenario_config()
        };
        assert!(LivenessSession::new(&config, 0).is_err(), "accepted {}", target_span_degrees);
    }
}

#[test]
fn test_timestamps_before_start() {
    let config = LivenessConfig {
        min_completion_time_millis: 100,
        ..scenario_config()
    };
    let mut session = LivenessSession::new(&config, 5000).unwrap();
    session.process(&yaw_frame(-30.0, 4000));
    // Elapsed saturates at zero, so the minimum time is not met
    assert!(!session.process(&yaw_frame(30.0, 4500)).completed);
    assert!(session.process(&yaw_frame(30.0, 5100)).completed);
}

fn motion_from(yaws: &[f64], pitches: &[f64], tracker: &MovementTracker) -> MotionState {
    let mut filter = PoseObservationFilter::new(0.0);
    let mut motion = MotionState::default();
    for (i, yaw) in yaws.iter().enumerate() {
        let pitch = pitches.get(i).copied();
        if let FilterOutcome::Accepted(observation) = filter.classify(&face_frame(*yaw, pitch, 50.0, i as u64)) {
            tracker.update(&mut motion, &observation);
        }
    }
    motion
}

proptest! {
    #[test]
    fn prop_percent_matches_formula(
        yaws in prop::collection::vec(-90.0f64..90.0, 1..40),
        pitches in prop::collection::vec(-45.0f64..45.0, 0..40),
        target in 1.0f64..180.0,
        pitch_enabled in any::<bool>(),
    ) {
        let tracker = MovementTracker::new(10.0, pitch_enabled);
        let calculator = ProgressCalculator::new(target, pitch_enabled);
        let motion = motion_from(&yaws, &pitches, &tracker);

        let yaw_span = yaws.iter().fold(0.0f64, |acc, &y| acc.max(y)) - yaws.iter().fold(0.0f64, |acc, &y| acc.min(y));
        let pitch_span = if pitch_enabled {
            let used = &pitches[..pitches.len().min(yaws.len())];
            used.iter().fold(0.0f64, |acc, &p| acc.max(p)) - used.iter().fold(0.0f64, |acc, &p| acc.min(p))
        } else {
            0.0
        };
        let expected = ((yaw_span + pitch_span) / target).min(1.0) * 100.0;

        let percent = calculator.percent(&motion);
        prop_assert_eq!(percent, expected.floor() as u8);
        // Idempotent on unchanged state
        prop_assert_eq!(calculator.percent(&motion), percent);
    }

    #[test]
    fn prop_percent_monotonic(
        yaws in prop::collection::vec(-90.0f64..90.0, 1..60),
        target in 1.0f64..180.0,
    ) {
        let tracker = MovementTracker::new(10.0, false);
        let calculator = ProgressCalculator::new(target, false);
        let mut filter = PoseObservationFilter::new(0.0);
        let mut motion = MotionState::default();
        let mut last = 0u8;

        for (i, yaw) in yaws.iter().enumerate() {
            if let FilterOutcome::Accepted(observation) = filter.classify(&yaw_frame(*yaw, i as u64)) {
                tracker.update(&mut motion, &observation);
            }
            let percent = calculator.percent(&motion);
            prop_assert!(percent >= last);
            prop_assert!(percent <= 100);
            last = percent;
        }
    }

    #[test]
    fn prop_completion_at_most_once(
        yaws in prop::collection::vec(-60.0f64..60.0, 1..80),
    ) {
        let mut session = LivenessSession::new(&scenario_config(), 0).unwrap();
        let completions = yaws
            .iter()
            .enumerate()
            .filter(|(i, yaw)| session.process(&yaw_frame(**yaw, *i as u64 * 10)).completed)
            .count();
        prop_assert!(completions <= 1);
    }
}
