//! End-to-end pipeline scenarios driven with synthetic ticks.

use std::time::{Duration, Instant};

use palmcontrol_lib::config::Settings;
use palmcontrol_lib::models::commands::{MouseButton, PointerCommand, ScrollDirection};
use palmcontrol_lib::models::landmarks::{HandFrame, NormalizedPoint};
use palmcontrol_lib::pipeline::GesturePipeline;

const FRAME: Duration = Duration::from_millis(20);

fn frame(pointer: (f64, f64), pinch_distance: f64) -> HandFrame {
    HandFrame {
        pointer: NormalizedPoint::new(pointer.0, pointer.1),
        pinch_distance,
        posture_active: false,
        scroll_y: 0.5,
    }
}

fn drive(
    pipeline: &mut GesturePipeline,
    settings: &Settings,
    start: Instant,
    frames: &[HandFrame],
) -> Vec<(Duration, PointerCommand)> {
    let mut timeline = Vec::new();
    for (idx, hand) in frames.iter().enumerate() {
        let offset = FRAME * idx as u32;
        let commands = pipeline
            .update(hand, start + offset, settings)
            .expect("valid frame");
        timeline.extend(commands.into_iter().map(|command| (offset, command)));
    }
    timeline
}

#[test]
fn hold_scenario_press_at_threshold_release_on_unpinch_no_click() {
    // minStableFrames=3, stableThreshold=0.015, holdThreshold=1.0s.
    let mut settings = Settings::default();
    settings.set_hold_threshold_secs(1.0);
    let mut pipeline = GesturePipeline::new(1_920.0, 1_080.0);

    // Stationary pointer for 3 frames, pinch held for 1.2 s, then released.
    let mut frames = vec![frame((0.50, 0.50), 0.2); 4];
    let pinch_frames = (1_200 / FRAME.as_millis()) as usize;
    frames.extend(vec![frame((0.50, 0.50), 0.03); pinch_frames]);
    frames.push(frame((0.50, 0.50), 0.2));

    let timeline = drive(&mut pipeline, &settings, Instant::now(), &frames);

    let press_at = timeline
        .iter()
        .find_map(|(at, command)| {
            matches!(command, PointerCommand::Press(MouseButton::Left)).then_some(*at)
        })
        .expect("press emitted");
    // Pinch begins on frame 4 (80 ms); the press lands one hold-threshold later.
    let pinch_start = FRAME * 4;
    assert!(press_at >= pinch_start + Duration::from_secs(1));
    assert!(press_at < pinch_start + Duration::from_millis(1_100));

    let releases = timeline
        .iter()
        .filter(|(_, command)| matches!(command, PointerCommand::Release(MouseButton::Left)))
        .count();
    assert_eq!(releases, 1);
    assert!(
        !timeline
            .iter()
            .any(|(_, command)| matches!(command, PointerCommand::Click(_))),
        "a held pinch must not also tap"
    );
}

#[test]
fn move_commands_respect_the_rate_limit() {
    let settings = Settings::default();
    let mut pipeline = GesturePipeline::new(1_920.0, 1_080.0);
    let start = Instant::now();

    // 100 ticks at 2 ms spacing against a 120 fps gate (~8.3 ms).
    let mut moves = 0;
    for idx in 0..100u32 {
        let now = start + Duration::from_millis(2) * idx;
        let commands = pipeline
            .update(&frame((0.50, 0.50), 0.2), now, &settings)
            .expect("valid frame");
        moves += commands
            .iter()
            .filter(|command| matches!(command, PointerCommand::Move(_)))
            .count();
    }

    // 198 ms of input at one move per 8.33 ms: at most 24 qualifying slots
    // (plus the ungated first tick).
    assert!(moves <= 25, "rate gate leaked: {moves} moves");
    assert!(moves >= 20, "rate gate too aggressive: {moves} moves");
}

#[test]
fn tap_then_flick_within_cooldown_yields_a_single_discrete_action() {
    let settings = Settings::default();
    let mut pipeline = GesturePipeline::new(1_920.0, 1_080.0);

    // Stabilize, quick tap, then immediately feed a qualifying flick.
    let mut frames = vec![frame((0.50, 0.50), 0.2); 4];
    frames.push(frame((0.50, 0.50), 0.03));
    frames.push(frame((0.50, 0.50), 0.2));
    for y in [0.50, 0.40, 0.30] {
        let mut hand = frame((0.50, 0.50), 0.2);
        hand.scroll_y = y;
        frames.push(hand);
    }

    let timeline = drive(&mut pipeline, &settings, Instant::now(), &frames);
    let discrete: Vec<&PointerCommand> = timeline
        .iter()
        .filter_map(|(_, command)| {
            (!matches!(command, PointerCommand::Move(_))).then_some(command)
        })
        .collect();

    assert_eq!(
        discrete,
        vec![&PointerCommand::Click(MouseButton::Left)],
        "the flick inside the tap's cooldown window must not fire"
    );
}

#[test]
fn flick_after_cooldown_fires_with_direction_sensitivity() {
    let mut settings = Settings::default();
    settings.set_scroll_up_sensitivity(1.5);
    let mut pipeline = GesturePipeline::new(1_920.0, 1_080.0);
    let start = Instant::now();

    // Warm up previous-y, then two qualifying upward frames well past any
    // cooldown activity.
    let mut timeline = Vec::new();
    for (idx, y) in [0.50, 0.50, 0.40, 0.30].iter().enumerate() {
        let mut hand = frame((0.50, 0.50), 0.2);
        hand.scroll_y = *y;
        let commands = pipeline
            .update(&hand, start + FRAME * idx as u32, &settings)
            .expect("valid frame");
        timeline.extend(commands);
    }

    let scroll = timeline
        .iter()
        .find_map(|command| match command {
            PointerCommand::Scroll { direction, amount } => Some((*direction, *amount)),
            _ => None,
        })
        .expect("scroll fired");
    assert_eq!(scroll, (ScrollDirection::Up, 75));
}

#[test]
fn every_press_is_paired_before_the_next_press() {
    let mut settings = Settings::default();
    settings.set_hold_threshold_secs(0.2);
    let mut pipeline = GesturePipeline::new(1_920.0, 1_080.0);

    // Two hold cycles back to back, with jitter-free pauses between them.
    let mut frames = Vec::new();
    for _ in 0..2 {
        frames.extend(vec![frame((0.50, 0.50), 0.2); 30]);
        frames.extend(vec![frame((0.50, 0.50), 0.03); 15]);
    }
    frames.push(frame((0.50, 0.50), 0.2));

    let timeline = drive(&mut pipeline, &settings, Instant::now(), &frames);
    let mut outstanding = 0i32;
    for (_, command) in &timeline {
        match command {
            PointerCommand::Press(_) => {
                outstanding += 1;
                assert_eq!(outstanding, 1, "second press before release");
            }
            PointerCommand::Release(_) => {
                outstanding -= 1;
                assert_eq!(outstanding, 0, "release without press");
            }
            _ => {}
        }
    }
    assert_eq!(outstanding, 0, "session left a press outstanding");
}
