use gesture_vision::{
    Action, ActionSink, Command, GestureConfig, GestureError, SessionController, SessionMode, Signal,
    StepOutcome,
};
use gesture_vision::{FrameSource, SignalSource};
use image::{Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const BACKGROUND: Rgb<u8> = Rgb([20, 160, 20]);
const BLUE: Rgb<u8> = Rgb([10, 10, 230]);
const RED: Rgb<u8> = Rgb([230, 10, 10]);

struct ScriptedFrames {
    frames: VecDeque<RgbImage>,
    releases: Rc<Cell<u32>>,
}

impl FrameSource for ScriptedFrames {
    fn read_frame(&mut self) -> Option<RgbImage> {
        self.frames.pop_front()
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

struct ScriptedSignals(VecDeque<Option<Signal>>);

impl SignalSource for ScriptedSignals {
    fn poll_signal(&mut self) -> Option<Signal> {
        self.0.pop_front().flatten()
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<Command>>>);

impl ActionSink for RecordingSink {
    fn execute(&mut self, command: Command) {
        self.0.borrow_mut().push(command);
    }
}

type TestSession = SessionController<ScriptedFrames, ScriptedSignals, RecordingSink>;

fn background() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND)
}

fn solid(color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, color)
}

/// A 60x60 square of `color` centered on (`center_x`, `center_y`) in camera coordinates.
fn square(color: Rgb<u8>, center_x: u32, center_y: u32) -> RgbImage {
    let mut frame = background();
    for y in center_y - 30..center_y + 30 {
        for x in center_x - 30..center_x + 30 {
            frame.put_pixel(x, y, color);
        }
    }
    frame
}

fn session_with(
    config: &GestureConfig,
    frames: Vec<RgbImage>,
    signals: Vec<Option<Signal>>,
) -> (TestSession, Rc<Cell<u32>>, Rc<RefCell<Vec<Command>>>) {
    let releases = Rc::new(Cell::new(0));
    let sink = RecordingSink::default();
    let sent = sink.0.clone();
    let session = SessionController::new(
        config,
        ScriptedFrames {
            frames: frames.into(),
            releases: releases.clone(),
        },
        ScriptedSignals(signals.into()),
        sink,
    );
    (session, releases, sent)
}

fn session(
    frames: Vec<RgbImage>,
    signals: Vec<Option<Signal>>,
) -> (TestSession, Rc<Cell<u32>>, Rc<RefCell<Vec<Command>>>) {
    session_with(&GestureConfig::default(), frames, signals)
}

fn action_of(outcome: StepOutcome) -> Action {
    match outcome {
        StepOutcome::Continue(report) => report.analysis.map(|a| a.action).unwrap_or(Action::None),
        StepOutcome::Terminated => panic!("session terminated unexpectedly"),
    }
}

#[test]
fn test_calibrate_track_and_dispatch() {
    let frames = vec![
        solid(BLUE),
        square(BLUE, 320, 80),
        square(BLUE, 320, 80),
        square(BLUE, 320, 400),
        background(),
        background(),
    ];
    let signals = vec![Some(Signal::Sample), None, None, None, None, Some(Signal::Quit)];
    let (mut session, releases, sent) = session(frames, signals);
    let start = Instant::now();

    // Frame 1: calibrate on the blue object filling the sampling square
    let StepOutcome::Continue(report) = session.step(start).unwrap() else {
        panic!("session should keep running");
    };
    assert_eq!(report.mode, SessionMode::Calibrating);
    let sample = report.calibration.expect("sample signal should calibrate");
    assert_eq!(sample.mean_hue, 120.0);
    assert_eq!(session.mode(), SessionMode::Tracking);

    // Frame 2: object high in the frame
    assert_eq!(action_of(session.step(start).unwrap()), Action::Jump);
    assert_eq!(*sent.borrow(), vec![Command::Jump]);

    // Frame 3: still high, 300ms later, inside the cooldown
    assert_eq!(action_of(session.step(start + Duration::from_millis(300)).unwrap()), Action::Jump);
    assert_eq!(sent.borrow().len(), 1);

    // Frame 4: object low, past the cooldown
    assert_eq!(action_of(session.step(start + Duration::from_millis(900)).unwrap()), Action::Duck);
    assert_eq!(*sent.borrow(), vec![Command::Jump, Command::Duck]);

    // Frame 5: nothing in view, much later
    assert_eq!(action_of(session.step(start + Duration::from_secs(5)).unwrap()), Action::None);
    assert_eq!(sent.borrow().len(), 2);

    // Frame 6: quit
    assert!(matches!(session.step(start + Duration::from_secs(6)), Ok(StepOutcome::Terminated)));
    assert_eq!(releases.get(), 1);

    drop(session);
    assert_eq!(releases.get(), 1); // released exactly once
}

#[test]
fn test_frames_are_mirrored_before_classification() {
    let frames = || vec![solid(BLUE), square(BLUE, 100, 240)];
    let signals = || vec![Some(Signal::Sample), None];
    let start = Instant::now();

    // An object on the camera's left is on the player's right.
    let (mut mirrored, _, sent) = session(frames(), signals());
    mirrored.step(start).unwrap();
    assert_eq!(action_of(mirrored.step(start).unwrap()), Action::Right);
    assert_eq!(*sent.borrow(), vec![Command::Right]);

    let mut config = GestureConfig::default();
    config.capture.mirror = false;
    let (mut raw, _, sent) = session_with(&config, frames(), signals());
    raw.step(start).unwrap();
    assert_eq!(action_of(raw.step(start).unwrap()), Action::Left);
    assert_eq!(*sent.borrow(), vec![Command::Left]);
}

#[test]
fn test_skip_tracks_with_the_default_red_range() {
    let frames = vec![background(), square(RED, 320, 80), square(BLUE, 320, 80)];
    let signals = vec![Some(Signal::Skip), None, None];
    let (mut session, _, sent) = session(frames, signals);
    let start = Instant::now();

    session.step(start).unwrap();
    assert_eq!(session.mode(), SessionMode::Tracking);

    assert_eq!(action_of(session.step(start).unwrap()), Action::Jump);
    // Blue is outside the default range.
    assert_eq!(action_of(session.step(start + Duration::from_secs(2)).unwrap()), Action::None);
    assert_eq!(*sent.borrow(), vec![Command::Jump]);
}

#[test]
fn test_recalibrate_stops_tracking() {
    let frames = vec![solid(BLUE), background(), square(BLUE, 320, 80), solid(RED), square(RED, 320, 400)];
    let signals = vec![
        Some(Signal::Sample),
        Some(Signal::Recalibrate),
        None,
        Some(Signal::Sample),
        None,
    ];
    let (mut session, _, sent) = session(frames, signals);
    let start = Instant::now();

    session.step(start).unwrap();
    session.step(start).unwrap();
    assert_eq!(session.mode(), SessionMode::Calibrating);

    // A jump pose while calibrating is not tracked.
    let StepOutcome::Continue(report) = session.step(start).unwrap() else {
        panic!("session should keep running");
    };
    assert!(report.analysis.is_none());
    assert!(report.sample_region.is_some());
    assert!(sent.borrow().is_empty());

    // Recalibrate on red, then track red.
    session.step(start).unwrap();
    assert_eq!(session.color_model().lower().hue, 0);
    assert_eq!(action_of(session.step(start).unwrap()), Action::Duck);
    assert_eq!(*sent.borrow(), vec![Command::Duck]);
}

#[test]
fn test_frame_failure_ends_the_session() {
    let (mut session, releases, _) = session(vec![background()], vec![None]);
    let start = Instant::now();

    assert!(session.step(start).is_ok());
    assert!(matches!(session.step(start), Err(GestureError::FrameUnavailable)));
    assert_eq!(releases.get(), 1);
    assert!(session.is_terminated());
    assert!(matches!(session.step(start), Err(GestureError::SessionTerminated)));

    drop(session);
    assert_eq!(releases.get(), 1);
}

#[test]
fn test_failed_calibration_keeps_calibrating() {
    let frames = vec![RgbImage::new(0, 0), solid(BLUE), square(BLUE, 320, 80)];
    let signals = vec![Some(Signal::Sample), Some(Signal::Sample), None];
    let (mut session, releases, sent) = session(frames, signals);
    let start = Instant::now();

    // Frame 1: an empty frame cannot be sampled, the session carries on
    let StepOutcome::Continue(report) = session.step(start).unwrap() else {
        panic!("a failed sample must not end the session");
    };
    assert!(report.calibration.is_none());
    assert_eq!(session.mode(), SessionMode::Calibrating);
    assert!(!session.is_terminated());
    assert_eq!(releases.get(), 0);

    // Frame 2: sampling again on a real frame succeeds
    session.step(start).unwrap();
    assert_eq!(session.mode(), SessionMode::Tracking);
    assert_eq!(session.color_model().lower().hue, 105);

    // Frame 3: tracking works with the new model
    assert_eq!(action_of(session.step(start).unwrap()), Action::Jump);
    assert_eq!(*sent.borrow(), vec![Command::Jump]);
}

#[test]
fn test_run_stops_on_quit() {
    let frames = vec![background(), background(), background()];
    let signals = vec![None, Some(Signal::Skip), Some(Signal::Quit)];
    let (mut session, releases, _) = session(frames, signals);

    session.run().unwrap();
    assert!(session.is_terminated());
    assert_eq!(releases.get(), 1);
}

#[test]
fn test_dropping_a_live_session_releases_the_camera() {
    let (session, releases, _) = session(vec![background()], vec![]);
    assert_eq!(releases.get(), 0);
    drop(session);
    assert_eq!(releases.get(), 1);
}
