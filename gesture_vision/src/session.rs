// THEORY:
// The `SessionController` is the top-level state machine of the system. It owns
// every piece of mutable state (the color model, the dispatcher's cooldown memory
// and the current mode) and drives exactly one control cycle per `step` call:
//
//   acquire frame -> (mirror) -> process for the current mode -> show -> poll signal
//
// Modes:
// - `Calibrating`: frames are shown with the sampling square; no segmentation runs.
//   A `Sample` signal calibrates from the frame just shown and switches to
//   tracking; a sample that fails is logged and the controller keeps calibrating.
//   `Skip` switches to tracking with the model unchanged. There is no timeout,
//   the controller waits for a signal indefinitely.
// - `Tracking`: the full pipeline runs and its action goes through the dispatcher.
//   `Recalibrate` switches back to calibrating.
// - `Quit` ends the session from either mode.
//
// All the outside world (camera, keyboard, overlay, game input) is reached through
// the traits below, so the controller can be driven by scripted frames and signals
// in tests. The capture device is released exactly once: on quit, on a fatal frame
// failure, or when the controller is dropped (which also covers unwinding).

use crate::config::GestureConfig;
use crate::core_modules::calibrator::{CalibrationSample, Calibrator, SampleRegion};
use crate::core_modules::color_model::ColorModel;
use crate::core_modules::dispatcher::{ActionDispatcher, ActionSink, Command};
use crate::core_modules::zone_classifier::ZoneThresholds;
use crate::error::{GestureError, Result};
use crate::pipeline::{FrameAnalysis, GesturePipeline};
use image::RgbImage;
use image::imageops;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pull-based video input.
pub trait FrameSource {
    /// The next frame, or `None` if the device can no longer deliver frames.
    fn read_frame(&mut self) -> Option<RgbImage>;

    /// Frees the underlying device. Called exactly once per session.
    fn release(&mut self) {}
}

/// Discrete user commands, polled once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sample,
    Skip,
    Quit,
    Recalibrate,
}

pub trait SignalSource {
    /// Must not block for longer than a minimal wait.
    fn poll_signal(&mut self) -> Option<Signal>;
}

/// Receives every processed frame, e.g. to draw debug overlays.
pub trait CycleObserver {
    fn observe(&mut self, frame: &RgbImage, report: &CycleReport);
}

impl CycleObserver for () {
    fn observe(&mut self, _frame: &RgbImage, _report: &CycleReport) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    Calibrating,
    Tracking,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Calibrating => f.write_str("calibrating"),
            SessionMode::Tracking => f.write_str("tracking"),
        }
    }
}

/// What happened during one control cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// The mode the frame was processed in.
    pub mode: SessionMode,
    pub thresholds: ZoneThresholds,
    /// The calibration square, while calibrating.
    pub sample_region: Option<SampleRegion>,
    /// The pipeline output, while tracking.
    pub analysis: Option<FrameAnalysis>,
    pub dispatched: Option<Command>,
    /// The signal received at the end of the cycle. Not yet set when observed.
    pub signal: Option<Signal>,
    /// Set when a `Sample` signal recalibrated the color model this cycle.
    pub calibration: Option<CalibrationSample>,
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Continue(CycleReport),
    Terminated,
}

pub struct SessionController<F, S, A, O = ()>
where
    F: FrameSource,
    S: SignalSource,
    A: ActionSink,
    O: CycleObserver,
{
    frames: F,
    signals: S,
    sink: A,
    observer: O,
    mirror: bool,

    pipeline: GesturePipeline,
    calibrator: Calibrator,
    dispatcher: ActionDispatcher,
    color_model: ColorModel,
    mode: SessionMode,

    terminated: bool,
    released: bool,
}

impl<F, S, A> SessionController<F, S, A>
where
    F: FrameSource,
    S: SignalSource,
    A: ActionSink,
{
    pub fn new(config: &GestureConfig, frames: F, signals: S, sink: A) -> Self {
        Self::with_observer(config, frames, signals, sink, ())
    }
}

impl<F, S, A, O> SessionController<F, S, A, O>
where
    F: FrameSource,
    S: SignalSource,
    A: ActionSink,
    O: CycleObserver,
{
    pub fn with_observer(config: &GestureConfig, frames: F, signals: S, sink: A, observer: O) -> Self {
        info!("Session started in calibration mode");
        Self {
            frames,
            signals,
            sink,
            observer,
            mirror: config.capture.mirror,
            pipeline: GesturePipeline::new(config),
            calibrator: Calibrator::new(&config.calibration),
            dispatcher: ActionDispatcher::from_config(&config.dispatch),
            color_model: ColorModel::from_config(&config.calibration),
            mode: SessionMode::Calibrating,
            terminated: false,
            released: false,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn color_model(&self) -> &ColorModel {
        &self.color_model
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Runs one control cycle at time `now`.
    pub fn step(&mut self, now: Instant) -> Result<StepOutcome> {
        if self.terminated {
            return Err(GestureError::SessionTerminated);
        }

        // --- 1. Frame Acquisition ---
        let Some(mut frame) = self.frames.read_frame() else {
            warn!("Failed to grab frame");
            self.terminate();
            return Err(GestureError::FrameUnavailable);
        };
        if self.mirror {
            imageops::flip_horizontal_in_place(&mut frame);
        }
        let (width, height) = frame.dimensions();

        // --- 2. Mode-Specific Processing ---
        let mut report = CycleReport {
            mode: self.mode,
            thresholds: self.pipeline.classifier().thresholds(width, height),
            sample_region: None,
            analysis: None,
            dispatched: None,
            signal: None,
            calibration: None,
        };
        match self.mode {
            SessionMode::Calibrating => {
                report.sample_region = Some(self.calibrator.sample_region(width, height));
            }
            SessionMode::Tracking => {
                let analysis = self.pipeline.analyze(&frame, &self.color_model)?;
                debug!(centroid = ?analysis.centroid, action = %analysis.action, "Frame analyzed");
                if analysis.action.is_dispatchable() {
                    report.dispatched = self.dispatcher.dispatch(analysis.action, now, &mut self.sink);
                    if let Some(command) = report.dispatched {
                        info!(%command, "Executed");
                    }
                }
                report.analysis = Some(analysis);
            }
        }

        // --- 3. Presentation ---
        self.observer.observe(&frame, &report);

        // --- 4. Signal Handling ---
        report.signal = self.signals.poll_signal();
        match (self.mode, report.signal) {
            (_, Some(Signal::Quit)) => {
                info!("Quit requested");
                self.terminate();
                return Ok(StepOutcome::Terminated);
            }
            (SessionMode::Calibrating, Some(Signal::Sample)) => {
                match self.calibrator.calibrate(&frame, &mut self.color_model) {
                    Ok(sample) => {
                        report.calibration = Some(sample);
                        info!("Calibration complete! Now tracking your colored object.");
                        self.mode = SessionMode::Tracking;
                    }
                    Err(e) => warn!("Calibration failed: {e}; still calibrating"),
                }
            }
            (SessionMode::Calibrating, Some(Signal::Skip)) => {
                info!("Exiting calibration mode using the current color range");
                self.mode = SessionMode::Tracking;
            }
            (SessionMode::Tracking, Some(Signal::Recalibrate)) => {
                info!("Entering calibration mode");
                self.mode = SessionMode::Calibrating;
            }
            (mode, Some(signal)) => {
                debug!(?signal, %mode, "Signal ignored in current mode");
            }
            (_, None) => {}
        }

        Ok(StepOutcome::Continue(report))
    }

    /// Steps with the wall clock until the session quits or the frame source fails.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if let StepOutcome::Terminated = self.step(Instant::now())? {
                return Ok(());
            }
        }
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.release_capture();
    }

    fn release_capture(&mut self) {
        if !self.released {
            self.released = true;
            self.frames.release();
            info!("Capture device released");
        }
    }
}

impl<F, S, A, O> Drop for SessionController<F, S, A, O>
where
    F: FrameSource,
    S: SignalSource,
    A: ActionSink,
    O: CycleObserver,
{
    fn drop(&mut self) {
        // Best effort release on any exit path that skipped `terminate`.
        self.release_capture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::collections::VecDeque;

    struct StaticFrames {
        frame: RgbImage,
    }

    impl FrameSource for StaticFrames {
        fn read_frame(&mut self) -> Option<RgbImage> {
            Some(self.frame.clone())
        }
    }

    struct Script(VecDeque<Option<Signal>>);

    impl SignalSource for Script {
        fn poll_signal(&mut self) -> Option<Signal> {
            self.0.pop_front().flatten()
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<Command>);

    impl ActionSink for Recorder {
        fn execute(&mut self, command: Command) {
            self.0.push(command);
        }
    }

    fn session(signals: &[Option<Signal>]) -> SessionController<StaticFrames, Script, Recorder> {
        let frames = StaticFrames {
            frame: RgbImage::from_pixel(64, 48, Rgb([0, 0, 255])),
        };
        SessionController::new(
            &GestureConfig::default(),
            frames,
            Script(signals.iter().copied().collect()),
            Recorder::default(),
        )
    }

    #[test]
    fn starts_calibrating_and_waits_without_a_signal() {
        let mut session = session(&[None, None, None]);
        for _ in 0..3 {
            let outcome = session.step(Instant::now()).unwrap();
            let StepOutcome::Continue(report) = outcome else {
                panic!("session should keep running");
            };
            assert_eq!(report.mode, SessionMode::Calibrating);
            assert!(report.analysis.is_none());
            assert!(report.sample_region.is_some());
        }
        assert_eq!(session.mode(), SessionMode::Calibrating);
    }

    #[test]
    fn tracking_only_signals_are_ignored_while_calibrating() {
        let mut session = session(&[Some(Signal::Recalibrate)]);
        session.step(Instant::now()).unwrap();
        assert_eq!(session.mode(), SessionMode::Calibrating);
    }

    #[test]
    fn sample_calibrates_from_the_current_frame() {
        let mut session = session(&[Some(Signal::Sample)]);
        let StepOutcome::Continue(report) = session.step(Instant::now()).unwrap() else {
            panic!("session should keep running");
        };
        let sample = report.calibration.expect("calibration result");
        assert_eq!(sample.mean_hue, 120.0);
        assert_eq!(session.mode(), SessionMode::Tracking);
        assert_eq!(session.color_model().lower().hue, 105);
    }

    #[test]
    fn failed_sample_stays_in_calibration() {
        let mut session = session(&[Some(Signal::Sample)]);
        session.frames.frame = RgbImage::new(0, 0);
        let StepOutcome::Continue(report) = session.step(Instant::now()).unwrap() else {
            panic!("a failed sample must not end the session");
        };
        assert!(report.calibration.is_none());
        assert_eq!(session.mode(), SessionMode::Calibrating);
        assert_eq!(*session.color_model(), ColorModel::default());
        assert!(!session.is_terminated());
    }

    #[test]
    fn skip_keeps_the_default_model() {
        let mut session = session(&[Some(Signal::Skip)]);
        session.step(Instant::now()).unwrap();
        assert_eq!(session.mode(), SessionMode::Tracking);
        assert_eq!(*session.color_model(), ColorModel::default());
    }

    #[test]
    fn stepping_after_quit_is_an_error() {
        let mut session = session(&[Some(Signal::Quit)]);
        assert!(matches!(session.step(Instant::now()), Ok(StepOutcome::Terminated)));
        assert!(session.is_terminated());
        assert!(matches!(
            session.step(Instant::now()),
            Err(GestureError::SessionTerminated)
        ));
    }
}
