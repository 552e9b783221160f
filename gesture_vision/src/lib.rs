// THEORY:
// This file is the main entry point for the `gesture_vision` library crate.
// It defines the public API used by the `gesture_runner` binary (or any other
// front end that can supply frames, key signals and a place to send commands).
//
// The primary exports are the `SessionController`, which runs the calibrate/track
// state machine, and the stateless `GesturePipeline` underneath it. Both are
// configured from a single `GestureConfig`. The per-stage building blocks live in
// `core_modules` and are public so they can be tested and reused on their own.
//
// The crate performs no I/O of its own apart from reading a config file: the
// camera, keyboard and window all sit behind the traits in `session`.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;

pub use config::GestureConfig;
pub use core_modules::color_model::ColorModel;
pub use core_modules::dispatcher::{ActionSink, Command};
pub use error::{GestureError, Result};
pub use pipeline::{Action, FrameAnalysis, GesturePipeline, Point};
pub use session::{
    CycleObserver, CycleReport, FrameSource, SessionController, SessionMode, Signal, SignalSource,
    StepOutcome,
};
