mod camera;
mod display;
mod keyboard;

use anyhow::{Context, Result};
use camera::Camera;
use display::{Display, KeySignals};
use gesture_vision::{GestureConfig, SessionController};
use keyboard::ArrowKeys;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // --- 1. Logging ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gesture_vision=info,gesture_runner=info")),
        )
        .init();

    info!("=== Gesture Color Tracking Control ===");

    // --- 2. Configuration ---
    let config = match env::args().nth(1) {
        Some(path) => {
            let config = GestureConfig::load(&path).with_context(|| format!("failed to load config {path}"))?;
            info!("✓ Configuration loaded from {}", path);
            config
        }
        None => GestureConfig::default(),
    };

    // --- 3. Device Initialization ---
    info!("Starting webcam... Please wait.");
    let camera = Camera::open(&config.capture)?;
    let display = Display::new().context("failed to create the display window")?;
    let keys = ArrowKeys::new()?;

    info!("Controls:");
    info!("- Press 'c' to enter color calibration mode");
    info!("- In calibration mode, press 's' to sample color or 'x' to keep the current range");
    info!("- Press 'q' to quit");
    info!("Gameplay: move the tracked object up to JUMP, down to DUCK, left or right to switch lanes");
    info!("Starting in calibration mode. Place your colored object in the center box.");

    // --- 4. Main Loop ---
    let mut session = SessionController::with_observer(&config, camera, KeySignals, keys, display);
    session.run()?;

    info!("Program terminated");
    Ok(())
}
