use anyhow::{Context, Result, bail};
use gesture_vision::FrameSource;
use gesture_vision::config::CaptureConfig;
use gesture_vision::core_modules::mat_bridge;
use image::RgbImage;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// A webcam delivering RGB frames.
pub struct Camera {
    capture: VideoCapture,
    raw: Mat,
}

impl Camera {
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        let mut capture = VideoCapture::new(config.camera_index, videoio::CAP_ANY)
            .with_context(|| format!("failed to open camera {}", config.camera_index))?;
        if !capture.is_opened()? {
            bail!("camera {} is not available", config.camera_index);
        }

        // The device may pick a different mode; frames are measured as they arrive.
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.frame_width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.frame_height as f64)?;
        info!(
            width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
            "Camera opened"
        );

        thread::sleep(Duration::from_millis(config.warmup_ms));

        Ok(Self {
            capture,
            raw: Mat::default(),
        })
    }

    fn grab(&mut self) -> opencv::Result<Option<RgbImage>> {
        if !self.capture.read(&mut self.raw)? || self.raw.empty() {
            return Ok(None);
        }

        mat_bridge::bgr_mat_to_rgb(&self.raw).map(Some)
    }
}

impl FrameSource for Camera {
    fn read_frame(&mut self) -> Option<RgbImage> {
        match self.grab() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Error reading frame: {:?}", e);
                None
            }
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Error releasing camera: {:?}", e);
        }
    }
}
