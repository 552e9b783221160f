// THEORY:
// The `Calibrator` teaches the `ColorModel` what the tracked object looks like.
// The user holds the object inside a fixed square at the center of the frame;
// the calibrator averages the HSV values of every pixel in that square and turns
// the mean hue into a hue band.
//
// Only hue is learned. Saturation and value get fixed floors and open ceilings,
// which gives up some precision in exchange for robustness against the lighting
// changes that happen the moment the object leaves the calibration square.
//
// The mean is taken by OpenCV over the HSV square, so the sample sees exactly the
// channel values the segmenter will later threshold.

use crate::config::CalibrationConfig;
use crate::core_modules::color_model::ColorModel;
use crate::core_modules::hsv_pixel::hsv_pixel::{CHANNEL_MAX, HUE_MAX, HsvPixel};
use crate::core_modules::mat_bridge;
use crate::error::{GestureError, Result};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Rect},
    prelude::*,
};
use tracing::info;

/// An axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SampleRegion {
    /// A `size`x`size` square centered in the frame, shrunk to fit small frames.
    pub fn centered(frame_width: u32, frame_height: u32, size: u32) -> Self {
        let width = size.min(frame_width);
        let height = size.min(frame_height);
        Self {
            x: (frame_width / 2).saturating_sub(width / 2),
            y: (frame_height / 2).saturating_sub(height / 2),
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive bottom-right corner.
    pub fn bottom_right(&self) -> (u32, u32) {
        (self.x + self.width, self.y + self.height)
    }
}

/// The diagnostic result of one calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub mean_hue: f64,
    pub mean_saturation: f64,
    pub mean_value: f64,
    pub lower: HsvPixel,
    pub upper: HsvPixel,
}

pub struct Calibrator {
    sample_size: u32,
    hue_tolerance: f64,
    saturation_floor: u8,
    value_floor: u8,
}

impl Calibrator {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            hue_tolerance: config.hue_tolerance,
            saturation_floor: config.saturation_floor,
            value_floor: config.value_floor,
        }
    }

    pub fn sample_region(&self, frame_width: u32, frame_height: u32) -> SampleRegion {
        SampleRegion::centered(frame_width, frame_height, self.sample_size)
    }

    /// Samples the centered square of `frame` and rewrites `model` from it.
    pub fn calibrate(&self, frame: &RgbImage, model: &mut ColorModel) -> Result<CalibrationSample> {
        let (frame_width, frame_height) = frame.dimensions();
        let region = self.sample_region(frame_width, frame_height);
        if region.area() == 0 {
            return Err(GestureError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }

        let (mean_hue, mean_saturation, mean_value) = mean_hsv(frame, &region)?;

        // Truncation toward zero matches storing a fractional bound in a byte channel.
        let lower = HsvPixel::new(
            (mean_hue - self.hue_tolerance).clamp(0.0, HUE_MAX as f64) as u8,
            self.saturation_floor,
            self.value_floor,
        );
        let upper = HsvPixel::new(
            (mean_hue + self.hue_tolerance).clamp(0.0, HUE_MAX as f64) as u8,
            CHANNEL_MAX,
            CHANNEL_MAX,
        );
        model.set(lower, upper);
        let (lower, upper) = model.get();

        info!("Color sampled: H={mean_hue:.1}, S={mean_saturation:.1}, V={mean_value:.1}");
        info!("Color range set: {:?} to {:?}", lower.channels(), upper.channels());

        Ok(CalibrationSample {
            mean_hue,
            mean_saturation,
            mean_value,
            lower,
            upper,
        })
    }
}

fn mean_hsv(frame: &RgbImage, region: &SampleRegion) -> opencv::Result<(f64, f64, f64)> {
    let hsv = mat_bridge::rgb_to_hsv(frame)?;
    let rect = Rect::new(
        region.x as i32,
        region.y as i32,
        region.width as i32,
        region.height as i32,
    );
    let square = Mat::roi(&hsv, rect)?.try_clone()?;
    let mean = core::mean(&square, &core::no_array())?;
    Ok((mean[0], mean[1], mean[2]))
}
