// THEORY:
// The `ColorModel` is the single piece of memory the tracker keeps about *what*
// it is looking for: an inclusive HSV box. It is written by calibration and read
// by segmentation, and nothing else touches it.
//
// Bounds are never rejected. Whatever the caller hands to `set` is clamped into
// the legal range of each channel and ordered so that lower <= upper. A poor
// calibration therefore produces a poor (but usable) box rather than an error,
// and the user can simply recalibrate.

use crate::config::CalibrationConfig;
use crate::core_modules::hsv_pixel::hsv_pixel::{HUE_MAX, HsvPixel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorModel {
    lower: HsvPixel,
    upper: HsvPixel,
}

impl Default for ColorModel {
    /// Placeholder range used until the first calibration.
    fn default() -> Self {
        Self::new(HsvPixel::new(0, 50, 50), HsvPixel::new(10, 255, 255))
    }
}

impl ColorModel {
    pub fn new(lower: HsvPixel, upper: HsvPixel) -> Self {
        let mut model = Self {
            lower: HsvPixel::default(),
            upper: HsvPixel::default(),
        };
        model.set(lower, upper);
        model
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(
            HsvPixel::from_channels(config.default_lower),
            HsvPixel::from_channels(config.default_upper),
        )
    }

    /// Stores the bounds after clamping each channel to its legal range.
    pub fn set(&mut self, lower: HsvPixel, upper: HsvPixel) {
        let lower = clamp(lower);
        let upper = clamp(upper);

        self.lower = HsvPixel::new(
            lower.hue.min(upper.hue),
            lower.saturation.min(upper.saturation),
            lower.value.min(upper.value),
        );
        self.upper = HsvPixel::new(
            lower.hue.max(upper.hue),
            lower.saturation.max(upper.saturation),
            lower.value.max(upper.value),
        );
    }

    pub fn get(&self) -> (HsvPixel, HsvPixel) {
        (self.lower, self.upper)
    }

    pub fn lower(&self) -> HsvPixel {
        self.lower
    }

    pub fn upper(&self) -> HsvPixel {
        self.upper
    }
}

// Saturation and value already span the whole byte; only hue has a tighter range.
fn clamp(pixel: HsvPixel) -> HsvPixel {
    HsvPixel::new(pixel.hue.min(HUE_MAX), pixel.saturation, pixel.value)
}
