// THEORY:
// The `Segmenter` turns a color frame into a binary mask of "this pixel looks like
// the tracked object". It is the noise-suppression layer of the system: the raw
// color threshold is full of speckles from sensor noise and similarly-colored
// background, and the later stages only work if those are gone.
//
// The stages run in a fixed order, and the order matters:
// 1.  **Color conversion**: RGB -> HSV, so the threshold is mostly about hue.
// 2.  **Threshold**: a pixel is on iff all three channels lie inside the
//     `ColorModel` box, bounds included.
// 3.  **Erode**: shrinks every on-region by the structuring element. Isolated
//     false positives smaller than the kernel disappear entirely.
// 4.  **Dilate (twice)**: grows what survived. Two passes against one erosion
//     gives a net growth bias, so the real object is never eaten away.
// 5.  **Smooth**: a Gaussian blur (sigma derived from the kernel size) rounds off
//     jagged edges and reduces frame-to-frame flicker of the region boundary; the
//     result is re-binarized (any non-zero coverage counts as on) so downstream
//     code sees a clean two-level mask.
//
// Every stage is an OpenCV call on a `Mat`; the frame crosses into OpenCV once and
// the mask crosses back once. The `Segmenter` is stateless: the same frame and
// model always give the same mask.

use crate::config::SegmentationConfig;
use crate::core_modules::color_model::ColorModel;
use crate::core_modules::mat_bridge;
use crate::error::Result;
use image::{GrayImage, RgbImage};
use opencv::{
    core::{self, Mat, Point, Size},
    imgproc,
};

/// A binary mask: every pixel is either `MASK_OFF` or `MASK_ON`.
pub type Mask = GrayImage;

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

pub struct Segmenter {
    kernel_size: i32,
    erode_iterations: i32,
    dilate_iterations: i32,
    blur_kernel_size: i32,
}

impl Segmenter {
    pub fn new(config: &SegmentationConfig) -> Self {
        Self {
            kernel_size: config.kernel_size as i32,
            erode_iterations: config.erode_iterations as i32,
            dilate_iterations: config.dilate_iterations as i32,
            blur_kernel_size: config.blur_kernel_size as i32,
        }
    }

    pub fn segment(&self, frame: &RgbImage, model: &ColorModel) -> Result<Mask> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Ok(Mask::new(width, height));
        }

        // --- 1. Color Conversion ---
        let hsv = mat_bridge::rgb_to_hsv(frame)?;

        // --- 2. Threshold ---
        let (lower, upper) = model.get();
        let mut mask = Mat::default();
        core::in_range(&hsv, &lower.to_scalar(), &upper.to_scalar(), &mut mask)?;

        // --- 3. & 4. Morphological Cleanup ---
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(self.kernel_size, self.kernel_size),
            Point::new(-1, -1),
        )?;
        // Out-of-frame pixels never influence the result.
        let border_value = imgproc::morphology_default_border_value()?;

        let mut eroded = Mat::default();
        imgproc::erode(
            &mask,
            &mut eroded,
            &kernel,
            Point::new(-1, -1),
            self.erode_iterations,
            core::BORDER_CONSTANT,
            border_value,
        )?;
        let mut dilated = Mat::default();
        imgproc::dilate(
            &eroded,
            &mut dilated,
            &kernel,
            Point::new(-1, -1),
            self.dilate_iterations,
            core::BORDER_CONSTANT,
            border_value,
        )?;

        // --- 5. Smoothing ---
        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            &dilated,
            &mut blurred,
            Size::new(self.blur_kernel_size, self.blur_kernel_size),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;
        let mut binary = Mat::default();
        imgproc::threshold(&blurred, &mut binary, 0.0, MASK_ON as f64, imgproc::THRESH_BINARY)?;

        Ok(mat_bridge::mat_to_mask(&binary)?)
    }
}
