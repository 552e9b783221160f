// THEORY:
// The crate speaks `image` buffers at its edges (frames come in as `RgbImage`,
// masks go out as `GrayImage`) and OpenCV `Mat`s inside the perception stages.
// This module is the only place where the two meet.
//
// Both sides store pixels row-major and tightly packed, so a conversion is a
// single copy of the raw bytes plus a reshape. Channel order is RGB on the
// `image` side; camera frames arrive as BGR and are swapped on the way in.
// Callers guard against zero-sized images before crossing the bridge.

use crate::core_modules::segmenter::Mask;
use image::{GrayImage, RgbImage};
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};

/// Copies an RGB frame into an owned 3-channel `Mat` (RGB order).
pub fn rgb_to_mat(frame: &RgbImage) -> opencv::Result<Mat> {
    let flat = Mat::from_slice(frame.as_raw().as_slice())?;
    let shaped = flat.reshape(3, frame.height() as i32)?;
    shaped.try_clone()
}

/// RGB frame to HSV on OpenCV's 8-bit scale (H 0..179, S and V 0..255).
pub fn rgb_to_hsv(frame: &RgbImage) -> opencv::Result<Mat> {
    let rgb = rgb_to_mat(frame)?;
    let mut hsv = Mat::default();
    imgproc::cvt_color(&rgb, &mut hsv, imgproc::COLOR_RGB2HSV, 0)?;
    Ok(hsv)
}

/// Copies a mask into an owned single-channel `Mat`.
pub fn mask_to_mat(mask: &Mask) -> opencv::Result<Mat> {
    let flat = Mat::from_slice(mask.as_raw().as_slice())?;
    let shaped = flat.reshape(1, mask.height() as i32)?;
    shaped.try_clone()
}

/// Copies a single-channel 8-bit `Mat` back into a mask.
pub fn mat_to_mask(mat: &Mat) -> opencv::Result<Mask> {
    let (width, height) = (mat.cols() as u32, mat.rows() as u32);
    let bytes = mat.data_bytes()?.to_vec();
    GrayImage::from_raw(width, height, bytes).ok_or_else(|| layout_error(mat))
}

/// Converts a BGR camera frame into an RGB frame.
pub fn bgr_mat_to_rgb(mat: &Mat) -> opencv::Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
    let bytes = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(width, height, bytes).ok_or_else(|| layout_error(&rgb))
}

fn layout_error(mat: &Mat) -> opencv::Error {
    opencv::Error::new(
        core::StsUnmatchedSizes,
        format!("{}x{} Mat does not match its pixel buffer", mat.cols(), mat.rows()),
    )
}
