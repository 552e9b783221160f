// THEORY:
// The display is the player's only feedback channel. It is a `CycleObserver`, so
// it sees every frame after the session has processed it, together with the
// report of what happened. It redraws the overlay from scratch each time:
//
// - zone lines and their labels, in both modes;
// - the sampling square and instructions while calibrating;
// - the centroid marker, the current action and the executed command while tracking.
//
// HighGUI only repaints inside `wait_key`, which is why the key reader lives here
// too and the session polls it right after the frame is shown.

use gesture_vision::core_modules::calibrator::SampleRegion;
use gesture_vision::core_modules::mat_bridge;
use gesture_vision::core_modules::segmenter::Mask;
use gesture_vision::core_modules::zone_classifier::ZoneThresholds;
use gesture_vision::{CycleObserver, CycleReport, Signal, SignalSource};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar},
    highgui, imgproc,
};
use tracing::warn;

const MAIN_WINDOW: &str = "Gesture Control";
const MASK_WINDOW: &str = "Color Mask";

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn blue() -> Scalar {
    Scalar::new(255.0, 0.0, 0.0, 0.0)
}

fn yellow() -> Scalar {
    Scalar::new(0.0, 255.0, 255.0, 0.0)
}

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

pub struct Display;

impl Display {
    pub fn new() -> opencv::Result<Self> {
        highgui::named_window(MAIN_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self)
    }

    fn render(&self, frame: &RgbImage, report: &CycleReport) -> opencv::Result<()> {
        let (width, height) = (frame.width() as i32, frame.height() as i32);
        let mut output = to_bgr_mat(frame)?;

        draw_zones(&mut output, &report.thresholds, width, height)?;

        if let Some(region) = &report.sample_region {
            draw_calibration_box(&mut output, region)?;
        }

        if let Some(analysis) = &report.analysis {
            if let Some(centroid) = analysis.centroid {
                let center = core::Point::new(centroid.x as i32, centroid.y as i32);
                imgproc::circle(&mut output, center, 10, yellow(), -1, imgproc::LINE_8, 0)?;
                put_label(
                    &mut output,
                    &format!("Action: {}", analysis.action),
                    core::Point::new(10, height - 20),
                    0.7,
                    white(),
                )?;
            }
            if let Some(command) = report.dispatched {
                put_label(
                    &mut output,
                    &format!("Executed: {}", command),
                    core::Point::new(width - 200, height - 20),
                    0.7,
                    green(),
                )?;
            }
            show_mask(&analysis.mask)?;
        }

        highgui::imshow(MAIN_WINDOW, &output)
    }
}

impl CycleObserver for Display {
    fn observe(&mut self, frame: &RgbImage, report: &CycleReport) {
        if let Err(e) = self.render(frame, report) {
            warn!("Error drawing frame: {:?}", e);
        }
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Error closing windows: {:?}", e);
        }
    }
}

fn to_bgr_mat(frame: &RgbImage) -> opencv::Result<Mat> {
    let rgb = mat_bridge::rgb_to_mat(frame)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn show_mask(mask: &Mask) -> opencv::Result<()> {
    highgui::imshow(MASK_WINDOW, &mat_bridge::mask_to_mat(mask)?)
}

fn draw_zones(output: &mut Mat, thresholds: &ZoneThresholds, width: i32, height: i32) -> opencv::Result<()> {
    let jump_y = thresholds.jump_y as i32;
    let duck_y = thresholds.duck_y as i32;
    let left_x = thresholds.left_x as i32;
    let right_x = thresholds.right_x as i32;

    let lines = [
        ((0, jump_y), (width, jump_y), green()),
        ((0, duck_y), (width, duck_y), red()),
        ((left_x, 0), (left_x, height), blue()),
        ((right_x, 0), (right_x, height), blue()),
    ];
    for ((x1, y1), (x2, y2), color) in lines {
        let pt1 = core::Point::new(x1, y1);
        let pt2 = core::Point::new(x2, y2);
        imgproc::line(output, pt1, pt2, color, 2, imgproc::LINE_8, 0)?;
    }

    put_label(output, "JUMP", core::Point::new(10, jump_y - 10), 0.6, green())?;
    put_label(output, "DUCK", core::Point::new(10, duck_y + 20), 0.6, red())?;
    put_label(output, "LEFT", core::Point::new(left_x - 50, 30), 0.6, blue())?;
    put_label(output, "RIGHT", core::Point::new(right_x + 10, 30), 0.6, blue())?;
    Ok(())
}

fn draw_calibration_box(output: &mut Mat, region: &SampleRegion) -> opencv::Result<()> {
    let (x1, y1) = (region.x as i32, region.y as i32);
    let (x2, y2) = region.bottom_right();
    let (x2, y2) = (x2 as i32, y2 as i32);

    imgproc::rectangle(
        output,
        core::Rect::new(x1, y1, x2 - x1, y2 - y1),
        yellow(),
        2,
        imgproc::LINE_8,
        0,
    )?;
    put_label(output, "Place object here", core::Point::new(x1, y1 - 10), 0.6, yellow())?;
    put_label(output, "Press 's' to sample color", core::Point::new(x1, y2 + 25), 0.6, yellow())?;
    put_label(output, "Press 'x' to exit calibration", core::Point::new(x1, y2 + 50), 0.6, yellow())?;
    Ok(())
}

fn put_label(output: &mut Mat, text: &str, origin: core::Point, scale: f64, color: Scalar) -> opencv::Result<()> {
    imgproc::put_text(
        output,
        text,
        origin,
        imgproc::FONT_HERSHEY_SIMPLEX,
        scale,
        color,
        2,
        imgproc::LINE_8,
        false,
    )
}

/// Reads single key presses from the HighGUI windows.
pub struct KeySignals;

impl SignalSource for KeySignals {
    fn poll_signal(&mut self) -> Option<Signal> {
        let key = match highgui::wait_key(1) {
            Ok(key) => key,
            Err(e) => {
                warn!("Error polling keys: {:?}", e);
                return None;
            }
        };
        signal_for_key(key)
    }
}

fn signal_for_key(key: i32) -> Option<Signal> {
    if key < 0 {
        return None;
    }
    match (key & 0xFF) as u8 {
        b's' => Some(Signal::Sample),
        b'x' => Some(Signal::Skip),
        b'c' => Some(Signal::Recalibrate),
        b'q' => Some(Signal::Quit),
        _ => None,
    }
}
