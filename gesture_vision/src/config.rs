// THEORY:
// Every tunable constant of the perception pipeline lives here. The values are
// read once at startup (optionally from a TOML file) and then handed, by
// reference, to the component that owns each concern. Nothing in the pipeline
// re-reads configuration while a session is running.
//
// Each section mirrors one stage of the pipeline so that a config file reads
// top-to-bottom in the same order a frame travels through the system. Missing
// sections or fields fall back to the defaults below.

use crate::error::{GestureError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub capture: CaptureConfig,
    pub calibration: CalibrationConfig,
    pub segmentation: SegmentationConfig,
    pub extraction: ExtractionConfig,
    pub zones: ZoneConfig,
    pub dispatch: DispatchConfig,
}

/// Settings for the video capture device and the per-frame preprocessing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Index of the camera to open.
    pub camera_index: i32,
    /// Requested frame width in pixels.
    pub frame_width: u32,
    /// Requested frame height in pixels.
    pub frame_height: u32,
    /// Flip every frame horizontally so that moving right on camera moves right on screen.
    pub mirror: bool,
    /// How long to let the camera settle before the first frame is read.
    pub warmup_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            frame_width: 640,
            frame_height: 480,
            mirror: true,
            warmup_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Side length of the centered square sampled during calibration.
    pub sample_size: u32,
    /// Half-width of the accepted hue band around the sampled mean hue.
    pub hue_tolerance: f64,
    /// Fixed lower bound for saturation, independent of the sample.
    pub saturation_floor: u8,
    /// Fixed lower bound for value, independent of the sample.
    pub value_floor: u8,
    /// HSV lower bound used before the first calibration.
    pub default_lower: [u8; 3],
    /// HSV upper bound used before the first calibration.
    pub default_upper: [u8; 3],
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            hue_tolerance: 15.0,
            saturation_floor: 50,
            value_floor: 50,
            default_lower: [0, 50, 50],
            default_upper: [10, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Side length of the square structuring element used for erosion and dilation.
    pub kernel_size: u32,
    pub erode_iterations: u32,
    pub dilate_iterations: u32,
    /// Side length of the Gaussian smoothing kernel.
    pub blur_kernel_size: u32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            erode_iterations: 1,
            dilate_iterations: 2,
            blur_kernel_size: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regions whose outline encloses less than this many square pixels are noise.
    pub min_region_area: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_region_area: 1000.0 }
    }
}

/// Zone boundaries as fractions of the frame height (vertical) and width (horizontal).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub jump_fraction: f64,
    pub duck_fraction: f64,
    pub left_fraction: f64,
    pub right_fraction: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            jump_fraction: 0.30,
            duck_fraction: 0.70,
            left_fraction: 0.35,
            right_fraction: 0.65,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Minimum time between two dispatched commands, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { cooldown_ms: 800 }
    }
}

impl DispatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl GestureConfig {
    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| GestureError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GestureConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.kernel_size == 0 || seg.kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "segmentation.kernel_size must be odd and positive, got {}",
                seg.kernel_size
            )));
        }
        if seg.blur_kernel_size == 0 || seg.blur_kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "segmentation.blur_kernel_size must be odd and positive, got {}",
                seg.blur_kernel_size
            )));
        }

        if self.calibration.sample_size == 0 {
            return Err(invalid("calibration.sample_size must be positive".to_string()));
        }
        let tolerance = self.calibration.hue_tolerance;
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(invalid(format!(
                "calibration.hue_tolerance must be non-negative, got {tolerance}"
            )));
        }

        let min_area = self.extraction.min_region_area;
        if min_area.is_nan() || min_area < 0.0 {
            return Err(invalid(format!(
                "extraction.min_region_area must be non-negative, got {min_area}"
            )));
        }

        let zones = &self.zones;
        for (name, fraction) in [
            ("jump_fraction", zones.jump_fraction),
            ("duck_fraction", zones.duck_fraction),
            ("left_fraction", zones.left_fraction),
            ("right_fraction", zones.right_fraction),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(invalid(format!("zones.{name} must lie in [0, 1], got {fraction}")));
            }
        }
        if zones.jump_fraction >= zones.duck_fraction {
            return Err(invalid("zones.jump_fraction must be below zones.duck_fraction".to_string()));
        }
        if zones.left_fraction >= zones.right_fraction {
            return Err(invalid("zones.left_fraction must be below zones.right_fraction".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> GestureError {
    GestureError::InvalidConfig(message)
}
