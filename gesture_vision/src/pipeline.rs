// THEORY:
// The `pipeline` module bundles the stateless per-frame stages into a single call:
// frame in, action out. It owns no memory between frames; the color model is
// passed in and the dispatcher (which does remember) lives in the session, so the
// same pipeline can be exercised on synthetic frames without any session around it.

use crate::config::GestureConfig;
use crate::core_modules::color_model::ColorModel;
use crate::core_modules::region_detector::CentroidExtractor;
use crate::core_modules::segmenter::Segmenter;
use crate::core_modules::zone_classifier::ZoneClassifier;
use crate::error::Result;
use image::RgbImage;

// Re-export key data structures for the public API.
pub use crate::core_modules::region::{Point, Region};
pub use crate::core_modules::segmenter::Mask;
pub use crate::core_modules::zone_classifier::{Action, ZoneThresholds};

/// Everything the pipeline learned about one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// The cleaned binary mask, same dimensions as the frame.
    pub mask: Mask,
    /// The dominant region, if one passed the size filter.
    pub region: Option<Region>,
    pub centroid: Option<Point>,
    pub thresholds: ZoneThresholds,
    pub action: Action,
}

pub struct GesturePipeline {
    segmenter: Segmenter,
    extractor: CentroidExtractor,
    classifier: ZoneClassifier,
}

impl GesturePipeline {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            segmenter: Segmenter::new(&config.segmentation),
            extractor: CentroidExtractor::new(&config.extraction),
            classifier: ZoneClassifier::new(&config.zones),
        }
    }

    pub fn classifier(&self) -> &ZoneClassifier {
        &self.classifier
    }

    pub fn analyze(&self, frame: &RgbImage, model: &ColorModel) -> Result<FrameAnalysis> {
        let (width, height) = frame.dimensions();

        // Stage 1: Segmentation
        let mask = self.segmenter.segment(frame, model)?;

        // Stage 2: Dominant Region & Centroid
        let region = self.extractor.dominant_region(&mask)?;
        let centroid = region.as_ref().and_then(Region::centroid);

        // Stage 3: Zone Classification
        let thresholds = self.classifier.thresholds(width, height);
        let action = self.classifier.classify(centroid, width, height);

        Ok(FrameAnalysis {
            mask,
            region,
            centroid,
            thresholds,
            action,
        })
    }
}
