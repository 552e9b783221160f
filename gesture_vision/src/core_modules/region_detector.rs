// THEORY:
// The region detector is the engine of the spatial layer. It takes the cleaned
// binary mask from the `Segmenter` and finds the one patch of it that is most
// likely to be the tracked object.
//
// Key algorithm steps:
// 1.  **Outer Contours**: OpenCV traces the outer boundary of every 8-connected
//     patch of "on" pixels. Only outermost boundaries are kept, so a ring-shaped
//     object counts as a solid disc and a blob sitting inside its hole is ignored.
// 2.  **Summary**: Each contour is reduced to a `Region` carrying the area the
//     polygon encloses and its raw moments.
// 3.  **Selection**: The `CentroidExtractor` keeps the largest region and rejects it
//     if it is too small to be anything but noise.
//
// Like the `Segmenter`, this layer is stateless and has no memory of earlier frames.

use crate::config::ExtractionConfig;
use crate::core_modules::mat_bridge;
use crate::core_modules::region::{Point, Region};
use crate::core_modules::segmenter::Mask;
use crate::error::Result;

pub mod region_detector {
    use super::*;
    use opencv::{core, imgproc};

    /// Finds every outermost region of the mask. The order is unspecified.
    pub fn find_regions(mask: &Mask) -> Result<Vec<Region>> {
        let (width, height) = mask.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        // --- 1. Outer Contours ---
        let mut mat = mat_bridge::mask_to_mat(mask)?;
        let mut contours = core::Vector::<core::Vector<core::Point>>::new();
        imgproc::find_contours(
            &mut mat,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            core::Point::new(0, 0),
        )?;

        // --- 2. Summary ---
        let mut regions = Vec::with_capacity(contours.len());
        for contour in contours.iter() {
            regions.push(Region::from_contour(&contour)?);
        }
        Ok(regions)
    }

    /// The region with the greatest area; the first one wins a tie.
    pub fn pick_largest(regions: Vec<Region>) -> Option<Region> {
        let mut largest: Option<Region> = None;
        for region in regions {
            if largest.as_ref().is_none_or(|best| region.area > best.area) {
                largest = Some(region);
            }
        }
        largest
    }

    pub fn largest_region(mask: &Mask) -> Result<Option<Region>> {
        Ok(pick_largest(find_regions(mask)?))
    }
}

/// Picks the dominant region of a mask and reduces it to a single point.
pub struct CentroidExtractor {
    min_area: f64,
}

impl CentroidExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_area: config.min_region_area,
        }
    }

    /// The largest region, if it is big enough to be the tracked object.
    pub fn dominant_region(&self, mask: &Mask) -> Result<Option<Region>> {
        let largest = region_detector::largest_region(mask)?;
        Ok(largest.filter(|region| region.area >= self.min_area))
    }

    pub fn extract(&self, mask: &Mask) -> Result<Option<Point>> {
        Ok(self.dominant_region(mask)?.and_then(|region| region.centroid()))
    }
}
