// THEORY:
// A `Region` is one spatially coherent patch of "on" pixels in a mask, summarized
// into the handful of numbers the rest of the system cares about: how big it is
// and where it is. Both come from the region's outer contour, the polygon through
// its boundary pixel centers, so a filled `w`x`h` block measures `(w-1)*(h-1)` and
// a one-pixel-wide line measures nothing at all. Like the blob it is modelled on,
// a region is a stateless snapshot of a single frame; it has no identity across
// frames.

use opencv::{core, imgproc};

/// A 2D integer position in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Raw spatial moments of a contour polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    /// Zeroth moment: the enclosed area.
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// `(M10 / M00, M01 / M00)` truncated to integers; `None` for a degenerate region.
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as u32,
            (self.m01 / self.m00) as u32,
        ))
    }
}

impl From<core::Moments> for Moments {
    fn from(moments: core::Moments) -> Self {
        Self {
            m00: moments.m00,
            m10: moments.m10,
            m01: moments.m01,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Area enclosed by the outer contour, in square pixels.
    pub area: f64,
    pub moments: Moments,
}

impl Region {
    pub fn from_contour(contour: &core::Vector<core::Point>) -> opencv::Result<Self> {
        Ok(Self {
            area: imgproc::contour_area(contour, false)?,
            moments: imgproc::moments(contour, false)?.into(),
        })
    }

    pub fn centroid(&self) -> Option<Point> {
        self.moments.centroid()
    }
}
