//! Foreground blob extraction and focus-of-attention selection.
//!
//! Only the single largest qualifying component is kept. Everything smaller
//! is ignored for the cycle, there is no multi-object bookkeeping.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::contour_area;
use imageproc::point::Point as ContourPoint;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scales each axis independently, truncating toward zero.
    pub fn scale(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            x: (f64::from(self.x) * scale_x) as u32,
            y: (f64::from(self.y) * scale_y) as u32,
            width: (f64::from(self.width) * scale_x) as u32,
            height: (f64::from(self.height) * scale_y) as u32,
        }
    }

    /// Integer center `(x + w/2, y + h/2)`.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

/// The region selected for tracking in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRegion {
    /// Bounding box in low-resolution coordinates.
    pub low_res: BoundingBox,
    /// Enclosed contour area at low resolution.
    pub low_res_area: f64,
    /// Bounding box mapped to full-resolution coordinates.
    pub bounds: BoundingBox,
}

impl FocusRegion {
    /// Maps a low-resolution component into full-resolution coordinates.
    pub fn from_low_res(
        low_res: BoundingBox,
        low_res_area: f64,
        low_dims: (u32, u32),
        full_dims: (u32, u32),
    ) -> Self {
        let scale_x = f64::from(full_dims.0) / f64::from(low_dims.0);
        let scale_y = f64::from(full_dims.1) / f64::from(low_dims.1);
        Self {
            low_res,
            low_res_area,
            bounds: low_res.scale(scale_x, scale_y),
        }
    }

    /// Center of the full-resolution bounding box.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Full-resolution bounding-box area, the quantity used for looming.
    pub fn area(&self) -> f64 {
        self.bounds.area() as f64
    }
}

/// Bounding box of a traced border, inclusive of both extreme pixels.
fn contour_bounds(points: &[ContourPoint<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(
        min_x.unsigned_abs(),
        min_y.unsigned_abs(),
        (max_x - min_x).unsigned_abs() + 1,
        (max_y - min_y).unsigned_abs() + 1,
    ))
}

/// Finds the focus of attention in a binary foreground mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobExtractor {
    min_area: u32,
}

impl BlobExtractor {
    pub fn new(min_area: u32) -> Self {
        Self { min_area }
    }

    /// Returns `(bounding box, area)` of the outermost blob with the largest
    /// enclosed area, in mask coordinates.
    ///
    /// Only top-level outer borders are candidates, so holes count toward
    /// the area and anything inside a hole is ignored. The area is that of
    /// the polygon through the border pixel centers and must strictly exceed
    /// the minimum. Ties keep the border met first in raster order.
    pub fn largest(&self, mask: &GrayImage) -> Option<(BoundingBox, f64)> {
        let min_area = f64::from(self.min_area);

        let mut best: Option<(BoundingBox, f64)> = None;
        for contour in find_contours::<i32>(mask) {
            if !matches!(contour.border_type, BorderType::Outer) || contour.parent.is_some() {
                continue;
            }
            let area = contour_area(&contour.points).abs();
            if area <= min_area || best.is_some_and(|(_, b)| area <= b) {
                continue;
            }
            if let Some(bounds) = contour_bounds(&contour.points) {
                best = Some((bounds, area));
            }
        }

        tracing::trace!(area = best.map(|(_, a)| a), "largest outer contour");
        best
    }

    /// Selects the focus region and maps it to a `full_dims` frame.
    pub fn extract(&self, mask: &GrayImage, full_dims: (u32, u32)) -> Option<FocusRegion> {
        let (bounds, area) = self.largest(mask)?;
        Some(FocusRegion::from_low_res(
            bounds,
            area,
            mask.dimensions(),
            full_dims,
        ))
    }
}

impl Default for BlobExtractor {
    fn default() -> Self {
        Self::new(800)
    }
}
