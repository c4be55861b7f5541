//! Drawing the focus box and trajectory onto output frames.

use crate::tracking::{Classification, MotionEstimate};
use crate::vision::{BoundingBox, FocusRegion, Point};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Trail colour (yellow).
pub const TRAIL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Text overlay describing the current motion estimate.
///
/// Sinks that can render text place `speed_label` above the box and
/// `looming_label` below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub bounds: BoundingBox,
    pub speed_label: String,
    pub looming_label: String,
    pub color: Rgb<u8>,
    pub danger: bool,
}

impl Hud {
    pub fn new(focus: &FocusRegion, estimate: &MotionEstimate, classification: &Classification) -> Self {
        Self {
            bounds: focus.bounds,
            speed_label: format!("SPEED: {:.1} u/s", estimate.speed()),
            looming_label: format!("DELTA: {}", estimate),
            color: classification.indicator.color(),
            danger: classification.danger,
        }
    }
}

fn rect(bounds: &BoundingBox) -> Option<Rect> {
    if bounds.width == 0 || bounds.height == 0 {
        return None;
    }
    Some(Rect::at(bounds.x as i32, bounds.y as i32).of_size(bounds.width, bounds.height))
}

/// Draws a two-pixel bounding box in `color`.
pub fn draw_focus(image: &mut RgbImage, bounds: &BoundingBox, color: Rgb<u8>) {
    if let Some(outer) = rect(bounds) {
        draw_hollow_rect_mut(image, outer, color);
    }
    if bounds.width > 2 && bounds.height > 2 {
        let inner = BoundingBox::new(bounds.x + 1, bounds.y + 1, bounds.width - 2, bounds.height - 2);
        if let Some(inner) = rect(&inner) {
            draw_hollow_rect_mut(image, inner, color);
        }
    }
}

/// Connects consecutive trail points with line segments.
pub fn draw_trail(image: &mut RgbImage, trail: &[Point]) {
    for pair in trail.windows(2) {
        draw_line_segment_mut(
            image,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            TRAIL_COLOR,
        );
    }
}
