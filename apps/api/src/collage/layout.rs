//! Collage geometry: canvas sizes and the four image regions of each layout.
//!
//! All geometry is computed in floating point from the canvas width, then every
//! rectangle edge is rounded independently. Adjacent regions therefore share a
//! snapped edge and never overlap, and proportions hold for any width.

use serde::{Deserialize, Serialize};

/// Gap between regions as a fraction of the canvas width.
const GAP_RATIO: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollageLayout {
    /// 9:16 vertical. Full-width hero, three full-width strips below.
    Story,
    /// 4:5. Hero on top, three side-by-side details below.
    Showcase,
    /// 1:1, 2×2 cells.
    Grid,
}

impl CollageLayout {
    pub const ALL: [CollageLayout; 3] = [
        CollageLayout::Story,
        CollageLayout::Showcase,
        CollageLayout::Grid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollageLayout::Story => "story",
            CollageLayout::Showcase => "showcase",
            CollageLayout::Grid => "grid",
        }
    }

    /// Height over width.
    fn aspect(&self) -> f64 {
        match self {
            CollageLayout::Story => 16.0 / 9.0,
            CollageLayout::Showcase => 5.0 / 4.0,
            CollageLayout::Grid => 1.0,
        }
    }

    /// `(width, height)` of the output canvas.
    pub fn canvas_size(&self, width: u32) -> (u32, u32) {
        let height = (width as f64 * self.aspect()).round() as u32;
        (width, height)
    }

    /// Hero region first, then the three detail regions in order.
    pub fn regions(&self, width: u32) -> [Region; 4] {
        let (w, h) = self.canvas_size(width);
        let (w, h) = (w as f64, h as f64);
        let gap = w * GAP_RATIO;

        match self {
            CollageLayout::Story => {
                let hero_h = w * 9.0 / 16.0;
                let detail_h = (h - hero_h - 3.0 * gap) / 3.0;
                let detail = |i: f64| {
                    let top = hero_h + gap + i * (detail_h + gap);
                    Region::snap(0.0, top, w, top + detail_h)
                };
                [
                    Region::snap(0.0, 0.0, w, hero_h),
                    detail(0.0),
                    detail(1.0),
                    detail(2.0),
                ]
            }
            CollageLayout::Showcase => {
                let hero_h = h * 0.6;
                let top = hero_h + gap;
                let detail_w = (w - 2.0 * gap) / 3.0;
                let detail = |i: f64| {
                    let left = i * (detail_w + gap);
                    Region::snap(left, top, left + detail_w, h)
                };
                [
                    Region::snap(0.0, 0.0, w, hero_h),
                    detail(0.0),
                    detail(1.0),
                    detail(2.0),
                ]
            }
            CollageLayout::Grid => {
                let cell = (w - gap) / 2.0;
                let far = cell + gap;
                [
                    Region::snap(0.0, 0.0, cell, cell),
                    Region::snap(far, 0.0, w, cell),
                    Region::snap(0.0, far, cell, h),
                    Region::snap(far, far, w, h),
                ]
            }
        }
    }
}

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    fn snap(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (x0, y0) = (left.round() as u32, top.round() as u32);
        let (x1, y1) = (right.round() as u32, bottom.round() as u32);
        Region {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0).max(1),
            height: y1.saturating_sub(y0).max(1),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}
