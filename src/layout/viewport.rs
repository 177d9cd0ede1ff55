//! Display surface and zoom scale.

use serde::{Deserialize, Serialize};

use crate::model::PointF;
use super::LayoutConfig;

/// Width/height of the drawing surface, re-supplied on resize.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(0.0), height: height.max(0.0) }
    }

    /// The sun sits here.
    pub fn center(&self) -> PointF {
        PointF::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Multiply `scale` by `factor` and clamp to the configured range.
pub fn zoom_by_clamped(scale: f64, factor: f64, cfg: &LayoutConfig) -> f64 {
    (scale * factor).clamp(cfg.min_scale, cfg.max_scale)
}

pub fn zoom_in(scale: f64, cfg: &LayoutConfig) -> f64 {
    zoom_by_clamped(scale, cfg.zoom_step, cfg)
}

pub fn zoom_out(scale: f64, cfg: &LayoutConfig) -> f64 {
    zoom_by_clamped(scale, 1.0 / cfg.zoom_step, cfg)
}
