#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::config::valid_zoom_range;
use crate::consts::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::geometry::{Point, Rect};

/// Pan/zoom state for the infinite board.
///
/// `offset_x` / `offset_y` are in screen pixels.
/// `zoom` is a scale factor (1.0 = no zoom), always within `[min_zoom, max_zoom]`.
///
/// Presentation state only: changes never pass through the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, zoom: 1.0, min_zoom: DEFAULT_MIN_ZOOM, max_zoom: DEFAULT_MAX_ZOOM }
    }
}

impl Viewport {
    /// Identity viewport with a custom zoom range. An invalid range falls back
    /// to the default one.
    #[must_use]
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        if !valid_zoom_range(min_zoom, max_zoom) {
            tracing::warn!(min_zoom, max_zoom, "invalid zoom range; using defaults");
            return Self::default();
        }
        Self { min_zoom, max_zoom, zoom: 1.0_f64.clamp(min_zoom, max_zoom), ..Self::default() }
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Convert a screen-space point to board coordinates.
    #[must_use]
    pub fn screen_to_board(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.offset_x) / self.zoom,
            y: (screen.y - self.offset_y) / self.zoom,
        }
    }

    /// Convert a board-space point to screen coordinates.
    #[must_use]
    pub fn board_to_screen(&self, board: Point) -> Point {
        Point {
            x: board.x * self.zoom + self.offset_x,
            y: board.y * self.zoom + self.offset_y,
        }
    }

    /// Convert a screen-space distance (pixels) to board-space distance.
    #[must_use]
    pub fn screen_dist_to_board(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Shift the view by a screen-space delta. Unconstrained.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Set the zoom factor, clamped to the configured range, keeping the
    /// screen origin fixed. Returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom_at(zoom, Point::new(0.0, 0.0))
    }

    /// Set the zoom factor, clamped to the configured range, keeping the board
    /// point under `anchor` (screen space) fixed. Returns the zoom actually applied.
    pub fn zoom_at(&mut self, zoom: f64, anchor: Point) -> f64 {
        if !zoom.is_finite() {
            return self.zoom;
        }
        let board_anchor = self.screen_to_board(anchor);
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.offset_x = anchor.x - board_anchor.x * self.zoom;
        self.offset_y = anchor.y - board_anchor.y * self.zoom;
        self.zoom
    }

    /// Center `bounds` on a `screen_width` x `screen_height` surface, zooming
    /// so it fits inside `padding` pixels on every side.
    pub fn fit_to(&mut self, bounds: Rect, screen_width: f64, screen_height: f64, padding: f64) {
        let avail_w = (screen_width - 2.0 * padding).max(1.0);
        let avail_h = (screen_height - 2.0 * padding).max(1.0);
        let zoom = if bounds.width > 0.0 && bounds.height > 0.0 {
            (avail_w / bounds.width).min(avail_h / bounds.height)
        } else if bounds.width > 0.0 {
            avail_w / bounds.width
        } else if bounds.height > 0.0 {
            avail_h / bounds.height
        } else {
            1.0
        };
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let center = bounds.center();
        self.offset_x = screen_width / 2.0 - center.x * self.zoom;
        self.offset_y = screen_height / 2.0 - center.y * self.zoom;
    }
}
