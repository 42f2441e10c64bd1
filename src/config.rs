//! Board configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::consts::{
    DEFAULT_COALESCE_WINDOW_MS, DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_ZOOM,
    DEFAULT_MIN_ZOOM,
};

/// Tuning knobs for a board and its built-in plugins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardConfig {
    /// Maximum number of undo (and redo) entries kept.
    pub history_limit: usize,
    /// Consecutive property patches on the same elements closer than this merge.
    pub coalesce_window: Duration,
    /// Lower zoom clamp.
    pub min_zoom: f64,
    /// Upper zoom clamp.
    pub max_zoom: f64,
    /// Screen distance before a press turns into a drag.
    pub drag_threshold_px: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            coalesce_window: Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS),
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

impl BoardConfig {
    /// Build typed board config from environment variables.
    ///
    /// Optional:
    /// - `BOARD_HISTORY_LIMIT`: default 100
    /// - `BOARD_COALESCE_WINDOW_MS`: default 1000
    /// - `BOARD_MIN_ZOOM` / `BOARD_MAX_ZOOM`: default 0.1 / 10.0
    /// - `BOARD_DRAG_THRESHOLD_PX`: default 5.0
    ///
    /// Unparseable values fall back to their defaults. An invalid zoom range
    /// falls back to the default range as a whole.
    #[must_use]
    pub fn from_env() -> Self {
        let mut min_zoom = env_parse("BOARD_MIN_ZOOM", DEFAULT_MIN_ZOOM);
        let mut max_zoom = env_parse("BOARD_MAX_ZOOM", DEFAULT_MAX_ZOOM);
        if !valid_zoom_range(min_zoom, max_zoom) {
            tracing::warn!(min_zoom, max_zoom, "invalid zoom range; using defaults");
            min_zoom = DEFAULT_MIN_ZOOM;
            max_zoom = DEFAULT_MAX_ZOOM;
        }

        Self {
            history_limit: env_parse("BOARD_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT),
            coalesce_window: Duration::from_millis(env_parse("BOARD_COALESCE_WINDOW_MS", DEFAULT_COALESCE_WINDOW_MS)),
            min_zoom,
            max_zoom,
            drag_threshold_px: env_parse("BOARD_DRAG_THRESHOLD_PX", DEFAULT_DRAG_THRESHOLD_PX),
        }
    }
}

/// True when both bounds are finite and `0 < min <= max`.
pub(crate) fn valid_zoom_range(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min > 0.0 && min <= max
}

/// Parse `key` from the environment, falling back to `default` when unset or unparseable.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
