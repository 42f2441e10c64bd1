//! Shared numeric constants for the whiteboard crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest zoom factor a viewport may reach.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Largest zoom factor a viewport may reach.
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Multiplicative zoom step for wheel and keyboard zoom.
pub const ZOOM_STEP: f64 = 1.1;

/// Padding in screen pixels kept around content by fit-to-view.
pub const FIT_VIEW_PADDING_PX: f64 = 50.0;

// ── History ─────────────────────────────────────────────────────

/// Default maximum number of undo (and redo) entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Default window in milliseconds for coalescing property patches.
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 1000;

// ── Gestures ────────────────────────────────────────────────────

/// Screen distance in pixels a press must travel before it becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

/// Screen-space hit slop in pixels for resize and rotate handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Minimum width or height a resize may produce, in board units.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Rotation snap increment in degrees while shift is held.
pub const ROTATE_SNAP_DEG: f64 = 15.0;

/// Keyboard nudge distance in board units.
pub const NUDGE_STEP: f64 = 5.0;

/// Keyboard nudge distance in board units while alt is held.
pub const NUDGE_STEP_PRECISE: f64 = 1.0;

/// Keyboard pan distance in screen pixels.
pub const PAN_STEP_PX: f64 = 20.0;
