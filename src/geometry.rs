//! Pure geometry: points, rectangles, path descriptions, and point-in-path tests.
//!
//! DESIGN
//! ======
//! Nothing here holds state. Paths are plain command lists so they can live
//! inside serialized elements; they are lowered to a `kurbo::BezPath` only for
//! the duration of a query. Open sub-paths are closed implicitly for fill
//! queries, matching 2D canvas fill semantics.
//!
//! Hit tests never transform the path. Callers map the query point into the
//! element's local frame with [`Placement::board_to_local`] and test there.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use kurbo::{Affine, BezPath, Shape};
use serde::{Deserialize, Serialize};

/// Control-point ratio for approximating a quarter ellipse with one cubic.
const KAPPA: f64 = 0.552_284_749_830_793_6;

// =============================================================================
// POINT / RECT
// =============================================================================

/// A point in either screen or board space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    fn from_kurbo(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Axis-aligned rectangle with a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners (e.g. a drag anchor and focus).
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Whether the two rectangles overlap by a positive amount on both axes.
    ///
    /// Rectangles that merely share an edge do not intersect. A degenerate
    /// rectangle (zero width or height) intersects when it lies strictly
    /// inside the other's span.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x() && other.x < self.max_x() && self.y < other.max_y() && other.y < self.max_y()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    fn from_kurbo(r: kurbo::Rect) -> Self {
        Self { x: r.x0, y: r.y0, width: r.width(), height: r.height() }
    }
}

// =============================================================================
// PATHS
// =============================================================================

/// Fill rule deciding which regions of a self-overlapping path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// One drawing command of a path description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { x1: f64, y1: f64, x: f64, y: f64 },
    CubicTo { x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64 },
    Close,
}

impl PathCommand {
    /// Closed rectangle from the origin to `(width, height)`.
    #[must_use]
    pub fn rect(width: f64, height: f64) -> Vec<PathCommand> {
        vec![
            Self::MoveTo { x: 0.0, y: 0.0 },
            Self::LineTo { x: width, y: 0.0 },
            Self::LineTo { x: width, y: height },
            Self::LineTo { x: 0.0, y: height },
            Self::Close,
        ]
    }

    /// Closed ellipse inscribed in the box from the origin to `(width, height)`.
    #[must_use]
    pub fn ellipse(width: f64, height: f64) -> Vec<PathCommand> {
        let (rx, ry) = (width / 2.0, height / 2.0);
        let (cx, cy) = (rx, ry);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        vec![
            Self::MoveTo { x: cx + rx, y: cy },
            Self::CubicTo { x1: cx + rx, y1: cy + ky, x2: cx + kx, y2: cy + ry, x: cx, y: cy + ry },
            Self::CubicTo { x1: cx - kx, y1: cy + ry, x2: cx - rx, y2: cy + ky, x: cx - rx, y: cy },
            Self::CubicTo { x1: cx - rx, y1: cy - ky, x2: cx - kx, y2: cy - ry, x: cx, y: cy - ry },
            Self::CubicTo { x1: cx + kx, y1: cy - ry, x2: cx + rx, y2: cy - ky, x: cx + rx, y: cy },
            Self::Close,
        ]
    }

    /// Closed polygon through `points`.
    #[must_use]
    pub fn polygon(points: &[Point]) -> Vec<PathCommand> {
        let mut commands = Vec::with_capacity(points.len() + 1);
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                commands.push(Self::MoveTo { x: p.x, y: p.y });
            } else {
                commands.push(Self::LineTo { x: p.x, y: p.y });
            }
        }
        if !commands.is_empty() {
            commands.push(Self::Close);
        }
        commands
    }
}

/// Lower a command list to a kurbo path with every sub-path closed.
///
/// Drawing commands with no current sub-path start one at their first point,
/// and drawing after `Close` resumes from the closed sub-path's start.
fn lower(commands: &[PathCommand]) -> BezPath {
    let mut path = BezPath::new();
    let mut open = false;
    let mut start: Option<kurbo::Point> = None;

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo { x, y } => {
                if open {
                    path.close_path();
                }
                let p = kurbo::Point::new(x, y);
                path.move_to(p);
                start = Some(p);
                open = true;
            }
            PathCommand::LineTo { x, y } => {
                let p = kurbo::Point::new(x, y);
                ensure_subpath(&mut path, &mut open, &mut start, p);
                path.line_to(p);
            }
            PathCommand::QuadTo { x1, y1, x, y } => {
                let c = kurbo::Point::new(x1, y1);
                ensure_subpath(&mut path, &mut open, &mut start, c);
                path.quad_to(c, kurbo::Point::new(x, y));
            }
            PathCommand::CubicTo { x1, y1, x2, y2, x, y } => {
                let c1 = kurbo::Point::new(x1, y1);
                ensure_subpath(&mut path, &mut open, &mut start, c1);
                path.curve_to(c1, kurbo::Point::new(x2, y2), kurbo::Point::new(x, y));
            }
            PathCommand::Close => {
                if open {
                    path.close_path();
                    open = false;
                }
            }
        }
    }
    if open {
        path.close_path();
    }
    path
}

fn ensure_subpath(path: &mut BezPath, open: &mut bool, start: &mut Option<kurbo::Point>, first: kurbo::Point) {
    if !*open {
        let origin = start.unwrap_or(first);
        path.move_to(origin);
        *start = Some(origin);
        *open = true;
    }
}

/// Whether `(x, y)` lies inside the filled region of `path` under `fill_rule`.
///
/// Points exactly on the boundary resolve through the winding computation and
/// give the same answer on every call.
#[must_use]
pub fn is_point_in_path(path: &[PathCommand], fill_rule: FillRule, x: f64, y: f64) -> bool {
    if path.is_empty() || !x.is_finite() || !y.is_finite() {
        return false;
    }
    let winding = lower(path).winding(kurbo::Point::new(x, y));
    match fill_rule {
        FillRule::NonZero => winding != 0,
        FillRule::EvenOdd => winding % 2 != 0,
    }
}

/// Axis-aligned bounds of `path` after mapping it through `placement`.
///
/// Returns `None` for an empty path.
#[must_use]
pub fn placed_bounds(path: &[PathCommand], placement: &Placement) -> Option<Rect> {
    if path.is_empty() {
        return None;
    }
    let mut lowered = lower(path);
    lowered.apply_affine(placement.to_board());
    Some(Rect::from_kurbo(lowered.bounding_box()))
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// Where an element's local frame sits on the board.
///
/// Local geometry is first scaled by `scale_x`/`scale_y`, yielding a box from
/// the origin to `(width, height)`. That box is rotated clockwise by
/// `rotation` degrees about its center and translated so its unrotated
/// top-left corner lands on `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Placement {
    /// Local-to-board affine transform.
    #[must_use]
    pub fn to_board(&self) -> Affine {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        Affine::translate((self.x + hw, self.y + hh))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::translate((-hw, -hh))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Map a board point into local coordinates.
    ///
    /// A degenerate scale (zero) has no inverse; such placements map every
    /// point to a non-finite location, which no path contains.
    #[must_use]
    pub fn board_to_local(&self, p: Point) -> Point {
        let affine = self.to_board();
        if affine.determinant().abs() < f64::EPSILON {
            return Point::new(f64::NAN, f64::NAN);
        }
        Point::from_kurbo(affine.inverse() * p.to_kurbo())
    }

    /// Map a local point onto the board.
    #[must_use]
    pub fn local_to_board(&self, p: Point) -> Point {
        Point::from_kurbo(self.to_board() * p.to_kurbo())
    }
}

/// Rotate `v` clockwise (screen-space, y down) by `degrees`.
#[must_use]
pub fn rotate_vector(v: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
