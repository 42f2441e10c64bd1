//! Hit testing: which element, or which of its handles, lies under a point.
//!
//! Queries map the board point into each element's local frame and test the
//! untransformed path there. Groups have no outline of their own; they are hit
//! when any descendant is, and their bounds are the union of their children.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::element::{Element, ElementId};
use crate::geometry::{Placement, Point, Rect, is_point_in_path, placed_bounds};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::viewport::Viewport;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    /// Handle position as fractions of the box, `(0, 0)` top-left to `(1, 1)` bottom-right.
    #[must_use]
    pub fn unit_position(self) -> (f64, f64) {
        match self {
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
            Self::Nw => (0.0, 0.0),
        }
    }

    /// Which edges this handle drags: `-1` for left/top, `1` for right/bottom, `0` for neither.
    #[must_use]
    pub fn edge_signs(self) -> (i8, i8) {
        match self {
            Self::N => (0, -1),
            Self::Ne => (1, -1),
            Self::E => (1, 0),
            Self::Se => (1, 1),
            Self::S => (0, 1),
            Self::Sw => (-1, 1),
            Self::W => (-1, 0),
            Self::Nw => (-1, -1),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// The element's unscaled box placement; handle positions live in this frame.
#[must_use]
pub fn box_placement(el: &Element) -> Placement {
    Placement { scale_x: 1.0, scale_y: 1.0, ..el.placement() }
}

/// Whether board point `p` falls inside element `id`'s filled geometry.
#[must_use]
pub fn element_contains(scene: &Scene, id: &ElementId, p: Point) -> bool {
    let Some(el) = scene.get(id) else {
        return false;
    };
    match el.local_path() {
        Some((path, rule)) => {
            let local = el.placement().board_to_local(p);
            is_point_in_path(&path, rule, local.x, local.y)
        }
        None => el.children().iter().any(|child| element_contains(scene, child, p)),
    }
}

/// Axis-aligned board bounds of element `id`, including its rotation.
/// `None` for unknown ids and for empty groups.
#[must_use]
pub fn element_bounds(scene: &Scene, id: &ElementId) -> Option<Rect> {
    let el = scene.get(id)?;
    match el.local_path() {
        Some((path, _)) => placed_bounds(&path, &el.placement()),
        None => union_bounds(scene, el.children()),
    }
}

/// Union of the bounds of `ids`, skipping any without bounds.
#[must_use]
pub fn union_bounds(scene: &Scene, ids: &[ElementId]) -> Option<Rect> {
    ids.iter()
        .filter_map(|id| element_bounds(scene, id))
        .reduce(|acc, r| acc.union(&r))
}

/// Topmost top-level element whose geometry contains board point `p`.
#[must_use]
pub fn pick(scene: &Scene, p: Point) -> Option<ElementId> {
    scene
        .draw_order()
        .into_iter()
        .rev()
        .filter(|el| !el.is_group())
        .find(|el| element_contains(scene, &el.id, p))
        .and_then(|el| scene.top_level_ancestor(&el.id))
}

/// Board position of a resize handle on `el`.
#[must_use]
pub fn anchor_point(el: &Element, anchor: ResizeAnchor) -> Point {
    let (u, v) = anchor.unit_position();
    box_placement(el).local_to_board(Point::new(u * el.width, v * el.height))
}

/// Board position of `el`'s rotate handle at the given zoom.
#[must_use]
pub fn rotate_handle_point(el: &Element, zoom: f64) -> Point {
    box_placement(el).local_to_board(Point::new(el.width / 2.0, -ROTATE_HANDLE_OFFSET_PX / zoom))
}

/// Test which element (if any) is under `board_pt`, checking handles of a
/// single selected non-group element first.
#[must_use]
pub fn hit_test(board_pt: Point, scene: &Scene, viewport: &Viewport, selection: &Selection) -> Option<Hit> {
    if let [selected_id] = selection.ids() {
        if let Some(el) = scene.get(selected_id).filter(|el| !el.is_group()) {
            let slop = viewport.screen_dist_to_board(HANDLE_RADIUS_PX);
            if rotate_handle_point(el, viewport.zoom()).distance(board_pt) <= slop {
                return Some(Hit { element_id: el.id.clone(), part: HitPart::RotateHandle });
            }
            for anchor in ResizeAnchor::ALL {
                if anchor_point(el, anchor).distance(board_pt) <= slop {
                    return Some(Hit { element_id: el.id.clone(), part: HitPart::ResizeHandle(anchor) });
                }
            }
        }
    }
    pick(scene, board_pt).map(|element_id| Hit { element_id, part: HitPart::Body })
}
