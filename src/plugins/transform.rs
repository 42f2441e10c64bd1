//! Move, resize, rotate, and nudge gestures.
//!
//! DESIGN
//! ======
//! Every pointer-move during a gesture issues absolute property patches
//! computed from the state captured at pointer-down, never increments. The
//! history coalesces them into one entry because they target the same
//! elements, and pointer-up seals the run so the next gesture starts fresh.
//!
//! Resizing works in the element's rotated frame: the pointer delta is rotated
//! back into local axes, the dragged edges grow or shrink, and the opposite
//! handle stays fixed on the board.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use tracing::debug;

use crate::board::Board;
use crate::consts::{MIN_ELEMENT_SIZE, NUDGE_STEP, NUDGE_STEP_PRECISE, ROTATE_SNAP_DEG};
use crate::element::{Element, ElementId, PropertyPatch};
use crate::geometry::{Point, rotate_vector};
use crate::hit::{self, HitPart, ResizeAnchor, box_placement};
use crate::input::{Button, KeyEvent, PointerEvent};
use crate::ops::Operation;
use crate::plugin::{EventFlow, Plugin};
use crate::selection::{self, SelectionPatch};

/// The gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Pressed on an element body; not yet past the drag threshold.
    Pending { origin_screen: Point, origin_board: Point },
    /// Dragging the selection. `originals` holds each moved element's starting position.
    Moving { origin_board: Point, originals: Vec<(ElementId, f64, f64)> },
    /// Dragging a resize handle of `original`.
    Resizing { anchor: ResizeAnchor, start_board: Point, original: Element },
    /// Dragging the rotate handle around `center`.
    Rotating { id: ElementId, center: Point, orig_rotation: f64, start_angle: f64 },
}

/// Translates drags on elements and handles into property patches.
#[derive(Debug, Default)]
pub struct TransformPlugin {
    gesture: Gesture,
}

impl TransformPlugin {
    fn begin_press(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        let board_pt = board.viewport().screen_to_board(event.screen());
        let Some(hit) = hit::hit_test(board_pt, board.scene(), board.viewport(), board.selection()) else {
            return EventFlow::Continue;
        };

        match hit.part {
            HitPart::ResizeHandle(anchor) => {
                let Some(original) = board.scene().get(&hit.element_id).cloned() else {
                    return EventFlow::Continue;
                };
                self.gesture = Gesture::Resizing { anchor, start_board: board_pt, original };
            }
            HitPart::RotateHandle => {
                let Some(el) = board.scene().get(&hit.element_id) else {
                    return EventFlow::Continue;
                };
                let center = box_placement(el).local_to_board(Point::new(el.width / 2.0, el.height / 2.0));
                self.gesture = Gesture::Rotating {
                    id: hit.element_id.clone(),
                    center,
                    orig_rotation: el.rotation,
                    start_angle: angle_deg(center, board_pt),
                };
            }
            HitPart::Body => {
                if !board.selection().contains(&hit.element_id) {
                    let ids = if event.modifiers.shift {
                        let mut ids = board.selection().ids().to_vec();
                        ids.push(hit.element_id.clone());
                        ids
                    } else {
                        vec![hit.element_id.clone()]
                    };
                    if let Err(err) = selection::update_select_area(board, SelectionPatch::ids(ids)) {
                        debug!(error = %err, "select on press rejected");
                        return EventFlow::Consumed;
                    }
                }
                self.gesture = Gesture::Pending { origin_screen: event.screen(), origin_board: board_pt };
            }
        }
        EventFlow::Consumed
    }
}

impl Plugin for TransformPlugin {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        if event.button != Button::Primary || event.modifiers.command() || board.is_read_only() {
            return EventFlow::Continue;
        }
        self.begin_press(event, board)
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        let board_pt = board.viewport().screen_to_board(event.screen());

        if let Gesture::Pending { origin_screen, origin_board } = &self.gesture {
            if origin_screen.distance(event.screen()) < board.config().drag_threshold_px {
                return EventFlow::Consumed;
            }
            self.gesture = Gesture::Moving { origin_board: *origin_board, originals: move_targets(board) };
        }

        match &self.gesture {
            Gesture::Idle => return EventFlow::Continue,
            Gesture::Pending { .. } => {}
            Gesture::Moving { origin_board, originals } => {
                let (dx, dy) = (board_pt.x - origin_board.x, board_pt.y - origin_board.y);
                let ops = originals
                    .iter()
                    .map(|(id, x, y)| Operation::set_properties(id.clone(), PropertyPatch::position(x + dx, y + dy)))
                    .collect();
                if let Err(err) = board.apply_batch(ops) {
                    debug!(error = %err, "move rejected; gesture dropped");
                    self.gesture = Gesture::Idle;
                }
            }
            Gesture::Resizing { anchor, start_board, original } => {
                let delta = Point::new(board_pt.x - start_board.x, board_pt.y - start_board.y);
                let patch = resize_patch(original, *anchor, delta);
                if let Err(err) = board.apply(Operation::set_properties(original.id.clone(), patch)) {
                    debug!(error = %err, "resize rejected; gesture dropped");
                    self.gesture = Gesture::Idle;
                }
            }
            Gesture::Rotating { id, center, orig_rotation, start_angle } => {
                let mut rotation = orig_rotation + angle_deg(*center, board_pt) - start_angle;
                if event.modifiers.shift {
                    rotation = (rotation / ROTATE_SNAP_DEG).round() * ROTATE_SNAP_DEG;
                }
                let patch = PropertyPatch { rotation: Some(rotation.rem_euclid(360.0)), ..PropertyPatch::default() };
                if let Err(err) = board.apply(Operation::set_properties(id.clone(), patch)) {
                    debug!(error = %err, "rotate rejected; gesture dropped");
                    self.gesture = Gesture::Idle;
                }
            }
        }
        EventFlow::Consumed
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, board: &mut Board) -> EventFlow {
        if matches!(std::mem::take(&mut self.gesture), Gesture::Idle) {
            return EventFlow::Continue;
        }
        board.seal_history();
        EventFlow::Consumed
    }

    fn on_key_down(&mut self, event: &KeyEvent, board: &mut Board) -> EventFlow {
        if event.modifiers.command() || board.selection().is_empty() || board.is_read_only() {
            return EventFlow::Continue;
        }
        let step = if event.modifiers.alt { NUDGE_STEP_PRECISE } else { NUDGE_STEP };
        let (dx, dy) = match event.key.as_str() {
            "ArrowLeft" => (-step, 0.0),
            "ArrowRight" => (step, 0.0),
            "ArrowUp" => (0.0, -step),
            "ArrowDown" => (0.0, step),
            _ => return EventFlow::Continue,
        };
        let ops = move_targets(board)
            .into_iter()
            .map(|(id, x, y)| Operation::set_properties(id, PropertyPatch::position(x + dx, y + dy)))
            .collect();
        if let Err(err) = board.apply_batch(ops) {
            debug!(error = %err, "nudge rejected");
        }
        EventFlow::Consumed
    }
}

/// Every selected element plus its descendants, each once, with its current position.
fn move_targets(board: &Board) -> Vec<(ElementId, f64, f64)> {
    let scene = board.scene();
    let mut ids: Vec<ElementId> = Vec::new();
    for id in board.selection().ids() {
        for target in std::iter::once(id.clone()).chain(scene.descendants(id)) {
            if !ids.contains(&target) {
                ids.push(target);
            }
        }
    }
    ids.into_iter()
        .filter_map(|id| {
            let el = scene.get(&id)?;
            let (x, y) = (el.x, el.y);
            Some((id, x, y))
        })
        .collect()
}

/// Direction from `center` to `p` in degrees, clockwise from +x on screen.
fn angle_deg(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}

/// New box for `original` after dragging `anchor` by `delta` (board units).
pub(crate) fn resize_patch(original: &Element, anchor: ResizeAnchor, delta: Point) -> PropertyPatch {
    let local = rotate_vector(delta, -original.rotation);
    let (sx, sy) = anchor.edge_signs();
    let (u, v) = anchor.unit_position();

    let width = if sx == 0 {
        original.width
    } else {
        (original.width + f64::from(sx) * local.x).max(MIN_ELEMENT_SIZE)
    };
    let height = if sy == 0 {
        original.height
    } else {
        (original.height + f64::from(sy) * local.y).max(MIN_ELEMENT_SIZE)
    };

    // The opposite handle keeps its board position.
    let fixed = box_placement(original).local_to_board(Point::new((1.0 - u) * original.width, (1.0 - v) * original.height));
    let offset = rotate_vector(
        Point::new((1.0 - u) * width - width / 2.0, (1.0 - v) * height - height / 2.0),
        original.rotation,
    );
    let (cx, cy) = (fixed.x - offset.x, fixed.y - offset.y);

    PropertyPatch {
        x: Some(cx - width / 2.0),
        y: Some(cy - height / 2.0),
        width: Some(width),
        height: Some(height),
        ..PropertyPatch::default()
    }
}
