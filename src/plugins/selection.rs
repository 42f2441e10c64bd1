//! Click, toggle, marquee, and keyboard selection gestures.
//!
//! Marquee frames are applied as transient previews. On release the preview
//! is reverted and the final selection is committed as one recorded
//! `set_selection`, so a whole marquee drag is a single undo step.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use tracing::debug;

use crate::board::Board;
use crate::element::ElementId;
use crate::geometry::{Point, Rect};
use crate::hit;
use crate::input::{Button, KeyEvent, PointerEvent};
use crate::ops::Operation;
use crate::plugin::{EventFlow, Plugin};
use crate::selection::{self, Selection, SelectionPatch};

#[derive(Debug, Clone)]
struct MarqueeDrag {
    anchor_screen: Point,
    anchor_board: Point,
    /// Selection before the press; restored before committing.
    origin: Selection,
    /// Shift or command held: add hits to the original selection.
    additive: bool,
    /// Past the drag threshold.
    active: bool,
}

impl MarqueeDrag {
    fn ids_for(&self, board: &Board, rect: &Rect) -> Vec<ElementId> {
        let hits = selection::marquee_hits(board.scene(), rect);
        if self.additive {
            self.origin.ids().iter().cloned().chain(hits).collect()
        } else {
            hits
        }
    }
}

/// Selection gestures on empty space and command-clicks, plus selection hotkeys.
#[derive(Debug, Default)]
pub struct SelectionPlugin {
    marquee: Option<MarqueeDrag>,
}

fn commit(board: &mut Board, patch: SelectionPatch) {
    if let Err(err) = selection::update_select_area(board, patch) {
        debug!(error = %err, "selection change rejected");
    }
}

fn restore(board: &mut Board, origin: &Selection) {
    if let Err(err) = board.apply_transient(Operation::select(origin.clone())) {
        debug!(error = %err, "marquee preview revert rejected");
    }
}

impl Plugin for SelectionPlugin {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        if event.button != Button::Primary || board.is_read_only() {
            return EventFlow::Continue;
        }
        let board_pt = board.viewport().screen_to_board(event.screen());

        match hit::pick(board.scene(), board_pt) {
            Some(id) if event.modifiers.command() => {
                let mut ids = board.selection().ids().to_vec();
                match ids.iter().position(|s| *s == id) {
                    Some(i) => {
                        ids.remove(i);
                    }
                    None => ids.push(id),
                }
                commit(board, SelectionPatch::ids(ids));
            }
            Some(id) => commit(board, SelectionPatch::ids(vec![id])),
            None => {
                self.marquee = Some(MarqueeDrag {
                    anchor_screen: event.screen(),
                    anchor_board: board_pt,
                    origin: board.selection().clone(),
                    additive: event.modifiers.shift || event.modifiers.command(),
                    active: false,
                });
            }
        }
        EventFlow::Consumed
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        let Some(drag) = self.marquee.as_mut() else {
            return EventFlow::Continue;
        };
        if !drag.active && drag.anchor_screen.distance(event.screen()) < board.config().drag_threshold_px {
            return EventFlow::Consumed;
        }
        drag.active = true;
        let rect = Rect::from_corners(drag.anchor_board, board.viewport().screen_to_board(event.screen()));
        let ids = drag.ids_for(board, &rect);
        let patch = SelectionPatch { ids: Some(ids), marquee: Some(Some(rect)) };
        if let Err(err) = selection::preview_select_area(board, patch) {
            debug!(error = %err, "marquee preview rejected");
        }
        EventFlow::Consumed
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        let Some(drag) = self.marquee.take() else {
            return EventFlow::Continue;
        };
        if drag.active {
            let rect = Rect::from_corners(drag.anchor_board, board.viewport().screen_to_board(event.screen()));
            let ids = drag.ids_for(board, &rect);
            restore(board, &drag.origin);
            commit(board, SelectionPatch::ids(ids));
        } else if !drag.additive && !drag.origin.is_empty() {
            // Plain click on empty space.
            commit(board, SelectionPatch::ids(Vec::new()));
        }
        EventFlow::Consumed
    }

    fn on_key_down(&mut self, event: &KeyEvent, board: &mut Board) -> EventFlow {
        if board.is_read_only() {
            return EventFlow::Continue;
        }
        if event.modifiers.command() && event.is("a") {
            let all = board.scene().root().to_vec();
            commit(board, SelectionPatch::ids(all));
            return EventFlow::Consumed;
        }
        if event.is("Escape") {
            if let Some(drag) = self.marquee.take() {
                restore(board, &drag.origin);
            }
            if !board.selection().is_empty() {
                commit(board, SelectionPatch::ids(Vec::new()));
            }
            return EventFlow::Consumed;
        }
        if (event.is("Delete") || event.is("Backspace")) && !board.selection().is_empty() {
            let scene = board.scene();
            let selected = board.selection().ids();
            // Skip ids already covered by a selected ancestor.
            let ops: Vec<Operation> = selected
                .iter()
                .filter(|id| !scene.ancestors(id).iter().any(|a| selected.contains(a)))
                .map(|id| Operation::remove(id.clone()))
                .collect();
            match board.apply_batch(ops) {
                Ok(applied) => debug!(removed = applied.len(), "deleted selection"),
                Err(err) => debug!(error = %err, "delete rejected"),
            }
            return EventFlow::Consumed;
        }
        EventFlow::Continue
    }
}
