//! Pan and zoom gestures. Viewport changes never touch history.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::debug;

use crate::board::Board;
use crate::consts::{FIT_VIEW_PADDING_PX, PAN_STEP_PX, ZOOM_STEP};
use crate::geometry::Point;
use crate::hit;
use crate::input::{Button, KeyEvent, PointerEvent, WheelEvent};
use crate::plugin::{EventFlow, Plugin};

/// Secondary/middle drag pans, wheel pans (ctrl+wheel zooms), zoom hotkeys,
/// `mod+o` fits content, arrows pan when nothing is selected.
#[derive(Debug, Default)]
pub struct ViewportPlugin {
    /// Screen position of the previous pan sample while a pan drag is active.
    panning: Option<Point>,
}

impl ViewportPlugin {
    /// Fit the selection, or everything when nothing is selected.
    fn fit(board: &mut Board) {
        let (width, height) = board.screen_size();
        if width <= 0.0 || height <= 0.0 {
            debug!("fit skipped: screen size unknown");
            return;
        }
        let ids = if board.selection().is_empty() {
            board.scene().root().to_vec()
        } else {
            board.selection().ids().to_vec()
        };
        let Some(bounds) = hit::union_bounds(board.scene(), &ids) else {
            return;
        };
        board.viewport_mut().fit_to(bounds, width, height, FIT_VIEW_PADDING_PX);
        debug!(zoom = board.viewport().zoom(), "fit to content");
    }
}

impl Plugin for ViewportPlugin {
    fn name(&self) -> &'static str {
        "viewport"
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, _board: &mut Board) -> EventFlow {
        if matches!(event.button, Button::Secondary | Button::Middle) {
            self.panning = Some(event.screen());
            return EventFlow::Consumed;
        }
        EventFlow::Continue
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, board: &mut Board) -> EventFlow {
        let Some(last) = self.panning else {
            return EventFlow::Continue;
        };
        let now = event.screen();
        board.viewport_mut().pan_by(now.x - last.x, now.y - last.y);
        self.panning = Some(now);
        EventFlow::Consumed
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, _board: &mut Board) -> EventFlow {
        if self.panning.take().is_some() {
            return EventFlow::Consumed;
        }
        EventFlow::Continue
    }

    fn on_wheel(&mut self, event: &WheelEvent, board: &mut Board) -> EventFlow {
        let viewport = board.viewport_mut();
        if event.modifiers.ctrl {
            if event.dy.abs() < f64::EPSILON {
                return EventFlow::Continue;
            }
            let factor = if event.dy < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            viewport.zoom_at(viewport.zoom() * factor, event.screen());
        } else {
            viewport.pan_by(-event.dx, -event.dy);
        }
        EventFlow::Consumed
    }

    fn on_key_down(&mut self, event: &KeyEvent, board: &mut Board) -> EventFlow {
        if event.modifiers.command() {
            let viewport = board.viewport_mut();
            if event.is("=") || event.is("+") {
                viewport.set_zoom(viewport.zoom() * ZOOM_STEP);
            } else if event.is("-") {
                viewport.set_zoom(viewport.zoom() / ZOOM_STEP);
            } else if event.is("0") {
                viewport.set_zoom(1.0);
            } else if event.is("o") {
                Self::fit(board);
            } else {
                return EventFlow::Continue;
            }
            return EventFlow::Consumed;
        }

        if !board.selection().is_empty() {
            return EventFlow::Continue;
        }
        let (dx, dy) = match event.key.as_str() {
            "ArrowLeft" => (PAN_STEP_PX, 0.0),
            "ArrowRight" => (-PAN_STEP_PX, 0.0),
            "ArrowUp" => (0.0, PAN_STEP_PX),
            "ArrowDown" => (0.0, -PAN_STEP_PX),
            _ => return EventFlow::Continue,
        };
        board.viewport_mut().pan_by(dx, dy);
        EventFlow::Consumed
    }
}
