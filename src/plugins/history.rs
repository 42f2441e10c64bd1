//! Undo/redo hotkeys.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::board::Board;
use crate::input::KeyEvent;
use crate::plugin::{EventFlow, Plugin};

/// Translates `mod+z` into undo and `mod+shift+z` / `mod+y` into redo.
pub struct HistoryPlugin;

impl Plugin for HistoryPlugin {
    fn name(&self) -> &'static str {
        "history"
    }

    fn on_key_down(&mut self, event: &KeyEvent, board: &mut Board) -> EventFlow {
        if !event.modifiers.command() {
            return EventFlow::Continue;
        }
        let status = if event.is("z") && !event.modifiers.shift {
            board.undo()
        } else if event.is("z") || event.is("y") {
            board.redo()
        } else {
            return EventFlow::Continue;
        };
        debug!(key = %event.key, ?status, "history hotkey");
        EventFlow::Consumed
    }
}
