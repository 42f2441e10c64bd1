//! Built-in plugins and the default pipeline order.
//!
//! | Plugin | Handles |
//! |--------|---------|
//! | [`history::HistoryPlugin`] | `mod+z` undo, `mod+shift+z` / `mod+y` redo |
//! | [`viewport::ViewportPlugin`] | Pan drags, wheel pan/zoom, zoom hotkeys, fit-to-view |
//! | [`transform::TransformPlugin`] | Move, resize, rotate, and nudge the selection |
//! | [`selection::SelectionPlugin`] | Click, toggle, marquee, select-all, delete, escape |
//!
//! Order matters: the transform plugin claims presses on elements and
//! handles, so the selection plugin only sees presses on empty space and
//! command-clicks.

pub mod history;
pub mod selection;
pub mod transform;
pub mod viewport;

use crate::plugin::Pipeline;

/// Pipeline with every built-in plugin in its standard order.
#[must_use]
pub fn default_pipeline() -> Pipeline {
    Pipeline::new()
        .with(history::HistoryPlugin)
        .with(viewport::ViewportPlugin::default())
        .with(transform::TransformPlugin::default())
        .with(selection::SelectionPlugin::default())
}
