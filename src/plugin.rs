//! Plugin trait and the ordered dispatch pipeline.
//!
//! DESIGN
//! ======
//! A plugin implements any subset of the five handlers; the rest default to
//! `EventFlow::Continue`. The pipeline calls plugins in registration order
//! and stops at the first one that returns `Consumed`. Order is fixed by
//! whoever builds the pipeline; there is no priority resolution.
//!
//! Gesture state (an in-progress drag, a marquee anchor) lives inside the
//! plugin that owns the gesture. Plugins share nothing but the board.

#[cfg(test)]
#[path = "plugin_test.rs"]
mod plugin_test;

use tracing::debug;

use crate::board::Board;
use crate::input::{InputEvent, KeyEvent, PointerEvent, WheelEvent};

/// Whether later plugins should see the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    /// Not handled here; pass it on.
    Continue,
    /// Handled; stop propagation.
    Consumed,
}

/// An input handler in the pipeline.
pub trait Plugin {
    /// Unique name. Registering a second plugin with the same name replaces the first.
    fn name(&self) -> &'static str;

    fn on_key_down(&mut self, _event: &KeyEvent, _board: &mut Board) -> EventFlow {
        EventFlow::Continue
    }

    fn on_pointer_down(&mut self, _event: &PointerEvent, _board: &mut Board) -> EventFlow {
        EventFlow::Continue
    }

    fn on_pointer_move(&mut self, _event: &PointerEvent, _board: &mut Board) -> EventFlow {
        EventFlow::Continue
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, _board: &mut Board) -> EventFlow {
        EventFlow::Continue
    }

    fn on_wheel(&mut self, _event: &WheelEvent, _board: &mut Board) -> EventFlow {
        EventFlow::Continue
    }
}

/// Ordered chain of plugins.
#[derive(Default)]
pub struct Pipeline {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `plugin`, or replace the registered plugin with the same name in place.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        match self.plugins.iter().position(|p| p.name() == name) {
            Some(i) => self.plugins[i] = plugin,
            None => self.plugins.push(plugin),
        }
    }

    /// Builder form of [`Pipeline::register`].
    #[must_use]
    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.register(Box::new(plugin));
        self
    }

    /// Registered plugin names, in dispatch order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Offer `event` to each plugin in order until one consumes it.
    /// Returns the name of the consuming plugin.
    pub fn dispatch(&mut self, event: &InputEvent, board: &mut Board) -> Option<&'static str> {
        for plugin in &mut self.plugins {
            let flow = match event {
                InputEvent::KeyDown(e) => plugin.on_key_down(e, board),
                InputEvent::PointerDown(e) => plugin.on_pointer_down(e, board),
                InputEvent::PointerMove(e) => plugin.on_pointer_move(e, board),
                InputEvent::PointerUp(e) => plugin.on_pointer_up(e, board),
                InputEvent::Wheel(e) => plugin.on_wheel(e, board),
            };
            if flow == EventFlow::Consumed {
                debug!(plugin = plugin.name(), "event consumed");
                return Some(plugin.name());
            }
        }
        None
    }
}
