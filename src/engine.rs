//! The engine: one board, one plugin pipeline, one resource loader.
//!
//! Hosts feed every input event to [`Engine::handle`]. After each event the
//! engine forwards any resource work the board queued to the loader. Loaded
//! resources come back through [`Engine::poll_resources`] (non-blocking, once
//! per frame) or [`Engine::settle_resources`] (await everything in flight).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tokio::runtime::Handle;
use tracing::debug;

use crate::board::Board;
use crate::config::BoardConfig;
use crate::input::InputEvent;
use crate::plugin::Pipeline;
use crate::plugins;
use crate::resource::{ResourceLoader, ResourceOutcome};

/// Counts of delivered resource completions by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceReport {
    pub applied: usize,
    pub failed: usize,
    pub stale: usize,
}

impl ResourceReport {
    fn count(&mut self, outcome: ResourceOutcome) {
        match outcome {
            ResourceOutcome::Applied => self.applied += 1,
            ResourceOutcome::Failed => self.failed += 1,
            ResourceOutcome::Stale => self.stale += 1,
        }
    }
}

/// Board plus the machinery that drives it.
pub struct Engine {
    pub board: Board,
    pub pipeline: Pipeline,
    loader: ResourceLoader,
}

impl Engine {
    /// An engine over `board`, dispatching through `pipeline`, loading resources with `loader`.
    #[must_use]
    pub fn new(board: Board, pipeline: Pipeline, loader: ResourceLoader) -> Self {
        let mut engine = Self { board, pipeline, loader };
        engine.flush_resource_commands();
        engine
    }

    /// An empty board with the built-in plugins.
    #[must_use]
    pub fn with_default_plugins(config: BoardConfig, handle: Handle) -> Self {
        Self::new(Board::new(config), plugins::default_pipeline(), ResourceLoader::new(handle))
    }

    /// Dispatch one input event. Returns the name of the plugin that consumed it.
    pub fn handle(&mut self, event: &InputEvent) -> Option<&'static str> {
        let consumed = self.pipeline.dispatch(event, &mut self.board);
        if consumed.is_none() {
            debug!(?event, "event not consumed");
        }
        self.flush_resource_commands();
        consumed
    }

    /// Forward queued resource work to the loader. Call after mutating
    /// `board` directly (outside [`Engine::handle`]).
    pub fn flush_resource_commands(&mut self) {
        for command in self.board.take_resource_commands() {
            self.loader.run(command);
        }
    }

    /// Number of resource loads still running.
    #[must_use]
    pub fn pending_resources(&self) -> usize {
        self.loader.in_flight()
    }

    /// Deliver every completion already available, without waiting.
    pub fn poll_resources(&mut self) -> ResourceReport {
        self.flush_resource_commands();
        let mut report = ResourceReport::default();
        while let Some(completion) = self.loader.try_next() {
            report.count(self.board.deliver_resource(completion));
        }
        report
    }

    /// Wait for every in-flight load and deliver each completion.
    pub async fn settle_resources(&mut self) -> ResourceReport {
        self.flush_resource_commands();
        let mut report = ResourceReport::default();
        while let Some(completion) = self.loader.next().await {
            report.count(self.board.deliver_resource(completion));
        }
        report
    }
}
