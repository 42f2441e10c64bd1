//! The board aggregate: scene, selection, viewport, and history in one owner.
//!
//! DESIGN
//! ======
//! All document mutation enters through `apply`, `apply_transient`, or
//! `apply_batch`, and all three route through `ops::apply`. Rejections are
//! logged here and returned to the caller; they never leave the board
//! partially modified. A batch that fails midway is rolled back with the
//! inverses of the operations that already went through.
//!
//! Undo and redo replay stored operations through the same path, so their
//! side effects (selection pruning, resource bookkeeping) match a live edit.
//!
//! The board performs no I/O. Inserting or removing image elements queues
//! `ResourceCommand`s that the engine hands to the loader.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::element::{Element, ElementId, ElementKind};
use crate::history::{History, HistoryStatus};
use crate::ops::{self, AppliedOperation, ApplyError, Operation, Origin};
use crate::resource::{ResourceCommand, ResourceCompletion, ResourceOutcome, ResourceRequest};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::snapshot::{RenderView, SceneSnapshot, SnapshotError};
use crate::viewport::Viewport;

/// Whiteboard document plus its presentation state.
pub struct Board {
    scene: Scene,
    selection: Selection,
    viewport: Viewport,
    history: History,
    config: BoardConfig,
    read_only: bool,
    screen_width: f64,
    screen_height: f64,
    resources: HashMap<ElementId, Arc<[u8]>>,
    resource_commands: Vec<ResourceCommand>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    /// An empty board.
    #[must_use]
    pub fn new(config: BoardConfig) -> Self {
        Self {
            scene: Scene::new(),
            selection: Selection::default(),
            viewport: Viewport::with_zoom_range(config.min_zoom, config.max_zoom),
            history: History::from_config(&config),
            config,
            read_only: false,
            screen_width: 0.0,
            screen_height: 0.0,
            resources: HashMap::new(),
            resource_commands: Vec::new(),
        }
    }

    /// Replace the scene with `snapshot`. Selection and history are reset;
    /// the viewport is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when the snapshot's structure is invalid.
    /// The board is unchanged in that case.
    pub fn hydrate(&mut self, snapshot: SceneSnapshot) -> Result<(), SnapshotError> {
        let scene = snapshot.into_scene()?;
        let old_images: Vec<ElementId> =
            self.scene.elements().filter(|el| is_image(el)).map(|el| el.id.clone()).collect();
        for id in old_images {
            self.forget_resource(id);
        }
        self.scene = scene;
        self.selection = Selection::default();
        self.history.clear();
        let images: Vec<&Element> = self.scene.draw_order();
        let requests: Vec<ResourceCommand> =
            images.into_iter().filter_map(|el| load_request(&self.scene, el)).map(ResourceCommand::Load).collect();
        self.resource_commands.extend(requests);
        info!(elements = self.scene.len(), top_level = self.scene.root().len(), "board hydrated");
        Ok(())
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Viewport changes bypass the operation log and are not undoable.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        debug!(read_only, "board read-only changed");
    }

    /// Host surface size in screen pixels, used by fit-to-view.
    #[must_use]
    pub fn screen_size(&self) -> (f64, f64) {
        (self.screen_width, self.screen_height)
    }

    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Loaded bytes for an image element, if its load completed.
    #[must_use]
    pub fn resource(&self, id: &ElementId) -> Option<&Arc<[u8]>> {
        self.resources.get(id)
    }

    /// Persistable view of the scene.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::from_scene(&self.scene)
    }

    /// Per-frame read-only view for a renderer.
    #[must_use]
    pub fn render_view(&self) -> RenderView<'_> {
        RenderView { elements: self.scene.draw_order(), selection: &self.selection, viewport: &self.viewport }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Apply `op` and record it in history.
    ///
    /// # Errors
    ///
    /// Returns the [`ApplyError`] that rejected the operation; the board is unchanged.
    pub fn apply(&mut self, op: Operation) -> Result<AppliedOperation, ApplyError> {
        let applied = self.apply_checked(op)?;
        self.history.record(applied.clone());
        Ok(applied)
    }

    /// Apply `op` without recording it (previews, marquee updates).
    ///
    /// # Errors
    ///
    /// Returns the [`ApplyError`] that rejected the operation; the board is unchanged.
    pub fn apply_transient(&mut self, op: Operation) -> Result<AppliedOperation, ApplyError> {
        self.apply_checked(op)
    }

    /// Apply `ops` in order as one undo entry. All or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first rejection, after rolling back everything the batch applied.
    pub fn apply_batch(&mut self, ops: Vec<Operation>) -> Result<Vec<AppliedOperation>, ApplyError> {
        if self.read_only {
            return Err(self.reject_read_only(ops.first()));
        }
        let applied = self.apply_sequence(ops, Origin::Edit)?;
        self.history.record_batch(applied.clone());
        Ok(applied)
    }

    /// Like [`Board::apply_batch`], but not recorded.
    ///
    /// # Errors
    ///
    /// Returns the first rejection, after rolling back everything the batch applied.
    pub fn apply_batch_transient(&mut self, ops: Vec<Operation>) -> Result<Vec<AppliedOperation>, ApplyError> {
        if self.read_only {
            return Err(self.reject_read_only(ops.first()));
        }
        self.apply_sequence(ops, Origin::Edit)
    }

    /// End the current property-patch coalescing run.
    pub fn seal_history(&mut self) {
        self.history.seal();
    }

    /// Revert the most recent history entry.
    pub fn undo(&mut self) -> HistoryStatus {
        if self.read_only {
            return HistoryStatus::Blocked;
        }
        let Some(entry) = self.history.pop_undo() else {
            return HistoryStatus::Empty;
        };
        match self.apply_sequence(entry.inverse.clone(), Origin::Replay) {
            Ok(_) => {
                debug!(ops = entry.inverse.len(), "undo");
                self.history.push_redo(entry);
                HistoryStatus::Applied
            }
            Err(err) => {
                warn!(error = %err, "undo entry no longer applies; dropped");
                HistoryStatus::Blocked
            }
        }
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> HistoryStatus {
        if self.read_only {
            return HistoryStatus::Blocked;
        }
        let Some(entry) = self.history.pop_redo() else {
            return HistoryStatus::Empty;
        };
        match self.apply_sequence(entry.forward.clone(), Origin::Replay) {
            Ok(_) => {
                debug!(ops = entry.forward.len(), "redo");
                self.history.push_undo(entry);
                HistoryStatus::Applied
            }
            Err(err) => {
                warn!(error = %err, "redo entry no longer applies; dropped");
                HistoryStatus::Blocked
            }
        }
    }

    fn reject_read_only(&self, op: Option<&Operation>) -> ApplyError {
        warn!(op = op.map(Operation::name), "operation rejected: board is read-only");
        ApplyError::ReadOnly
    }

    fn apply_checked(&mut self, op: Operation) -> Result<AppliedOperation, ApplyError> {
        if self.read_only {
            return Err(self.reject_read_only(Some(&op)));
        }
        self.apply_raw(op, Origin::Edit)
    }

    fn apply_raw(&mut self, op: Operation, origin: Origin) -> Result<AppliedOperation, ApplyError> {
        let name = op.name();
        let result = match origin {
            Origin::Edit => ops::apply(&mut self.scene, &mut self.selection, op),
            Origin::Replay => ops::replay(&mut self.scene, &mut self.selection, op),
        };
        match result {
            Ok(applied) => {
                self.track_resources(&applied);
                Ok(applied)
            }
            Err(err) => {
                warn!(op = name, error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    /// Apply `ops` in order, rolling back on the first rejection.
    fn apply_sequence(&mut self, ops: Vec<Operation>, origin: Origin) -> Result<Vec<AppliedOperation>, ApplyError> {
        let mut applied: Vec<AppliedOperation> = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply_raw(op, origin) {
                Ok(a) => applied.push(a),
                Err(err) => {
                    self.roll_back(applied);
                    return Err(err);
                }
            }
        }
        Ok(applied)
    }

    fn roll_back(&mut self, applied: Vec<AppliedOperation>) {
        let count = applied.len();
        for a in applied.into_iter().rev() {
            for inverse in a.inverse {
                if let Err(err) = self.apply_raw(inverse, Origin::Replay) {
                    warn!(error = %err, "rollback step failed");
                }
            }
        }
        if count > 0 {
            debug!(count, "rolled back partial sequence");
        }
    }

    // =========================================================================
    // RESOURCES
    // =========================================================================

    /// Drain the resource commands queued by recent mutations.
    pub fn take_resource_commands(&mut self) -> Vec<ResourceCommand> {
        std::mem::take(&mut self.resource_commands)
    }

    /// Store a finished load if it still matches a live element generation.
    pub fn deliver_resource(&mut self, completion: ResourceCompletion) -> ResourceOutcome {
        let live = self.scene.generation(&completion.id);
        if live != Some(completion.generation) {
            debug!(
                id = %completion.id,
                generation = completion.generation,
                live = ?live,
                "stale resource completion discarded"
            );
            return ResourceOutcome::Stale;
        }
        match completion.result {
            Ok(bytes) => {
                debug!(id = %completion.id, bytes = bytes.len(), "resource stored");
                self.resources.insert(completion.id, bytes);
                ResourceOutcome::Applied
            }
            Err(_) => ResourceOutcome::Failed,
        }
    }

    fn track_resources(&mut self, applied: &AppliedOperation) {
        match &applied.operation {
            Operation::InsertElement { element, descendants, .. } => {
                let requests: Vec<ResourceRequest> = std::iter::once(element)
                    .chain(descendants)
                    .filter_map(|el| load_request(&self.scene, el))
                    .collect();
                self.resource_commands.extend(requests.into_iter().map(ResourceCommand::Load));
            }
            Operation::RemoveElement { .. } => {
                for inverse in &applied.inverse {
                    if let Operation::InsertElement { element, descendants, .. } = inverse {
                        for el in std::iter::once(element).chain(descendants).filter(|el| is_image(el)) {
                            self.forget_resource(el.id.clone());
                        }
                    }
                }
            }
            Operation::SetElementProperties { .. } | Operation::MoveElement { .. } | Operation::SetSelection { .. } => {}
        }
    }

    fn forget_resource(&mut self, id: ElementId) {
        self.resources.remove(&id);
        self.resource_commands.push(ResourceCommand::Cancel(id));
    }
}

fn is_image(el: &Element) -> bool {
    matches!(el.kind, ElementKind::Image { .. })
}

fn load_request(scene: &Scene, el: &Element) -> Option<ResourceRequest> {
    match &el.kind {
        ElementKind::Image { source } => Some(ResourceRequest {
            id: el.id.clone(),
            generation: scene.generation(&el.id)?,
            source: source.clone(),
        }),
        _ => None,
    }
}
