//! Selection state and marquee resolution.
//!
//! DESIGN
//! ======
//! A `Selection` is document state: it changes only through `set_selection`
//! operations, so undo restores focus along with geometry. The marquee rect
//! rides along in the same value so previews and commits share one path.
//!
//! Marquee hits are computed from each leaf element's placed bounds. Any
//! positive-area overlap counts. A hit inside a group selects the group's
//! top-level ancestor instead of the leaf.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::element::ElementId;
use crate::geometry::Rect;
use crate::hit;
use crate::ops::{ApplyError, Operation};
use crate::scene::Scene;

/// Selected element ids plus an optional in-progress marquee, in board coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    ids: Vec<ElementId>,
    #[serde(default)]
    marquee: Option<Rect>,
}

impl Selection {
    /// A selection of `ids` (duplicates dropped, first occurrence kept) without a marquee.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = ElementId>) -> Self {
        Self { ids: Vec::new(), marquee: None }.with_ids(ids)
    }

    #[must_use]
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self
    }

    #[must_use]
    pub fn with_marquee(mut self, marquee: Option<Rect>) -> Self {
        self.marquee = marquee;
        self
    }

    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    #[must_use]
    pub fn marquee(&self) -> Option<Rect> {
        self.marquee
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Same selection with duplicate ids dropped.
    #[must_use]
    pub fn normalized(self) -> Self {
        let marquee = self.marquee;
        Self::new(self.ids).with_marquee(marquee)
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&ElementId) -> bool) {
        self.ids.retain(keep);
    }
}

/// Partial update for the selection. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionPatch {
    /// Replace the selected ids.
    pub ids: Option<Vec<ElementId>>,
    /// Replace the marquee (`Some(None)` clears it).
    pub marquee: Option<Option<Rect>>,
}

impl SelectionPatch {
    /// Patch setting the marquee and letting it decide the selected ids.
    #[must_use]
    pub fn marquee(rect: Rect) -> Self {
        Self { ids: None, marquee: Some(Some(rect)) }
    }

    /// Patch selecting exactly `ids` and clearing any marquee.
    #[must_use]
    pub fn ids(ids: Vec<ElementId>) -> Self {
        Self { ids: Some(ids), marquee: Some(None) }
    }
}

/// Top-level ids whose geometry overlaps `marquee` by a positive area, in draw order.
#[must_use]
pub fn marquee_hits(scene: &Scene, marquee: &Rect) -> Vec<ElementId> {
    let mut out: Vec<ElementId> = Vec::new();
    for el in scene.draw_order() {
        if el.is_group() {
            continue;
        }
        let Some(bounds) = hit::element_bounds(scene, &el.id) else {
            continue;
        };
        if !bounds.intersects(marquee) {
            continue;
        }
        if let Some(top) = scene.top_level_ancestor(&el.id) {
            if !out.contains(&top) {
                out.push(top);
            }
        }
    }
    out
}

/// Merge `patch` into the current selection.
fn resolve(board: &Board, patch: SelectionPatch) -> Selection {
    let current = board.selection();
    let marquee = patch.marquee.unwrap_or_else(|| current.marquee());
    let ids = match (patch.ids, patch.marquee) {
        (Some(ids), _) => ids,
        (None, Some(Some(rect))) => marquee_hits(board.scene(), &rect),
        (None, _) => current.ids().to_vec(),
    };
    Selection::new(ids).with_marquee(marquee)
}

/// Merge `patch` into the board's selection through one recorded `set_selection` operation.
///
/// # Errors
///
/// Returns the apply rejection (e.g. an id that no longer exists, or a read-only board).
pub fn update_select_area(board: &mut Board, patch: SelectionPatch) -> Result<Selection, ApplyError> {
    let next = resolve(board, patch);
    board.apply(Operation::select(next.clone()))?;
    Ok(next)
}

/// Like [`update_select_area`], but the change is not recorded in history.
/// Used for per-frame marquee previews.
///
/// # Errors
///
/// Returns the apply rejection.
pub fn preview_select_area(board: &mut Board, patch: SelectionPatch) -> Result<Selection, ApplyError> {
    let next = resolve(board, patch);
    board.apply_transient(Operation::select(next.clone()))?;
    Ok(next)
}
