//! Operations and the apply engine.
//!
//! DESIGN
//! ======
//! `Operation` is the closed set of scene and selection mutations. `apply`
//! validates an operation against the current scene, then mutates it and
//! returns the operation together with the operations that undo it.
//!
//! Validation happens in full before the first write, so a rejected operation
//! leaves the scene and selection untouched.
//!
//! The inverse is a list rather than a single operation because removing an
//! element has two observable effects: the subtree disappears, and any
//! selected ids inside it are pruned. Undoing it re-inserts the subtree and
//! then restores the selection.

#[cfg(test)]
#[path = "ops_test.rs"]
mod ops_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{Element, ElementId, PropertyPatch};
use crate::scene::Scene;
use crate::selection::Selection;

/// One atomic, invertible mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert `element` (and, for groups, every descendant) under `parent`.
    /// `index` of `None` places it on top of its siblings.
    InsertElement {
        element: Element,
        #[serde(default)]
        descendants: Vec<Element>,
        #[serde(default)]
        parent: Option<ElementId>,
        #[serde(default)]
        index: Option<usize>,
    },
    /// Remove an element and its subtree.
    RemoveElement { id: ElementId },
    /// Patch an element's geometry or props.
    SetElementProperties { id: ElementId, patch: PropertyPatch },
    /// Reparent or reorder an element. `index` is its final sibling index.
    MoveElement {
        id: ElementId,
        #[serde(default)]
        parent: Option<ElementId>,
        #[serde(default)]
        index: Option<usize>,
    },
    /// Replace the selection.
    SetSelection { previous: Selection, next: Selection },
}

impl Operation {
    /// Insert a top-level element on top of the stack.
    #[must_use]
    pub fn insert(element: Element) -> Self {
        Self::InsertElement { element, descendants: Vec::new(), parent: None, index: None }
    }

    #[must_use]
    pub fn remove(id: ElementId) -> Self {
        Self::RemoveElement { id }
    }

    #[must_use]
    pub fn set_properties(id: ElementId, patch: PropertyPatch) -> Self {
        Self::SetElementProperties { id, patch }
    }

    /// Select exactly `next`. The previous selection is filled in when applied.
    #[must_use]
    pub fn select(next: Selection) -> Self {
        Self::SetSelection { previous: Selection::default(), next }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertElement { .. } => "insert_element",
            Self::RemoveElement { .. } => "remove_element",
            Self::SetElementProperties { .. } => "set_element_properties",
            Self::MoveElement { .. } => "move_element",
            Self::SetSelection { .. } => "set_selection",
        }
    }

    /// The element this operation targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<&ElementId> {
        match self {
            Self::InsertElement { element, .. } => Some(&element.id),
            Self::RemoveElement { id } | Self::SetElementProperties { id, .. } | Self::MoveElement { id, .. } => {
                Some(id)
            }
            Self::SetSelection { .. } => None,
        }
    }
}

/// An operation that went through, with the operations that revert it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOperation {
    /// The operation as applied: indices resolved, previous selection captured.
    pub operation: Operation,
    /// Applying these in order restores the prior scene and selection.
    pub inverse: Vec<Operation>,
}

/// Why an operation was not applied. The board is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("target parent not found: {0}")]
    TargetNotFound(ElementId),
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("invalid target {id}: {reason}")]
    InvalidTarget { id: ElementId, reason: &'static str },
    #[error("incomplete subtree for group {0}")]
    IncompleteSubtree(ElementId),
    #[error("board is read-only")]
    ReadOnly,
}

/// Where an operation comes from. Only replays may bring back a retired id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A new edit.
    Edit,
    /// Undo, redo, or rollback of a recorded operation.
    Replay,
}

/// Apply `op` to `scene` and `selection`, all or nothing.
///
/// # Errors
///
/// Returns an [`ApplyError`] when the operation references a missing element
/// or parent, reuses a live or retired id, or would break the group structure.
pub fn apply(scene: &mut Scene, selection: &mut Selection, op: Operation) -> Result<AppliedOperation, ApplyError> {
    apply_from(scene, selection, op, Origin::Edit)
}

/// Apply a recorded operation (an inverse or a redone forward). Unlike
/// [`apply`], an insert may restore an id that was removed earlier.
///
/// # Errors
///
/// Same as [`apply`], minus the retired-id check.
pub fn replay(scene: &mut Scene, selection: &mut Selection, op: Operation) -> Result<AppliedOperation, ApplyError> {
    apply_from(scene, selection, op, Origin::Replay)
}

fn apply_from(
    scene: &mut Scene,
    selection: &mut Selection,
    op: Operation,
    origin: Origin,
) -> Result<AppliedOperation, ApplyError> {
    let applied = match op {
        Operation::InsertElement { element, descendants, parent, index } => {
            validate_insert(scene, &element, &descendants, parent.as_ref(), origin)?;
            let id = element.id.clone();
            let used = scene.place(element.clone(), descendants.clone(), parent.as_ref(), index.unwrap_or(usize::MAX));
            AppliedOperation {
                operation: Operation::InsertElement { element, descendants, parent, index: Some(used) },
                inverse: vec![Operation::RemoveElement { id }],
            }
        }
        Operation::RemoveElement { id } => {
            let detached = scene.take(&id).ok_or_else(|| ApplyError::ElementNotFound(id.clone()))?;
            let before = selection.clone();
            selection.retain(|sid| scene.contains(sid));
            let mut inverse = vec![Operation::InsertElement {
                element: detached.element,
                descendants: detached.descendants,
                parent: detached.location.parent,
                index: Some(detached.location.index),
            }];
            if *selection != before {
                debug!(%id, pruned = before.ids().len() - selection.ids().len(), "selection pruned by remove");
                inverse.push(Operation::SetSelection { previous: selection.clone(), next: before });
            }
            AppliedOperation { operation: Operation::RemoveElement { id }, inverse }
        }
        Operation::SetElementProperties { id, patch } => {
            let previous = scene.patch(&id, &patch).ok_or_else(|| ApplyError::ElementNotFound(id.clone()))?;
            AppliedOperation {
                inverse: vec![Operation::SetElementProperties { id: id.clone(), patch: previous }],
                operation: Operation::SetElementProperties { id, patch },
            }
        }
        Operation::MoveElement { id, parent, index } => {
            validate_move(scene, &id, parent.as_ref())?;
            let (previous, used) = scene
                .relocate(&id, parent.as_ref(), index.unwrap_or(usize::MAX))
                .ok_or_else(|| ApplyError::ElementNotFound(id.clone()))?;
            AppliedOperation {
                inverse: vec![Operation::MoveElement {
                    id: id.clone(),
                    parent: previous.parent,
                    index: Some(previous.index),
                }],
                operation: Operation::MoveElement { id, parent, index: Some(used) },
            }
        }
        Operation::SetSelection { next, .. } => {
            let next = next.normalized();
            if let Some(missing) = next.ids().iter().find(|sid| !scene.contains(sid)) {
                return Err(ApplyError::ElementNotFound(missing.clone()));
            }
            let previous = std::mem::replace(selection, next.clone());
            AppliedOperation {
                inverse: vec![Operation::SetSelection { previous: next.clone(), next: previous.clone() }],
                operation: Operation::SetSelection { previous, next },
            }
        }
    };
    debug!(op = applied.operation.name(), target = ?applied.operation.target(), "operation applied");
    Ok(applied)
}

fn validate_parent(scene: &Scene, parent: Option<&ElementId>) -> Result<(), ApplyError> {
    let Some(pid) = parent else {
        return Ok(());
    };
    match scene.get(pid) {
        None => Err(ApplyError::TargetNotFound(pid.clone())),
        Some(el) if !el.is_group() => {
            Err(ApplyError::InvalidTarget { id: pid.clone(), reason: "parent is not a group" })
        }
        Some(_) => Ok(()),
    }
}

fn validate_insert(
    scene: &Scene,
    element: &Element,
    descendants: &[Element],
    parent: Option<&ElementId>,
    origin: Origin,
) -> Result<(), ApplyError> {
    validate_parent(scene, parent)?;

    let mut incoming: HashMap<&ElementId, &Element> = HashMap::with_capacity(descendants.len() + 1);
    for el in std::iter::once(element).chain(descendants) {
        let retired = origin == Origin::Edit && scene.is_retired(&el.id);
        if scene.contains(&el.id) || retired || incoming.insert(&el.id, el).is_some() {
            return Err(ApplyError::DuplicateId(el.id.clone()));
        }
    }

    // Every child must be supplied, reachable exactly once, with nothing left over.
    let mut seen: HashSet<&ElementId> = HashSet::with_capacity(incoming.len());
    let mut stack = vec![element];
    seen.insert(&element.id);
    while let Some(el) = stack.pop() {
        for child in el.children() {
            let Some(&child_el) = incoming.get(child) else {
                return Err(ApplyError::IncompleteSubtree(element.id.clone()));
            };
            if !seen.insert(child) {
                return Err(ApplyError::InvalidTarget { id: child.clone(), reason: "child listed more than once" });
            }
            stack.push(child_el);
        }
    }
    if seen.len() != incoming.len() {
        return Err(ApplyError::IncompleteSubtree(element.id.clone()));
    }
    Ok(())
}

fn validate_move(scene: &Scene, id: &ElementId, parent: Option<&ElementId>) -> Result<(), ApplyError> {
    if !scene.contains(id) {
        return Err(ApplyError::ElementNotFound(id.clone()));
    }
    validate_parent(scene, parent)?;
    if let Some(pid) = parent {
        if scene.is_self_or_ancestor(id, pid) {
            return Err(ApplyError::InvalidTarget { id: pid.clone(), reason: "move would create a cycle" });
        }
    }
    Ok(())
}
