//! Persistence and render views of a board.
//!
//! A `SceneSnapshot` is the whole contract with storage: the root ordering and
//! every element. History, selection, and viewport are not persisted.
//! Loading validates structure before anything is built, so a malformed
//! document can never produce a half-linked scene.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::viewport::Viewport;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Errors produced while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("referenced element not found: {0}")]
    MissingElement(ElementId),
    #[error("element {0} has more than one parent")]
    MultipleParents(ElementId),
    #[error("element {0} is not reachable from the root")]
    Unreachable(ElementId),
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized scene: root ordering plus every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    pub root: Vec<ElementId>,
    pub elements: Vec<Element>,
}

impl SceneSnapshot {
    /// Capture `scene`, elements in draw order.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            root: scene.root().to_vec(),
            elements: scene.draw_order().into_iter().cloned().collect(),
        }
    }

    /// Parse a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] when the text is not a valid snapshot document.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build a scene.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] describing the first structural problem found.
    pub fn into_scene(self) -> Result<Scene, SnapshotError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }

        let mut elements: HashMap<ElementId, Element> = HashMap::with_capacity(self.elements.len());
        for el in self.elements {
            if elements.contains_key(&el.id) {
                return Err(SnapshotError::DuplicateId(el.id));
            }
            elements.insert(el.id.clone(), el);
        }

        let mut claimed: HashSet<&ElementId> = HashSet::with_capacity(elements.len());
        let mut stack: Vec<&ElementId> = Vec::new();
        for id in self.root.iter().rev() {
            if !elements.contains_key(id) {
                return Err(SnapshotError::MissingElement(id.clone()));
            }
            if !claimed.insert(id) {
                return Err(SnapshotError::MultipleParents(id.clone()));
            }
            stack.push(id);
        }
        while let Some(id) = stack.pop() {
            let Some(el) = elements.get(id) else {
                return Err(SnapshotError::MissingElement(id.clone()));
            };
            for child in el.children() {
                if !elements.contains_key(child) {
                    return Err(SnapshotError::MissingElement(child.clone()));
                }
                if !claimed.insert(child) {
                    return Err(SnapshotError::MultipleParents(child.clone()));
                }
                stack.push(child);
            }
        }
        if let Some(orphan) = elements.keys().find(|id| !claimed.contains(id)) {
            return Err(SnapshotError::Unreachable(orphan.clone()));
        }

        Ok(Scene::from_parts(elements, self.root))
    }
}

/// Immutable per-frame view for a renderer: elements in paint order plus
/// the selection and viewport to draw them with.
#[derive(Debug, Serialize)]
pub struct RenderView<'a> {
    pub elements: Vec<&'a Element>,
    pub selection: &'a Selection,
    pub viewport: &'a Viewport,
}
