//! Element model: scene nodes, their kinds, and sparse property patches.
//!
//! This module defines what sits on the board (`Element`, `ElementKind`) and
//! a sparse-update type for incremental edits (`PropertyPatch`). Styling lives
//! in the open-ended `props` JSON bag and is opaque to the engine.
//!
//! Geometry is always stored in board coordinates: `x`/`y` is the unrotated
//! top-left corner, `rotation` is clockwise degrees about the box center.
//! Children of a group keep their own board coordinates.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{FillRule, PathCommand, Placement};

/// Unique, stable identifier for an element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kind of an element, with the data only that kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Axis-aligned (before rotation) rectangle filling the element box.
    Rectangle,
    /// Ellipse inscribed within the element box.
    Ellipse,
    /// Bitmap loaded asynchronously from `source`.
    Image { source: String },
    /// Freeform path authored in a `view_width` x `view_height` box and
    /// stretched to the element size.
    Path {
        commands: Vec<PathCommand>,
        #[serde(default)]
        fill_rule: FillRule,
        view_width: f64,
        view_height: f64,
    },
    /// Container owning an ordered list of children, bottom to top.
    Group { children: Vec<ElementId> },
}

/// A node in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Shape or container type.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Left edge of the unrotated box in board coordinates.
    pub x: f64,
    /// Top edge of the unrotated box in board coordinates.
    pub y: f64,
    /// Width of the box in board units.
    pub width: f64,
    /// Height of the box in board units.
    pub height: f64,
    /// Clockwise rotation in degrees around the box center.
    #[serde(default)]
    pub rotation: f64,
    /// Open-ended style properties (fill, stroke, text, etc.).
    #[serde(default = "empty_props")]
    pub props: serde_json::Value,
}

fn empty_props() -> serde_json::Value {
    serde_json::json!({})
}

impl Element {
    /// A new element with a generated id and empty props.
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_id(ElementId::generate(), kind, x, y, width, height)
    }

    /// A new element with an explicit id.
    #[must_use]
    pub fn with_id(id: ElementId, kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id, kind, x, y, width, height, rotation: 0.0, props: empty_props() }
    }

    /// An empty group.
    #[must_use]
    pub fn group(id: ElementId) -> Self {
        Self::with_id(id, ElementKind::Group { children: Vec::new() }, 0.0, 0.0, 0.0, 0.0)
    }

    /// Ordered child ids; empty for every kind but `Group`.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Group { children } => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match &mut self.kind {
            ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group { .. })
    }

    /// The element's fill outline in its local frame, or `None` for groups,
    /// whose geometry is the union of their children.
    #[must_use]
    pub fn local_path(&self) -> Option<(Vec<PathCommand>, FillRule)> {
        match &self.kind {
            ElementKind::Rectangle | ElementKind::Image { .. } => {
                Some((PathCommand::rect(self.width, self.height), FillRule::NonZero))
            }
            ElementKind::Ellipse => Some((PathCommand::ellipse(self.width, self.height), FillRule::NonZero)),
            ElementKind::Path { commands, fill_rule, .. } => Some((commands.clone(), *fill_rule)),
            ElementKind::Group { .. } => None,
        }
    }

    /// How the local frame maps onto the board.
    #[must_use]
    pub fn placement(&self) -> Placement {
        let (scale_x, scale_y) = match &self.kind {
            ElementKind::Path { view_width, view_height, .. } => {
                (ratio(self.width, *view_width), ratio(self.height, *view_height))
            }
            _ => (1.0, 1.0),
        };
        Placement {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            scale_x,
            scale_y,
        }
    }

    /// Apply a patch in place. Props merge key-wise; `null` deletes a key.
    pub fn apply_patch(&mut self, patch: &PropertyPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(r) = patch.rotation {
            self.rotation = r;
        }
        if let Some(incoming) = patch.props.as_ref().and_then(serde_json::Value::as_object) {
            if !self.props.is_object() {
                self.props = empty_props();
            }
            if let Some(existing) = self.props.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
    }

    /// The current values of every field `patch` touches, as a patch.
    ///
    /// Applying the result after `patch` restores this element. Props keys
    /// absent today are captured as `null` so the restore deletes them.
    #[must_use]
    pub fn capture(&self, patch: &PropertyPatch) -> PropertyPatch {
        let props = patch.props.as_ref().and_then(serde_json::Value::as_object).map(|incoming| {
            let mut previous = serde_json::Map::new();
            for key in incoming.keys() {
                let value = self.props.get(key).cloned().unwrap_or(serde_json::Value::Null);
                previous.insert(key.clone(), value);
            }
            serde_json::Value::Object(previous)
        });
        PropertyPatch {
            x: patch.x.map(|_| self.x),
            y: patch.y.map(|_| self.y),
            width: patch.width.map(|_| self.width),
            height: patch.height.map(|_| self.height),
            rotation: patch.rotation.map(|_| self.rotation),
            props,
        }
    }
}

fn ratio(actual: f64, natural: f64) -> f64 {
    if natural.abs() < f64::EPSILON { 1.0 } else { actual / natural }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

impl PropertyPatch {
    /// Patch moving an element's box to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay `later` onto `self`: fields present in `later` win.
    #[must_use]
    pub fn overlay(&self, later: &PropertyPatch) -> PropertyPatch {
        PropertyPatch {
            x: later.x.or(self.x),
            y: later.y.or(self.y),
            width: later.width.or(self.width),
            height: later.height.or(self.height),
            rotation: later.rotation.or(self.rotation),
            props: merge_props(self.props.as_ref(), later.props.as_ref()),
        }
    }

    /// Underlay `earlier` beneath `self`: fields present in `self` win.
    #[must_use]
    pub fn underlay(&self, earlier: &PropertyPatch) -> PropertyPatch {
        earlier.overlay(self)
    }
}

fn merge_props(base: Option<&serde_json::Value>, top: Option<&serde_json::Value>) -> Option<serde_json::Value> {
    match (base.and_then(serde_json::Value::as_object), top.and_then(serde_json::Value::as_object)) {
        (Some(base), Some(top)) => {
            let mut merged = base.clone();
            for (k, v) in top {
                merged.insert(k.clone(), v.clone());
            }
            Some(serde_json::Value::Object(merged))
        }
        (None, Some(_)) => top.cloned(),
        (Some(_), None) => base.cloned(),
        (None, None) => None,
    }
}
