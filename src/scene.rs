//! Scene store: the element map, root ordering, and group structure.
//!
//! DESIGN
//! ======
//! Ordering lives in exactly two places: `root` for top-level elements and each
//! group's `children` list for nested ones. Both are bottom-to-top. Parent
//! links are a derived index kept in step with those lists so ancestor walks
//! don't scan the whole scene.
//!
//! Every insert stamps the inserted elements with a fresh generation from a
//! monotonic counter. A removed element that comes back through undo gets a
//! new generation, which is what async resource completions are checked
//! against.
//!
//! Ids taken out of the scene are retired: a fresh insert may not reuse them,
//! only a replay of history that puts the same element back. A hydrated scene
//! starts with no retired ids.
//!
//! Mutation methods here are unchecked primitives. `ops::apply` validates
//! first and only then calls them, so none of them can fail halfway.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{HashMap, HashSet};

use crate::element::{Element, ElementId, PropertyPatch};

/// Where an element sits: its parent (or root) and its index among siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<ElementId>,
    pub index: usize,
}

/// A removed element together with everything needed to put it back.
#[derive(Debug, Clone, PartialEq)]
pub struct Detached {
    pub element: Element,
    /// Every descendant, parents before children.
    pub descendants: Vec<Element>,
    pub location: Location,
}

/// In-memory scene graph.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: HashMap<ElementId, Element>,
    root: Vec<ElementId>,
    parents: HashMap<ElementId, ElementId>,
    generations: HashMap<ElementId, u64>,
    next_generation: u64,
    retired: HashSet<ElementId>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from an already validated element map and root order.
    pub(crate) fn from_parts(elements: HashMap<ElementId, Element>, root: Vec<ElementId>) -> Self {
        let mut scene = Self { elements, root, ..Self::default() };
        let ids: Vec<ElementId> = scene.elements.keys().cloned().collect();
        for id in &ids {
            if let Some(el) = scene.elements.get(id) {
                for child in el.children() {
                    scene.parents.insert(child.clone(), id.clone());
                }
            }
        }
        for id in ids {
            scene.stamp(id);
        }
        scene
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Total number of elements, nested ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Top-level element ids, bottom to top.
    #[must_use]
    pub fn root(&self) -> &[ElementId] {
        &self.root
    }

    /// Every element, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// The group directly containing `id`, or `None` for top-level (or unknown) ids.
    #[must_use]
    pub fn parent(&self, id: &ElementId) -> Option<&ElementId> {
        self.parents.get(id)
    }

    /// Generation stamped on `id` when it was last inserted.
    #[must_use]
    pub fn generation(&self, id: &ElementId) -> Option<u64> {
        self.generations.get(id).copied()
    }

    /// True when `id` was removed earlier in this session and is not live now.
    #[must_use]
    pub fn is_retired(&self, id: &ElementId) -> bool {
        self.retired.contains(id)
    }

    /// Ordered ids under `parent` (root when `None`). `None` when the parent
    /// is missing or is not a group.
    #[must_use]
    pub fn siblings(&self, parent: Option<&ElementId>) -> Option<&[ElementId]> {
        match parent {
            None => Some(&self.root),
            Some(pid) => self.elements.get(pid).filter(|el| el.is_group()).map(Element::children),
        }
    }

    /// Current parent and sibling index of `id`.
    #[must_use]
    pub fn location(&self, id: &ElementId) -> Option<Location> {
        if !self.contains(id) {
            return None;
        }
        let parent = self.parents.get(id).cloned();
        let index = self.siblings(parent.as_ref())?.iter().position(|s| s == id)?;
        Some(Location { parent, index })
    }

    /// Ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cursor = self.parents.get(id);
        while let Some(pid) = cursor {
            out.push(pid.clone());
            cursor = self.parents.get(pid);
        }
        out
    }

    /// The outermost group containing `id`, or `id` itself when top-level.
    #[must_use]
    pub fn top_level_ancestor(&self, id: &ElementId) -> Option<ElementId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).pop().unwrap_or_else(|| id.clone()))
    }

    /// Whether `ancestor` is `id` or contains it.
    #[must_use]
    pub fn is_self_or_ancestor(&self, ancestor: &ElementId, id: &ElementId) -> bool {
        ancestor == id || self.ancestors(id).iter().any(|a| a == ancestor)
    }

    /// Every descendant of `id`, depth first, parents before children.
    #[must_use]
    pub fn descendants(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if let Some(el) = self.elements.get(id) {
            self.collect_descendants(el, &mut out);
        }
        out
    }

    fn collect_descendants(&self, el: &Element, out: &mut Vec<ElementId>) {
        for child in el.children() {
            out.push(child.clone());
            if let Some(child_el) = self.elements.get(child) {
                self.collect_descendants(child_el, out);
            }
        }
    }

    /// Elements in paint order: depth first, parents before children, siblings bottom to top.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&Element> {
        let mut out = Vec::with_capacity(self.elements.len());
        for id in &self.root {
            if let Some(el) = self.elements.get(id) {
                out.push(el);
                for d in self.descendants(id) {
                    if let Some(child) = self.elements.get(&d) {
                        out.push(child);
                    }
                }
            }
        }
        out
    }

    // =========================================================================
    // UNCHECKED MUTATION
    // =========================================================================

    fn stamp(&mut self, id: ElementId) {
        self.next_generation += 1;
        self.generations.insert(id, self.next_generation);
    }

    fn siblings_mut(&mut self, parent: Option<&ElementId>) -> Option<&mut Vec<ElementId>> {
        match parent {
            None => Some(&mut self.root),
            Some(pid) => self.elements.get_mut(pid).and_then(Element::children_mut),
        }
    }

    /// Insert `element` and its `descendants` under `parent` at `index`
    /// (clamped to the sibling count). Returns the index used.
    pub(crate) fn place(
        &mut self,
        element: Element,
        descendants: Vec<Element>,
        parent: Option<&ElementId>,
        index: usize,
    ) -> usize {
        let id = element.id.clone();
        for el in std::iter::once(&element).chain(descendants.iter()) {
            for child in el.children() {
                self.parents.insert(child.clone(), el.id.clone());
            }
        }
        for el in std::iter::once(element).chain(descendants) {
            self.retired.remove(&el.id);
            self.stamp(el.id.clone());
            self.elements.insert(el.id.clone(), el);
        }
        if let Some(pid) = parent {
            self.parents.insert(id.clone(), pid.clone());
        }
        self.attach(id, parent, index)
    }

    fn attach(&mut self, id: ElementId, parent: Option<&ElementId>, index: usize) -> usize {
        match self.siblings_mut(parent) {
            Some(list) => {
                let index = index.min(list.len());
                list.insert(index, id);
                index
            }
            None => 0,
        }
    }

    fn detach(&mut self, id: &ElementId) -> Option<Location> {
        let location = self.location(id)?;
        if let Some(list) = self.siblings_mut(location.parent.as_ref()) {
            list.remove(location.index);
        }
        Some(location)
    }

    /// Remove `id` and its whole subtree.
    pub(crate) fn take(&mut self, id: &ElementId) -> Option<Detached> {
        let location = self.detach(id)?;
        let descendant_ids = self.descendants(id);
        self.parents.remove(id);
        self.generations.remove(id);
        let element = self.elements.remove(id)?;
        self.retired.insert(id.clone());
        let mut descendants = Vec::with_capacity(descendant_ids.len());
        for d in descendant_ids {
            self.parents.remove(&d);
            self.generations.remove(&d);
            self.retired.insert(d.clone());
            if let Some(el) = self.elements.remove(&d) {
                descendants.push(el);
            }
        }
        Some(Detached { element, descendants, location })
    }

    /// Move `id` under `parent` at `index` (clamped after detaching).
    /// Returns the previous location and the index actually used.
    pub(crate) fn relocate(
        &mut self,
        id: &ElementId,
        parent: Option<&ElementId>,
        index: usize,
    ) -> Option<(Location, usize)> {
        let previous = self.detach(id)?;
        match parent {
            Some(pid) => self.parents.insert(id.clone(), pid.clone()),
            None => self.parents.remove(id),
        };
        let used = self.attach(id.clone(), parent, index);
        Some((previous, used))
    }

    /// Apply `patch` to `id`, returning the values it replaced.
    pub(crate) fn patch(&mut self, id: &ElementId, patch: &PropertyPatch) -> Option<PropertyPatch> {
        let el = self.elements.get_mut(id)?;
        let previous = el.capture(patch);
        el.apply_patch(patch);
        Some(previous)
    }
}
