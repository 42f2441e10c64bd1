#![allow(clippy::float_cmp)]

use std::time::{Duration, Instant};

use super::*;
use crate::element::{Element, ElementKind};
use crate::ops::{apply, replay};
use crate::scene::Scene;
use crate::selection::Selection;

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

struct Fixture {
    scene: Scene,
    selection: Selection,
}

impl Fixture {
    fn new() -> Self {
        Self { scene: Scene::new(), selection: Selection::default() }
    }

    fn run(&mut self, op: Operation) -> AppliedOperation {
        apply(&mut self.scene, &mut self.selection, op).unwrap()
    }

    fn insert(&mut self, s: &str) -> AppliedOperation {
        self.run(Operation::insert(Element::with_id(id(s), ElementKind::Rectangle, 0.0, 0.0, 10.0, 10.0)))
    }

    fn move_to(&mut self, s: &str, x: f64, y: f64) -> AppliedOperation {
        self.run(Operation::set_properties(id(s), PropertyPatch::position(x, y)))
    }

    /// Apply an entry's inverse, as the board does on undo.
    fn revert(&mut self, entry: &HistoryEntry) {
        for op in entry.inverse.clone() {
            replay(&mut self.scene, &mut self.selection, op).unwrap();
        }
    }

    fn x_of(&self, s: &str) -> f64 {
        self.scene.get(&id(s)).unwrap().x
    }
}

fn window() -> Duration {
    Duration::from_millis(1000)
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn empty_history_pops_nothing() {
    let mut history = History::new(10, window());
    assert!(history.pop_undo().is_none());
    assert!(history.pop_redo().is_none());
    assert!(!history.can_undo());
}

#[test]
fn stack_never_exceeds_limit() {
    let mut fx = Fixture::new();
    let mut history = History::new(3, window());
    for s in ["e0", "e1", "e2", "e3", "e4"] {
        history.record(fx.insert(s));
        assert!(history.undo_len() <= 3);
    }
    assert_eq!(history.undo_len(), 3);
}

#[test]
fn eviction_drops_exactly_the_oldest() {
    let mut fx = Fixture::new();
    let mut history = History::new(2, window());
    for s in ["e0", "e1", "e2"] {
        history.record(fx.insert(s));
    }
    let newest = history.pop_undo().unwrap();
    let oldest_left = history.pop_undo().unwrap();
    assert_eq!(newest.inverse, vec![Operation::remove(id("e2"))]);
    assert_eq!(oldest_left.inverse, vec![Operation::remove(id("e1"))]);
    assert!(history.pop_undo().is_none());
}

#[test]
fn zero_limit_keeps_nothing() {
    let mut fx = Fixture::new();
    let mut history = History::new(0, window());
    history.record(fx.insert("e0"));
    assert_eq!(history.undo_len(), 0);
}

#[test]
fn record_clears_redo() {
    let mut fx = Fixture::new();
    let mut history = History::default();
    history.record(fx.insert("e0"));
    let entry = history.pop_undo().unwrap();
    history.push_redo(entry);
    assert!(history.can_redo());
    history.record(fx.insert("e1"));
    assert!(!history.can_redo());
}

// =============================================================
// Coalescing
// =============================================================

#[test]
fn patches_within_window_coalesce_into_one_entry() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    history.record(fx.insert("e1"));

    let t0 = Instant::now();
    for i in 1..=10_u32 {
        let step = f64::from(i);
        history.record_at(fx.move_to("e1", step, step), t0 + Duration::from_millis(50 * u64::from(i)));
    }
    assert_eq!(history.undo_len(), 2);

    let entry = history.pop_undo().unwrap();
    assert_eq!(entry.forward, vec![Operation::set_properties(id("e1"), PropertyPatch::position(10.0, 10.0))]);
    fx.revert(&entry);
    assert_eq!(fx.x_of("e1"), 0.0);
}

#[test]
fn window_slides_from_last_merge() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("e1");

    let t0 = Instant::now();
    // Each step is 800ms after the previous one; the run spans 2.4s.
    for i in 0..4_u32 {
        history.record_at(fx.move_to("e1", f64::from(i), 0.0), t0 + Duration::from_millis(800 * u64::from(i)));
    }
    assert_eq!(history.undo_len(), 1);
}

#[test]
fn gap_beyond_window_starts_new_entry() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("e1");

    let t0 = Instant::now();
    history.record_at(fx.move_to("e1", 1.0, 0.0), t0);
    history.record_at(fx.move_to("e1", 2.0, 0.0), t0 + Duration::from_millis(1500));
    assert_eq!(history.undo_len(), 2);
}

#[test]
fn seal_starts_new_entry() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("e1");

    let t0 = Instant::now();
    history.record_at(fx.move_to("e1", 1.0, 0.0), t0);
    history.seal();
    history.record_at(fx.move_to("e1", 2.0, 0.0), t0);
    assert_eq!(history.undo_len(), 2);
}

#[test]
fn different_elements_do_not_coalesce() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("a");
    fx.insert("b");

    let t0 = Instant::now();
    history.record_at(fx.move_to("a", 1.0, 0.0), t0);
    history.record_at(fx.move_to("b", 1.0, 0.0), t0);
    assert_eq!(history.undo_len(), 2);
}

#[test]
fn batches_on_same_elements_coalesce() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("a");
    fx.insert("b");

    let t0 = Instant::now();
    for i in 1..=3 {
        let x = f64::from(i) * 10.0;
        let batch = vec![fx.move_to("a", x, 0.0), fx.move_to("b", x, 5.0)];
        history.record_batch_at(batch, t0);
    }
    assert_eq!(history.undo_len(), 1);
    let entry = history.pop_undo().unwrap();
    fx.revert(&entry);
    assert_eq!(fx.x_of("a"), 0.0);
    assert_eq!(fx.x_of("b"), 0.0);
}

#[test]
fn coalesced_inverse_keeps_first_values_for_later_fields() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("e1");

    let t0 = Instant::now();
    history.record_at(fx.move_to("e1", 5.0, 5.0), t0);
    let resize = fx.run(Operation::set_properties(
        id("e1"),
        PropertyPatch { width: Some(40.0), x: Some(7.0), ..PropertyPatch::default() },
    ));
    history.record_at(resize, t0);

    let entry = history.pop_undo().unwrap();
    fx.revert(&entry);
    let el = fx.scene.get(&id("e1")).unwrap();
    assert_eq!((el.x, el.y, el.width), (0.0, 0.0, 10.0));
}

#[test]
fn undo_seals_the_run() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    fx.insert("e1");

    let t0 = Instant::now();
    history.record_at(fx.move_to("e1", 1.0, 0.0), t0);
    history.seal();
    history.record_at(fx.move_to("e1", 2.0, 0.0), t0);
    let entry = history.pop_undo().unwrap();
    fx.revert(&entry);
    history.push_redo(entry);

    // Without the seal this would merge into the first move.
    history.record_at(fx.move_to("e1", 3.0, 0.0), t0);
    assert_eq!(history.undo_len(), 2);
}

#[test]
fn batch_inverse_runs_in_reverse_order() {
    let mut fx = Fixture::new();
    let mut history = History::new(100, window());
    let batch = vec![fx.insert("a"), fx.insert("b")];
    history.record_batch(batch);
    let entry = history.pop_undo().unwrap();
    assert_eq!(entry.inverse, vec![Operation::remove(id("b")), Operation::remove(id("a"))]);
}
