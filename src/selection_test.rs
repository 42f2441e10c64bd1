use super::*;
use crate::element::{Element, ElementKind};

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

fn rect_at(s: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::with_id(id(s), ElementKind::Rectangle, x, y, w, h)
}

/// a at (0,0) 10x10, b at (100,100) 10x10, group g(c at (50,0), d at (200,0)).
fn board() -> Board {
    let mut board = Board::default();
    board.apply(Operation::insert(rect_at("a", 0.0, 0.0, 10.0, 10.0))).unwrap();
    board.apply(Operation::insert(rect_at("b", 100.0, 100.0, 10.0, 10.0))).unwrap();
    let mut g = Element::group(id("g"));
    g.kind = ElementKind::Group { children: vec![id("c"), id("d")] };
    board
        .apply(Operation::InsertElement {
            element: g,
            descendants: vec![rect_at("c", 50.0, 0.0, 10.0, 10.0), rect_at("d", 200.0, 0.0, 10.0, 10.0)],
            parent: None,
            index: None,
        })
        .unwrap();
    board
}

// =============================================================================
// Selection value
// =============================================================================

#[test]
fn new_drops_duplicates_keeping_first() {
    let sel = Selection::new([id("b"), id("a"), id("b")]);
    assert_eq!(sel.ids(), &[id("b"), id("a")]);
    assert!(sel.contains(&id("a")));
    assert!(sel.marquee().is_none());
}

#[test]
fn normalized_keeps_marquee() {
    let marquee = Rect::new(0.0, 0.0, 5.0, 5.0);
    let sel: Selection = serde_json::from_value(serde_json::json!({
        "ids": ["a", "a"],
        "marquee": marquee,
    }))
    .unwrap();
    let sel = sel.normalized();
    assert_eq!(sel.ids(), &[id("a")]);
    assert_eq!(sel.marquee(), Some(marquee));
}

#[test]
fn missing_fields_deserialize_empty() {
    let sel: Selection = serde_json::from_str("{}").unwrap();
    assert!(sel.is_empty());
    assert!(sel.marquee().is_none());
}

// =============================================================================
// Marquee hits
// =============================================================================

#[test]
fn marquee_selects_overlapping_only() {
    let board = board();
    let hits = marquee_hits(board.scene(), &Rect::new(-5.0, -5.0, 10.0, 10.0));
    assert_eq!(hits, vec![id("a")]);
}

#[test]
fn partial_overlap_counts() {
    let board = board();
    let hits = marquee_hits(board.scene(), &Rect::new(105.0, 105.0, 50.0, 50.0));
    assert_eq!(hits, vec![id("b")]);
}

#[test]
fn touching_edge_is_not_overlap() {
    let board = board();
    let hits = marquee_hits(board.scene(), &Rect::new(10.0, 0.0, 5.0, 5.0));
    assert!(hits.is_empty());
}

#[test]
fn group_selects_as_unit() {
    let board = board();
    let hits = marquee_hits(board.scene(), &Rect::new(195.0, -5.0, 20.0, 20.0));
    assert_eq!(hits, vec![id("g")]);
}

#[test]
fn group_reported_once_in_draw_order() {
    let board = board();
    let hits = marquee_hits(board.scene(), &Rect::new(-10.0, -10.0, 500.0, 500.0));
    assert_eq!(hits, vec![id("a"), id("b"), id("g")]);
}

#[test]
fn rotated_element_uses_rotated_bounds() {
    let mut board = Board::default();
    let mut el = rect_at("r", 0.0, 0.0, 100.0, 10.0);
    el.rotation = 90.0;
    board.apply(Operation::insert(el)).unwrap();
    // Rotated about its center (50,5): now spans x 45..55, y -45..55.
    assert!(marquee_hits(board.scene(), &Rect::new(0.0, -40.0, 40.0, 10.0)).is_empty());
    assert_eq!(marquee_hits(board.scene(), &Rect::new(48.0, -40.0, 4.0, 4.0)), vec![id("r")]);
}

// =============================================================================
// update / preview
// =============================================================================

#[test]
fn update_with_marquee_resolves_ids_and_records() {
    let mut board = board();
    let before = board.history().undo_len();
    let sel = update_select_area(&mut board, SelectionPatch::marquee(Rect::new(-5.0, -5.0, 10.0, 10.0))).unwrap();
    assert_eq!(sel.ids(), &[id("a")]);
    assert_eq!(board.selection(), &sel);
    assert_eq!(board.history().undo_len(), before + 1);
}

#[test]
fn update_with_ids_clears_marquee() {
    let mut board = board();
    update_select_area(&mut board, SelectionPatch::marquee(Rect::new(-5.0, -5.0, 10.0, 10.0))).unwrap();
    let sel = update_select_area(&mut board, SelectionPatch::ids(vec![id("b")])).unwrap();
    assert_eq!(sel.ids(), &[id("b")]);
    assert!(sel.marquee().is_none());
}

#[test]
fn empty_patch_keeps_current() {
    let mut board = board();
    update_select_area(&mut board, SelectionPatch::ids(vec![id("a"), id("b")])).unwrap();
    let sel = update_select_area(&mut board, SelectionPatch::default()).unwrap();
    assert_eq!(sel.ids(), &[id("a"), id("b")]);
}

#[test]
fn preview_does_not_record() {
    let mut board = board();
    let before = board.history().undo_len();
    preview_select_area(&mut board, SelectionPatch::marquee(Rect::new(-5.0, -5.0, 10.0, 10.0))).unwrap();
    assert_eq!(board.selection().ids(), &[id("a")]);
    assert_eq!(board.history().undo_len(), before);
}

#[test]
fn update_rejects_unknown_id() {
    let mut board = board();
    let err = update_select_area(&mut board, SelectionPatch::ids(vec![id("ghost")])).unwrap_err();
    assert!(matches!(err, ApplyError::ElementNotFound(_)));
    assert!(board.selection().is_empty());
}

#[test]
fn undo_restores_previous_selection() {
    let mut board = board();
    update_select_area(&mut board, SelectionPatch::ids(vec![id("a")])).unwrap();
    update_select_area(&mut board, SelectionPatch::ids(vec![id("b")])).unwrap();
    board.undo();
    assert_eq!(board.selection().ids(), &[id("a")]);
}
