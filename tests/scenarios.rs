//! End-to-end sessions driven through the engine's input pipeline.
#![allow(clippy::float_cmp)]

use serde_json::json;
use tokio::runtime::Handle;
use whiteboard::config::BoardConfig;
use whiteboard::element::{Element, ElementId, ElementKind};
use whiteboard::engine::Engine;
use whiteboard::input::{Button, InputEvent, KeyEvent, Modifiers, PointerEvent, WheelEvent};
use whiteboard::ops::Operation;

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

fn engine() -> Engine {
    Engine::with_default_plugins(BoardConfig::default(), Handle::current())
}

fn insert(engine: &mut Engine, s: &str, x: f64, y: f64) {
    let el = Element::with_id(id(s), ElementKind::Rectangle, x, y, 40.0, 40.0);
    engine.board.apply(Operation::insert(el)).unwrap();
    engine.board.seal_history();
}

fn position(engine: &Engine, s: &str) -> (f64, f64) {
    let el = engine.board.scene().get(&id(s)).unwrap();
    (el.x, el.y)
}

fn down(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown(PointerEvent::primary(x, y))
}

fn moved(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove(PointerEvent::primary(x, y))
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp(PointerEvent::primary(x, y))
}

fn key(k: &str, modifiers: Modifiers) -> InputEvent {
    InputEvent::KeyDown(KeyEvent::new(k, modifiers))
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Modifiers::default() }
}

fn run(engine: &mut Engine, events: &[InputEvent]) {
    for event in events {
        engine.handle(event);
    }
}

#[tokio::test]
async fn drag_undo_redo() {
    let mut engine = engine();
    insert(&mut engine, "e1", 0.0, 0.0);

    run(&mut engine, &[down(20.0, 20.0), moved(25.0, 25.0), moved(30.0, 30.0), up(30.0, 30.0)]);
    assert_eq!(position(&engine, "e1"), (10.0, 10.0));

    run(&mut engine, &[key("z", ctrl())]);
    assert_eq!(position(&engine, "e1"), (0.0, 0.0));

    let redo = Modifiers { shift: true, ..ctrl() };
    run(&mut engine, &[key("z", redo)]);
    assert_eq!(position(&engine, "e1"), (10.0, 10.0));
}

#[tokio::test]
async fn recorded_session_replays_from_json() {
    let mut engine = engine();
    insert(&mut engine, "a", 0.0, 0.0);
    insert(&mut engine, "b", 100.0, 0.0);

    let events: Vec<InputEvent> = serde_json::from_value(json!([
        { "type": "pointer_down", "x": -10.0, "y": -10.0 },
        { "type": "pointer_move", "x": 60.0, "y": 30.0 },
        { "type": "pointer_move", "x": 120.0, "y": 30.0 },
        { "type": "pointer_up", "x": 120.0, "y": 30.0 },
        { "type": "key_down", "key": "ArrowDown" },
        { "type": "key_down", "key": "ArrowDown", "modifiers": { "alt": true } }
    ]))
    .unwrap();
    run(&mut engine, &events);

    assert_eq!(engine.board.selection().ids(), &[id("a"), id("b")]);
    assert_eq!(position(&engine, "a"), (0.0, 6.0));
    assert_eq!(position(&engine, "b"), (100.0, 6.0));
}

#[tokio::test]
async fn marquee_delete_and_restore() {
    let mut engine = engine();
    insert(&mut engine, "a", 0.0, 0.0);
    insert(&mut engine, "b", 100.0, 0.0);
    insert(&mut engine, "c", 0.0, 200.0);

    run(&mut engine, &[down(-10.0, -10.0), moved(50.0, 20.0), moved(110.0, 20.0), up(110.0, 20.0)]);
    assert_eq!(engine.board.selection().ids(), &[id("a"), id("b")]);

    run(&mut engine, &[key("Delete", Modifiers::default())]);
    assert_eq!(engine.board.scene().root(), &[id("c")]);
    assert!(engine.board.selection().is_empty());

    run(&mut engine, &[key("z", ctrl())]);
    assert_eq!(engine.board.scene().root(), &[id("a"), id("b"), id("c")]);
    assert_eq!(engine.board.selection().ids(), &[id("a"), id("b")]);

    // Undo the marquee commit itself.
    run(&mut engine, &[key("z", ctrl())]);
    assert!(engine.board.selection().is_empty());
}

#[tokio::test]
async fn read_only_board_ignores_edits() {
    let mut engine = engine();
    insert(&mut engine, "a", 0.0, 0.0);
    engine.board.set_read_only(true);

    run(&mut engine, &[down(20.0, 20.0), moved(60.0, 60.0), up(60.0, 60.0), key("Delete", Modifiers::default())]);
    assert_eq!(position(&engine, "a"), (0.0, 0.0));
    assert!(engine.board.selection().is_empty());

    let before = engine.board.snapshot();
    run(&mut engine, &[key("z", ctrl())]);
    assert_eq!(engine.board.snapshot(), before);
}

#[tokio::test]
async fn ctrl_wheel_zooms_about_pointer() {
    let mut engine = engine();
    let anchor = whiteboard::geometry::Point::new(300.0, 200.0);
    let before = engine.board.viewport().screen_to_board(anchor);

    let wheel = WheelEvent { x: anchor.x, y: anchor.y, dx: 0.0, dy: -100.0, modifiers: ctrl() };
    assert_eq!(engine.handle(&InputEvent::Wheel(wheel)), Some("viewport"));
    assert!(engine.board.viewport().zoom() > 1.0);

    let after = engine.board.viewport().screen_to_board(anchor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
    assert!(!engine.board.history().can_undo());
}

#[tokio::test]
async fn right_drag_pans_without_touching_elements() {
    let mut engine = engine();
    insert(&mut engine, "a", 0.0, 0.0);
    let right = |x, y| PointerEvent::new(x, y, Button::Secondary, Modifiers::default());

    run(
        &mut engine,
        &[
            InputEvent::PointerDown(right(20.0, 20.0)),
            InputEvent::PointerMove(right(70.0, 40.0)),
            InputEvent::PointerUp(right(70.0, 40.0)),
        ],
    );
    assert_eq!(engine.board.viewport().offset_x, 50.0);
    assert_eq!(engine.board.viewport().offset_y, 20.0);
    assert_eq!(position(&engine, "a"), (0.0, 0.0));
}

#[tokio::test]
async fn fit_view_frames_content() {
    let mut engine = engine();
    insert(&mut engine, "a", 0.0, 0.0);
    insert(&mut engine, "b", 960.0, 560.0);
    engine.board.set_screen_size(1100.0, 700.0);

    run(&mut engine, &[key("o", ctrl())]);
    let viewport = engine.board.viewport();
    let top_left = viewport.board_to_screen(whiteboard::geometry::Point::new(0.0, 0.0));
    let bottom_right = viewport.board_to_screen(whiteboard::geometry::Point::new(1000.0, 600.0));
    assert!(top_left.x >= 49.0 && top_left.y >= 49.0);
    assert!(bottom_right.x <= 1051.0 && bottom_right.y <= 651.0);
}

#[tokio::test]
async fn history_limit_evicts_oldest() {
    let config = BoardConfig { history_limit: 2, ..BoardConfig::default() };
    let mut engine = Engine::with_default_plugins(config, Handle::current());
    for (name, x) in [("a", 0.0), ("b", 100.0), ("c", 200.0)] {
        insert(&mut engine, name, x, 0.0);
    }
    assert_eq!(engine.board.history().undo_len(), 2);

    run(&mut engine, &[key("z", ctrl()), key("z", ctrl()), key("z", ctrl())]);
    assert_eq!(engine.board.scene().root(), &[id("a")]);
}
