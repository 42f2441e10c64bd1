#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn rect_at(id: &str, x: f64, y: f64) -> Element {
    Element::with_id(ElementId::from(id), ElementKind::Rectangle, x, y, 100.0, 80.0)
}

// =============================================================
// ElementId
// =============================================================

#[test]
fn generated_ids_are_unique() {
    let a = ElementId::generate();
    let b = ElementId::generate();
    assert_ne!(a, b);
}

#[test]
fn id_serializes_as_plain_string() {
    let id = ElementId::from("e1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"e1\"");
    assert_eq!(id.to_string(), "e1");
}

// =============================================================
// Element serde
// =============================================================

#[test]
fn element_kind_tag_is_flattened() {
    let el = rect_at("e1", 1.0, 2.0);
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(value["type"], "rectangle");
    assert_eq!(value["id"], "e1");
    assert_eq!(value["x"], 1.0);
}

#[test]
fn element_deserializes_with_defaults() {
    let el: Element = serde_json::from_value(json!({
        "id": "img",
        "type": "image",
        "source": "cat.png",
        "x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0
    }))
    .unwrap();
    assert_eq!(el.kind, ElementKind::Image { source: "cat.png".into() });
    assert_eq!(el.rotation, 0.0);
    assert_eq!(el.props, json!({}));
}

#[test]
fn group_deserializes_children() {
    let el: Element = serde_json::from_value(json!({
        "id": "g",
        "type": "group",
        "children": ["a", "b"],
        "x": 0.0, "y": 0.0, "width": 0.0, "height": 0.0
    }))
    .unwrap();
    assert!(el.is_group());
    assert_eq!(el.children(), &[ElementId::from("a"), ElementId::from("b")]);
}

#[test]
fn path_fill_rule_defaults_to_nonzero() {
    let el: Element = serde_json::from_value(json!({
        "id": "p",
        "type": "path",
        "commands": [
            { "cmd": "move_to", "x": 0.0, "y": 0.0 },
            { "cmd": "line_to", "x": 10.0, "y": 0.0 },
            { "cmd": "close" }
        ],
        "view_width": 10.0,
        "view_height": 10.0,
        "x": 0.0, "y": 0.0, "width": 20.0, "height": 20.0
    }))
    .unwrap();
    let Some((commands, rule)) = el.local_path() else {
        panic!("path elements have a local path");
    };
    assert_eq!(commands.len(), 3);
    assert_eq!(rule, FillRule::NonZero);
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn non_group_has_no_children() {
    let el = rect_at("e1", 0.0, 0.0);
    assert!(el.children().is_empty());
    assert!(!el.is_group());
}

#[test]
fn group_has_no_local_path() {
    assert!(Element::group(ElementId::from("g")).local_path().is_none());
}

#[test]
fn path_placement_scales_view_box() {
    let mut el = rect_at("p", 0.0, 0.0);
    el.kind = ElementKind::Path {
        commands: PathCommand::rect(10.0, 20.0),
        fill_rule: FillRule::EvenOdd,
        view_width: 10.0,
        view_height: 20.0,
    };
    let placement = el.placement();
    assert_eq!(placement.scale_x, 10.0);
    assert_eq!(placement.scale_y, 4.0);
}

#[test]
fn zero_view_box_does_not_divide_by_zero() {
    let mut el = rect_at("p", 0.0, 0.0);
    el.kind = ElementKind::Path {
        commands: Vec::new(),
        fill_rule: FillRule::NonZero,
        view_width: 0.0,
        view_height: 0.0,
    };
    let placement = el.placement();
    assert_eq!(placement.scale_x, 1.0);
    assert_eq!(placement.scale_y, 1.0);
}

// =============================================================
// PropertyPatch
// =============================================================

#[test]
fn patch_applies_only_present_fields() {
    let mut el = rect_at("e1", 5.0, 6.0);
    el.apply_patch(&PropertyPatch { x: Some(50.0), ..PropertyPatch::default() });
    assert_eq!(el.x, 50.0);
    assert_eq!(el.y, 6.0);
    assert_eq!(el.width, 100.0);
}

#[test]
fn patch_merges_props_and_null_deletes() {
    let mut el = rect_at("e1", 0.0, 0.0);
    el.props = json!({ "fill": "red", "text": "hi" });
    el.apply_patch(&PropertyPatch {
        props: Some(json!({ "fill": "blue", "text": null, "stroke": "black" })),
        ..PropertyPatch::default()
    });
    assert_eq!(el.props, json!({ "fill": "blue", "stroke": "black" }));
}

#[test]
fn patch_props_onto_non_object_replaces_it() {
    let mut el = rect_at("e1", 0.0, 0.0);
    el.props = json!(null);
    el.apply_patch(&PropertyPatch { props: Some(json!({ "fill": "red" })), ..PropertyPatch::default() });
    assert_eq!(el.props, json!({ "fill": "red" }));
}

#[test]
fn capture_then_apply_restores_element() {
    let mut el = rect_at("e1", 5.0, 6.0);
    el.rotation = 12.0;
    el.props = json!({ "fill": "red" });
    let original = el.clone();

    let patch = PropertyPatch {
        x: Some(1.0),
        rotation: Some(90.0),
        props: Some(json!({ "fill": "blue", "stroke": "black" })),
        ..PropertyPatch::default()
    };
    let previous = el.capture(&patch);
    el.apply_patch(&patch);
    assert_ne!(el, original);

    el.apply_patch(&previous);
    assert_eq!(el, original);
}

#[test]
fn capture_records_absent_props_as_null() {
    let el = rect_at("e1", 0.0, 0.0);
    let previous = el.capture(&PropertyPatch { props: Some(json!({ "fill": "red" })), ..PropertyPatch::default() });
    assert_eq!(previous.props, Some(json!({ "fill": null })));
    assert!(previous.x.is_none());
}

#[test]
fn overlay_prefers_later_fields() {
    let first = PropertyPatch { x: Some(1.0), y: Some(2.0), props: Some(json!({ "a": 1 })), ..PropertyPatch::default() };
    let later = PropertyPatch { x: Some(10.0), props: Some(json!({ "b": 2 })), ..PropertyPatch::default() };
    let merged = first.overlay(&later);
    assert_eq!(merged.x, Some(10.0));
    assert_eq!(merged.y, Some(2.0));
    assert_eq!(merged.props, Some(json!({ "a": 1, "b": 2 })));
}

#[test]
fn underlay_prefers_own_fields() {
    let earliest = PropertyPatch { x: Some(0.0), width: Some(5.0), ..PropertyPatch::default() };
    let own = PropertyPatch { x: Some(3.0), ..PropertyPatch::default() };
    let merged = own.underlay(&earliest);
    assert_eq!(merged.x, Some(3.0));
    assert_eq!(merged.width, Some(5.0));
}

#[test]
fn empty_patch_is_empty() {
    assert!(PropertyPatch::default().is_empty());
    assert!(!PropertyPatch::position(0.0, 0.0).is_empty());
}
