//! Layout builder tests: piece placement, cross-references against key
//! names, and the problems reported for bad layouts.

use fingerlib::{parse_layout_str, Issue, Layout, LayoutOptions, ValidationError};
use pretty_assertions::assert_eq;

const NAMES: &[&str] = &["T", "R1", "1"];

const DEFS: &str = r#"
[layout.defs]
circle = '<circle r="10"/>'
square = '<rect width="10" height="10"/>'
"#;

fn layout(head: &str, pieces: &str) -> String {
    format!("[layout]\n{head}\n{DEFS}\n{pieces}\n")
}

fn built(text: &str) -> Layout {
    parse_layout_str(text, NAMES, &LayoutOptions::default()).unwrap()
}

fn rejected(text: &str) -> ValidationError {
    parse_layout_str(text, NAMES, &LayoutOptions::default())
        .unwrap_err()
        .validation()
        .cloned()
        .expect("should fail validation")
}

fn positions(layout: &Layout) -> Vec<(&str, i64, i64)> {
    layout
        .pieces
        .iter()
        .map(|p| (p.name.as_str(), p.x, p.y))
        .collect()
}

#[test]
fn pieces_advance_by_spacing() {
    let l = built(&layout(
        "width = 100\nspacing = 50",
        r#"
        [layout.pieces.T]
        parts = { _off = "circle" }
        [layout.pieces.R1]
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(positions(&l), [("T", 0, 0), ("R1", 0, 50)]);
    // (2 + 1) * 50 + 20
    assert_eq!(l.size, (100, 170));
}

#[test]
fn explicit_coordinates_rebase_the_cursor() {
    let l = built(&layout(
        "width = 60\nspacing = 10",
        r#"
        [layout.pieces._top]
        parts = { _off = "square" }
        [layout.pieces.T]
        x = 5
        y = 100
        parts = { _off = "circle" }
        [layout.pieces.R1]
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(
        positions(&l),
        [("_top", 0, 0), ("T", 5, 100), ("R1", 5, 110)]
    );
    assert_eq!(l.size, (60, 150));
    assert_eq!(l.spacing, 10);
}

#[test]
fn definitions_carry_their_id() {
    let l = built(&layout("", "[layout.pieces]"));
    let ids: Vec<&str> = l.defs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["circle", "square"]);
    assert_eq!(
        l.definition("circle").unwrap().element.to_markup(),
        r#"<circle r="10" id="circle"/>"#
    );
}

#[test]
fn parts_parse_into_definition_references() {
    let l = built(&layout(
        "",
        r#"
        [layout.pieces.T]
        parts = { _off = "circle", T = "circle@filled+square@ring" }
        "#,
    ));
    let pressed = &l.piece("T").unwrap().parts["T"];
    assert_eq!(pressed.len(), 2);
    assert_eq!(pressed[1].def_id, "square");
    assert_eq!(pressed[1].style, "ring");
}

#[test]
fn short_names_and_decorative_pieces_are_valid() {
    let l = built(&layout(
        "",
        r#"
        [layout.pieces.1]
        parts = { off = "circle" }
        [layout.pieces._outline]
        parts = { _off = "square" }
        "#,
    ));
    assert_eq!(l.pieces.len(), 2);
}

#[test]
fn unknown_piece_name_is_reported() {
    let e = rejected(&layout(
        "",
        r#"
        [layout.pieces.Z]
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(e.details(Issue::UnknownPieceName), ["Z"]);
    assert_eq!(e.labels().count(), 1);
}

#[test]
fn piece_without_parts() {
    let e = rejected(&layout(
        "",
        r#"
        [layout.pieces.T]
        x = 3
        [layout.pieces.R1]
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(e.details(Issue::MissingParts), ["T"]);
    assert_eq!(e.labels().count(), 1);
}

#[test]
fn piece_without_off_state() {
    let e = rejected(&layout(
        "",
        r#"
        [layout.pieces.T]
        parts = { T = "circle" }
        "#,
    ));
    assert_eq!(e.details(Issue::MissingOffPart), ["T"]);
}

#[test]
fn parts_must_reference_known_definitions() {
    let e = rejected(&layout(
        "",
        r#"
        [layout.pieces.T]
        parts = { _off = "circle+hexagon", T = "star@filled" }
        "#,
    ));
    assert_eq!(e.details(Issue::UnknownDefinition), ["T: star hexagon"]);
}

#[test]
fn broken_markup_is_dropped_and_reported() {
    let e = rejected(
        r#"
        [layout.defs]
        broken = '<circle r="3">'
        number = 7

        [layout.pieces.T]
        parts = { _off = "broken" }
        "#,
    );
    let bad = e.details(Issue::BadMarkup);
    assert_eq!(bad.len(), 2);
    assert!(bad[0].ends_with(r#"broken: <circle r="3">"#), "{}", bad[0]);
    assert_eq!(bad[1], "not a string: number: 7");
    assert_eq!(e.details(Issue::UnknownDefinition), ["T: broken"]);
}

#[test]
fn piece_fields_are_checked() {
    let e = rejected(&layout(
        "",
        r#"
        [layout.pieces.T]
        x = "left"
        colour = "red"
        parts = { _off = "circle", T = 1 }
        "#,
    ));
    assert_eq!(e.details(Issue::UnknownField), ["T: colour"]);
    assert_eq!(
        e.details(Issue::InvalidValue),
        ["T: parts.T: 1", "T: x: \"left\""]
    );
}

#[test]
fn layout_section_shape_is_checked_first() {
    let e = rejected("[layout]\ndefs = {}\nheight = 3\n");
    assert_eq!(e.details(Issue::UnknownField), ["height"]);
    assert_eq!(e.details(Issue::MissingField), ["pieces"]);

    let e = rejected("[other]\n");
    assert_eq!(e.details(Issue::NotATable), ["layout"]);
    assert_eq!(e.details(Issue::UnknownField), ["other"]);

    let e = rejected("[layout]\ndefs = {}\npieces = {}\n\n[layout_extra]\nfoo = 1\n");
    assert_eq!(e.details(Issue::UnknownField), ["layout_extra"]);
}

#[test]
fn cursor_overflow_is_reported() {
    let e = rejected(&layout(
        "spacing = 9223372036854775807",
        r#"
        [layout.pieces.T]
        parts = { _off = "circle" }
        [layout.pieces.R1]
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(
        e.details(Issue::InvalidValue),
        [
            "R1: y: out of range",
            "spacing: 9223372036854775807: canvas height out of range",
        ]
    );

    let e = rejected(&layout(
        "spacing = 10",
        r#"
        [layout.pieces.T]
        y = 9223372036854775800
        parts = { _off = "circle" }
        "#,
    ));
    assert_eq!(
        e.details(Issue::InvalidValue),
        ["T: y: out of range", "spacing: 10: canvas height out of range"]
    );
}

#[test]
fn validated_against_a_fingering_system() {
    let system = fingerlib::parse_fingering_str(
        r#"
        [keys.T]
        short_name = "th"
        press = "thumb"

        [fingerings]
        C4 = "T"
        "#,
        &fingerlib::FingeringOptions::default(),
    )
    .unwrap();

    let text = layout(
        "",
        r#"
        [layout.pieces.th]
        parts = { _off = "circle" }
        [layout.pieces.R1]
        parts = { _off = "circle" }
        "#,
    );
    let e = parse_layout_str(&text, &system, &LayoutOptions::default())
        .unwrap_err()
        .validation()
        .cloned()
        .unwrap();
    assert_eq!(e.details(Issue::UnknownPieceName), ["R1"]);
}
