#![allow(clippy::float_cmp)]

use super::*;

// =============================================================================
// parse_script
// =============================================================================

#[test]
fn parses_pointer_events_with_defaults() {
    let events = parse_script(r#"{"event":"pointer_down","x":10,"y":20}"#).unwrap();
    assert_eq!(
        events,
        vec![ScriptEvent::PointerDown { x: 10.0, y: 20.0, button: Button::Primary, modifiers: Modifiers::default() }]
    );
}

#[test]
fn skips_blank_lines_and_comments() {
    let text = "\n# draw a box\n{\"event\":\"mode\",\"mode\":\"draw_rect_section\"}\n   \n{\"event\":\"delete_seats\"}\n";
    let events = parse_script(text).unwrap();
    assert_eq!(events, vec![ScriptEvent::Mode { mode: EditMode::DrawRectSection }, ScriptEvent::DeleteSeats]);
}

#[test]
fn reports_the_offending_line() {
    let text = "{\"event\":\"delete_rows\"}\n\n{\"event\":\"teleport\"}\n";
    let err = parse_script(text).unwrap_err();
    assert!(matches!(err, ScriptError::Parse { line: 3, .. }), "{err}");
}

#[test]
fn missing_field_is_a_parse_error() {
    assert!(matches!(parse_script(r#"{"event":"curve","section":"Floor"}"#), Err(ScriptError::Parse { line: 1, .. })));
}

#[test]
fn parses_drag_path_and_modifiers() {
    let line = r#"{"event":"drag","path":[{"x":0,"y":0},{"x":5,"y":5}],"modifiers":{"shift":true}}"#;
    let events = parse_script(line).unwrap();
    let ScriptEvent::Drag { path, button, modifiers } = &events[0] else {
        panic!("expected drag, got {events:?}");
    };
    assert_eq!(path, &vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
    assert_eq!(*button, Button::Primary);
    assert!(modifiers.shift && !modifiers.ctrl);
}

#[test]
fn parses_bulk_operations() {
    let text = [
        r#"{"event":"assign_seats","section":"Balcony","row":"Z"}"#,
        r#"{"event":"recalculate_rows"}"#,
        r#"{"event":"align_rows","alignment":"center"}"#,
        r#"{"event":"update_section","section":"Floor","fields":{"name":"Pit","rotation":15}}"#,
        r#"{"event":"kind","kind":"stage"}"#,
    ]
    .join("\n");
    let events = parse_script(&text).unwrap();
    assert_eq!(events[0], ScriptEvent::AssignSeats { section: "Balcony".into(), row: "Z".into() });
    assert_eq!(events[1], ScriptEvent::RecalculateRows { section: None });
    assert_eq!(events[2], ScriptEvent::AlignRows { alignment: Alignment::Center });
    let ScriptEvent::UpdateSection { fields, .. } = &events[3] else {
        panic!("expected update_section");
    };
    assert_eq!(fields.name.as_deref(), Some("Pit"));
    assert_eq!(fields.rotation, Some(15.0));
    assert_eq!(events[4], ScriptEvent::Kind { kind: SectionKind::Stage });
}

#[test]
fn parses_row_table_and_block_events() {
    let text = [
        r#"{"event":"update_row","section":"Floor","row":"A","fields":{"seat_count":12,"curve":-4}}"#,
        r##"{"event":"update_table","section":"Floor","row":"T1","fields":{"seat_spacing":40,"color":"#111"}}"##,
        r#"{"event":"block_seats","reason":"mixing desk"}"#,
        r#"{"event":"block_seats"}"#,
        r#"{"event":"unblock_seats"}"#,
    ]
    .join("\n");
    let events = parse_script(&text).unwrap();
    let ScriptEvent::UpdateRow { row, fields, .. } = &events[0] else {
        panic!("expected update_row, got {:?}", events[0]);
    };
    assert_eq!(row, "A");
    assert_eq!((fields.seat_count, fields.curve), (Some(12), Some(-4.0)));
    let ScriptEvent::UpdateTable { fields, .. } = &events[1] else {
        panic!("expected update_table, got {:?}", events[1]);
    };
    assert_eq!(fields.seat_spacing, Some(40.0));
    assert_eq!(fields.color.as_deref(), Some("#111"));
    assert_eq!(events[2], ScriptEvent::BlockSeats { reason: Some("mixing desk".into()) });
    assert_eq!(events[3], ScriptEvent::BlockSeats { reason: None });
    assert_eq!(events[4], ScriptEvent::UnblockSeats);
}

#[test]
fn empty_script_is_empty() {
    assert!(parse_script("").unwrap().is_empty());
}
