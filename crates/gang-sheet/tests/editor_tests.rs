use gang_sheet::editor::*;
use gang_sheet::*;

fn placement(logo_id: &str, x: f64, y: f64, width: f64, height: f64) -> Placement {
    Placement {
        id: PlacementId::next(),
        logo: LogoRef {
            id: logo_id.to_string(),
            description: String::new(),
            account_name: String::new(),
            raster_url: format!("{logo_id}.png"),
            vector_url: None,
        },
        note: None,
        x,
        y,
        width,
        height,
        rotated: false,
    }
}

/// Medium sheet (22.5 x 12.5) with three logos well away from the edges
fn test_sheet() -> Sheet {
    Sheet {
        size: SheetSize::Medium,
        placements: vec![
            placement("a", 2.0, 2.0, 3.0, 1.5),
            placement("b", 8.0, 2.0, 2.0, 2.0),
            placement("c", 14.0, 6.0, 4.0, 1.0),
        ],
    }
}

fn editing_session() -> (EditorSession, Vec<PlacementId>) {
    let mut session = EditorSession::new(test_sheet());
    assert!(session.begin_editing());
    let ids = session.sheet().ids();
    (session, ids)
}

fn assert_in_bounds(sheet: &Sheet) {
    for p in &sheet.placements {
        assert!(p.x >= 0.0 && p.y >= 0.0, "{:?}", p);
        assert!(p.right() <= sheet.width_in() + 1e-9, "{:?}", p);
        assert!(p.bottom() <= sheet.height_in() + 1e-9, "{:?}", p);
    }
}

#[test]
fn test_session_starts_idle() {
    let mut session = EditorSession::new(test_sheet());
    assert_eq!(session.mode(), EditMode::Idle);
    assert_eq!(session.pointer(), PointerState::Released);

    assert!(session.begin_editing());
    assert!(!session.begin_editing());
    assert_eq!(session.mode(), EditMode::Editing);
}

#[test]
fn test_select_replaces_and_additive_toggles() {
    let (mut session, ids) = editing_session();

    assert!(session.select(ids[0], false));
    assert!(session.select(ids[1], false));
    assert_eq!(session.selection(), &[ids[1]]);

    session.select(ids[2], true);
    assert_eq!(session.selection(), &[ids[1], ids[2]]);

    session.select(ids[1], true);
    assert_eq!(session.selection(), &[ids[2]]);
}

#[test]
fn test_select_unknown_placement_is_noop() {
    let (mut session, _) = editing_session();
    assert!(!session.select(PlacementId(u64::MAX), false));
    assert!(session.selection().is_empty());
}

#[test]
fn test_selecting_a_member_selects_the_group() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[2], true);
    assert!(session.group());

    session.clear_selection();
    session.select(ids[2], false);
    assert_eq!(session.selection(), &[ids[0], ids[2]]);

    // Additive toggle removes the whole group at once
    session.select(ids[1], true);
    session.select(ids[0], true);
    assert_eq!(session.selection(), &[ids[1]]);
}

#[test]
fn test_group_needs_two() {
    let (mut session, ids) = editing_session();
    assert!(!session.group());
    session.select(ids[0], false);
    assert!(!session.group());
    assert!(session.groups().is_empty());
}

#[test]
fn test_latest_group_wins_on_overlap() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[1], true);
    session.group();

    // Selecting b would pull in its group, so pick b and c with a box
    session.clear_selection();
    session.apply(&EditCommand::BoxSelect {
        from: Point::new(8.5, 2.5),
        to: Point::new(15.0, 6.5),
        additive: false,
    });
    session.group();

    let group = session.group_of(ids[1]).unwrap();
    assert_eq!(group.members, vec![ids[1], ids[2]]);
}

#[test]
fn test_ungroup_dissolves_every_touched_group() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[1], true);
    session.group();
    session.select(ids[1], false);
    session.select(ids[2], true);
    session.group();
    assert_eq!(session.groups().len(), 2);

    // Selecting just b touches both groups
    session.clear_selection();
    session.apply(&EditCommand::BoxSelect {
        from: Point::new(8.5, 2.5),
        to: Point::new(9.0, 3.0),
        additive: false,
    });
    assert_eq!(session.selection(), &[ids[1]]);

    assert!(session.ungroup());
    assert!(session.groups().is_empty());
    assert!(!session.ungroup());
}

#[test]
fn test_rotate_keeps_centre_and_swaps_dimensions() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    let before = session.sheet().placements[0].center();

    assert!(session.rotate());
    let p = &session.sheet().placements[0];
    assert_eq!((p.width, p.height), (1.5, 3.0));
    assert_eq!(p.center(), before);
    assert_eq!(session.rotation_of(ids[0]), Rotation::Clockwise90);
    assert_eq!(session.rotation_of(ids[1]), Rotation::None);
}

#[test]
fn test_four_rotations_restore_placement() {
    let (mut session, ids) = editing_session();
    let original = session.sheet().placements.clone();
    session.select(ids[0], false);
    session.select(ids[2], true);

    let expected = [
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::Clockwise270,
        Rotation::None,
    ];
    for rotation in expected {
        session.rotate();
        assert_eq!(session.rotation_of(ids[0]), rotation);
    }

    assert_eq!(session.sheet().placements, original);
    assert!(session.overlay().is_empty());
}

#[test]
fn test_rotate_clamps_at_sheet_edge() {
    let mut sheet = test_sheet();
    // Wide logo in the bottom-right corner
    sheet.placements.push(placement("d", 16.5, 11.5, 6.0, 1.0));
    let mut session = EditorSession::new(sheet);
    session.begin_editing();
    let id = session.sheet().placements[3].id;

    session.select(id, false);
    session.rotate();

    let p = session.sheet().get(id).unwrap();
    assert_eq!((p.width, p.height), (1.0, 6.0));
    assert_eq!(p.y, 12.5 - 6.0);
    assert_in_bounds(session.sheet());
}

#[test]
fn test_duplicate_appends_offset_copies() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.rotate();
    session.select(ids[1], true);

    assert!(session.duplicate());
    let placements = &session.sheet().placements;
    assert_eq!(placements.len(), 5);

    let copies = session.selection().to_vec();
    assert_eq!(copies.len(), 2);
    assert_eq!(copies, vec![placements[3].id, placements[4].id]);
    assert!(copies.iter().all(|id| !ids.contains(id)));

    // Copies follow their originals in sheet order
    assert_eq!(placements[3].logo.id, "a");
    assert_eq!(placements[4].logo.id, "b");
    assert_eq!(placements[4].x, 8.0 + 0.25);
    assert_eq!(placements[4].y, 2.0 + 0.25);

    assert_eq!(session.rotation_of(copies[0]), Rotation::Clockwise90);
    assert_eq!(session.rotation_of(copies[1]), Rotation::None);
}

#[test]
fn test_duplicate_then_delete_restores_list() {
    let (mut session, ids) = editing_session();
    let original = session.sheet().placements.clone();

    session.select(ids[0], false);
    session.select(ids[2], true);
    session.duplicate();
    assert!(session.delete());

    assert_eq!(session.sheet().placements, original);
    assert!(session.selection().is_empty());
}

#[test]
fn test_duplicate_is_clamped() {
    let mut sheet = Sheet::new(SheetSize::Small);
    sheet.placements.push(placement("edge", 8.0, 11.5, 3.0, 1.0));
    let mut session = EditorSession::new(sheet);
    session.begin_editing();
    let id = session.sheet().placements[0].id;

    session.select(id, false);
    session.duplicate();

    let copy = &session.sheet().placements[1];
    assert_eq!((copy.x, copy.y), (8.0, 11.5));
    assert_ne!(copy.id, id);
}

#[test]
fn test_delete_dissolves_small_groups() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[1], true);
    session.group();
    session.apply(&EditCommand::BoxSelect {
        from: Point::new(0.0, 0.0),
        to: Point::new(20.0, 8.0),
        additive: false,
    });
    session.group();
    assert_eq!(session.groups().len(), 2);

    // Delete b only: the pair loses a member and dissolves
    session.clear_selection();
    session.apply(&EditCommand::BoxSelect {
        from: Point::new(8.5, 2.5),
        to: Point::new(8.6, 2.6),
        additive: false,
    });
    session.delete();

    assert_eq!(session.sheet().placements.len(), 2);
    assert_eq!(session.groups().len(), 1);
    assert_eq!(session.groups()[0].members, vec![ids[0], ids[2]]);
}

#[test]
fn test_delete_clears_rotation_of_removed() {
    let (mut session, ids) = editing_session();
    session.select(ids[1], false);
    session.rotate();
    session.delete();

    assert_eq!(session.rotation_of(ids[1]), Rotation::None);
    assert!(session.overlay().is_empty());
}

#[test]
fn test_drag_moves_selection_together() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[1], true);

    assert!(session.begin_drag(ids[1]));
    assert!(session.end_drag(1.0, 0.5));
    assert_eq!(session.pointer(), PointerState::Released);

    let placements = &session.sheet().placements;
    assert_eq!((placements[0].x, placements[0].y), (3.0, 2.5));
    assert_eq!((placements[1].x, placements[1].y), (9.0, 2.5));
    assert_eq!((placements[2].x, placements[2].y), (14.0, 6.0));
}

#[test]
fn test_drag_unselected_moves_its_group() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[2], true);
    session.group();
    session.select(ids[1], false);

    session.drag_move(ids[0], -1.0, 0.0);

    let placements = &session.sheet().placements;
    assert_eq!(placements[0].x, 1.0);
    assert_eq!(placements[1].x, 8.0);
    assert_eq!(placements[2].x, 13.0);
}

#[test]
fn test_drag_clamps_each_member_independently() {
    let (mut session, ids) = editing_session();
    session.select(ids[0], false);
    session.select(ids[2], true);

    session.drag_move(ids[0], 10.0, 0.0);

    let placements = &session.sheet().placements;
    assert_eq!(placements[0].x, 12.0);
    // c would end at 28 and stops at the right edge instead
    assert_eq!(placements[2].x, 22.5 - 4.0);
    assert_in_bounds(session.sheet());
}

#[test]
fn test_drag_lone_placement() {
    let (mut session, ids) = editing_session();
    session.apply(&EditCommand::Drag {
        index: 1,
        dx: -20.0,
        dy: -20.0,
    });

    let p = session.sheet().get(ids[1]).unwrap();
    assert_eq!((p.x, p.y), (0.0, 0.0));
    assert_eq!(session.sheet().placements[0].x, 2.0);
}

#[test]
fn test_box_select_unions_while_dragging_out() {
    let (mut session, ids) = editing_session();
    session.select(ids[2], false);

    assert!(session.begin_box_select(Point::new(1.0, 1.0), true));
    session.update_box_select(Point::new(3.0, 3.0));
    assert_eq!(session.selection(), &[ids[2], ids[0]]);

    session.update_box_select(Point::new(9.0, 3.0));
    assert_eq!(session.selection(), &[ids[2], ids[0], ids[1]]);

    // Shrinking the box never drops anything
    session.update_box_select(Point::new(1.5, 1.5));
    assert_eq!(session.selection().len(), 3);

    session.release_pointer();
    assert!(!session.update_box_select(Point::new(20.0, 10.0)));
}

#[test]
fn test_box_select_touching_edge_counts() {
    let (mut session, ids) = editing_session();
    session.begin_box_select(Point::new(0.0, 0.0), false);
    // Touches a's top-left corner exactly
    session.update_box_select(Point::new(2.0, 2.0));
    assert_eq!(session.selection(), &[ids[0]]);
}

#[test]
fn test_cancel_restores_original() {
    let (mut session, ids) = editing_session();
    let original = session.sheet().clone();

    session.select(ids[0], false);
    session.select(ids[1], true);
    session.group();
    session.rotate();
    session.duplicate();

    assert!(session.cancel());
    assert_eq!(session.mode(), EditMode::Idle);
    assert_eq!(session.sheet(), &original);
    assert!(session.groups().is_empty());
    assert!(session.selection().is_empty());
    assert!(session.overlay().is_empty());
}

#[test]
fn test_save_keeps_edits_and_overlay() {
    let (mut session, ids) = editing_session();
    session.select(ids[2], false);
    session.rotate();

    let saved = session.save();
    assert_eq!(session.mode(), EditMode::Idle);
    assert_eq!((saved.placements[2].width, saved.placements[2].height), (1.0, 4.0));
    assert_eq!(session.rotation_of(ids[2]), Rotation::Clockwise90);

    // Mutation is off again until the next begin_editing
    assert!(!session.rotate());
    assert!(!session.cancel());

    let (sheet, overlay) = session.into_parts();
    assert_eq!(sheet, saved);
    assert_eq!(overlay.get(ids[2]), Rotation::Clockwise90);
}

#[test]
fn test_command_out_of_range_is_noop() {
    let (mut session, _) = editing_session();
    assert!(!session.apply(&EditCommand::Select {
        index: 9,
        additive: false
    }));
    assert!(!session.apply(&EditCommand::Drag {
        index: 9,
        dx: 1.0,
        dy: 1.0
    }));
    assert!(!session.apply(&EditCommand::Delete));
}

#[cfg(feature = "serde")]
#[test]
fn test_scripted_commands() {
    let script = r#"[
        {"op": "select", "index": 0},
        {"op": "select", "index": 1, "additive": true},
        {"op": "group"},
        {"op": "rotate"},
        {"op": "duplicate"},
        {"op": "drag", "index": 3, "dx": 0.5, "dy": 0.0}
    ]"#;
    let commands: Vec<EditCommand> = serde_json::from_str(script).unwrap();

    let (mut session, _) = editing_session();
    for command in &commands {
        assert!(session.apply(command), "{:?}", command);
    }

    let sheet = session.save();
    assert_eq!(sheet.placements.len(), 5);
    assert_eq!(session.groups().len(), 1);
    assert_in_bounds(&sheet);
}
