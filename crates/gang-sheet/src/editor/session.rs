use super::geometry::{quarter_turn, translate};
use super::state::*;
use crate::constants::DUPLICATE_OFFSET_IN;
use crate::layout::Rect;
use crate::types::{PlacementId, Rotation, Sheet};

/// An editing session over one sheet.
///
/// The session owns the sheet's placement list while it is open. Every
/// operation is a no-op (returning `false`) outside [`EditMode::Editing`],
/// and every operation that changes placements replaces the whole list.
#[derive(Debug, Clone)]
pub struct EditorSession {
    sheet: Sheet,
    /// Snapshot taken by `begin_editing`, restored by `cancel`
    original: Option<Sheet>,
    mode: EditMode,
    pointer: PointerState,
    selection: Vec<PlacementId>,
    groups: Vec<SelectionGroup>,
    overlay: RotationOverlay,
}

impl EditorSession {
    pub fn new(sheet: Sheet) -> Self {
        Self {
            sheet,
            original: None,
            mode: EditMode::Idle,
            pointer: PointerState::Released,
            selection: Vec::new(),
            groups: Vec::new(),
            overlay: RotationOverlay::new(),
        }
    }

    // =========================================================================
    // Mode
    // =========================================================================

    pub fn begin_editing(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.original = Some(self.sheet.clone());
        self.mode = EditMode::Editing;
        log::debug!(
            "Editing {} sheet with {} placements",
            self.sheet.size,
            self.sheet.placements.len()
        );
        true
    }

    /// Leave editing and hand back the sheet as it now stands.
    ///
    /// Groups and the rotation overlay survive so the sheet can be exported
    /// with its rotations.
    pub fn save(&mut self) -> Sheet {
        if self.is_editing() {
            log::debug!(
                "Saved sheet: {} placements, {} rotated",
                self.sheet.placements.len(),
                self.overlay.len()
            );
        }
        self.mode = EditMode::Idle;
        self.pointer = PointerState::Released;
        self.selection.clear();
        self.original = None;
        self.sheet.clone()
    }

    /// Throw away every change made since `begin_editing`
    pub fn cancel(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        if let Some(original) = self.original.take() {
            self.sheet = original;
        }
        self.mode = EditMode::Idle;
        self.pointer = PointerState::Released;
        self.selection.clear();
        self.groups.clear();
        self.overlay = RotationOverlay::new();
        true
    }

    /// Consume the session, keeping the sheet and its rotations
    pub fn into_parts(self) -> (Sheet, RotationOverlay) {
        (self.sheet, self.overlay)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn selection(&self) -> &[PlacementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: PlacementId) -> bool {
        self.selection.contains(&id)
    }

    pub fn groups(&self) -> &[SelectionGroup] {
        &self.groups
    }

    /// The group a placement acts with. With overlapping groups the most
    /// recently created one wins.
    pub fn group_of(&self, id: PlacementId) -> Option<&SelectionGroup> {
        self.groups.iter().rev().find(|group| group.contains(id))
    }

    pub fn rotation_of(&self, id: PlacementId) -> Rotation {
        self.overlay.get(id)
    }

    pub fn overlay(&self) -> &RotationOverlay {
        &self.overlay
    }

    fn id_at(&self, index: usize) -> Option<PlacementId> {
        self.sheet.placements.get(index).map(|p| p.id)
    }

    fn group_members(&self, id: PlacementId) -> Vec<PlacementId> {
        match self.group_of(id) {
            Some(group) => group.members.clone(),
            None => vec![id],
        }
    }

    fn add_to_selection(&mut self, ids: impl IntoIterator<Item = PlacementId>) {
        for id in ids {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a placement, or its whole group.
    ///
    /// With `additive` the group is toggled in or out of the current
    /// selection instead of replacing it.
    pub fn select(&mut self, id: PlacementId, additive: bool) -> bool {
        if !self.is_editing() || self.sheet.get(id).is_none() {
            return false;
        }

        let members = self.group_members(id);
        if !additive {
            self.selection = members;
        } else if self.selection.contains(&id) {
            self.selection.retain(|selected| !members.contains(selected));
        } else {
            self.add_to_selection(members);
        }
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if !self.is_editing() || self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        true
    }

    /// Start a selection rectangle. Ignored while dragging.
    pub fn begin_box_select(&mut self, point: Point, additive: bool) -> bool {
        if !self.is_editing() || matches!(self.pointer, PointerState::Dragging { .. }) {
            return false;
        }
        if !additive {
            self.selection.clear();
        }
        self.pointer = PointerState::BoxSelecting {
            origin: point,
            current: point,
        };
        true
    }

    /// Grow the selection rectangle and add everything it touches.
    /// Nothing already selected is dropped.
    pub fn update_box_select(&mut self, point: Point) -> bool {
        let PointerState::BoxSelecting { origin, .. } = self.pointer else {
            return false;
        };
        self.pointer = PointerState::BoxSelecting {
            origin,
            current: point,
        };

        let rect = Rect::from_corners((origin.x, origin.y), (point.x, point.y));
        let hits: Vec<PlacementId> = self
            .sheet
            .placements
            .iter()
            .filter(|p| Rect::of_placement(p).intersects(&rect))
            .map(|p| p.id)
            .collect();
        self.add_to_selection(hits);
        true
    }

    pub fn release_pointer(&mut self) {
        self.pointer = PointerState::Released;
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Group the current selection. Needs at least two selected.
    pub fn group(&mut self) -> bool {
        if !self.is_editing() || self.selection.len() < 2 {
            return false;
        }
        let group = SelectionGroup {
            id: GroupId::next(),
            members: self.selection.clone(),
        };
        log::debug!("Created group {:?} of {}", group.id, group.members.len());
        self.groups.push(group);
        true
    }

    /// Dissolve every group sharing a member with the selection
    pub fn ungroup(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        let before = self.groups.len();
        let selection = &self.selection;
        self.groups
            .retain(|group| !group.members.iter().any(|m| selection.contains(m)));
        self.groups.len() != before
    }

    // =========================================================================
    // Placement edits
    // =========================================================================

    /// Turn each selected placement a quarter turn about its centre
    pub fn rotate(&mut self) -> bool {
        if !self.is_editing() || self.selection.is_empty() {
            return false;
        }

        let (width, height) = (self.sheet.width_in(), self.sheet.height_in());
        let mut placements = self.sheet.placements.clone();
        for placement in placements
            .iter_mut()
            .filter(|p| self.selection.contains(&p.id))
        {
            quarter_turn(placement, width, height);
            let rotation = self.overlay.get(placement.id).next();
            self.overlay.set(placement.id, rotation);
        }

        self.sheet.placements = placements;
        true
    }

    /// Append an offset copy of each selected placement and select the copies
    pub fn duplicate(&mut self) -> bool {
        if !self.is_editing() || self.selection.is_empty() {
            return false;
        }

        let (width, height) = (self.sheet.width_in(), self.sheet.height_in());
        let mut placements = self.sheet.placements.clone();
        let mut copies = Vec::new();

        for original in self
            .sheet
            .placements
            .iter()
            .filter(|p| self.selection.contains(&p.id))
        {
            let mut copy = original.clone();
            copy.id = PlacementId::next();
            translate(
                &mut copy,
                DUPLICATE_OFFSET_IN,
                DUPLICATE_OFFSET_IN,
                width,
                height,
            );
            let rotation = self.overlay.get(original.id);
            self.overlay.set(copy.id, rotation);
            copies.push(copy.id);
            placements.push(copy);
        }

        self.sheet.placements = placements;
        self.selection = copies;
        true
    }

    /// Remove every selected placement. Groups left with fewer than two
    /// members are dissolved.
    pub fn delete(&mut self) -> bool {
        if !self.is_editing() || self.selection.is_empty() {
            return false;
        }

        let removed = std::mem::take(&mut self.selection);
        self.sheet.placements = self
            .sheet
            .placements
            .iter()
            .filter(|p| !removed.contains(&p.id))
            .cloned()
            .collect();

        for id in &removed {
            self.overlay.remove(*id);
        }
        for group in &mut self.groups {
            group.members.retain(|m| !removed.contains(m));
        }
        self.groups.retain(|group| group.members.len() >= 2);
        true
    }

    /// What moves when `active` is dragged: the selection if it holds
    /// `active`, otherwise its group, otherwise `active` alone.
    pub fn drag_targets(&self, active: PlacementId) -> Vec<PlacementId> {
        if self.selection.contains(&active) {
            self.selection.clone()
        } else {
            self.group_members(active)
        }
    }

    /// Move the drag targets of `active` by a delta, clamping each one
    /// into the sheet on its own
    pub fn drag_move(&mut self, active: PlacementId, dx: f64, dy: f64) -> bool {
        if !self.is_editing() || self.sheet.get(active).is_none() {
            return false;
        }

        let targets = self.drag_targets(active);
        let (width, height) = (self.sheet.width_in(), self.sheet.height_in());
        let mut placements = self.sheet.placements.clone();
        for placement in placements.iter_mut().filter(|p| targets.contains(&p.id)) {
            translate(placement, dx, dy, width, height);
        }

        self.sheet.placements = placements;
        true
    }

    // =========================================================================
    // Pointer drag
    // =========================================================================

    pub fn begin_drag(&mut self, id: PlacementId) -> bool {
        if !self.is_editing()
            || self.pointer != PointerState::Released
            || self.sheet.get(id).is_none()
        {
            return false;
        }
        self.pointer = PointerState::Dragging { active: id };
        true
    }

    /// Finish a drag, moving by the total pointer delta
    pub fn end_drag(&mut self, dx: f64, dy: f64) -> bool {
        let PointerState::Dragging { active } = self.pointer else {
            return false;
        };
        self.pointer = PointerState::Released;
        self.drag_move(active, dx, dy)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Apply one scripted command. Returns whether anything changed.
    pub fn apply(&mut self, command: &EditCommand) -> bool {
        log::debug!("Applying {:?}", command);

        match *command {
            EditCommand::Select { index, additive } => match self.id_at(index) {
                Some(id) => self.select(id, additive),
                None => false,
            },
            EditCommand::BoxSelect { from, to, additive } => {
                if !self.begin_box_select(from, additive) {
                    return false;
                }
                self.update_box_select(to);
                self.release_pointer();
                true
            }
            EditCommand::ClearSelection => self.clear_selection(),
            EditCommand::Group => self.group(),
            EditCommand::Ungroup => self.ungroup(),
            EditCommand::Rotate => self.rotate(),
            EditCommand::Duplicate => self.duplicate(),
            EditCommand::Delete => self.delete(),
            EditCommand::Drag { index, dx, dy } => match self.id_at(index) {
                Some(id) => self.begin_drag(id) && self.end_drag(dx, dy),
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogoRef, Placement, SheetSize};

    fn sheet_with(count: usize) -> Sheet {
        let mut sheet = Sheet::new(SheetSize::Medium);
        for i in 0..count {
            sheet.placements.push(Placement {
                id: PlacementId::next(),
                logo: LogoRef {
                    id: i.to_string(),
                    description: String::new(),
                    account_name: String::new(),
                    raster_url: String::new(),
                    vector_url: None,
                },
                note: None,
                x: 1.0 + 4.0 * i as f64,
                y: 1.0,
                width: 3.0,
                height: 1.5,
                rotated: false,
            });
        }
        sheet
    }

    #[test]
    fn test_idle_session_ignores_edits() {
        let mut session = EditorSession::new(sheet_with(2));
        let first = session.sheet().placements[0].id;

        assert!(!session.select(first, false));
        assert!(!session.apply(&EditCommand::Rotate));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_drag_targets_prefer_selection_over_group() {
        let mut session = EditorSession::new(sheet_with(3));
        session.begin_editing();
        let ids = session.sheet().ids();

        session.select(ids[0], false);
        session.select(ids[1], true);
        session.group();

        // Selection holding the dragged item wins
        session.select(ids[2], false);
        session.select(ids[0], true);
        assert_eq!(session.selection().len(), 3);
        assert_eq!(session.drag_targets(ids[2]).len(), 3);

        // Dragged item outside the selection falls back to its group
        session.select(ids[2], false);
        assert_eq!(session.drag_targets(ids[0]), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_box_select_ignored_while_dragging() {
        let mut session = EditorSession::new(sheet_with(1));
        session.begin_editing();
        let id = session.sheet().placements[0].id;

        assert!(session.begin_drag(id));
        assert!(!session.begin_box_select(Point::new(0.0, 0.0), false));
        assert_eq!(session.pointer(), PointerState::Dragging { active: id });
    }
}
