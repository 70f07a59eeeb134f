//! Transient editor state: modes, pointer sub-state, groups and rotations
//!
//! None of this is stored in a [`Sheet`](crate::Sheet). It lives only as
//! long as the editing session that owns it.

use crate::types::{PlacementId, Rotation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether mutation is currently allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Viewing only
    #[default]
    Idle,
    /// Selection and mutation enabled
    Editing,
}

/// A point on the sheet in inches
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer sub-state, entered on pointer-down and left on pointer-up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Released,
    Dragging {
        active: PlacementId,
    },
    BoxSelecting {
        origin: Point,
        current: Point,
    },
}

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub u64);

impl GroupId {
    pub fn next() -> Self {
        GroupId(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Placements that are selected, moved and rotated together
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionGroup {
    pub id: GroupId,
    /// Always at least two members
    pub members: Vec<PlacementId>,
}

impl SelectionGroup {
    pub fn contains(&self, id: PlacementId) -> bool {
        self.members.contains(&id)
    }
}

/// Visual rotation per placement, on top of the stored dimensions.
///
/// Placements without an entry are unrotated.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationOverlay {
    rotations: HashMap<PlacementId, Rotation>,
}

impl RotationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlacementId) -> Rotation {
        self.rotations.get(&id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, id: PlacementId, rotation: Rotation) {
        if rotation == Rotation::None {
            self.rotations.remove(&id);
        } else {
            self.rotations.insert(id, rotation);
        }
    }

    pub fn remove(&mut self, id: PlacementId) {
        self.rotations.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlacementId, Rotation)> + '_ {
        self.rotations.iter().map(|(&id, &rotation)| (id, rotation))
    }
}

/// One editor operation, as recorded in an edit script.
///
/// Placements are addressed by their position in the sheet at the time the
/// command is applied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum EditCommand {
    Select {
        index: usize,
        #[cfg_attr(feature = "serde", serde(default))]
        additive: bool,
    },
    BoxSelect {
        from: Point,
        to: Point,
        #[cfg_attr(feature = "serde", serde(default))]
        additive: bool,
    },
    ClearSelection,
    Group,
    Ungroup,
    Rotate,
    Duplicate,
    Delete,
    Drag {
        index: usize,
        dx: f64,
        dy: f64,
    },
}
