//! Layout data types for packing and editing
//!
//! Coordinates are in inches with the origin at the sheet's top-left
//! corner and y growing downwards.

use crate::types::{LogoInstance, Placement};

/// An axis-aligned rectangle in inches
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corner points in any order
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let left = a.0.min(b.0);
        let top = a.1.min(b.1);
        Self::new(left, top, (a.0 - b.0).abs(), (a.1 - b.1).abs())
    }

    pub fn of_placement(placement: &Placement) -> Self {
        Self::new(placement.x, placement.y, placement.width, placement.height)
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Closed overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right() >= other.x
            && self.x <= other.right()
            && self.bottom() >= other.y
            && self.y <= other.bottom()
    }
}

/// Result of shelf-packing a pool of instances onto one sheet size
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFit {
    /// Placements in row order, left to right
    pub placements: Vec<Placement>,
    /// Instances that did not make it onto the sheet, still height-sorted
    pub remaining: Vec<LogoInstance>,
    /// Sheet price divided by the number placed; infinite when nothing fit
    pub cost_per_unit: f64,
}

impl SheetFit {
    pub fn count_placed(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
