//! Layout calculation modules for sheet packing
//!
//! This module handles all the geometric work of turning logo instances
//! into placed sheets:
//! - Shelf packing (rows of logos on one sheet of a given size)
//! - Sheet size selection (cheapest cost per logo, forced placement)

mod shelf;
mod sizing;
mod types;

pub use shelf::*;
pub use sizing::*;
pub use types::*;
