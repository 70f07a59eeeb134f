//! Interactive placement editing
//!
//! An [`EditorSession`] owns one sheet while it is being edited, together
//! with the transient state that goes with it: the selection, selection
//! groups, the per-placement rotation overlay and the pointer sub-state.
//! All of it is keyed by [`PlacementId`](crate::PlacementId), so appending
//! or removing placements never invalidates it.
//!
//! Operations never fail. Anything that cannot apply is a no-op that
//! returns `false`.

mod geometry;
mod session;
mod state;

pub use session::*;
pub use state::*;
