//! Shared constants for sheet composition
//!
//! This module centralizes the fixed physical spacing, fallbacks and
//! export resolution used throughout packing, editing and export.

use std::time::Duration;

// =============================================================================
// Packing Geometry
// =============================================================================

/// Gap between neighbouring logos, both within a row and between rows (inches)
pub const SPACING_IN: f64 = 0.15;

/// Clear border kept on every side of the sheet during packing (inches)
pub const MARGIN_IN: f64 = 0.2;

// =============================================================================
// Aspect Ratio Resolution
// =============================================================================

/// Width:height ratio used when a logo image cannot be loaded or decoded
pub const DEFAULT_ASPECT_RATIO: f64 = 2.0;

/// Upper bound on a single image fetch before falling back to the default ratio
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest image body we are willing to download (bytes)
pub const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

// =============================================================================
// Editing
// =============================================================================

/// Offset applied to each axis when duplicating a placement (inches)
pub const DUPLICATE_OFFSET_IN: f64 = 0.25;

// =============================================================================
// Export
// =============================================================================

/// Print resolution of exported raster sheets (dots per inch)
pub const EXPORT_DPI: u32 = 300;

/// Legend strip added below the sheet in raster exports (inches)
pub const FOOTER_HEIGHT_IN: f64 = 0.65;

/// Gap around and between legend cards in the strip (inches)
pub const FOOTER_PADDING_IN: f64 = 0.1;

/// Convert inches to whole pixels at the given resolution
#[inline]
pub fn in_to_px(inches: f64, dpi: u32) -> i64 {
    (inches * dpi as f64).round() as i64
}

/// Convert inches to millimeters
#[inline]
pub fn in_to_mm(inches: f64) -> f32 {
    (inches * 25.4) as f32
}

// =============================================================================
// Catalog
// =============================================================================

/// Number of catalog records returned per search page
pub const CATALOG_PAGE_SIZE: usize = 40;
