//! Shelf (row) packing of logos onto a single sheet
//!
//! Logos are sorted tallest first and laid out in rows. Each row takes
//! logos from the front of the pool while they fit horizontally and stops
//! at the first one that doesn't. A row that would run past the bottom
//! margin is dropped whole and ends the sheet.

use crate::options::PackingOptions;
use crate::types::{LogoInstance, Placement, PlacementId, SheetSize};

use super::SheetFit;

/// Pack as many instances as the shelf heuristic allows onto one sheet.
///
/// # Arguments
/// * `instances` - The pool to draw from, in request order
/// * `size` - Sheet size to pack onto
/// * `options` - Spacing and margin
pub fn pack_sheet(instances: &[LogoInstance], size: SheetSize, options: &PackingOptions) -> SheetFit {
    let (sheet_width, sheet_height) = size.dimensions_in();
    let max_x = sheet_width - options.margin_in;
    let max_y = sheet_height - options.margin_in;

    let mut pool = instances.to_vec();
    sort_tallest_first(&mut pool);

    let mut placements = Vec::new();
    let mut cursor_y = options.margin_in;

    while !pool.is_empty() {
        let row_len = fill_row(&pool, max_x, options);
        if row_len == 0 {
            break;
        }

        let row_height = pool[..row_len]
            .iter()
            .map(|instance| instance.effective_dimensions().1)
            .fold(0.0, f64::max);

        if cursor_y + row_height > max_y {
            break;
        }

        let mut cursor_x = options.margin_in;
        for instance in pool.drain(..row_len) {
            let (width, height) = instance.effective_dimensions();
            placements.push(Placement {
                id: PlacementId::next(),
                logo: instance.logo,
                note: instance.note,
                x: cursor_x,
                y: cursor_y,
                width,
                height,
                rotated: instance.rotated,
            });
            cursor_x += width + options.spacing_in;
        }

        log::debug!(
            "{}: committed row of {} at y={:.3} (height {:.3})",
            size,
            row_len,
            cursor_y,
            row_height
        );
        cursor_y += row_height + options.spacing_in;
    }

    let cost_per_unit = if placements.is_empty() {
        f64::INFINITY
    } else {
        size.price() / placements.len() as f64
    };

    SheetFit {
        placements,
        remaining: pool,
        cost_per_unit,
    }
}

/// Order a pool the way rows consume it. Stable, so equal heights keep
/// request order.
pub fn sort_tallest_first(pool: &mut [LogoInstance]) {
    pool.sort_by(|a, b| b.height_in.total_cmp(&a.height_in));
}

/// Length of the prefix of `pool` that fits on one row
fn fill_row(pool: &[LogoInstance], max_x: f64, options: &PackingOptions) -> usize {
    let mut cursor_x = options.margin_in;
    let mut count = 0;

    for instance in pool {
        let (width, _) = instance.effective_dimensions();
        if cursor_x + width > max_x {
            break;
        }
        cursor_x += width + options.spacing_in;
        count += 1;
    }

    count
}
