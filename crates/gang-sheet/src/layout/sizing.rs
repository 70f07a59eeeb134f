//! Sheet size selection
//!
//! Repeatedly packs the remaining pool onto a fresh sheet until nothing is
//! left. Without a pinned size every size is tried and the lowest cost per
//! logo wins. When no size can take anything, the first remaining logo is
//! force-placed alone so the loop always makes progress.

use crate::options::PackingOptions;
use crate::types::{LogoInstance, Placement, PlacementId, Sheet, SheetSize};

use super::{SheetFit, pack_sheet, sort_tallest_first};

/// Pick the cheapest size per logo for this pool.
///
/// Sizes that place nothing are skipped. Ties keep the smaller size.
/// Returns `None` when no size places anything.
pub fn best_fit(pool: &[LogoInstance], options: &PackingOptions) -> Option<(SheetSize, SheetFit)> {
    let mut best: Option<(SheetSize, SheetFit)> = None;

    for size in SheetSize::ALL {
        let fit = pack_sheet(pool, size, options);
        if fit.is_empty() {
            continue;
        }

        let better = best
            .as_ref()
            .is_none_or(|(_, current)| fit.cost_per_unit < current.cost_per_unit);
        if better {
            best = Some((size, fit));
        }
    }

    best
}

/// Place a single instance at the top-left margin without any fit check
pub fn force_place(instance: LogoInstance, size: SheetSize, options: &PackingOptions) -> Sheet {
    let (width, height) = instance.effective_dimensions();
    log::warn!(
        "Logo {} ({:.2}x{:.2}in) does not fit any sheet; placing it alone on {}",
        instance.logo.id,
        width,
        height,
        size
    );

    Sheet {
        size,
        placements: vec![Placement {
            id: PlacementId::next(),
            logo: instance.logo,
            note: instance.note,
            x: options.margin_in,
            y: options.margin_in,
            width,
            height,
            rotated: instance.rotated,
        }],
    }
}

/// Pack one grouping key's instances onto as many sheets as needed.
///
/// # Arguments
/// * `instances` - Every instance sharing one grouping key
/// * `preferred` - Pin every sheet to this size when set
/// * `options` - Spacing and margin
pub fn fill_group(
    instances: Vec<LogoInstance>,
    preferred: Option<SheetSize>,
    options: &PackingOptions,
) -> Vec<Sheet> {
    let mut sheets = Vec::new();
    let mut pool = instances;
    // The forced instance must be the tallest, whatever the request order
    sort_tallest_first(&mut pool);

    while !pool.is_empty() {
        let chosen = match preferred {
            Some(size) => {
                let fit = pack_sheet(&pool, size, options);
                (!fit.is_empty()).then_some((size, fit))
            }
            None => best_fit(&pool, options),
        };

        match chosen {
            Some((size, fit)) => {
                log::debug!(
                    "Packed {} logos on {} ({:.3}/logo), {} left",
                    fit.count_placed(),
                    size,
                    fit.cost_per_unit,
                    fit.remaining.len()
                );
                sheets.push(Sheet {
                    size,
                    placements: fit.placements,
                });
                pool = fit.remaining;
            }
            None => {
                let size = preferred.unwrap_or_else(SheetSize::largest);
                let first = pool.remove(0);
                sheets.push(force_place(first, size, options));
            }
        }
    }

    sheets
}
