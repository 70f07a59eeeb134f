use crate::types::*;

/// Calculate totals for a set of grouped sheets
pub fn calculate_statistics(groups: &[GroupedSheet]) -> Result<SheetStatistics> {
    if groups.is_empty() {
        return Err(GangSheetError::NoSheets);
    }

    let mut total_sheets = 0;
    let mut logos_placed = 0;
    let mut total_cost = 0.0;

    for group in groups {
        total_sheets += group.quantity;
        logos_placed += group.sheet.placements.len() * group.quantity;
        total_cost += group.sheet.size.price() * group.quantity as f64;
    }

    // Sizes in table order, unused sizes left out
    let sheets_by_size = SheetSize::ALL
        .iter()
        .map(|&size| {
            let count = groups
                .iter()
                .filter(|g| g.sheet.size == size)
                .map(|g| g.quantity)
                .sum();
            (size, count)
        })
        .filter(|&(_, count)| count > 0)
        .collect();

    Ok(SheetStatistics {
        total_sheets,
        distinct_layouts: groups.len(),
        logos_placed,
        total_cost,
        sheets_by_size,
    })
}
