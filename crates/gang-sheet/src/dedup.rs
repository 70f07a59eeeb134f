use crate::types::{GroupedSheet, Sheet};

/// Collapse structurally identical sheets.
///
/// Each group keeps the first occurrence as its representative and the
/// order groups were first seen. Quantities sum to `sheets.len()`.
pub fn group_identical_sheets(sheets: &[Sheet]) -> Vec<GroupedSheet> {
    let mut groups: Vec<GroupedSheet> = Vec::new();

    for (index, sheet) in sheets.iter().enumerate() {
        match groups.iter_mut().find(|g| g.sheet.layout_eq(sheet)) {
            Some(group) => group.quantity += 1,
            None => groups.push(GroupedSheet {
                sheet: sheet.clone(),
                quantity: 1,
                index,
            }),
        }
    }

    groups
}

/// Expand grouped sheets back to one sheet per physical copy
pub fn expand_grouped(groups: &[GroupedSheet]) -> Vec<Sheet> {
    groups
        .iter()
        .flat_map(|g| std::iter::repeat_n(&g.sheet, g.quantity).cloned())
        .collect()
}
