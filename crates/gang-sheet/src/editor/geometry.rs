use crate::types::Placement;

/// Clamp one axis so `[pos, pos + size]` stays inside `[0, extent]`.
///
/// Something larger than the sheet is pinned to 0.
pub(crate) fn clamp_axis(pos: f64, size: f64, extent: f64) -> f64 {
    pos.min(extent - size).max(0.0)
}

pub(crate) fn clamp_into(placement: &mut Placement, sheet_width: f64, sheet_height: f64) {
    placement.x = clamp_axis(placement.x, placement.width, sheet_width);
    placement.y = clamp_axis(placement.y, placement.height, sheet_height);
}

/// Quarter turn in place: swap width and height about the same centre
pub(crate) fn quarter_turn(placement: &mut Placement, sheet_width: f64, sheet_height: f64) {
    let (cx, cy) = placement.center();
    std::mem::swap(&mut placement.width, &mut placement.height);
    placement.x = cx - placement.width / 2.0;
    placement.y = cy - placement.height / 2.0;
    clamp_into(placement, sheet_width, sheet_height);
}

pub(crate) fn translate(
    placement: &mut Placement,
    dx: f64,
    dy: f64,
    sheet_width: f64,
    sheet_height: f64,
) {
    placement.x += dx;
    placement.y += dy;
    clamp_into(placement, sheet_width, sheet_height);
}
