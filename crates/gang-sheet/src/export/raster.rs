//! Rasterizing a sheet at print resolution

use crate::constants::{FOOTER_HEIGHT_IN, FOOTER_PADDING_IN, in_to_px};
use crate::editor::RotationOverlay;
use crate::types::*;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::HashMap;

const FOOTER_BACKGROUND: Rgba<u8> = Rgba([248, 249, 250, 255]);
const FOOTER_BORDER: Rgba<u8> = Rgba([233, 236, 239, 255]);
const CARD_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// One placement as the renderer should draw it, in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub id: PlacementId,
    pub logo: LogoRef,
    /// Box the rotated image must fit inside (the placement's footprint)
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Box the image is drawn into before rotation, centred on the same
    /// point. Width and height are swapped for quarter turns.
    pub draw_width: u32,
    pub draw_height: u32,
    pub rotation: Rotation,
}

/// Work out where and how each placement is drawn at `dpi`.
///
/// A placement packed rotated starts a quarter turn round; the overlay's
/// rotation is added on top.
pub fn render_plan(sheet: &Sheet, overlay: Option<&RotationOverlay>, dpi: u32) -> Vec<RenderItem> {
    sheet
        .placements
        .iter()
        .map(|placement| {
            let mut rotation = if placement.rotated {
                Rotation::Clockwise90
            } else {
                Rotation::None
            };
            let extra = overlay.map(|o| o.get(placement.id)).unwrap_or_default();
            for _ in 0..extra.degrees() / 90 {
                rotation = rotation.next();
            }

            let width = in_to_px(placement.width, dpi).max(0) as u32;
            let height = in_to_px(placement.height, dpi).max(0) as u32;
            let (draw_width, draw_height) = if rotation.swaps_dimensions() {
                (height, width)
            } else {
                (width, height)
            };

            RenderItem {
                id: placement.id,
                logo: placement.logo.clone(),
                x: in_to_px(placement.x, dpi),
                y: in_to_px(placement.y, dpi),
                width,
                height,
                draw_width,
                draw_height,
                rotation,
            }
        })
        .collect()
}

/// A distinct logo listed in the strip below an exported sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub logo_id: String,
    pub account_name: String,
    pub note: Option<String>,
}

impl LegendEntry {
    /// `Acme (ID: 42)`, followed by ` - note` when there is one
    pub fn label(&self) -> String {
        match &self.note {
            Some(note) => format!("{} (ID: {}) - {}", self.account_name, self.logo_id, note),
            None => format!("{} (ID: {})", self.account_name, self.logo_id),
        }
    }
}

/// Each logo on the sheet once, in order of first appearance
pub fn footer_legend(sheet: &Sheet) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = Vec::new();

    for placement in &sheet.placements {
        if entries.iter().any(|e| e.logo_id == placement.logo.id) {
            continue;
        }
        entries.push(LegendEntry {
            logo_id: placement.logo.id.clone(),
            account_name: placement.logo.account_name.clone(),
            note: placement.note.clone().filter(|n| !n.trim().is_empty()),
        });
    }

    entries
}

/// Draw a sheet onto a transparent canvas, optionally with the legend strip
/// below it. Logos missing from `images` are left blank.
pub(crate) fn render_sheet(
    sheet: &Sheet,
    overlay: Option<&RotationOverlay>,
    dpi: u32,
    footer: bool,
    images: &HashMap<String, DynamicImage>,
) -> RgbaImage {
    let width = in_to_px(sheet.width_in(), dpi).max(0) as u32;
    let height = in_to_px(sheet.height_in(), dpi).max(0) as u32;
    let footer_height = if footer {
        in_to_px(FOOTER_HEIGHT_IN, dpi).max(0) as u32
    } else {
        0
    };

    let mut canvas = RgbaImage::new(width, height + footer_height);

    for item in render_plan(sheet, overlay, dpi) {
        if item.width == 0 || item.height == 0 {
            continue;
        }
        let Some(source) = images.get(&item.logo.id) else {
            continue;
        };

        let rotated = match item.rotation {
            Rotation::None => source.clone(),
            Rotation::Clockwise90 => source.rotate90(),
            Rotation::Clockwise180 => source.rotate180(),
            Rotation::Clockwise270 => source.rotate270(),
        };

        // Contain: keep the aspect ratio, centre in the box
        let fitted = rotated.resize(item.width, item.height, FilterType::Triangle);
        let offset_x = item.x + (item.width as i64 - fitted.width() as i64) / 2;
        let offset_y = item.y + (item.height as i64 - fitted.height() as i64) / 2;

        imageops::overlay(&mut canvas, &fitted.to_rgba8(), offset_x, offset_y);
    }

    if footer_height > 0 {
        draw_footer(
            &mut canvas,
            height,
            footer_height,
            &footer_legend(sheet),
            images,
            dpi,
        );
    }

    canvas
}

/// Strip background, top rule, then one square card per legend entry
/// holding the logo's thumbnail. Cards past the right edge are cut off.
fn draw_footer(
    canvas: &mut RgbaImage,
    top: u32,
    height: u32,
    legend: &[LegendEntry],
    images: &HashMap<String, DynamicImage>,
    dpi: u32,
) {
    let width = canvas.width();
    fill_rect(canvas, 0, top, width, height, FOOTER_BACKGROUND);
    fill_rect(canvas, 0, top, width, (dpi / 150).max(1), FOOTER_BORDER);

    let padding = in_to_px(FOOTER_PADDING_IN, dpi).max(1) as u32;
    let card = height.saturating_sub(padding);
    let inner = card.saturating_sub(padding);
    if card == 0 {
        return;
    }

    let card_top = top + padding / 2;
    let mut x = padding;
    for entry in legend {
        if x >= width {
            break;
        }
        fill_rect(canvas, x, card_top, card, card, CARD_BACKGROUND);

        if let Some(image) = images.get(&entry.logo_id).filter(|_| inner > 0) {
            let thumb = image.resize(inner, inner, FilterType::Triangle);
            let thumb_x = x + padding / 2 + (inner - thumb.width().min(inner)) / 2;
            let thumb_y = card_top + padding / 2 + (inner - thumb.height().min(inner)) / 2;
            imageops::overlay(canvas, &thumb.to_rgba8(), thumb_x as i64, thumb_y as i64);
        }

        x += card + 2 * padding;
    }
}

fn fill_rect(
    canvas: &mut RgbaImage,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    let right = left.saturating_add(width).min(canvas.width());
    let bottom = top.saturating_add(height).min(canvas.height());
    for y in top..bottom {
        for x in left..right {
            canvas.put_pixel(x, y, color);
        }
    }
}
