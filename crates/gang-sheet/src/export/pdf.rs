//! Print documents with one page per sheet
//!
//! Each page is sized exactly to its sheet and carries the rendered sheet,
//! flattened onto white, as a single full-page image.

use crate::constants::in_to_mm;
use crate::types::*;
use image::imageops;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};
use std::io::Cursor;

/// Lay out rendered sheets as pages.
///
/// `dpi` must be the resolution the canvases were rendered at so each
/// image covers its page exactly.
pub(crate) fn build_document(
    title: &str,
    pages: &[(SheetSize, RgbaImage)],
    dpi: u32,
) -> Result<PdfDocument> {
    let mut doc = PdfDocument::new(title);
    let mut pdf_pages = Vec::with_capacity(pages.len());

    for (size, canvas) in pages {
        let encoded = flatten_to_png(canvas)?;
        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(&encoded, &mut warnings).map_err(|e| {
            GangSheetError::Export(format!("Failed to embed {} sheet: {}", size, e))
        })?;
        let image_id = doc.add_image(&image);

        let (width, height) = size.dimensions_in();
        pdf_pages.push(PdfPage::new(
            Mm(in_to_mm(width)),
            Mm(in_to_mm(height)),
            vec![Op::UseXobject {
                id: image_id,
                transform: XObjectTransform {
                    dpi: Some(dpi as f32),
                    ..Default::default()
                },
            }],
        ));
    }

    doc.pages = pdf_pages;
    Ok(doc)
}

pub(crate) fn document_bytes(
    title: &str,
    pages: &[(SheetSize, RgbaImage)],
    dpi: u32,
) -> Result<Vec<u8>> {
    let doc = build_document(title, pages, dpi)?;

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF writer reported {} warnings", warnings.len());
    }

    Ok(bytes)
}

/// Print pages have no transparency: composite over white, encode as RGB
fn flatten_to_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut page = RgbaImage::from_pixel(
        canvas.width(),
        canvas.height(),
        Rgba([255, 255, 255, 255]),
    );
    imageops::overlay(&mut page, canvas, 0, 0);

    let rgb = DynamicImage::ImageRgba8(page).to_rgb8();
    let mut bytes = Cursor::new(Vec::new());
    rgb.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
