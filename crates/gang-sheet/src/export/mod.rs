//! Sheet export
//!
//! Placements are composited onto a transparent canvas at print resolution,
//! each logo rotated by its visual rotation and scaled to fit inside its
//! box without distortion. PNG exports add a legend strip below the sheet.
//! PDF exports embed the canvas without the strip, one page per sheet.

mod pdf;
mod raster;

pub use raster::{LegendEntry, RenderItem, footer_legend, render_plan};

use crate::aspect::ImageSource;
use crate::constants::EXPORT_DPI;
use crate::editor::RotationOverlay;
use crate::types::*;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File type written for an export request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Transparent raster with the legend strip
    #[default]
    Png,
    /// Single-page document at the sheet's exact size
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Everything needed to write one sheet to disk
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub sheet: Sheet,
    /// Position of the sheet in the grouped list
    pub index: usize,
    pub filename: String,
    pub rotations: Option<RotationOverlay>,
    pub format: ExportFormat,
}

impl ExportRequest {
    /// Export a grouped sheet as PNG under its default filename
    pub fn for_group(group: &GroupedSheet) -> Self {
        Self {
            sheet: group.sheet.clone(),
            index: group.index,
            filename: export_filename(group.sheet.size, group.quantity),
            rotations: None,
            format: ExportFormat::Png,
        }
    }

    pub fn with_rotations(mut self, rotations: RotationOverlay) -> Self {
        self.rotations = Some(rotations);
        self
    }

    /// Switch format, replacing the filename's extension to match
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        let stem = self
            .filename
            .rsplit_once('.')
            .map_or(self.filename.as_str(), |(stem, _)| stem);
        self.filename = format!("{}.{}", stem, format.extension());
        self.format = format;
        self
    }
}

/// `Small.png`, or `Small-QTY3.png` for a layout printed three times
pub fn export_filename(size: SheetSize, quantity: usize) -> String {
    if quantity > 1 {
        format!("{}-QTY{}.png", size, quantity)
    } else {
        format!("{}.png", size)
    }
}

/// Writes sheets into a directory as PNGs or PDFs
pub struct SheetExporter<S> {
    source: S,
    output_dir: PathBuf,
    dpi: u32,
    footer: bool,
}

impl<S: ImageSource> SheetExporter<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            dpi: EXPORT_DPI,
            footer: true,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Whether PNG exports get the legend strip
    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and save one sheet in the request's format, returning the
    /// written path
    pub async fn export(&self, request: &ExportRequest) -> Result<PathBuf> {
        match request.format {
            ExportFormat::Png => self.export_png(request).await,
            ExportFormat::Pdf => {
                self.export_document(std::slice::from_ref(request), &request.filename)
                    .await
            }
        }
    }

    /// Write every request as one page of a single PDF, in order.
    ///
    /// Each request's own format and filename are ignored.
    pub async fn export_document(
        &self,
        requests: &[ExportRequest],
        filename: &str,
    ) -> Result<PathBuf> {
        self.check_dpi()?;
        if requests.is_empty() {
            return Err(GangSheetError::Export("No sheets to export".to_string()));
        }

        let images = self.load_images(requests).await?;
        let path = self.prepare(filename).await?;

        let pages: Vec<(Sheet, Option<RotationOverlay>)> = requests
            .iter()
            .map(|r| (r.sheet.clone(), r.rotations.clone()))
            .collect();
        let dpi = self.dpi;
        let title = filename.trim_end_matches(".pdf").to_string();

        let bytes = tokio::task::spawn_blocking(move || {
            let canvases: Vec<_> = pages
                .iter()
                .map(|(sheet, rotations)| {
                    let canvas =
                        raster::render_sheet(sheet, rotations.as_ref(), dpi, false, &images);
                    (sheet.size, canvas)
                })
                .collect();
            pdf::document_bytes(&title, &canvases, dpi)
        })
        .await??;

        tokio::fs::write(&path, bytes).await?;

        log::info!(
            "Exported {} sheet(s) as PDF to {}",
            requests.len(),
            path.display()
        );
        Ok(path)
    }

    async fn export_png(&self, request: &ExportRequest) -> Result<PathBuf> {
        self.check_dpi()?;

        let images = self.load_images(std::slice::from_ref(request)).await?;
        let path = self.prepare(&request.filename).await?;

        let sheet = request.sheet.clone();
        let rotations = request.rotations.clone();
        let (dpi, footer) = (self.dpi, self.footer);
        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            let canvas = raster::render_sheet(&sheet, rotations.as_ref(), dpi, footer, &images);
            canvas.save_with_format(&target, image::ImageFormat::Png)
        })
        .await??;

        log::info!(
            "Exported sheet {} ({}, {} logos) to {}",
            request.index + 1,
            request.sheet.size,
            request.sheet.placements.len(),
            path.display()
        );
        Ok(path)
    }

    fn check_dpi(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(GangSheetError::Export("DPI must be positive".to_string()));
        }
        Ok(())
    }

    async fn prepare(&self, filename: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(self.output_dir.join(filename))
    }

    /// Every logo used by the requests, each loaded once
    async fn load_images(
        &self,
        requests: &[ExportRequest],
    ) -> Result<HashMap<String, DynamicImage>> {
        let mut images = HashMap::new();
        for placement in requests.iter().flat_map(|r| &r.sheet.placements) {
            if !images.contains_key(&placement.logo.id) {
                let image = self.load_logo(&placement.logo).await?;
                images.insert(placement.logo.id.clone(), image);
            }
        }
        Ok(images)
    }

    /// First of the logo's images that decodes
    async fn load_logo(&self, logo: &LogoRef) -> Result<DynamicImage> {
        for url in logo.image_candidates() {
            let bytes = match self.source.fetch(url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Logo {}: could not fetch {}: {}", logo.id, url, e);
                    continue;
                }
            };

            match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await? {
                Ok(image) => return Ok(image),
                Err(e) => log::debug!("Logo {}: {} is not a raster image: {}", logo.id, url, e),
            }
        }

        Err(GangSheetError::Export(format!(
            "No usable image for logo {} ({})",
            logo.id, logo.description
        )))
    }
}
