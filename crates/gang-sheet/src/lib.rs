pub mod aspect;
mod calculate;
pub mod catalog;
pub mod constants;
mod dedup;
pub mod editor;
pub mod export;
pub mod layout;
mod options;
mod stats;
mod types;

pub use aspect::{AspectRatioResolver, ImageSource, UrlImageSource, decode_aspect_ratio};
pub use calculate::{calculate_sheets, expand_requests, group_by_note, pack_requests};
pub use catalog::{Catalog, CatalogPage, CatalogQuery, CsvCatalog};
pub use dedup::{expand_grouped, group_identical_sheets};
pub use editor::{EditCommand, EditMode, EditorSession, Point, PointerState, RotationOverlay};
pub use export::{
    ExportFormat, ExportRequest, LegendEntry, RenderItem, SheetExporter, export_filename,
    footer_legend, render_plan,
};
pub use layout::{SheetFit, best_fit, fill_group, pack_sheet};
pub use options::*;
pub use stats::calculate_statistics;
pub use types::*;
