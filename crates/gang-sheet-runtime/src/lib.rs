use std::path::PathBuf;

mod handlers;
mod worker;

// Re-export types from the library crate
pub use gang_sheet::{
    CalculationOptions, CatalogPage, CatalogQuery, ExportFormat, ExportRequest, GroupedSheet,
    SelectionRequest, Sheet, SheetStatistics,
};
pub use worker::{WorkerContext, worker_task};

/// Commands sent from the front end to the worker
#[derive(Debug)]
pub enum SheetCommand {
    /// Resolve, pack and group. Queued calculations collapse into the newest.
    Calculate {
        requests: Vec<SelectionRequest>,
        options: CalculationOptions,
    },
    Search {
        query: CatalogQuery,
    },
    Export {
        request: ExportRequest,
    },
    /// Write several sheets into one PDF, a page each
    ExportDocument {
        requests: Vec<ExportRequest>,
        filename: String,
    },
}

/// Updates sent from the worker back to the front end
#[derive(Debug, Clone)]
pub enum SheetUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    Calculated {
        sheets: Vec<Sheet>,
        grouped: Vec<GroupedSheet>,
        /// `None` when there was nothing to pack
        stats: Option<SheetStatistics>,
    },
    SearchResults {
        page: CatalogPage,
    },
    Exported {
        path: PathBuf,
    },
    Error {
        message: String,
        /// Whether offering "try again" makes sense
        retryable: bool,
    },
}
