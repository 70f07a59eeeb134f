use crate::SheetUpdate;
use gang_sheet::{
    AspectRatioResolver, CalculationOptions, Catalog, CatalogQuery, ExportRequest,
    GangSheetError, ImageSource, Order, SheetExporter, SelectionRequest, calculate_sheets,
    calculate_statistics, group_identical_sheets,
};
use tokio::sync::mpsc;

fn send_error(update_tx: &mpsc::UnboundedSender<SheetUpdate>, context: &str, e: &GangSheetError) {
    let _ = update_tx.send(SheetUpdate::Error {
        message: format!("{context}: {e}"),
        retryable: e.is_retryable(),
    });
}

fn send_progress(update_tx: &mpsc::UnboundedSender<SheetUpdate>, operation: &str, current: usize) {
    let _ = update_tx.send(SheetUpdate::Progress {
        operation: operation.to_string(),
        current,
        total: 2,
    });
}

pub async fn handle_calculate<S: ImageSource>(
    requests: Vec<SelectionRequest>,
    options: CalculationOptions,
    resolver: &AspectRatioResolver<S>,
    update_tx: &mpsc::UnboundedSender<SheetUpdate>,
) {
    if requests.is_empty() {
        let _ = update_tx.send(SheetUpdate::Calculated {
            sheets: Vec::new(),
            grouped: Vec::new(),
            stats: None,
        });
        return;
    }

    let order = Order { options, requests };
    if let Err(e) = order.validate() {
        send_error(update_tx, "Invalid order", &e);
        return;
    }

    send_progress(update_tx, "Calculating sheets", 0);
    let sheets = calculate_sheets(&order.requests, &order.options, resolver).await;

    send_progress(update_tx, "Grouping sheets", 1);
    let grouped = group_identical_sheets(&sheets);
    let stats = calculate_statistics(&grouped).ok();

    send_progress(update_tx, "Done", 2);
    let _ = update_tx.send(SheetUpdate::Calculated {
        sheets,
        grouped,
        stats,
    });
}

pub fn handle_search<C: Catalog>(
    query: CatalogQuery,
    catalog: Option<&C>,
    update_tx: &mpsc::UnboundedSender<SheetUpdate>,
) {
    let Some(catalog) = catalog else {
        let _ = update_tx.send(SheetUpdate::Error {
            message: "No catalog loaded".to_string(),
            retryable: false,
        });
        return;
    };

    match catalog.search(&query) {
        Ok(page) => {
            let _ = update_tx.send(SheetUpdate::SearchResults { page });
        }
        Err(e) => send_error(update_tx, "Catalog search failed", &e),
    }
}

pub async fn handle_export<S: ImageSource>(
    request: ExportRequest,
    exporter: Option<&SheetExporter<S>>,
    update_tx: &mpsc::UnboundedSender<SheetUpdate>,
) {
    let Some(exporter) = exporter else {
        send_no_exporter(update_tx);
        return;
    };

    match exporter.export(&request).await {
        Ok(path) => {
            let _ = update_tx.send(SheetUpdate::Exported { path });
        }
        Err(e) => send_error(update_tx, "Export failed", &e),
    }
}

pub async fn handle_export_document<S: ImageSource>(
    requests: Vec<ExportRequest>,
    filename: String,
    exporter: Option<&SheetExporter<S>>,
    update_tx: &mpsc::UnboundedSender<SheetUpdate>,
) {
    let Some(exporter) = exporter else {
        send_no_exporter(update_tx);
        return;
    };

    match exporter.export_document(&requests, &filename).await {
        Ok(path) => {
            let _ = update_tx.send(SheetUpdate::Exported { path });
        }
        Err(e) => send_error(update_tx, "PDF export failed", &e),
    }
}

fn send_no_exporter(update_tx: &mpsc::UnboundedSender<SheetUpdate>) {
    let _ = update_tx.send(SheetUpdate::Error {
        message: "No export directory configured".to_string(),
        retryable: false,
    });
}
