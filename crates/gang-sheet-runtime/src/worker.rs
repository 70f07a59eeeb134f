use crate::{SheetCommand, SheetUpdate, handlers};
use gang_sheet::{AspectRatioResolver, Catalog, ImageSource, SheetExporter};
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// What the worker needs to serve commands
pub struct WorkerContext<S, C> {
    pub(crate) resolver: AspectRatioResolver<S>,
    pub(crate) catalog: Option<C>,
    pub(crate) exporter: Option<SheetExporter<S>>,
}

impl<S: ImageSource, C: Catalog> WorkerContext<S, C> {
    pub fn new(resolver: AspectRatioResolver<S>) -> Self {
        Self {
            resolver,
            catalog: None,
            exporter: None,
        }
    }

    pub fn with_catalog(mut self, catalog: C) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_exporter(mut self, exporter: SheetExporter<S>) -> Self {
        self.exporter = Some(exporter);
        self
    }
}

/// Async worker task that processes sheet commands and sends updates.
///
/// Commands run one at a time, so a calculation never overlaps another.
/// Runs until every command sender is dropped.
pub async fn worker_task<S: ImageSource, C: Catalog>(
    context: WorkerContext<S, C>,
    mut command_rx: mpsc::UnboundedReceiver<SheetCommand>,
    update_tx: mpsc::UnboundedSender<SheetUpdate>,
) {
    // Commands pulled off the channel while coalescing, in arrival order
    let mut deferred = VecDeque::new();

    loop {
        let cmd = match deferred.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };

        process_command(cmd, &context, &mut command_rx, &mut deferred, &update_tx).await;
    }

    log::debug!("Command channel closed, worker exiting");
}

async fn process_command<S: ImageSource, C: Catalog>(
    cmd: SheetCommand,
    context: &WorkerContext<S, C>,
    command_rx: &mut mpsc::UnboundedReceiver<SheetCommand>,
    deferred: &mut VecDeque<SheetCommand>,
    update_tx: &mpsc::UnboundedSender<SheetUpdate>,
) {
    match cmd {
        SheetCommand::Calculate {
            mut requests,
            mut options,
        } => {
            // A newer order supersedes this one; only the last queued calculation runs
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let SheetCommand::Calculate {
                    requests: new_requests,
                    options: new_options,
                } = next_cmd
                {
                    log::debug!("Skipping stale calculation of {} requests", requests.len());
                    requests = new_requests;
                    options = new_options;
                } else {
                    deferred.push_back(next_cmd);
                }
            }

            handlers::handle_calculate(requests, options, &context.resolver, update_tx).await;
        }
        SheetCommand::Search { query } => {
            handlers::handle_search(query, context.catalog.as_ref(), update_tx);
        }
        SheetCommand::Export { request } => {
            handlers::handle_export(request, context.exporter.as_ref(), update_tx).await;
        }
        SheetCommand::ExportDocument { requests, filename } => {
            handlers::handle_export_document(
                requests,
                filename,
                context.exporter.as_ref(),
                update_tx,
            )
            .await;
        }
    }
}
