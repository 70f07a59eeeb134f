mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gang_sheet::{
    AspectRatioResolver, CatalogQuery, CsvCatalog, EditCommand, EditorSession, ExportFormat,
    ExportRequest, GroupedSheet, Order, SheetExporter, SheetSize, SheetStatistics, UrlImageSource,
    calculate_sheets, export_filename, footer_legend, group_identical_sheets,
};
use gang_sheet_runtime::{SheetCommand, SheetUpdate, WorkerContext, worker_task};
use logger::CliLogger;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "gsb", about = "Gang sheet builder", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the available sheet sizes and prices
    Sizes,

    /// Search a catalog export
    Search {
        /// Catalog CSV (columns: logo_id, description, account_name, png_url, svg_link)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Text to match against description and account; numbers also match ids
        #[arg(short, long, default_value = "")]
        query: String,

        /// Result page, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Arrange an order onto sheets
    Build {
        /// Order file (JSON)
        #[arg(short, long)]
        order: PathBuf,

        /// Use this size for every sheet instead of the cheapest per sheet
        #[arg(long, value_enum)]
        size: Option<SizeArg>,

        /// Directory relative image paths are resolved against
        /// (defaults to the order file's directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Write the distinct sheets into this directory
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// One PNG or PDF per sheet, or every sheet in one PDF
        #[arg(long, value_enum, default_value = "png")]
        format: FormatArg,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,
    },

    /// Apply a scripted edit to one sheet of an order and export it
    Edit {
        /// Order file (JSON)
        #[arg(short, long)]
        order: PathBuf,

        /// Sheet number as listed by `build`, starting at 1
        #[arg(short, long)]
        sheet: usize,

        /// Edit script (JSON array of edit commands)
        #[arg(long)]
        script: PathBuf,

        /// Output directory
        #[arg(short, long)]
        export: PathBuf,

        #[arg(long, value_enum, default_value = "png")]
        format: FormatArg,

        #[arg(long, value_enum)]
        size: Option<SizeArg>,

        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Pdf,
    /// All sheets as pages of gang-sheets.pdf
    Document,
}

impl FormatArg {
    fn per_sheet(self) -> ExportFormat {
        match self {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Pdf | FormatArg::Document => ExportFormat::Pdf,
        }
    }
}

impl From<SizeArg> for SheetSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => Self::Small,
            SizeArg::Medium => Self::Medium,
            SizeArg::Large => Self::Large,
            SizeArg::ExtraLarge => Self::ExtraLarge,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = CliLogger::new(500, CliLogger::level_for(cli.verbose));
    logger.clone().init()?;

    match cli.command {
        Commands::Sizes => {
            println!("{:<12} {:>14} {:>8}", "Size", "Inches", "Price");
            for size in SheetSize::ALL {
                let (width, height) = size.dimensions_in();
                println!(
                    "{:<12} {:>14} {:>8}",
                    size.name(),
                    format!("{:.2} x {:.2}", width, height),
                    format!("${:.2}", size.price())
                );
            }
        }

        Commands::Search {
            catalog,
            query,
            page,
        } => {
            let catalog = CsvCatalog::load(&catalog)
                .await
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let context = WorkerContext::new(AspectRatioResolver::new(UrlImageSource::new()))
                .with_catalog(catalog);
            let mut worker = Worker::spawn(context);

            worker.send(SheetCommand::Search {
                query: CatalogQuery::new(query).with_page(page),
            })?;
            if let SheetUpdate::SearchResults { page } = worker.next_result().await? {
                println!(
                    "Page {} of {} ({} matches)",
                    page.page, page.total_pages, page.total_count
                );
                for record in &page.records {
                    let vector = if record.vector_url.is_some() { " [svg]" } else { "" };
                    println!(
                        "  {:>8}  {} ({}){}",
                        record.id, record.description, record.account_name, vector
                    );
                }
            }
            worker.finish().await?;
        }

        Commands::Build {
            order,
            size,
            base_dir,
            export,
            format,
            stats_only,
        } => {
            let (order, source) = load_order(&order, size, base_dir).await?;

            let mut context =
                WorkerContext::<_, CsvCatalog>::new(AspectRatioResolver::new(source.clone()));
            let export = export.filter(|_| !stats_only);
            if let Some(dir) = &export {
                context = context.with_exporter(SheetExporter::new(source, dir));
            }
            let mut worker = Worker::spawn(context);

            worker.send(SheetCommand::Calculate {
                requests: order.requests,
                options: order.options,
            })?;
            let SheetUpdate::Calculated { grouped, stats, .. } = worker.next_result().await?
            else {
                bail!("Worker did not return a calculation");
            };

            if let Some(stats) = &stats {
                print_statistics(stats);
            }
            if !stats_only {
                print_sheets(&grouped);
            }

            match format {
                _ if export.is_none() || grouped.is_empty() => {}
                FormatArg::Document => {
                    worker.send(SheetCommand::ExportDocument {
                        requests: grouped.iter().map(ExportRequest::for_group).collect(),
                        filename: "gang-sheets.pdf".to_string(),
                    })?;
                    if let SheetUpdate::Exported { path } = worker.next_result().await? {
                        println!("Exported {} sheets → {}", grouped.len(), path.display());
                    }
                }
                FormatArg::Png | FormatArg::Pdf => {
                    for group in &grouped {
                        worker.send(SheetCommand::Export {
                            request: ExportRequest::for_group(group)
                                .with_format(format.per_sheet()),
                        })?;
                        if let SheetUpdate::Exported { path } = worker.next_result().await? {
                            println!("Exported sheet {} → {}", group.index + 1, path.display());
                        }
                    }
                }
            }
            worker.finish().await?;
        }

        Commands::Edit {
            order,
            sheet,
            script,
            export,
            format,
            size,
            base_dir,
        } => {
            let (order, source) = load_order(&order, size, base_dir).await?;
            let commands = load_script(&script).await?;

            let resolver = AspectRatioResolver::new(source.clone());
            let sheets = calculate_sheets(&order.requests, &order.options, &resolver).await;
            let grouped = group_identical_sheets(&sheets);

            let Some(group) = sheet.checked_sub(1).and_then(|i| grouped.get(i)) else {
                bail!("Sheet {} does not exist ({} sheets)", sheet, grouped.len());
            };

            let mut session = EditorSession::new(group.sheet.clone());
            session.begin_editing();
            let mut applied = 0;
            for command in &commands {
                if session.apply(command) {
                    applied += 1;
                } else {
                    log::warn!("Edit had no effect: {:?}", command);
                }
            }
            session.save();
            let (edited, overlay) = session.into_parts();
            println!(
                "Applied {} of {} edits, {} placements on sheet",
                applied,
                commands.len(),
                edited.placements.len()
            );

            let request = ExportRequest {
                filename: export_filename(edited.size, group.quantity),
                sheet: edited,
                index: group.index,
                rotations: Some(overlay),
                format: ExportFormat::Png,
            }
            .with_format(format.per_sheet());
            let path = SheetExporter::new(source, &export).export(&request).await?;
            println!("Exported edited sheet → {}", path.display());
        }
    }

    let warnings = logger.count_at(log::Level::Warn);
    if warnings > 0 {
        println!("{} warning(s) logged", warnings);
    }

    Ok(())
}

/// Load and validate an order, applying command-line overrides
async fn load_order(
    path: &Path,
    size: Option<SizeArg>,
    base_dir: Option<PathBuf>,
) -> Result<(Order, UrlImageSource)> {
    let mut order = Order::load(path)
        .await
        .with_context(|| format!("Failed to load order {}", path.display()))?;
    if let Some(size) = size {
        order.options.preferred_size = Some(size.into());
    }
    order.validate()?;

    let base_dir = base_dir
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let source = UrlImageSource::new()
        .with_base_dir(base_dir)
        .with_timeout(order.options.resolve_timeout());

    Ok((order, source))
}

async fn load_script(path: &Path) -> Result<Vec<EditCommand>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read edit script {}", path.display()))?;
    let commands = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse edit script {}", path.display()))?;
    Ok(commands)
}

fn print_statistics(stats: &SheetStatistics) {
    println!("Sheet Statistics:");
    println!("  Sheets to print: {}", stats.total_sheets);
    println!("  Distinct layouts: {}", stats.distinct_layouts);
    println!("  Logos placed: {}", stats.logos_placed);
    for (size, count) in &stats.sheets_by_size {
        println!("  {}: {}", size, count);
    }
    println!("  Total cost: ${:.2}", stats.total_cost);
}

fn print_sheets(grouped: &[GroupedSheet]) {
    for (number, group) in grouped.iter().enumerate() {
        println!(
            "Sheet {} ({}, x{}): {} logos",
            number + 1,
            group.sheet.size,
            group.quantity,
            group.sheet.placements.len()
        );
        for p in &group.sheet.placements {
            let turned = if p.rotated { " rotated" } else { "" };
            println!(
                "  {:>8} at ({:.2}, {:.2}) {:.2} x {:.2} in{}",
                p.logo.id, p.x, p.y, p.width, p.height, turned
            );
        }
        for entry in footer_legend(&group.sheet) {
            println!("  legend: {}", entry.label());
        }
    }
}

/// A running worker task and its channels
struct Worker {
    command_tx: mpsc::UnboundedSender<SheetCommand>,
    update_rx: mpsc::UnboundedReceiver<SheetUpdate>,
    handle: tokio::task::JoinHandle<()>,
}

impl Worker {
    fn spawn(context: WorkerContext<UrlImageSource, CsvCatalog>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker_task(context, command_rx, update_tx));
        Self {
            command_tx,
            update_rx,
            handle,
        }
    }

    fn send(&self, cmd: SheetCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker stopped"))
    }

    /// Wait for the next non-progress update, turning errors into `Err`
    async fn next_result(&mut self) -> Result<SheetUpdate> {
        while let Some(update) = self.update_rx.recv().await {
            match update {
                SheetUpdate::Progress {
                    operation,
                    current,
                    total,
                } => log::info!("{} ({}/{})", operation, current, total),
                SheetUpdate::Error { message, retryable } => {
                    let hint = if retryable { " (try again)" } else { "" };
                    bail!("{}{}", message, hint);
                }
                other => return Ok(other),
            }
        }
        bail!("Worker stopped before replying")
    }

    async fn finish(self) -> Result<()> {
        drop(self.command_tx);
        self.handle.await?;
        Ok(())
    }
}
