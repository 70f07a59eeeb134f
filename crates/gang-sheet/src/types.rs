use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GangSheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Catalog error: {0}")]
    Catalog(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No sheets to report")]
    NoSheets,
}

impl GangSheetError {
    /// Whether retrying the same request may succeed (network, disk, catalog)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GangSheetError::Io(_)
                | GangSheetError::Http(_)
                | GangSheetError::Catalog(_)
                | GangSheetError::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GangSheetError>;

/// Physical sheet sizes offered by the print shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetSize {
    Small,
    Medium,
    Large,
    #[cfg_attr(feature = "serde", serde(rename = "Extra Large"))]
    ExtraLarge,
}

impl SheetSize {
    /// All sizes, smallest first. Auto-selection tries them in this order.
    pub const ALL: [SheetSize; 4] = [
        SheetSize::Small,
        SheetSize::Medium,
        SheetSize::Large,
        SheetSize::ExtraLarge,
    ];

    /// Sheet (width, height) in inches
    pub fn dimensions_in(self) -> (f64, f64) {
        match self {
            SheetSize::Small => (11.0, 12.5),
            SheetSize::Medium => (22.5, 12.5),
            SheetSize::Large => (22.5, 25.0),
            SheetSize::ExtraLarge => (22.5, 60.0),
        }
    }

    pub fn width_in(self) -> f64 {
        self.dimensions_in().0
    }

    pub fn height_in(self) -> f64 {
        self.dimensions_in().1
    }

    /// Flat price of one printed sheet
    pub fn price(self) -> f64 {
        match self {
            SheetSize::Small => 3.35,
            SheetSize::Medium => 6.50,
            SheetSize::Large => 12.75,
            SheetSize::ExtraLarge => 30.00,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SheetSize::Small => "Small",
            SheetSize::Medium => "Medium",
            SheetSize::Large => "Large",
            SheetSize::ExtraLarge => "Extra Large",
        }
    }

    /// The size used when nothing fits anywhere
    pub fn largest() -> SheetSize {
        SheetSize::ExtraLarge
    }
}

impl std::fmt::Display for SheetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A logo as published by the catalog. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogoRef {
    pub id: String,
    pub description: String,
    pub account_name: String,
    pub raster_url: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vector_url: Option<String>,
}

impl LogoRef {
    /// Image references to try, best quality first
    pub fn image_candidates(&self) -> Vec<&str> {
        let mut urls = Vec::with_capacity(2);
        if let Some(vector) = self.vector_url.as_deref().filter(|u| !u.is_empty()) {
            urls.push(vector);
        }
        urls.push(self.raster_url.as_str());
        urls
    }
}

/// A user's request for copies of one logo at a physical width
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionRequest {
    pub logo: LogoRef,
    /// Target printed width in inches
    pub width_in: f64,
    pub quantity: u32,
    /// Free-text note. Requests with different notes never share a sheet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub note: Option<String>,
    /// Pack this logo turned 90° (width and height swapped)
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotated: bool,
}

impl SelectionRequest {
    pub fn new(logo: LogoRef, width_in: f64, quantity: u32) -> Self {
        Self {
            logo,
            width_in,
            quantity,
            note: None,
            rotated: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    /// Grouping key; a missing note groups with the empty note
    pub fn grouping_key(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}

/// Which copy of which request an instance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    /// Index of the originating request
    pub request: usize,
    /// Copy number within the request (0..quantity)
    pub copy: u32,
}

/// One physical copy of a requested logo, before packing
#[derive(Debug, Clone, PartialEq)]
pub struct LogoInstance {
    pub id: InstanceId,
    pub logo: LogoRef,
    pub note: Option<String>,
    pub rotated: bool,
    /// Resolved size in inches, before any rotation swap
    pub width_in: f64,
    pub height_in: f64,
}

impl LogoInstance {
    /// (width, height) as packed, swapped when the request asked for rotation
    pub fn effective_dimensions(&self) -> (f64, f64) {
        if self.rotated {
            (self.height_in, self.width_in)
        } else {
            (self.width_in, self.height_in)
        }
    }
}

static NEXT_PLACEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a placement, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementId(pub u64);

impl PlacementId {
    /// Allocate a fresh identifier, never handed out before in this process
    pub fn next() -> Self {
        PlacementId(NEXT_PLACEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A logo anchored on a sheet. Position is the top-left corner in inches.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub id: PlacementId,
    pub logo: LogoRef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub note: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Effective width (already swapped if packed rotated)
    pub width: f64,
    /// Effective height (already swapped if packed rotated)
    pub height: f64,
    /// Whether the packer placed this logo turned 90°
    pub rotated: bool,
}

impl Placement {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same layout, ignoring identity
    pub fn layout_eq(&self, other: &Placement) -> bool {
        self.logo.id == other.logo.id
            && self.width == other.width
            && self.height == other.height
            && self.x == other.x
            && self.y == other.y
            && self.rotated == other.rotated
    }
}

/// One physical print sheet and everything arranged on it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub size: SheetSize,
    pub placements: Vec<Placement>,
}

impl Sheet {
    pub fn new(size: SheetSize) -> Self {
        Self {
            size,
            placements: Vec::new(),
        }
    }

    pub fn width_in(&self) -> f64 {
        self.size.width_in()
    }

    pub fn height_in(&self) -> f64 {
        self.size.height_in()
    }

    /// Position of the placement with this id in the sheet's order
    pub fn index_of(&self, id: PlacementId) -> Option<usize> {
        self.placements.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn ids(&self) -> Vec<PlacementId> {
        self.placements.iter().map(|p| p.id).collect()
    }

    /// Structural equality used for deduplication: same size and the same
    /// placements in the same order, compared on logo, size, position and
    /// rotation. Placement identities are ignored.
    pub fn layout_eq(&self, other: &Sheet) -> bool {
        self.size == other.size
            && self.placements.len() == other.placements.len()
            && self
                .placements
                .iter()
                .zip(&other.placements)
                .all(|(a, b)| a.layout_eq(b))
    }
}

/// A representative sheet standing for `quantity` identical sheets
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupedSheet {
    pub sheet: Sheet,
    pub quantity: usize,
    /// Position of the first occurrence in generation order
    pub index: usize,
}

/// Visual rotation of a placement in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Add a quarter turn, wrapping at 360°
    pub fn next(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    /// 90° and 270° exchange width and height
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Totals over a calculation's grouped sheets
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetStatistics {
    /// Physical sheets to print (sum of group quantities)
    pub total_sheets: usize,
    /// Number of distinct layouts
    pub distinct_layouts: usize,
    /// Logos printed across all physical sheets
    pub logos_placed: usize,
    /// Price of all physical sheets
    pub total_cost: f64,
    /// Physical sheet count for each size that is used, smallest size first
    pub sheets_by_size: Vec<(SheetSize, usize)>,
}
