use crate::constants::{DEFAULT_ASPECT_RATIO, MARGIN_IN, RESOLVE_TIMEOUT, SPACING_IN};
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed gaps used by the shelf packer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingOptions {
    /// Gap between logos in a row and between rows (inches)
    pub spacing_in: f64,
    /// Border kept clear on every side of the sheet (inches)
    pub margin_in: f64,
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            spacing_in: SPACING_IN,
            margin_in: MARGIN_IN,
        }
    }
}

/// Settings for one sheet calculation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalculationOptions {
    /// Pin every sheet to this size instead of choosing the cheapest per sheet
    pub preferred_size: Option<SheetSize>,
    pub packing: PackingOptions,
    /// Ratio used for logos whose image can't be resolved
    pub default_aspect_ratio: f64,
    /// Per-image fetch timeout in milliseconds
    pub resolve_timeout_ms: u64,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            preferred_size: None,
            packing: PackingOptions::default(),
            default_aspect_ratio: DEFAULT_ASPECT_RATIO,
            resolve_timeout_ms: RESOLVE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CalculationOptions {
    pub fn with_preferred_size(mut self, size: Option<SheetSize>) -> Self {
        self.preferred_size = size;
        self
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !is_non_negative(self.packing.spacing_in) {
            return Err(GangSheetError::Config(
                "Spacing must be zero or positive".to_string(),
            ));
        }
        if !is_non_negative(self.packing.margin_in) {
            return Err(GangSheetError::Config(
                "Margin must be zero or positive".to_string(),
            ));
        }
        if !is_positive(self.default_aspect_ratio) {
            return Err(GangSheetError::Config(format!(
                "Default aspect ratio must be positive, got {}",
                self.default_aspect_ratio
            )));
        }
        if self.resolve_timeout_ms == 0 {
            return Err(GangSheetError::Config(
                "Resolve timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| GangSheetError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GangSheetError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// A complete job: what to print and how to calculate it
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: CalculationOptions,
    pub requests: Vec<SelectionRequest>,
}

impl Order {
    pub fn new(requests: Vec<SelectionRequest>) -> Self {
        Self {
            options: CalculationOptions::default(),
            requests,
        }
    }

    /// Check the options and every request
    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;

        if self.requests.is_empty() {
            return Err(GangSheetError::Config("No logos selected".to_string()));
        }

        for (i, request) in self.requests.iter().enumerate() {
            if !is_positive(request.width_in) {
                return Err(GangSheetError::Config(format!(
                    "Request {} ({}): width must be positive, got {}",
                    i, request.logo.id, request.width_in
                )));
            }
            if request.quantity == 0 {
                return Err(GangSheetError::Config(format!(
                    "Request {} ({}): quantity must be at least 1",
                    i, request.logo.id
                )));
            }
        }

        Ok(())
    }

    /// Load an order from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let order = serde_json::from_slice(&bytes)
            .map_err(|e| GangSheetError::Config(format!("Failed to parse order: {}", e)))?;
        Ok(order)
    }

    /// Save the order to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GangSheetError::Config(format!("Failed to serialize order: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
