//! Aspect ratio resolution for logo images
//!
//! Ratios are read from the image header only. Any failure along the way
//! (fetch error, timeout, undecodable data, zero height) falls back to the
//! configured default ratio instead of failing the calculation.

use crate::constants::{DEFAULT_ASPECT_RATIO, MAX_IMAGE_BYTES, RESOLVE_TIMEOUT};
use crate::options::CalculationOptions;
use crate::types::*;
use std::collections::HashMap;
use std::future::Future;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Somewhere logo image bytes can be fetched from
pub trait ImageSource: Send + Sync + 'static {
    /// Fetch the raw bytes behind an image reference
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Fetches `http(s)://` references over the network and everything else
/// (`file://` or bare paths) from disk.
#[derive(Debug, Clone)]
pub struct UrlImageSource {
    /// Directory relative paths are resolved against
    base_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for UrlImageSource {
    fn default() -> Self {
        Self {
            base_dir: None,
            timeout: RESOLVE_TIMEOUT,
        }
    }
}

impl UrlImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn local_path(&self, url: &str) -> PathBuf {
        let raw = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(raw);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageSource for UrlImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let url = url.to_owned();
            let timeout = self.timeout;
            // ureq is blocking
            tokio::task::spawn_blocking(move || fetch_http(&url, timeout)).await?
        } else {
            Ok(tokio::fs::read(self.local_path(url)).await?)
        }
    }
}

fn fetch_http(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let response = ureq::get(url)
        .timeout(timeout)
        .call()
        .map_err(|e| GangSheetError::Http(format!("{url}: {e}")))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_IMAGE_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Width / height from an encoded image's header
pub fn decode_aspect_ratio(bytes: &[u8]) -> Result<f64> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    if height == 0 {
        return Err(GangSheetError::Config("Image has zero height".to_string()));
    }
    Ok(width as f64 / height as f64)
}

/// Resolves logo aspect ratios, never failing the caller
#[derive(Debug)]
pub struct AspectRatioResolver<S> {
    source: Arc<S>,
    default_ratio: f64,
    timeout: Duration,
}

impl<S> Clone for AspectRatioResolver<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            default_ratio: self.default_ratio,
            timeout: self.timeout,
        }
    }
}

impl<S: ImageSource> AspectRatioResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            default_ratio: DEFAULT_ASPECT_RATIO,
            timeout: RESOLVE_TIMEOUT,
        }
    }

    pub fn with_default_ratio(mut self, ratio: f64) -> Self {
        self.default_ratio = ratio;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A resolver sharing this one's source, set up for one calculation
    pub fn for_options(&self, options: &CalculationOptions) -> Self {
        self.clone()
            .with_default_ratio(options.default_aspect_ratio)
            .with_timeout(options.resolve_timeout())
    }

    pub fn default_ratio(&self) -> f64 {
        self.default_ratio
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ratio of a single image reference, or the default on any failure
    pub async fn resolve(&self, url: &str) -> f64 {
        resolve_url(self.source.as_ref(), url, self.timeout)
            .await
            .unwrap_or(self.default_ratio)
    }

    /// Ratio of a logo: vector image first, then raster, then the default
    pub async fn resolve_logo(&self, logo: &LogoRef) -> f64 {
        resolve_candidates(self.source.as_ref(), logo, self.timeout)
            .await
            .unwrap_or(self.default_ratio)
    }

    /// Resolve every distinct logo concurrently.
    ///
    /// Returns only after every lookup has finished or fallen back. Logos
    /// are keyed by catalog id; repeated ids are fetched once.
    pub async fn resolve_all<'a>(
        &self,
        logos: impl IntoIterator<Item = &'a LogoRef>,
    ) -> HashMap<String, f64> {
        let mut ratios = HashMap::new();
        let mut tasks = JoinSet::new();

        for logo in logos {
            if ratios.contains_key(&logo.id) {
                continue;
            }
            ratios.insert(logo.id.clone(), self.default_ratio);

            let source = Arc::clone(&self.source);
            let logo = logo.clone();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let ratio = resolve_candidates(source.as_ref(), &logo, timeout).await;
                (logo.id, ratio)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Some(ratio))) => {
                    ratios.insert(id, ratio);
                }
                Ok((id, None)) => {
                    log::debug!("Using default ratio {} for logo {}", self.default_ratio, id);
                }
                Err(e) => {
                    log::warn!("Aspect ratio task failed: {}", e);
                }
            }
        }

        log::info!("Resolved aspect ratios for {} logos", ratios.len());
        ratios
    }
}

async fn resolve_candidates<S: ImageSource>(
    source: &S,
    logo: &LogoRef,
    timeout: Duration,
) -> Option<f64> {
    for url in logo.image_candidates() {
        match resolve_url(source, url, timeout).await {
            Ok(ratio) => return Some(ratio),
            Err(e) => log::warn!("Logo {}: could not read {}: {}", logo.id, url, e),
        }
    }
    None
}

async fn resolve_url<S: ImageSource>(source: &S, url: &str, timeout: Duration) -> Result<f64> {
    let bytes = tokio::time::timeout(timeout, source.fetch(url))
        .await
        .map_err(|_| GangSheetError::Http(format!("{url}: timed out after {timeout:?}")))??;
    decode_aspect_ratio(&bytes)
}
