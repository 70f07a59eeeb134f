//! Logo catalog lookup
//!
//! The engine only reads from the catalog. [`CsvCatalog`] serves an
//! exported catalog file with the columns
//! `logo_id,description,account_name,png_url,svg_link`.

use crate::constants::CATALOG_PAGE_SIZE;
use crate::types::*;
use std::cmp::Ordering;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A text search for one page of results
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogQuery {
    pub text: String,
    /// 1-based page number
    pub page: usize,
}

impl CatalogQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: 1,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogPage {
    pub records: Vec<LogoRef>,
    pub page: usize,
    pub total_pages: usize,
    /// Matches across every page
    pub total_count: usize,
}

/// Paged search over logo records
pub trait Catalog: Send + Sync {
    fn search(&self, query: &CatalogQuery) -> Result<CatalogPage>;
}

/// An in-memory catalog loaded from a CSV export
#[derive(Debug, Clone, Default)]
pub struct CsvCatalog {
    records: Vec<LogoRef>,
}

impl CsvCatalog {
    /// Build a catalog from records, sorted by id
    pub fn from_records(mut records: Vec<LogoRef>) -> Self {
        records.sort_by(|a, b| compare_ids(&a.id, &b.id));
        Self { records }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let contents = tokio::fs::read_to_string(&path).await?;

        let records = tokio::task::spawn_blocking(move || parse_records(&contents)).await??;
        log::info!("Loaded {} catalog records from {}", records.len(), path.display());

        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LogoRef> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl Catalog for CsvCatalog {
    fn search(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let matches: Vec<&LogoRef> = self
            .records
            .iter()
            .filter(|record| matches_query(record, &query.text))
            .collect();

        let total_count = matches.len();
        let total_pages = total_count.div_ceil(CATALOG_PAGE_SIZE);
        let page = query.page.max(1);

        let records = matches
            .into_iter()
            .skip((page - 1) * CATALOG_PAGE_SIZE)
            .take(CATALOG_PAGE_SIZE)
            .cloned()
            .collect();

        Ok(CatalogPage {
            records,
            page,
            total_pages,
            total_count,
        })
    }
}

fn parse_records(contents: &str) -> Result<Vec<LogoRef>> {
    let mut reader = csv::Reader::from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| GangSheetError::Catalog(format!("Missing column '{}'", name)))
    };
    let id_col = column("logo_id")?;
    let description_col = column("description")?;
    let account_col = column("account_name")?;
    let raster_col = column("png_url")?;
    // Older exports have no vector column
    let vector_col = column("svg_link").ok();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |index: usize| record.get(index).unwrap_or("").trim().to_string();

        let id = field(id_col);
        if id.is_empty() {
            continue;
        }
        let vector_url = vector_col.map(field).filter(|url| !url.is_empty());

        records.push(LogoRef {
            id,
            description: field(description_col),
            account_name: field(account_col),
            raster_url: field(raster_col),
            vector_url,
        });
    }

    Ok(records)
}

/// Case-insensitive substring match on description and account name; a
/// numeric query also matches the id
fn matches_query(record: &LogoRef, text: &str) -> bool {
    let query = text.trim();
    if query.is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    if record.description.to_lowercase().contains(&needle)
        || record.account_name.to_lowercase().contains(&needle)
    {
        return true;
    }

    query.parse::<u64>().is_ok() && record.id.contains(query)
}

/// Numeric ids first in numeric order, then everything else lexicographically
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, description: &str, account: &str) -> LogoRef {
        LogoRef {
            id: id.to_string(),
            description: description.to_string(),
            account_name: account.to_string(),
            raster_url: format!("{id}.png"),
            vector_url: None,
        }
    }

    #[test]
    fn test_matches_description_case_insensitive() {
        let logo = record("7", "Blue Eagle Crest", "Springfield High");
        assert!(matches_query(&logo, "eagle"));
        assert!(matches_query(&logo, "SPRINGFIELD"));
        assert!(!matches_query(&logo, "tiger"));
    }

    #[test]
    fn test_numeric_query_matches_id() {
        let logo = record("1042", "Crest", "Acme");
        assert!(matches_query(&logo, "104"));
        assert!(matches_query(&logo, " 1042 "));
        assert!(!matches_query(&logo, "999"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(matches_query(&record("1", "a", "b"), "   "));
    }

    #[test]
    fn test_ids_sort_numerically() {
        let catalog = CsvCatalog::from_records(vec![
            record("10", "", ""),
            record("9", "", ""),
            record("100", "", ""),
        ]);
        let page = catalog.search(&CatalogQuery::new("")).unwrap();
        let ids: Vec<&str> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_parse_missing_column() {
        let result = parse_records("logo_id,description\n1,Crest\n");
        assert!(matches!(result, Err(GangSheetError::Catalog(_))));
    }
}
