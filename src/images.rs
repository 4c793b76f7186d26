//! Image mapping export for the house-brand line.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use tracing::{info, instrument};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::model::{ArticleRecord, SheetTable};

/// Product line for which image mappings are exported.
pub const IMAGE_LINE: &str = "in";

pub const IMAGE_SHEET: &str = "Images";

const SKU: usize = 0;
const FALLBACK_PATH: usize = 2;
const DISPLAY_ORDER: usize = 3;
const PATH: usize = 4;

/// Image URLs per SKU, keyed by two-digit display order. SKUs keep the
/// order of their first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMapping {
    skus: Vec<String>,
    images: HashMap<String, BTreeMap<String, String>>,
}

impl ImageMapping {
    /// Builds the mapping from `adc*` rows (`sku, _, fallback path, display
    /// order, path`). Rows without SKU, display order or any path are skipped.
    pub fn from_rows(rows: &[Vec<String>], base_url: &str) -> Self {
        let mut mapping = Self::default();
        for row in rows {
            if row.len() <= PATH {
                continue;
            }
            let sku = row[SKU].trim();
            let order = row[DISPLAY_ORDER].trim();
            let path = match row[PATH].trim() {
                "" => row[FALLBACK_PATH].trim(),
                path => path,
            };
            if sku.is_empty() || order.is_empty() || path.is_empty() {
                continue;
            }

            let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
            let url = format!("{}/{file_name}", base_url.trim_end_matches('/'));
            if !mapping.images.contains_key(sku) {
                mapping.skus.push(sku.to_string());
            }
            mapping
                .images
                .entry(sku.to_string())
                .or_default()
                .insert(format!("{order:0>2}"), url);
        }
        mapping
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }

    /// All display orders in use, sorted.
    pub fn display_orders(&self) -> BTreeSet<&str> {
        self.images
            .values()
            .flat_map(|images| images.keys().map(String::as_str))
            .collect()
    }

    /// Sheet with `SKU, Name, Image_XX...`. Names come from the article
    /// records; unknown SKUs use the SKU as name.
    pub fn to_table(&self, records: &[ArticleRecord]) -> SheetTable {
        let names: HashMap<&str, &str> = records
            .iter()
            .filter(|record| !record.article_number().is_empty())
            .map(|record| (record.article_number(), record.description()))
            .collect();
        let orders = self.display_orders();

        let mut columns = vec!["SKU".to_string(), "Name".to_string()];
        columns.extend(orders.iter().map(|order| format!("Image_{order}")));
        let mut table = SheetTable::new(IMAGE_SHEET, columns);

        for sku in &self.skus {
            let images = &self.images[sku];
            let mut row = vec![
                sku.clone(),
                names.get(sku.as_str()).copied().unwrap_or(sku.as_str()).to_string(),
            ];
            row.extend(
                orders
                    .iter()
                    .map(|order| images.get(*order).cloned().unwrap_or_default()),
            );
            table.rows.push(row);
        }
        table
    }
}

#[instrument(level = "info", skip_all)]
pub fn read_image_mapping(path: Option<&Path>, base_url: &str) -> Result<Loaded<ImageMapping>> {
    let mapping = flatfile::read_optional_records(path, "images")?
        .map(|rows| ImageMapping::from_rows(&rows, base_url));
    if let Loaded::Data(mapping) = &mapping {
        info!(skus = mapping.skus.len(), "read image mapping");
    }
    Ok(mapping)
}
