//! Assembly of article-table rows.
//!
//! Each row interleaves the base cells with their resolved `_CONV` cells,
//! followed by the attribute columns and a few summary columns. The header
//! layout is derived from [`BASE_COLUMNS`] and the selected attribute fields
//! so that headers and cells cannot drift apart.

use tracing::{info, instrument};

use crate::attributes::{self, AttributeTable, DIMENSIONS_FIELD, VARIANTS_FIELD};
use crate::lookup::OptionTables;
use crate::model::{ArticleRecord, SheetTable};
use crate::runlog::{LogChannel, RunLog};
use crate::schema::{
    self, BASE_COLUMNS, Derived, GRANDPARENT_KEY, PRICE_CARD_DESCRIPTION, SPECIFICATION_GROUPS,
};

/// Sheet name of the article table.
pub const ARTICLE_SHEET: &str = "Artikelen";

const CHILD_GROUPS: [&str; 6] = [
    "algemeen_child",
    "logistiek_child",
    "prijzen_child",
    "marketing_child",
    "teksten_child",
    "prijskaarten_child",
];

/// Column layout of the article table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleLayout {
    attribute_fields: Vec<String>,
    headers: Vec<String>,
}

impl ArticleLayout {
    /// Builds the layout for `attribute_fields`, normally the output of
    /// [`select_fields`](crate::attributes::select_fields).
    pub fn new(attribute_fields: Vec<String>) -> Self {
        let mut headers = Vec::new();
        for column in &BASE_COLUMNS {
            headers.push(column.header.to_string());
            headers.extend(column.derived_header());
        }
        for field in &attribute_fields {
            headers.extend(attributes::column_headers(field));
        }
        headers.push(PRICE_CARD_DESCRIPTION.to_string());
        headers.push(SPECIFICATION_GROUPS.to_string());
        headers.push(GRANDPARENT_KEY.to_string());

        Self {
            attribute_fields,
            headers,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn attribute_fields(&self) -> &[String] {
        &self.attribute_fields
    }
}

/// Specification groups attached to every article row of a product line.
pub fn specification_groups(line: &str) -> String {
    let mut groups: Vec<&str> = CHILD_GROUPS.to_vec();
    match line.to_ascii_lowercase().as_str() {
        "pw" => groups.push("labels_pronto_wonen_child"),
        "pm" => groups.push("labels_profijt_meubel_child"),
        "bs" => groups.push("teksten_child_baenks"),
        _ => {}
    }
    groups.join("|")
}

/// Removes control characters except line terminators.
pub fn strip_control_chars(value: &str) -> String {
    value
        .chars()
        .filter(|ch| *ch as u32 >= 32 || *ch == '\n' || *ch == '\r')
        .collect()
}

/// Inputs shared by every projected row of one run.
pub struct Projector<'a> {
    pub layout: &'a ArticleLayout,
    pub attributes: &'a AttributeTable,
    pub options: &'a OptionTables,
    /// Product-line code, e.g. `pw`.
    pub line: &'a str,
}

impl Projector<'_> {
    /// Builds the output row of one record, or `None` (logged) when the
    /// record lacks its article number or description.
    pub fn project(&self, record: &ArticleRecord, log: &mut RunLog) -> Option<Vec<String>> {
        let article_number = record.article_number();
        if article_number.is_empty() || record.description().is_empty() {
            log.record(
                LogChannel::General,
                format!("[SKIP] mandatory field missing for article '{article_number}'"),
            );
            return None;
        }

        let mut row: Vec<String> = Vec::with_capacity(self.layout.headers.len());
        let mut variant_name = String::new();

        for (index, column) in BASE_COLUMNS.iter().enumerate() {
            let value = record.get(index);
            match column.derived {
                Derived::None => {
                    let cell = if index == schema::PARENT_SKU && !variant_name.is_empty() {
                        format!("{} - {variant_name}", record.parent_number())
                    } else {
                        column.format.apply(value)
                    };
                    row.push(strip_control_chars(&cell));
                }
                Derived::Lookup(key) => {
                    row.push(strip_control_chars(&column.format.apply(value)));
                    let resolution = self.options.resolve(key, value);
                    if !resolution.matched && !value.is_empty() {
                        log.record_once(
                            LogChannel::General,
                            format!("No {key} option for code '{value}'"),
                        );
                    }
                    row.push(strip_control_chars(&resolution.value));
                }
                Derived::PaddedLookup(key) => {
                    let (padded, resolution) = self.options.resolve_padded(key, value);
                    if !resolution.matched && !padded.is_empty() {
                        log.record_once(
                            LogChannel::Options,
                            format!("Missing mapping for {key}: '{value}' (padded: '{padded}')"),
                        );
                    }
                    row.push(strip_control_chars(&padded));
                    variant_name = resolution.value.clone();
                    row.push(strip_control_chars(&resolution.value));
                }
            }
        }

        let mut variants_short = String::new();
        let mut dimensions_short = String::new();
        for field in &self.layout.attribute_fields {
            let value = self
                .attributes
                .get(article_number, field)
                .unwrap_or_default();
            let cells = attributes::column_values(field, value);
            match field.as_str() {
                VARIANTS_FIELD => variants_short = cells[0].trim().to_string(),
                DIMENSIONS_FIELD => dimensions_short = cells[1].trim().to_string(),
                _ => {}
            }
            row.extend(cells);
        }

        let price_card = match (variants_short.is_empty(), dimensions_short.is_empty()) {
            (false, false) => format!("{variants_short} {dimensions_short}"),
            (false, true) => variants_short,
            _ => dimensions_short,
        };
        row.push(strip_control_chars(&price_card));
        row.push(specification_groups(self.line));
        row.push(strip_control_chars(&format!(
            "{} - {}",
            record.parent_number(),
            record.parent_description()
        )));

        Some(row)
    }

    /// Projects every record into the article table. Skipped records are
    /// logged and left out.
    #[instrument(level = "info", skip_all, fields(line = self.line, records = records.len()))]
    pub fn build_table(&self, records: &[ArticleRecord], log: &mut RunLog) -> SheetTable {
        let mut table = SheetTable::new(ARTICLE_SHEET, self.layout.headers.clone());
        table.rows = records
            .iter()
            .filter_map(|record| self.project(record, log))
            .collect();
        info!(
            rows = table.rows.len(),
            skipped = records.len() - table.rows.len(),
            "article table built"
        );
        table
    }
}
