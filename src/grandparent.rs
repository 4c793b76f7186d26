//! Parent-level ("grandparent") table and memo export.
//!
//! Article records are grouped by parent number and description in order of
//! first appearance. Group-level fields (contract dates, codes, discounts,
//! supplier) come from the first record of each group.

use serde::Serialize;
use tracing::{info, instrument};

use crate::io::flatfile::strip_leading_zeros;
use crate::lookup::{AttributeKey, OptionTables};
use crate::memo::{self, MemoBook};
use crate::model::{ArticleRecord, SheetTable, SupplierDirectory};
use crate::projection::strip_control_chars;
use crate::runlog::{LogChannel, RunLog};
use crate::schema::{self, format_range};

pub const GRANDPARENT_SHEET: &str = "Hoofdartikelen";

pub const GRANDPARENT_COLUMNS: [&str; 21] = [
    "SKU",
    "ParentSKU",
    "Hoofdartikelnummer",
    "Hoofdartikelomschrijving",
    "Memoveld",
    "Leverweek",
    "formule",
    "SpecificatieGroepen",
    "Begindatum contract",
    "Einddatum contract",
    "Code sfeer",
    "Hoofdartikel afdelingnummer",
    "Hoofdartikel afdelingnummer_CONV",
    "Hoofdartikel opslag conversiefactor",
    "Hoofdartikel korting 1",
    "Hoofdartikel korting 2",
    "Hoofdartikel code collectie_CONV",
    "Code concept_CONV",
    "Soort afronding",
    "Leveranciersnummer",
    "LeverancierNaam",
];

/// Specification group of every grandparent row.
pub const GRANDPARENT_GROUP: &str = "algemeen_grandparent";

const HOUSE_BRAND_LINE: &str = "in";
const HOUSE_BRAND_CONCEPT: &str = "110";
const HOUSE_BRAND_FORMULA: &str = "House of Dutchz";

/// Article records sharing one parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentGroup {
    pub parent_number: String,
    pub parent_description: String,
    pub first: ArticleRecord,
    /// Distinct delivery times of the members, in order of appearance.
    pub delivery_times: Vec<f64>,
}

impl ParentGroup {
    pub fn sku(&self) -> String {
        format!("{} - {}", self.parent_number, self.parent_description)
    }

    pub fn delivery_range(&self) -> String {
        format_range(&self.delivery_times)
    }
}

/// Groups records by parent, preserving first-occurrence order. Records
/// without a parent number are not grouped and are logged instead.
pub fn aggregate(records: &[ArticleRecord], log: &mut RunLog) -> Vec<ParentGroup> {
    let mut groups: Vec<ParentGroup> = Vec::new();
    for record in records {
        let number = record.parent_number();
        if number.is_empty() {
            log.record(
                LogChannel::General,
                format!(
                    "[SKIP] no parent number for article '{}', no grandparent row",
                    record.article_number()
                ),
            );
            continue;
        }
        let description = record.parent_description();
        let position = groups
            .iter()
            .position(|group| group.parent_number == number && group.parent_description == description);
        let group = match position {
            Some(position) => &mut groups[position],
            None => {
                groups.push(ParentGroup {
                    parent_number: number.to_string(),
                    parent_description: description.to_string(),
                    first: record.clone(),
                    delivery_times: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        if let Ok(delivery) = record.delivery_time().trim().parse::<f64>() {
            if !group.delivery_times.contains(&delivery) {
                group.delivery_times.push(delivery);
            }
        }
    }
    groups
}

/// Entry of the memo JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoEntry {
    #[serde(rename = "Artikelnummer")]
    pub article_number: String,
    pub name: String,
    #[serde(rename = "Memoveld")]
    pub memo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoDocument {
    pub product: Vec<MemoEntry>,
}

/// Lookup sources for the grandparent rows of one product line.
pub struct GrandparentBuilder<'a> {
    pub options: &'a OptionTables,
    pub memos: &'a MemoBook,
    pub suppliers: &'a SupplierDirectory,
    /// Product-line code, e.g. `pw`.
    pub line: &'a str,
    /// Configured formula name of the product line.
    pub formula: &'a str,
}

impl GrandparentBuilder<'_> {
    fn formula_for(&self, concept_code: &str) -> &str {
        if self.line.eq_ignore_ascii_case(HOUSE_BRAND_LINE) && concept_code == HOUSE_BRAND_CONCEPT {
            HOUSE_BRAND_FORMULA
        } else {
            self.formula
        }
    }

    pub fn row(&self, group: &ParentGroup) -> Vec<String> {
        let first = &group.first;
        let sku = group.sku();
        let concept = first.get(schema::CONCEPT_CODE);
        let department = first.get(schema::PARENT_DEPARTMENT);
        let supplier_number = first.supplier_number();

        let row = vec![
            sku.clone(),
            sku,
            group.parent_number.clone(),
            group.parent_description.clone(),
            memo::memo_cell(self.memos.lines_for(&group.parent_number)),
            group.delivery_range(),
            self.formula_for(concept).to_string(),
            GRANDPARENT_GROUP.to_string(),
            first.get(schema::CONTRACT_START).to_string(),
            first.get(schema::CONTRACT_END).to_string(),
            first.get(schema::AMBIENCE_CODE).to_string(),
            department.to_string(),
            self.options
                .lookup_or_raw(AttributeKey::ParentDepartment, department),
            comma_decimal(first.get(schema::PARENT_MARKUP_FACTOR)),
            comma_decimal(strip_leading_zeros(first.get(schema::PARENT_DISCOUNT_1))),
            comma_decimal(strip_leading_zeros(first.get(schema::PARENT_DISCOUNT_2))),
            self.options.lookup_or_raw(
                AttributeKey::ParentCollectionCode,
                first.get(schema::PARENT_COLLECTION_CODE),
            ),
            self.options.lookup_or_raw(AttributeKey::ConceptCode, concept),
            first.get(schema::ROUNDING_KIND).to_string(),
            supplier_number.to_string(),
            self.suppliers
                .name_for(supplier_number)
                .unwrap_or_default()
                .to_string(),
        ];
        row.iter().map(|cell| strip_control_chars(cell)).collect()
    }

    #[instrument(level = "info", skip_all, fields(line = self.line, parents = groups.len()))]
    pub fn build_table(&self, groups: &[ParentGroup]) -> SheetTable {
        let columns = GRANDPARENT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut table = SheetTable::new(GRANDPARENT_SHEET, columns);
        table.rows = groups.iter().map(|group| self.row(group)).collect();
        info!(rows = table.rows.len(), "grandparent table built");
        table
    }

    /// Memo export of every parent that has memo lines.
    pub fn memo_document(&self, groups: &[ParentGroup]) -> MemoDocument {
        let product = groups
            .iter()
            .filter_map(|group| {
                let memo = memo::memo_document_text(self.memos.lines_for(&group.parent_number));
                if memo.trim().is_empty() {
                    return None;
                }
                Some(MemoEntry {
                    article_number: group.sku(),
                    name: group.parent_number.clone(),
                    memo,
                })
            })
            .collect();
        MemoDocument { product }
    }
}

fn comma_decimal(value: &str) -> String {
    value.replace('.', ",")
}
