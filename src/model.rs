use std::collections::HashMap;

use serde::Serialize;

use crate::schema::{self, BASE_COLUMNS, BASE_WIDTH};

/// One article row of the primary input, normalized to the base column
/// layout (see [`schema::BASE_COLUMNS`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    fields: Vec<String>,
}

impl ArticleRecord {
    /// Normalizes a raw input row: cells are trimmed, numeric cells lose
    /// their leading zeros, the delivery-range slot is inserted after the
    /// delivery time and the row is padded to the full layout.
    pub fn from_raw(raw: Vec<String>) -> Self {
        let mut fields: Vec<String> = Vec::with_capacity(BASE_WIDTH);
        for (index, cell) in raw.into_iter().enumerate() {
            if fields.len() == schema::DELIVERY_RANGE {
                fields.push(String::new());
            }
            let target = if index < schema::DELIVERY_RANGE {
                index
            } else {
                index + 1
            };
            let cell = cell.trim();
            let numeric = BASE_COLUMNS.get(target).is_some_and(|column| column.numeric);
            fields.push(if numeric {
                schema::strip_numeric(cell)
            } else {
                cell.to_string()
            });
        }
        if fields.len() < BASE_WIDTH {
            fields.resize(BASE_WIDTH, String::new());
        }
        Self { fields }
    }

    /// Builds a record from cells already in base-column order.
    pub fn from_fields(mut fields: Vec<String>) -> Self {
        if fields.len() < BASE_WIDTH {
            fields.resize(BASE_WIDTH, String::new());
        }
        Self { fields }
    }

    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if index >= self.fields.len() {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value.into();
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn article_number(&self) -> &str {
        self.get(schema::ARTICLE_NUMBER)
    }

    pub fn description(&self) -> &str {
        self.get(schema::DESCRIPTION)
    }

    pub fn parent_number(&self) -> &str {
        self.get(schema::PARENT_NUMBER)
    }

    pub fn parent_description(&self) -> &str {
        self.get(schema::PARENT_DESCRIPTION)
    }

    pub fn supplier_number(&self) -> &str {
        self.get(schema::SUPPLIER_NUMBER)
    }

    pub fn delivery_time(&self) -> &str {
        self.get(schema::DELIVERY_TIME)
    }
}

/// A supplier row from the fixed 18-column supplier export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Supplier {
    pub number: String,
    pub name: String,
    pub street: String,
    pub house_number: String,
    pub house_number_suffix: String,
    pub postal_code: String,
    pub city: String,
    pub country_code: String,
    pub phone: String,
    pub fax: String,
    pub email: String,
    pub vat_number: String,
    pub supplier_group: String,
    pub payment_terms: String,
    pub financial_group: String,
    pub free_shipping_amount: String,
    pub lead_time: String,
    pub currency_code: String,
}

/// Width of a supplier record; shorter rows are ignored.
pub const SUPPLIER_WIDTH: usize = 18;

impl Supplier {
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < SUPPLIER_WIDTH {
            return None;
        }
        let cell = |index: usize| row[index].trim().to_string();
        Some(Self {
            number: cell(0),
            name: cell(1),
            street: cell(2),
            house_number: cell(3),
            house_number_suffix: cell(4),
            postal_code: cell(5),
            city: cell(6),
            country_code: cell(7),
            phone: cell(8),
            fax: cell(9),
            email: cell(10),
            vat_number: cell(11),
            supplier_group: cell(12),
            payment_terms: cell(13),
            financial_group: cell(14),
            free_shipping_amount: cell(15),
            lead_time: cell(16),
            currency_code: cell(17),
        })
    }
}

/// Supplier number → name, indexed by the number as delivered and with its
/// leading zeros removed.
#[derive(Debug, Clone, Default)]
pub struct SupplierDirectory {
    names: HashMap<String, String>,
}

impl SupplierDirectory {
    pub fn from_suppliers<'a>(suppliers: impl IntoIterator<Item = &'a Supplier>) -> Self {
        let mut names = HashMap::new();
        for supplier in suppliers {
            names.insert(supplier.number.clone(), supplier.name.clone());
            names.insert(
                supplier.number.trim_start_matches('0').to_string(),
                supplier.name.clone(),
            );
        }
        Self { names }
    }

    /// Resolves a supplier number exactly, then zero-stripped.
    pub fn name_for(&self, number: &str) -> Option<&str> {
        let number = number.trim();
        self.names
            .get(number)
            .or_else(|| self.names.get(number.trim_start_matches('0')))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of the column with the given header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == header)
    }

    /// Cell of `row` in the column named `header`.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column_index(header)?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// Represents all tables required to materialise an Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}
