//! Resolution of coded option values to display names.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::io::flatfile::strip_leading_zeros;
use crate::runlog::{LogChannel, RunLog};
use crate::specs::SpecificationDocument;

/// Attributes whose option codes are resolved through the specification
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKey {
    ArticlePublication,
    ArticleKind,
    CatalogueKind,
    CatalogueVariant,
    ConceptCode,
    CollectionCode,
    MaterialCode,
    AmbienceCode,
    VariantCode,
    CommissionCode,
    PurchaseUnit,
    SalesUnit,
    GroupCode,
    ParentCollectionCode,
    RevenueGroup,
    RoundingKind,
    ParentDepartment,
    ParentRoundingKind,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 18] = [
        AttributeKey::ArticlePublication,
        AttributeKey::ArticleKind,
        AttributeKey::CatalogueKind,
        AttributeKey::CatalogueVariant,
        AttributeKey::ConceptCode,
        AttributeKey::CollectionCode,
        AttributeKey::MaterialCode,
        AttributeKey::AmbienceCode,
        AttributeKey::VariantCode,
        AttributeKey::CommissionCode,
        AttributeKey::PurchaseUnit,
        AttributeKey::SalesUnit,
        AttributeKey::GroupCode,
        AttributeKey::ParentCollectionCode,
        AttributeKey::RevenueGroup,
        AttributeKey::RoundingKind,
        AttributeKey::ParentDepartment,
        AttributeKey::ParentRoundingKind,
    ];

    /// Attribute code as used by the specification service.
    pub fn code(self) -> &'static str {
        match self {
            AttributeKey::ArticlePublication => "Artikel publicatie",
            AttributeKey::ArticleKind => "Artikelsoort",
            AttributeKey::CatalogueKind => "Catalogus soort",
            AttributeKey::CatalogueVariant => "Catalogus uitvoering",
            AttributeKey::ConceptCode => "Code concept",
            AttributeKey::CollectionCode => "Code in collectie",
            AttributeKey::MaterialCode => "Code materiaal",
            AttributeKey::AmbienceCode => "Code sfeer",
            AttributeKey::VariantCode => "Code uitvoering",
            AttributeKey::CommissionCode => "Commissiecode",
            AttributeKey::PurchaseUnit => "Eenh_aankoop",
            AttributeKey::SalesUnit => "Eenh_verkoop",
            AttributeKey::GroupCode => "Groepscode",
            AttributeKey::ParentCollectionCode => "Hoofdartikel code collectie",
            AttributeKey::RevenueGroup => "Omzetgroepnummer",
            AttributeKey::RoundingKind => "soort afronding",
            AttributeKey::ParentDepartment => "gp_hoofdartikel_afdelingsnummer",
            AttributeKey::ParentRoundingKind => "gp_soort_afronding",
        }
    }

    /// Case-insensitive match against a specification item code.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of resolving one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Display name, or the raw code when nothing matched.
    pub value: String,
    pub matched: bool,
}

impl Resolution {
    fn unmatched(raw: &str) -> Self {
        Self {
            value: raw.to_string(),
            matched: false,
        }
    }
}

/// Option code → display name for one attribute.
///
/// Besides the codes as delivered, every code is indexed zero-stripped and,
/// for single digits, zero-padded to two digits, so that `"7"`, `"07"` and
/// `"007"` reach the same option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    options: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl LookupTable {
    /// Builds the table from (code, name) pairs in source order. When a code
    /// appears twice with different names the latest name wins and the
    /// conflict is logged once per attribute and code.
    pub fn from_options<'a>(
        attribute: &str,
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
        log: &mut RunLog,
    ) -> Self {
        let mut raw: Vec<(String, String)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (code, name) in options {
            let code = code.trim();
            let name = name.trim();
            match positions.get(code) {
                Some(&position) => {
                    let previous = &raw[position].1;
                    if previous != name {
                        log.record_once_keyed(
                            LogChannel::General,
                            format!("duplicate {attribute} [{code}]"),
                            format!("Duplicate {attribute} code {code}: '{previous}' vs '{name}'"),
                        );
                    }
                    raw[position].1 = name.to_string();
                }
                None => {
                    positions.insert(code.to_string(), raw.len());
                    raw.push((code.to_string(), name.to_string()));
                }
            }
        }

        let mut table = Self::default();
        for (code, name) in raw {
            table.add_option(&code, &name);
        }
        table
    }

    /// Adds one option under all of its index keys.
    pub fn add_option(&mut self, code: &str, name: &str) {
        let mut keys = vec![code.to_string(), strip_leading_zeros(code).to_string()];
        if is_single_digit(code) {
            keys.push(pad_code(code));
        }
        for key in keys {
            self.folded.insert(key.to_lowercase(), name.to_string());
            self.options.insert(key, name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let code = raw.trim();
        if code.is_empty() {
            return None;
        }
        let stripped = strip_leading_zeros(code);
        self.options
            .get(code)
            .or_else(|| self.options.get(stripped))
            .or_else(|| self.folded.get(&code.to_lowercase()))
            .or_else(|| self.folded.get(&stripped.to_lowercase()))
            .map(String::as_str)
    }

    /// Resolves a code: exact, zero-stripped, case-insensitive, then
    /// case-insensitive zero-stripped. Falls back to the raw code.
    pub fn resolve(&self, raw: &str) -> Resolution {
        match self.lookup(raw) {
            Some(name) => Resolution {
                value: name.to_string(),
                matched: true,
            },
            None => Resolution::unmatched(raw),
        }
    }

    /// Variant for codes that are displayed two-digit: a single digit is
    /// padded before matching and the padded code replaces the raw one, both
    /// as the returned display code and as the fallback value.
    pub fn resolve_padded(&self, raw: &str) -> (String, Resolution) {
        let trimmed = raw.trim();
        let padded = if is_single_digit(trimmed) {
            pad_code(trimmed)
        } else {
            trimmed.to_string()
        };

        let resolution = match self.lookup(&padded).or_else(|| self.lookup(trimmed)) {
            Some(name) => Resolution {
                value: name.to_string(),
                matched: true,
            },
            None => Resolution::unmatched(&padded),
        };
        (padded, resolution)
    }
}

fn is_single_digit(code: &str) -> bool {
    code.len() == 1 && code.bytes().all(|byte| byte.is_ascii_digit())
}

fn pad_code(code: &str) -> String {
    format!("{code:0>2}")
}

/// Lookup tables of every known attribute for one run.
#[derive(Debug, Clone, Default)]
pub struct OptionTables {
    tables: HashMap<AttributeKey, LookupTable>,
}

impl OptionTables {
    /// Builds the tables from the specification document. Items whose code
    /// does not name a known attribute are ignored. The parent rounding kind
    /// table also serves the article rounding kind column.
    pub fn from_document(document: &SpecificationDocument, log: &mut RunLog) -> Self {
        let mut tables = HashMap::new();
        for item in &document.items {
            let Some(key) = item.code.as_deref().and_then(AttributeKey::from_code) else {
                continue;
            };
            let label = item.code.as_deref().unwrap_or_default().trim();
            let options = item.options.iter().map(|option| {
                (
                    option.code.as_deref().unwrap_or_default(),
                    option.name.as_deref().unwrap_or_default(),
                )
            });
            tables.insert(key, LookupTable::from_options(label, options, log));
        }

        if let Some(parent) = tables.get(&AttributeKey::ParentRoundingKind).cloned() {
            tables.insert(AttributeKey::RoundingKind, parent);
        }

        debug!(attributes = tables.len(), "built option tables");
        Self { tables }
    }

    pub fn insert(&mut self, key: AttributeKey, table: LookupTable) {
        self.tables.insert(key, table);
    }

    /// Adds one option to an attribute's table, creating the table if needed.
    pub fn add_option(&mut self, key: AttributeKey, code: &str, name: &str) {
        self.tables.entry(key).or_default().add_option(code, name);
    }

    pub fn get(&self, key: AttributeKey) -> Option<&LookupTable> {
        self.tables.get(&key)
    }

    pub fn resolve(&self, key: AttributeKey, raw: &str) -> Resolution {
        match self.tables.get(&key) {
            Some(table) => table.resolve(raw),
            None => Resolution::unmatched(raw),
        }
    }

    pub fn resolve_padded(&self, key: AttributeKey, raw: &str) -> (String, Resolution) {
        match self.tables.get(&key) {
            Some(table) => table.resolve_padded(raw),
            None => LookupTable::default().resolve_padded(raw),
        }
    }

    /// Plain lookup without fallback, used where a missing option leaves the
    /// cell at its raw value without logging.
    pub fn lookup_or_raw(&self, key: AttributeKey, raw: &str) -> String {
        self.tables
            .get(&key)
            .and_then(|table| table.lookup(raw))
            .unwrap_or(raw)
            .to_string()
    }
}
