//! Fixed column layout of the article export.
//!
//! The primary input has one field per base column (except the derived
//! delivery-week range, which is inserted after reading). The article table
//! repeats the base columns in the same order and follows every
//! lookup-enabled column with its `_CONV` column.

use crate::lookup::AttributeKey;

/// Suffix of derived columns.
pub const CONV_SUFFIX: &str = "_CONV";

/// How a base column's lookup column is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived {
    None,
    Lookup(AttributeKey),
    /// Single-digit codes are padded to two digits, also in the base cell.
    PaddedLookup(AttributeKey),
}

/// Formatting applied to a base cell in the article table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Text,
    /// Decimal separator rendered as a comma.
    CommaDecimal,
    /// Decimal separator rendered as a dot.
    DotDecimal,
    /// Leading zeros removed; an all-zero value becomes `0`.
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseColumn {
    pub header: &'static str,
    pub derived: Derived,
    pub format: CellFormat,
    /// Leading zeros are stripped when the record is read.
    pub numeric: bool,
}

const fn text(header: &'static str) -> BaseColumn {
    BaseColumn {
        header,
        derived: Derived::None,
        format: CellFormat::Text,
        numeric: false,
    }
}

const fn lookup(header: &'static str, key: AttributeKey) -> BaseColumn {
    BaseColumn {
        header,
        derived: Derived::Lookup(key),
        format: CellFormat::Text,
        numeric: false,
    }
}

const fn number(header: &'static str, format: CellFormat) -> BaseColumn {
    BaseColumn {
        header,
        derived: Derived::None,
        format,
        numeric: true,
    }
}

const fn formatted(header: &'static str, format: CellFormat) -> BaseColumn {
    BaseColumn {
        header,
        derived: Derived::None,
        format,
        numeric: false,
    }
}

pub const ARTICLE_NUMBER: usize = 0;
pub const DESCRIPTION: usize = 1;
pub const SUPPLIER_NUMBER: usize = 17;
pub const VARIANT_CODE: usize = 23;
pub const PARENT_NUMBER: usize = 29;
pub const PARENT_DESCRIPTION: usize = 30;
pub const AMBIENCE_CODE: usize = 31;
pub const CONCEPT_CODE: usize = 32;
pub const PARENT_DEPARTMENT: usize = 33;
pub const PARENT_DISCOUNT_1: usize = 42;
pub const PARENT_DISCOUNT_2: usize = 43;
pub const PARENT_MARKUP_FACTOR: usize = 44;
pub const PARENT_COLLECTION_CODE: usize = 45;
pub const CONTRACT_START: usize = 49;
pub const CONTRACT_END: usize = 50;
pub const ROUNDING_KIND: usize = 51;
pub const DELIVERY_TIME: usize = 56;
pub const DELIVERY_RANGE: usize = 57;
pub const PARENT_SKU: usize = 79;

/// Every base column in input order.
pub const BASE_COLUMNS: [BaseColumn; 80] = [
    text("Artikelnummer"),
    text("Artikelomschrijving"),
    text("Barcode"),
    lookup("Eenh_aankoop", AttributeKey::PurchaseUnit),
    lookup("Eenh_verkoop", AttributeKey::SalesUnit),
    formatted("Bestelhoeveelheid", CellFormat::Integer),
    text("nvt1"),
    text("nvt2"),
    text("nvt3"),
    text("nvt4"),
    text("nvt5"),
    number("Standaardprijs verkoopprijs", CellFormat::DotDecimal),
    text("nvt6"),
    number("Standaard inkoopprijs", CellFormat::Text),
    formatted("Standaard magazijn", CellFormat::Integer),
    text("Standaard locatie"),
    lookup("Omzetgroepnummer", AttributeKey::RevenueGroup),
    text("Crediteurnummer"),
    lookup("Code in collectie", AttributeKey::CollectionCode),
    formatted("Minimum voorraad", CellFormat::Integer),
    formatted("Maximum voorraad", CellFormat::Integer),
    text("Inkoopomschrijving"),
    lookup("Code materiaal", AttributeKey::MaterialCode),
    BaseColumn {
        header: "Code uitvoering",
        derived: Derived::PaddedLookup(AttributeKey::VariantCode),
        format: CellFormat::Text,
        numeric: false,
    },
    lookup("Groepscode", AttributeKey::GroupCode),
    formatted("Stofbreedte", CellFormat::Integer),
    formatted("Patroonhoogte", CellFormat::Integer),
    lookup("Commissiecode", AttributeKey::CommissionCode),
    text("Aanvullende omschrijving"),
    text("Hoofdartikelnummer"),
    text("Hoofdartikelomschrijving"),
    lookup("Code sfeer", AttributeKey::AmbienceCode),
    lookup("Code concept", AttributeKey::ConceptCode),
    text("Hoofdartikel afdelingnummer"),
    text("Code vrije omschrijving"),
    text("Code vrije prijs"),
    text("Code inkoopvaluta"),
    number("Adviesprijs", CellFormat::CommaDecimal),
    text("nvt7"),
    text("nvt8"),
    text("nvt9"),
    text("nvt10"),
    text("Hoofdartikel korting 1"),
    text("Hoofdartikel korting 2"),
    number("Hoofdartikel opslag conversiefactor", CellFormat::CommaDecimal),
    lookup("Hoofdartikel code collectie", AttributeKey::ParentCollectionCode),
    lookup("Catalogus uitvoering", AttributeKey::CatalogueVariant),
    lookup("Catalogus soort", AttributeKey::CatalogueKind),
    text("kenmerken"),
    text("begindatum contract"),
    text("einddatum contract"),
    lookup("soort afronding", AttributeKey::RoundingKind),
    formatted("prijs afronden op", CellFormat::Integer),
    text("verzamelen order op \"0\""),
    text("code catalogus op 1"),
    text("omschrijving catalogus"),
    number("Levertijd", CellFormat::Text),
    text("leverweek_CONV"),
    lookup("Artikel publicatie", AttributeKey::ArticlePublication),
    text("Artikelnr leverancier"),
    number("Volume", CellFormat::CommaDecimal),
    number("Gewicht", CellFormat::CommaDecimal),
    text("Cat_extra_detail"),
    lookup("Artikelsoort", AttributeKey::ArticleKind),
    number("Aantal colli", CellFormat::Text),
    number("Hoogte", CellFormat::CommaDecimal),
    number("Breedte", CellFormat::CommaDecimal),
    number("Lengte", CellFormat::CommaDecimal),
    number("Zithoogte", CellFormat::CommaDecimal),
    number("Zitdiepte", CellFormat::CommaDecimal),
    number("Hoogte onderzijde blad", CellFormat::CommaDecimal),
    number("Hoogte armligger", CellFormat::CommaDecimal),
    number("Hoogte verpakking", CellFormat::CommaDecimal),
    number("Breedte verpakking", CellFormat::CommaDecimal),
    number("Lengte verpakking", CellFormat::CommaDecimal),
    number("Volume verpakking", CellFormat::CommaDecimal),
    number("Aantal colli verpakking", CellFormat::Text),
    text("Artikel publicatie verkoop - NIEUW"),
    text("Voorraad houden - NIEUW"),
    text("ParentSKU"),
];

/// Number of fields in a normalized article record.
pub const BASE_WIDTH: usize = BASE_COLUMNS.len();

/// Summary columns appended after the attribute columns.
pub const PRICE_CARD_DESCRIPTION: &str = "prijskaart_omschrijving";
pub const SPECIFICATION_GROUPS: &str = "SpecificatieGroepen";
pub const GRANDPARENT_KEY: &str = "GrandParentExternalKey";

impl BaseColumn {
    /// Header of the derived column, if any.
    pub fn derived_header(&self) -> Option<String> {
        match self.derived {
            Derived::None => None,
            Derived::Lookup(_) | Derived::PaddedLookup(_) => {
                Some(format!("{}{CONV_SUFFIX}", self.header))
            }
        }
    }
}

impl CellFormat {
    /// Applies the column's number convention to a non-empty cell.
    pub fn apply(self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        match self {
            CellFormat::Text => value.to_string(),
            CellFormat::CommaDecimal => value.replace('.', ","),
            CellFormat::DotDecimal => value.replace(',', "."),
            CellFormat::Integer => {
                let stripped = value.trim_start_matches('0');
                if stripped.is_empty() {
                    "0".to_string()
                } else {
                    stripped.to_string()
                }
            }
        }
    }
}

/// Normalizes a numeric input cell: leading zeros are removed and a bare
/// fraction regains its leading zero (`"0012.50"` → `"12.50"`,
/// `"000.5"` → `"0.5"`).
pub fn strip_numeric(value: &str) -> String {
    let stripped = value.trim_start_matches('0');
    if stripped.starts_with('.') {
        format!("0{stripped}")
    } else {
        stripped.to_string()
    }
}

/// Renders a number without a decimal point when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Renders a set of values as `"<min> / <max>"`, a single value, or an empty
/// string. Duplicates collapse.
pub fn format_range(values: &[f64]) -> String {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    match sorted.as_slice() {
        [] => String::new(),
        [single] => format_number(*single),
        [min, .., max] => format!("{} / {}", format_number(*min), format_number(*max)),
    }
}
