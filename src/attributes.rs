//! Attribute text table: one merged value per (record id, field name).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::merge::{merge_segments, trailing_blanks};
use crate::runlog::{LogChannel, RunLog};

/// Separator between the quoted fields of an attribute line.
pub const FIELD_DELIMITER: &str = "\",\"";

/// Lines with fewer parts are discarded as format noise.
pub const MIN_PARTS: usize = 8;

/// Index of the first part belonging to the free-form value.
const VALUE_PART: usize = 7;

static PAREN_BEFORE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)(\d)").expect("static pattern"));

/// Fields that are exported as attribute columns.
pub const ALLOWED_FIELDS: [&str; 19] = [
    "AFMETINGEN",
    "CT",
    "CT_ARMEN",
    "CT_COMFORT",
    "CT_DETAILS",
    "CT_FUNCTIONEEL",
    "CT_KLEUREN",
    "CT_POTEN",
    "CT_RELAX",
    "CT_ZITCOMFORT",
    "CT_ZITTING",
    "CT2",
    "LABEL",
    "OMSCHRIJVING",
    "PK_BAENKS",
    "PRIJSKAARTTEKST",
    "SHOWROOMMODEL",
    "STOFGROEP1",
    "UITVOERINGEN",
];

/// Allowed fields that lead the column order when present.
pub const PREFERRED_ORDER: [&str; 5] = [
    "OMSCHRIJVING",
    "CT",
    "UITVOERINGEN",
    "AFMETINGEN",
    "SHOWROOMMODEL",
];

pub const DIMENSIONS_FIELD: &str = "AFMETINGEN";
pub const VARIANTS_FIELD: &str = "UITVOERINGEN";

/// One physical line of the attribute file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub record_id: String,
    pub field: String,
    pub text: String,
}

impl RawFragment {
    /// Splits a physical line into its parts. Returns `None` for lines with
    /// fewer than [`MIN_PARTS`] parts.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts: Vec<&str> = line
            .split(FIELD_DELIMITER)
            .map(|part| part.trim_matches('"'))
            .collect();
        if parts.len() < MIN_PARTS {
            return None;
        }

        Some(Self {
            record_id: parts[0].trim().to_string(),
            field: parts[2].trim().to_uppercase(),
            text: parts[VALUE_PART..].join(FIELD_DELIMITER),
        })
    }

    pub fn trailing_whitespace(&self) -> usize {
        trailing_blanks(&self.text)
    }
}

/// Record id → field name → merged value, plus the distinct field names seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    values: HashMap<String, BTreeMap<String, String>>,
    fields: BTreeSet<String>,
}

impl AttributeTable {
    /// Groups the lines of an attribute file by (record id, field) in
    /// encounter order and merges every group.
    pub fn build<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut groups: HashMap<String, BTreeMap<String, Vec<String>>> = HashMap::new();
        let mut fields = BTreeSet::new();
        let mut discarded = 0usize;

        for line in lines {
            let Some(fragment) = RawFragment::parse(line) else {
                discarded += 1;
                continue;
            };
            fields.insert(fragment.field.clone());
            groups
                .entry(fragment.record_id)
                .or_default()
                .entry(fragment.field)
                .or_default()
                .push(fragment.text);
        }

        let values = groups
            .into_iter()
            .map(|(record_id, by_field)| {
                let merged = by_field
                    .into_iter()
                    .map(|(field, segments)| {
                        let value = merge_segments(&segments);
                        let value = PAREN_BEFORE_DIGIT.replace_all(&value, ") $1").into_owned();
                        (field, value)
                    })
                    .collect();
                (record_id, merged)
            })
            .collect::<HashMap<_, _>>();

        debug!(discarded, "skipped short attribute lines");
        info!(
            records = values.len(),
            fields = fields.len(),
            "built attribute table"
        );
        Self { values, fields }
    }

    pub fn get(&self, record_id: &str, field: &str) -> Option<&str> {
        self.values
            .get(record_id)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Distinct field names in sorted order.
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    pub fn record_count(&self) -> usize {
        self.values.len()
    }

    /// Record ids carrying `field`, sorted.
    pub fn records_with(&self, field: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .values
            .iter()
            .filter(|(_, fields)| fields.contains_key(field))
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Reads the `atk*` export into an attribute table.
pub fn read_attributes(path: Option<&Path>) -> Result<Loaded<AttributeTable>> {
    let Some(path) = path else {
        return Ok(Loaded::Missing(Path::new("attributes").to_path_buf()));
    };
    Ok(flatfile::read_legacy_text(path)?.map(|text| AttributeTable::build(text.lines())))
}

/// Decides the attribute columns of the article table and logs fields that
/// are not on the allow-list.
///
/// Order: preferred fields that are present, remaining present allowed
/// fields sorted, then allowed fields absent from the input, sorted.
pub fn select_fields(table: &AttributeTable, log: &mut RunLog) -> Vec<String> {
    let present = table.fields();
    let allowed: BTreeSet<&str> = ALLOWED_FIELDS.into_iter().collect();

    let mut selected: Vec<String> = PREFERRED_ORDER
        .iter()
        .filter(|field| present.contains(**field))
        .map(|field| field.to_string())
        .collect();
    selected.extend(
        present
            .iter()
            .filter(|field| allowed.contains(field.as_str()))
            .filter(|field| !PREFERRED_ORDER.contains(&field.as_str()))
            .cloned(),
    );
    selected.extend(
        allowed
            .iter()
            .filter(|field| !present.contains(**field))
            .map(|field| field.to_string()),
    );

    let unexpected: Vec<&String> = present
        .iter()
        .filter(|field| !allowed.contains(field.as_str()))
        .collect();
    if unexpected.is_empty() {
        log.note(LogChannel::Attributes, "All attribute fields are expected");
    } else {
        log.note(LogChannel::Attributes, "Unexpected attribute fields:");
        for field in unexpected {
            let records = table.records_with(field).join(", ");
            log.record(LogChannel::Attributes, format!("{field}: {records}"));
        }
    }

    selected
}

/// Output headers produced by one attribute field.
pub fn column_headers(field: &str) -> Vec<String> {
    match field {
        DIMENSIONS_FIELD => vec![
            "ATK_Afmetingen_CONV".to_string(),
            "ATK_Prijskaart Afmetingen_CONV".to_string(),
        ],
        VARIANTS_FIELD => vec![
            "ATK_Uitvoeringen_CONV".to_string(),
            "ATK_Uitvoeringen Webshop_CONV".to_string(),
        ],
        other => vec![format!("ATK_{}_CONV", capitalize(other))],
    }
}

/// Cell values produced by one attribute field, aligned with
/// [`column_headers`].
///
/// Dimensions: the full text, then the short price-card variant before the
/// first pipe (the full text when there is no pipe). Variants: the two
/// halves around the first pipe, or the full text and an empty cell.
pub fn column_values(field: &str, value: &str) -> Vec<String> {
    let value = value.replace('\r', "").replace('\n', " ");
    match field {
        DIMENSIONS_FIELD => {
            let full = value.trim();
            let short = full
                .split_once('|')
                .map(|(before, _)| before.trim())
                .unwrap_or(full);
            vec![full.to_string(), short.to_string()]
        }
        VARIANTS_FIELD => match value.split_once('|') {
            Some((short, webshop)) => vec![short.to_string(), webshop.to_string()],
            None => vec![value, String::new()],
        },
        _ => vec![value],
    }
}

fn capitalize(field: &str) -> String {
    let lower = field.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
