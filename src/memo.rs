//! Parent-level memo texts from the `mvm*` export.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::escape::resolve_html5_entity;
use tracing::{info, instrument};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::merge::repair_mojibake;

/// Longest entity name considered when decoding; longer `&...;` runs are
/// left untouched.
const MAX_ENTITY_LEN: usize = 32;

/// Memo lines per parent number, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoBook {
    blocks: HashMap<String, Vec<String>>,
}

impl MemoBook {
    /// Groups memo rows (`key, sequence, text, ...`) by key. Rows with fewer
    /// than three fields are ignored.
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut blocks: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            if row.len() < 3 {
                continue;
            }
            blocks
                .entry(row[0].trim().to_uppercase())
                .or_default()
                .push(row[2].clone());
        }
        Self { blocks }
    }

    /// Memo lines of a parent, matched case-insensitively.
    pub fn lines_for(&self, parent_number: &str) -> &[String] {
        self.blocks
            .get(&parent_number.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[instrument(level = "info", skip_all)]
pub fn read_memos(path: Option<&Path>) -> Result<Loaded<MemoBook>> {
    let book = flatfile::read_optional_records(path, "memo")?.map(|rows| MemoBook::from_rows(&rows));
    if let Loaded::Data(book) = &book {
        info!(parents = book.len(), "read memo texts");
    }
    Ok(book)
}

/// Memo cell of the grandparent table: lines joined by LF, non-breaking
/// spaces replaced, entities decoded and mojibake repaired.
pub fn memo_cell(lines: &[String]) -> String {
    let joined = lines
        .iter()
        .map(|line| line.replace('\u{A0}', " "))
        .collect::<Vec<_>>()
        .join("\n");
    repair_mojibake(&decode_entities(&joined))
}

/// Memo field of the JSON export, wrapped in `<PRE>`. Empty when the parent
/// has no memo lines.
pub fn memo_document_text(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    repair_mojibake(&format!("<PRE>{}\n</PRE>", lines.join("\n")))
}

/// Decodes named HTML5 and numeric character references. Unknown or
/// malformed references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        if let Some(end) = candidate.find(';').filter(|end| (1..=MAX_ENTITY_LEN).contains(end)) {
            if let Some(replacement) = resolve_entity(&candidate[..end]) {
                decoded.push_str(&replacement);
                rest = &candidate[end + 1..];
                continue;
            }
        }
        decoded.push('&');
        rest = candidate;
    }
    decoded.push_str(rest);
    decoded
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(name).map(str::to_string)
}
