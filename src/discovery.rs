//! Locating the export files of each product line.
//!
//! A bundle is recognised by its primary file `art<digits><line>`, for
//! example `art0000pw`. All companion files of the same product line share
//! the suffix (`atk0000pw`, `mvm0000pw`, ...).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// Prefix of the primary article file.
pub const ARTICLE_PREFIX: &str = "art";

/// One product line found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProductLine {
    /// File suffix shared by the line's export files, e.g. `0000pw`.
    pub suffix: String,
    /// Product-line code, e.g. `pw`.
    pub line: String,
}

impl ProductLine {
    /// Parses an article file name such as `art0000pw`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let suffix = name.strip_prefix(ARTICLE_PREFIX)?;
        let digits_end = suffix
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map(|(idx, _)| idx)?;
        let (digits, line) = suffix.split_at(digits_end);
        if digits.is_empty() || line.is_empty() || !line.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self {
            suffix: suffix.to_string(),
            line: line.to_ascii_lowercase(),
        })
    }

    /// Stem used for output file names, e.g. `art0000pw`.
    pub fn stem(&self) -> String {
        format!("{ARTICLE_PREFIX}{}", self.suffix)
    }
}

fn file_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(ConvertError::MissingInput(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Lists the product lines present in `dir`, sorted by suffix.
pub fn detect_product_lines(dir: &Path) -> Result<Vec<ProductLine>> {
    let mut lines: Vec<ProductLine> = file_names(dir)?
        .iter()
        .filter_map(|name| ProductLine::from_file_name(name))
        .collect();
    lines.sort();
    lines.dedup();
    Ok(lines)
}

/// Returns the first file named `<prefix>*<suffix>` in `dir`.
pub fn find_input(dir: &Path, prefix: &str, suffix: &str) -> Result<Option<PathBuf>> {
    Ok(file_names(dir)?
        .into_iter()
        .find(|name| {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        })
        .map(|name| dir.join(name)))
}

/// Paths of every export file of one product line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBundle {
    pub articles: PathBuf,
    pub attributes: Option<PathBuf>,
    pub memos: Option<PathBuf>,
    pub suppliers: Option<PathBuf>,
    pub catalogue_variants: Option<PathBuf>,
    pub catalogue_kinds: Option<PathBuf>,
    pub images: Option<PathBuf>,
}

impl InputBundle {
    pub fn locate(dir: &Path, line: &ProductLine) -> Result<Self> {
        let suffix = line.suffix.as_str();
        Ok(Self {
            articles: find_input(dir, ARTICLE_PREFIX, suffix)?
                .unwrap_or_else(|| dir.join(line.stem())),
            attributes: find_input(dir, "atk", suffix)?,
            memos: find_input(dir, "mvm", suffix)?,
            suppliers: find_input(dir, "lev", suffix)?,
            catalogue_variants: find_input(dir, "uic", suffix)?,
            catalogue_kinds: find_input(dir, "stc", suffix)?,
            images: find_input(dir, "adc", suffix)?,
        })
    }
}
