use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, warn};

use crate::error::Result;

/// Outcome of reading an optional input section.
///
/// A missing file is a normal situation for most export sections and must be
/// distinguishable from a file that exists but could not be read (which is
/// reported as an error instead).
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// The file was present and parsed.
    Data(T),
    /// The file was not found; the section is empty for this run.
    Missing(PathBuf),
}

impl<T> Loaded<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Loaded::Missing(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        match self {
            Loaded::Data(value) => Loaded::Data(f(value)),
            Loaded::Missing(path) => Loaded::Missing(path),
        }
    }

    /// Returns the data, or the default value for a missing section.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            Loaded::Data(value) => value,
            Loaded::Missing(_) => T::default(),
        }
    }
}

/// Reads a legacy single-byte export file. Undecodable bytes are replaced
/// rather than rejected.
pub fn read_legacy_text(path: &Path) -> Result<Loaded<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "input file not found");
            return Ok(Loaded::Missing(path.to_path_buf()));
        }
        Err(error) => return Err(error.into()),
    };

    let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    if had_errors {
        debug!(path = %path.display(), "replaced undecodable bytes");
    }
    Ok(Loaded::Data(text.into_owned()))
}

/// Splits comma-delimited, quote-enclosed text into records. Rows may have
/// any number of fields.
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Reads and splits a delimited export file in one step.
pub fn read_records(path: &Path) -> Result<Loaded<Vec<Vec<String>>>> {
    match read_legacy_text(path)? {
        Loaded::Data(text) => Ok(Loaded::Data(parse_records(&text)?)),
        Loaded::Missing(path) => Ok(Loaded::Missing(path)),
    }
}

/// Reads an optional export file whose location may not have been resolved.
pub fn read_optional_records(path: Option<&Path>, label: &str) -> Result<Loaded<Vec<Vec<String>>>> {
    match path {
        Some(path) => read_records(path),
        None => {
            warn!(section = label, "no input file found");
            Ok(Loaded::Missing(PathBuf::from(label)))
        }
    }
}

/// Strips leading zeros from a code; `"000"` becomes empty.
pub fn strip_leading_zeros(value: &str) -> &str {
    value.trim_start_matches('0')
}
