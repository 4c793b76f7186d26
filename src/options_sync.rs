//! Reconciliation of the catalogue option files (`uic*`, `stc*`) with the
//! options known to the specification service.
//!
//! Options missing remotely are either reported or, when a publisher is
//! supplied, created. Options that exist under a different name are
//! reported as mismatches.

use std::path::Path;

use tracing::{info, instrument};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::lookup::{AttributeKey, OptionTables};
use crate::runlog::{LogChannel, RunLog};
use crate::specs::{OptionPublisher, PublishOutcome};

/// Catalogue attributes fed from option files, with their remote attribute id.
pub const CATALOGUE_ATTRIBUTES: [(AttributeKey, u32); 2] = [
    (AttributeKey::CatalogueVariant, 157),
    (AttributeKey::CatalogueKind, 158),
];

/// One `code, name` row of an option file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueOption {
    pub code: String,
    /// Display name as published: `"<code> - <name>"`.
    pub name: String,
}

impl CatalogueOption {
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 2 {
            return None;
        }
        let name = row[1].trim();
        let code = match row[0].trim() {
            "" => name,
            code => code,
        };
        Some(Self {
            code: code.to_string(),
            name: format!("{code} - {name}").trim_end().to_string(),
        })
    }
}

pub fn read_catalogue_options(path: Option<&Path>, label: &str) -> Result<Loaded<Vec<CatalogueOption>>> {
    Ok(flatfile::read_optional_records(path, label)?.map(|rows| {
        rows.iter()
            .filter_map(|row| CatalogueOption::from_row(row))
            .collect()
    }))
}

/// Counters of one reconciled option file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub posted: usize,
    pub existing: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Compares the file options of one attribute with the option tables.
///
/// Newly created options are added to `tables` so that the same run
/// resolves them.
#[instrument(level = "info", skip(options, tables, publisher, log), fields(options = options.len()))]
pub fn reconcile(
    key: AttributeKey,
    attribute_id: u32,
    options: &[CatalogueOption],
    tables: &mut OptionTables,
    publisher: Option<&dyn OptionPublisher>,
    log: &mut RunLog,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    for option in options {
        let code = option.code.as_str();
        let name = option.name.as_str();
        let existing = tables
            .get(key)
            .and_then(|table| table.lookup(code))
            .map(str::to_string);

        if let Some(existing) = existing {
            if existing != name {
                log.record(
                    LogChannel::Options,
                    format!("Name mismatch for {key} [{code}]: PIM has \"{existing}\", file has \"{name}\""),
                );
            }
            summary.existing += 1;
            continue;
        }

        let Some(publisher) = publisher else {
            log.record(
                LogChannel::Options,
                format!("Missing {key} [{code}] -> \"{name}\" (posting disabled)"),
            );
            summary.missing += 1;
            continue;
        };

        match publisher.create_option(attribute_id, code, name) {
            Ok(PublishOutcome::Created) => {
                log.note(LogChannel::Options, format!("POSTED {key} [{code}] -> \"{name}\""));
                tables.add_option(key, code, name);
                summary.posted += 1;
            }
            Ok(PublishOutcome::AlreadyExists) => {
                tables.add_option(key, code, name);
                summary.existing += 1;
            }
            Err(error) => {
                log.record(
                    LogChannel::Options,
                    format!("FAILED create {key} [{code}]: {error}"),
                );
                summary.failed += 1;
            }
        }
    }

    log.note(
        LogChannel::Options,
        format!(
            "{key}: {} posted, {} existing, {} missing, {} failed",
            summary.posted, summary.existing, summary.missing, summary.failed
        ),
    );
    info!(
        posted = summary.posted,
        existing = summary.existing,
        missing = summary.missing,
        failed = summary.failed,
        "reconciled option file"
    );
    summary
}
