use std::cell::RefCell;
use std::fs;

use catalog_convert::error::{ConvertError, Result};
use catalog_convert::lookup::{AttributeKey, LookupTable, OptionTables};
use catalog_convert::options_sync::{CatalogueOption, read_catalogue_options, reconcile};
use catalog_convert::runlog::{LogChannel, RunLog};
use catalog_convert::specs::{
    OptionPublisher, PublishOutcome, SpecificationCache, SpecificationDocument, SpecificationSource,
};
use tempfile::tempdir;

#[derive(Default)]
struct RecordingPublisher {
    calls: RefCell<Vec<(u32, String, String)>>,
}

impl OptionPublisher for RecordingPublisher {
    fn create_option(&self, attribute_id: u32, code: &str, name: &str) -> Result<PublishOutcome> {
        self.calls
            .borrow_mut()
            .push((attribute_id, code.to_string(), name.to_string()));
        match code {
            "99" => Ok(PublishOutcome::AlreadyExists),
            "00" => Err(ConvertError::RemoteStatus {
                url: "http://pim.invalid".to_string(),
                status: 500,
            }),
            _ => Ok(PublishOutcome::Created),
        }
    }
}

struct FixedSource(SpecificationDocument);

impl SpecificationSource for FixedSource {
    fn fetch(&self) -> Result<SpecificationDocument> {
        Ok(self.0.clone())
    }
}

fn option(code: &str, name: &str) -> CatalogueOption {
    CatalogueOption::from_row(&[code.to_string(), name.to_string()]).expect("option row")
}

fn tables(log: &mut RunLog) -> OptionTables {
    let mut tables = OptionTables::default();
    tables.insert(
        AttributeKey::CatalogueVariant,
        LookupTable::from_options(
            "Catalogus uitvoering",
            [("12", "12 - Eiken"), ("13", "13 - Noten")],
            log,
        ),
    );
    tables
}

#[test]
fn option_names_combine_code_and_name() {
    assert_eq!(option("12", "Eiken").name, "12 - Eiken");
    assert_eq!(option("12", "").name, "12 -");
    let nameless = option("", "Los");
    assert_eq!(nameless.code, "Los");
    assert_eq!(nameless.name, "Los - Los");
    assert_eq!(CatalogueOption::from_row(&["12".to_string()]), None);
}

#[test]
fn disabled_posting_reports_missing_and_mismatched_options() {
    let mut log = RunLog::new();
    let mut tables = tables(&mut log);
    let options = [option("012", "Eiken"), option("13", "Walnoot"), option("14", "Beuken")];

    let summary = reconcile(
        AttributeKey::CatalogueVariant,
        157,
        &options,
        &mut tables,
        None,
        &mut log,
    );

    assert_eq!(summary.existing, 2);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.posted, 0);
    let entries = log.entries(LogChannel::Options);
    assert!(entries.contains(
        &"Name mismatch for Catalogus uitvoering [13]: PIM has \"13 - Noten\", file has \"13 - Walnoot\""
            .to_string()
    ));
    assert!(entries.contains(
        &"Missing Catalogus uitvoering [14] -> \"14 - Beuken\" (posting disabled)".to_string()
    ));
    assert_eq!(
        entries.last().map(String::as_str),
        Some("Catalogus uitvoering: 0 posted, 2 existing, 1 missing, 0 failed")
    );
}

#[test]
fn publisher_creates_missing_options() {
    let mut log = RunLog::new();
    let mut tables = tables(&mut log);
    let publisher = RecordingPublisher::default();
    let options = [option("12", "Eiken"), option("20", "Teak"), option("99", "Bestaand"), option("00", "Fout")];

    let summary = reconcile(
        AttributeKey::CatalogueVariant,
        157,
        &options,
        &mut tables,
        Some(&publisher),
        &mut log,
    );

    assert_eq!(summary.posted, 1);
    assert_eq!(summary.existing, 2);
    assert_eq!(summary.failed, 1);
    let calls = publisher.calls.borrow();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], (157, "20".to_string(), "20 - Teak".to_string()));
    assert_eq!(
        tables.resolve(AttributeKey::CatalogueVariant, "20").value,
        "20 - Teak"
    );
    assert!(
        log.entries(LogChannel::Options)
            .iter()
            .any(|entry| entry.starts_with("FAILED create Catalogus uitvoering [00]"))
    );
}

#[test]
fn option_files_are_read_leniently() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("stc0000pw");
    fs::write(&path, "\"A\",\"Bank\"\n\"los\"\n\"B\",\"Stoel  \",\"extra\"\n").expect("option file");

    let options = read_catalogue_options(Some(&path), "stc")
        .expect("options read")
        .unwrap_or_default();
    assert_eq!(options, vec![option("A", "Bank"), option("B", "Stoel")]);
    assert!(
        read_catalogue_options(None, "stc")
            .expect("no path")
            .is_missing()
    );
}

#[test]
fn specification_cache_loads_refreshes_and_invalidates() {
    let dir = tempdir().expect("temporary directory");
    let cache = SpecificationCache::new(dir.path().join("cache").join("specifications.json"));
    let document = SpecificationDocument::from_json(
        r#"{"Items": [{"Id": 157, "Code": "Catalogus uitvoering", "Options": [{"Code": "12", "Name": "12 - Eiken"}]}]}"#,
    )
    .expect("document parsed");
    let source = FixedSource(document.clone());

    assert!(cache.load().expect("cache read").is_missing());
    assert_eq!(cache.load_or_refresh(&source).expect("refreshed"), document);
    assert!(cache.path().exists());
    assert_eq!(
        cache.load().expect("cache read").unwrap_or_default(),
        document
    );

    cache.invalidate().expect("cache invalidated");
    assert!(!cache.path().exists());
    cache.invalidate().expect("invalidating twice is fine");
}

#[test]
fn malformed_cache_is_an_error() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("specifications.json");
    fs::write(&path, "{ not json").expect("cache written");
    assert!(matches!(
        SpecificationCache::new(&path).load(),
        Err(ConvertError::Json(_))
    ));
}
