use catalog_convert::lookup::{AttributeKey, LookupTable, OptionTables};
use catalog_convert::runlog::{LogChannel, RunLog};
use catalog_convert::specs::SpecificationDocument;

fn table(options: &[(&str, &str)], log: &mut RunLog) -> LookupTable {
    LookupTable::from_options("Code uitvoering", options.iter().copied(), log)
}

#[test]
fn codes_resolve_regardless_of_padding_and_case() {
    let mut log = RunLog::new();
    let table = table(&[("07", "Eiken naturel"), ("AB", "Antraciet")], &mut log);

    for code in ["7", "07", "007", " 7 ", "7 "] {
        let resolution = table.resolve(code);
        assert!(resolution.matched, "code {code:?} should resolve");
        assert_eq!(resolution.value, "Eiken naturel");
    }
    assert_eq!(table.resolve("ab").value, "Antraciet");
}

#[test]
fn unknown_code_falls_back_to_raw_value() {
    let mut log = RunLog::new();
    let table = table(&[("1", "Wit")], &mut log);

    let resolution = table.resolve("X9");
    assert!(!resolution.matched);
    assert_eq!(resolution.value, "X9");
    assert_eq!(table.resolve("").value, "");
    assert!(!table.resolve("").matched);
}

#[test]
fn padded_resolution_treats_single_digits_as_two_digit_codes() {
    let mut log = RunLog::new();
    let table = table(&[("05", "Zwart")], &mut log);

    assert_eq!(table.resolve_padded("5"), table.resolve_padded("05"));
    let (padded, resolution) = table.resolve_padded("5");
    assert_eq!(padded, "05");
    assert_eq!(resolution.value, "Zwart");

    let (padded, resolution) = table.resolve_padded("8");
    assert_eq!(padded, "08");
    assert!(!resolution.matched);
    assert_eq!(resolution.value, "08");
}

#[test]
fn duplicate_codes_are_logged_once_and_latest_name_wins() {
    let mut log = RunLog::new();
    let options = [("3", "Rood"), ("3", "Bordeaux"), ("3", "Bordeaux"), ("4", "Blauw")];
    let table = table(&options, &mut log);

    assert_eq!(table.resolve("3").value, "Bordeaux");
    assert_eq!(
        log.entries(LogChannel::General),
        ["Duplicate Code uitvoering code 3: 'Rood' vs 'Bordeaux'"]
    );

    LookupTable::from_options("Code uitvoering", options.iter().copied(), &mut log);
    assert_eq!(log.entries(LogChannel::General).len(), 1);
}

#[test]
fn conflicting_names_for_one_code_are_logged_once() {
    let mut log = RunLog::new();
    let table = table(&[("3", "Rood"), ("3", "Bordeaux"), ("3", "Wijnrood")], &mut log);

    assert_eq!(table.resolve("3").value, "Wijnrood");
    assert_eq!(
        log.entries(LogChannel::General),
        ["Duplicate Code uitvoering code 3: 'Rood' vs 'Bordeaux'"]
    );

    LookupTable::from_options("Eenh_verkoop", [("3", "Stuk"), ("3", "Set")], &mut log);
    assert_eq!(log.entries(LogChannel::General).len(), 2);
}

#[test]
fn resolution_is_idempotent() {
    let mut log = RunLog::new();
    let table = table(&[("12", "Eiken")], &mut log);

    let first = table.resolve("012");
    let second = table.resolve("012");
    assert_eq!(first, second);
    assert!(log.entries(LogChannel::General).is_empty());
}

#[test]
fn option_tables_follow_the_specification_document() {
    let document = SpecificationDocument::from_json(
        r#"{
            "Items": [
                {"Id": 1, "Code": "code concept", "Options": [{"Code": "110", "Name": "House of Dutchz"}]},
                {"Id": 2, "Code": "gp_soort_afronding", "Options": [{"Code": "2", "Name": "Op hele euro"}]},
                {"Id": 3, "Code": "Onbekend attribuut", "Options": [{"Code": "1", "Name": "Niets"}]}
            ]
        }"#,
    )
    .expect("document parsed");

    let mut log = RunLog::new();
    let mut tables = OptionTables::from_document(&document, &mut log);

    assert_eq!(tables.resolve(AttributeKey::ConceptCode, "110").value, "House of Dutchz");
    assert_eq!(tables.resolve(AttributeKey::RoundingKind, "02").value, "Op hele euro");
    assert_eq!(
        tables.resolve(AttributeKey::ParentRoundingKind, "2").value,
        "Op hele euro"
    );
    assert!(tables.get(AttributeKey::MaterialCode).is_none());
    assert_eq!(tables.lookup_or_raw(AttributeKey::MaterialCode, "M1"), "M1");

    tables.add_option(AttributeKey::MaterialCode, "M1", "Massief");
    assert_eq!(tables.lookup_or_raw(AttributeKey::MaterialCode, "m1"), "Massief");
}

#[test]
fn attribute_keys_match_codes_case_insensitively() {
    assert_eq!(
        AttributeKey::from_code(" CODE UITVOERING "),
        Some(AttributeKey::VariantCode)
    );
    assert_eq!(AttributeKey::from_code("kleur"), None);
    for key in AttributeKey::ALL {
        assert_eq!(AttributeKey::from_code(key.code()), Some(key));
    }
}
