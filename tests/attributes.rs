use std::fs;

use catalog_convert::attributes::{
    self, AttributeTable, RawFragment, column_headers, column_values, select_fields,
};
use catalog_convert::runlog::{LogChannel, RunLog};
use tempfile::tempdir;

const EXPORT: &str = r#""1001","01","OMSCHRIJVING","","","","","Mooie bank  "
"1001","02","OMSCHRIJVING","","","","","met armleuning"
"1001","01","AFMETINGEN","","","","","200 x 90|200 x 90 x 85 cm"
"1001","01","UITVOERINGEN","","","","","Stof grijs|Webshop grijs"
"1002","01","KLEUR_OUD","","","","","rood"
"1003","01","CT","","","","","a","b"
"1004","01","ct","","","","","(zie foto)2 zits"
"kort","regel"
"#;

fn table() -> AttributeTable {
    AttributeTable::build(EXPORT.lines())
}

#[test]
fn short_lines_are_discarded() {
    assert_eq!(RawFragment::parse(r#""kort","regel""#), None);
    let fragment = RawFragment::parse(r#""1001","01","omschrijving","","","","","tekst  ""#)
        .expect("fragment parsed");
    assert_eq!(fragment.record_id, "1001");
    assert_eq!(fragment.field, "OMSCHRIJVING");
    assert_eq!(fragment.text, "tekst  ");
    assert_eq!(fragment.trailing_whitespace(), 2);
}

#[test]
fn fragments_merge_per_record_and_field() {
    let table = table();
    assert_eq!(table.record_count(), 4);
    assert_eq!(table.get("1001", "OMSCHRIJVING"), Some("Mooie bank<br>met armleuning"));
    assert_eq!(table.get("1001", "CT"), None);
    assert_eq!(table.get("9999", "OMSCHRIJVING"), None);
}

#[test]
fn embedded_delimiters_stay_in_the_value() {
    assert_eq!(table().get("1003", "CT"), Some(r#"a","b"#));
}

#[test]
fn digit_after_parenthesis_gets_a_space() {
    assert_eq!(table().get("1004", "CT"), Some("(zie foto) 2 zits"));
}

#[test]
fn field_selection_orders_preferred_fields_first() {
    let mut log = RunLog::new();
    let selected = select_fields(&table(), &mut log);

    assert_eq!(selected.len(), attributes::ALLOWED_FIELDS.len());
    assert_eq!(
        &selected[..5],
        ["OMSCHRIJVING", "CT", "UITVOERINGEN", "AFMETINGEN", "CT2"]
    );
    assert!(!selected.iter().any(|field| field == "KLEUR_OUD"));
    assert_eq!(
        log.entries(LogChannel::Attributes),
        ["Unexpected attribute fields:", "KLEUR_OUD: 1002"]
    );
}

#[test]
fn expected_fields_only_are_reported_as_such() {
    let mut log = RunLog::new();
    let table = AttributeTable::build([r#""1","01","CT","","","","","x""#]);
    select_fields(&table, &mut log);
    assert_eq!(
        log.entries(LogChannel::Attributes),
        ["All attribute fields are expected"]
    );
}

#[test]
fn dimension_and_variant_columns_split_on_pipe() {
    assert_eq!(
        column_headers("AFMETINGEN"),
        ["ATK_Afmetingen_CONV", "ATK_Prijskaart Afmetingen_CONV"]
    );
    assert_eq!(
        column_headers("UITVOERINGEN"),
        ["ATK_Uitvoeringen_CONV", "ATK_Uitvoeringen Webshop_CONV"]
    );
    assert_eq!(column_headers("CT_ARMEN"), ["ATK_Ct_armen_CONV"]);

    assert_eq!(
        column_values("AFMETINGEN", "200 x 90|200 x 90 x 85 cm"),
        ["200 x 90|200 x 90 x 85 cm", "200 x 90"]
    );
    assert_eq!(column_values("AFMETINGEN", "200 x 90"), ["200 x 90", "200 x 90"]);
    assert_eq!(
        column_values("UITVOERINGEN", "Stof grijs|Webshop grijs"),
        ["Stof grijs", "Webshop grijs"]
    );
    assert_eq!(column_values("UITVOERINGEN", "Stof grijs"), ["Stof grijs", ""]);
    assert_eq!(column_values("CT", "regel\r\nnog een"), ["regel nog een"]);
}

#[test]
fn attribute_file_is_read_from_disk() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("atk0000pw");
    fs::write(&path, EXPORT).expect("export written");

    let table = attributes::read_attributes(Some(&path))
        .expect("attributes read")
        .unwrap_or_default();
    assert_eq!(table.get("1001", "UITVOERINGEN"), Some("Stof grijs|Webshop grijs"));

    let missing = attributes::read_attributes(Some(&dir.path().join("atk0000bs")))
        .expect("missing file tolerated");
    assert!(missing.is_missing());
    assert!(attributes::read_attributes(None).expect("no path").is_missing());
}
