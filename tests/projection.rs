use catalog_convert::attributes::{AttributeTable, select_fields};
use catalog_convert::lookup::{AttributeKey, LookupTable, OptionTables};
use catalog_convert::model::{ArticleRecord, SheetTable};
use catalog_convert::projection::{ArticleLayout, Projector, specification_groups};
use catalog_convert::runlog::{LogChannel, RunLog};
use catalog_convert::schema;

const ATTRIBUTES: &str = r#""1001","01","UITVOERINGEN","","","","","Stof grijs|Webshop grijs"
"1001","01","AFMETINGEN","","","","","200 x 90|200 x 90 x 85 cm"
"1001","01","OMSCHRIJVING","","","","","Bank met<b>""#;

fn record(article: &str, description: &str) -> ArticleRecord {
    let mut record = ArticleRecord::from_fields(Vec::new());
    record.set(schema::ARTICLE_NUMBER, article);
    record.set(schema::DESCRIPTION, description);
    record.set(schema::PARENT_NUMBER, "P1");
    record.set(schema::PARENT_DESCRIPTION, "Bank Oslo");
    record
}

fn options(log: &mut RunLog) -> OptionTables {
    let mut tables = OptionTables::default();
    tables.insert(
        AttributeKey::VariantCode,
        LookupTable::from_options("Code uitvoering", [("05", "Eiken")], log),
    );
    tables.insert(
        AttributeKey::SalesUnit,
        LookupTable::from_options("Eenh_verkoop", [("ST", "Stuk")], log),
    );
    tables
}

fn build(records: &[ArticleRecord], attributes: &AttributeTable, log: &mut RunLog) -> SheetTable {
    let options = options(log);
    let layout = ArticleLayout::new(select_fields(attributes, log));
    let projector = Projector {
        layout: &layout,
        attributes,
        options: &options,
        line: "pw",
    };
    projector.build_table(records, log)
}

#[test]
fn headers_interleave_derived_columns() {
    let mut log = RunLog::new();
    let layout = ArticleLayout::new(select_fields(&AttributeTable::default(), &mut log));
    let headers = layout.headers();

    assert_eq!(
        &headers[..5],
        ["Artikelnummer", "Artikelomschrijving", "Barcode", "Eenh_aankoop", "Eenh_aankoop_CONV"]
    );
    let delivery = headers
        .iter()
        .position(|header| header == "Levertijd")
        .expect("delivery column");
    assert_eq!(headers[delivery + 1], "leverweek_CONV");
    assert_eq!(
        &headers[headers.len() - 3..],
        ["prijskaart_omschrijving", "SpecificatieGroepen", "GrandParentExternalKey"]
    );
    assert!(headers.iter().any(|header| header == "ATK_Pk_baenks_CONV"));
}

#[test]
fn rows_match_the_header_layout() {
    let mut log = RunLog::new();
    let attributes = AttributeTable::build(ATTRIBUTES.lines());
    let table = build(&[record("1001", "Bank")], &attributes, &mut log);

    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].len(), table.columns.len());
}

#[test]
fn variant_code_is_padded_and_feeds_the_child_key() {
    let mut log = RunLog::new();
    let mut article = record("1001", "Bank");
    article.set(schema::VARIANT_CODE, "5");
    let table = build(&[article], &AttributeTable::default(), &mut log);

    assert_eq!(table.cell(0, "Code uitvoering"), Some("05"));
    assert_eq!(table.cell(0, "Code uitvoering_CONV"), Some("Eiken"));
    assert_eq!(table.cell(0, "ParentSKU"), Some("P1 - Eiken"));
    assert_eq!(table.cell(0, "GrandParentExternalKey"), Some("P1 - Bank Oslo"));
    assert!(log.entries(LogChannel::Options).is_empty());
}

#[test]
fn unmatched_padded_code_is_logged_on_the_options_channel() {
    let mut log = RunLog::new();
    let mut first = record("1001", "Bank");
    first.set(schema::VARIANT_CODE, "9");
    let mut second = record("1002", "Fauteuil");
    second.set(schema::VARIANT_CODE, "9");
    let table = build(&[first, second], &AttributeTable::default(), &mut log);

    assert_eq!(table.cell(0, "Code uitvoering_CONV"), Some("09"));
    assert_eq!(table.cell(1, "ParentSKU"), Some("P1 - 09"));
    assert_eq!(
        log.entries(LogChannel::Options),
        ["Missing mapping for Code uitvoering: '9' (padded: '09')"]
    );
}

#[test]
fn lookup_columns_resolve_or_fall_back() {
    let mut log = RunLog::new();
    let mut article = record("1001", "Bank");
    article.set(3, "DS");
    article.set(4, "st");
    let table = build(&[article], &AttributeTable::default(), &mut log);

    assert_eq!(table.cell(0, "Eenh_verkoop"), Some("st"));
    assert_eq!(table.cell(0, "Eenh_verkoop_CONV"), Some("Stuk"));
    assert_eq!(table.cell(0, "Eenh_aankoop_CONV"), Some("DS"));
    assert!(
        log.entries(LogChannel::General)
            .iter()
            .any(|entry| entry == "No Eenh_aankoop option for code 'DS'")
    );
}

#[test]
fn number_columns_follow_their_separator_convention() {
    let mut log = RunLog::new();
    let mut article = record("1001", "Bank");
    article.set(5, "000");
    article.set(19, "0012");
    article.set(11, "1299,5");
    article.set(37, "1499.95");
    let table = build(&[article], &AttributeTable::default(), &mut log);

    assert_eq!(table.cell(0, "Bestelhoeveelheid"), Some("0"));
    assert_eq!(table.cell(0, "Minimum voorraad"), Some("12"));
    assert_eq!(table.cell(0, "Standaardprijs verkoopprijs"), Some("1299.5"));
    assert_eq!(table.cell(0, "Adviesprijs"), Some("1499,95"));
}

#[test]
fn control_characters_are_removed_outside_attribute_columns() {
    let mut log = RunLog::new();
    let attributes = AttributeTable::build(
        attributes_line("1001", "CT", "Zacht\u{1}kussen").iter().map(String::as_str),
    );
    let table = build(&[record("1001", "Bank\u{7}Oslo")], &attributes, &mut log);

    assert_eq!(table.cell(0, "Artikelomschrijving"), Some("BankOslo"));
    assert_eq!(table.cell(0, "ATK_Ct_CONV"), Some("Zacht\u{1}kussen"));
}

fn attributes_line(id: &str, field: &str, text: &str) -> Vec<String> {
    vec![format!(r#""{id}","01","{field}","","","","","{text}""#)]
}

#[test]
fn price_card_description_combines_variant_and_dimensions() {
    let mut log = RunLog::new();
    let attributes = AttributeTable::build(ATTRIBUTES.lines());
    let table = build(&[record("1001", "Bank")], &attributes, &mut log);

    assert_eq!(table.cell(0, "ATK_Uitvoeringen_CONV"), Some("Stof grijs"));
    assert_eq!(table.cell(0, "ATK_Uitvoeringen Webshop_CONV"), Some("Webshop grijs"));
    assert_eq!(table.cell(0, "ATK_Prijskaart Afmetingen_CONV"), Some("200 x 90"));
    assert_eq!(table.cell(0, "prijskaart_omschrijving"), Some("Stof grijs 200 x 90"));
    assert_eq!(table.cell(0, "ATK_Omschrijving_CONV"), Some("Bank met<b>"));
}

#[test]
fn records_without_description_are_skipped_and_logged() {
    let mut log = RunLog::new();
    let records = [record("1001", "Bank"), record("1002", ""), record("", "Zonder nummer")];
    let table = build(&records, &AttributeTable::default(), &mut log);

    assert_eq!(table.rows.len(), 1);
    let skips: Vec<&String> = log
        .entries(LogChannel::General)
        .iter()
        .filter(|entry| entry.starts_with("[SKIP]"))
        .collect();
    assert_eq!(skips.len(), 2);
    assert_eq!(
        log.entries(LogChannel::General)
            .iter()
            .filter(|entry| entry.contains("1002"))
            .count(),
        1
    );
}

#[test]
fn specification_groups_depend_on_the_product_line() {
    let base = "algemeen_child|logistiek_child|prijzen_child|marketing_child|teksten_child|prijskaarten_child";
    assert_eq!(specification_groups("in"), base);
    assert_eq!(
        specification_groups("pw"),
        format!("{base}|labels_pronto_wonen_child")
    );
    assert_eq!(
        specification_groups("PM"),
        format!("{base}|labels_profijt_meubel_child")
    );
    assert_eq!(specification_groups("bs"), format!("{base}|teksten_child_baenks"));
}
