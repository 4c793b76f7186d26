use catalog_convert::memo::{decode_entities, memo_cell, memo_document_text};
use catalog_convert::merge::{LINE_BREAK, merge_segments, repair_mojibake};

#[test]
fn single_fragment_is_trimmed_without_marker() {
    for fragment in ["Stevige bank   ", "Stevige bank\t", "Stevige bank\r\n", "Stevige bank"] {
        let merged = merge_segments(&[fragment]);
        assert_eq!(merged, "Stevige bank");
        assert!(!merged.contains(LINE_BREAK));
    }
}

#[test]
fn empty_input_yields_empty_value() {
    let fragments: [&str; 0] = [];
    assert_eq!(merge_segments(&fragments), "");
}

#[test]
fn two_trailing_blanks_mark_a_line_break() {
    let merged = merge_segments(&["Eerste regel  ", "Tweede regel"]);
    assert_eq!(merged, "Eerste regel<br>Tweede regel");
}

#[test]
fn one_trailing_blank_is_not_a_line_break() {
    let merged = merge_segments(&["Eerste regel ", "Tweede regel"]);
    assert_eq!(merged, "Eerste regel Tweede regel");
}

#[test]
fn short_follow_up_completes_the_cut_word() {
    assert_eq!(merge_segments(&["gewoo ", "n"]), "gewoon");
    assert_eq!(merge_segments(&["gewo ", "on"]), "gewoon");
}

#[test]
fn three_character_follow_up_is_a_separate_fragment() {
    assert_eq!(merge_segments(&["gewoo ", "nen"]), "gewoo nen");
}

#[test]
fn continuation_keeps_a_break_on_the_glued_fragment() {
    let merged = merge_segments(&["zitcomfo", "rt  ", "Poten van eiken"]);
    assert_eq!(merged, "zitcomfort<br>Poten van eiken");
}

#[test]
fn inner_whitespace_collapses_between_words_only() {
    let merged = merge_segments(&["Breed   model  ", "<ul>  <li>Eiken</li> </u l>"]);
    assert_eq!(merged, "Breed model<br><ul>  <li>Eiken</li> </ul>");
}

#[test]
fn known_mojibake_is_repaired() {
    assert_eq!(repair_mojibake("CafÃ© â€“ ligbed"), "Café \u{2013} ligbed");
    assert_eq!(repair_mojibake("prijs ï¿½ 10"), "prijs  10");
    assert_eq!(merge_segments(&["SeÃ±or  ", "tafel"]), "Señor<br>tafel");
}

#[test]
fn entities_are_decoded_leniently() {
    assert_eq!(decode_entities("a &amp; b &eacute; &#233; &#xE9;"), "a & b é é é");
    assert_eq!(decode_entities("R&D &unknown; &"), "R&D &unknown; &");
}

#[test]
fn memo_cell_joins_lines_and_decodes() {
    let lines = vec!["Hoes van&nbsp;stof".to_string(), "Kleur:\u{A0}grijs".to_string()];
    assert_eq!(memo_cell(&lines), "Hoes van\u{A0}stof\nKleur: grijs");
}

#[test]
fn memo_document_text_wraps_lines() {
    let lines = vec!["Regel 1".to_string(), "CafÃ©".to_string()];
    assert_eq!(memo_document_text(&lines), "<PRE>Regel 1\nCafé\n</PRE>");
    assert_eq!(memo_document_text(&[]), "");
}
