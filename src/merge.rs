//! Reconstruction of multi-line attribute values.
//!
//! The attribute export stores long texts as a sequence of physical line
//! fragments. Two or more trailing blanks on a fragment mark a hard line
//! break; a very short follow-up fragment is the tail of a word that was cut
//! at the fragment boundary. [`merge_segments`] turns such a sequence back
//! into one value with explicit [`LINE_BREAK`] markers.

/// Marker inserted where the source text had an intentional line break.
pub const LINE_BREAK: &str = "<br>";

/// Trailing blank run at which a fragment ends with a hard line break.
pub const HARD_BREAK_MIN_BLANKS: usize = 2;

/// Longest trimmed follow-up fragment that is glued onto the previous one.
pub const CONTINUATION_MAX_CHARS: usize = 2;

const BLANKS: [char; 3] = [' ', '\t', '\u{A0}'];

/// Known mis-decoded sequences and their replacement. Longer sequences come
/// first so that their prefixes are not consumed by shorter entries.
const MOJIBAKE_REPAIRS: &[(&str, &str)] = &[
    ("Ã¯Â¿Â½", ""),
    ("ï¿½", ""),
    ("\u{FFFD}", ""),
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã\u{AD}", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã±", "ñ"),
    ("Ã¼", "ü"),
    ("Ã¶", "ö"),
    ("Ã¤", "ä"),
    ("â€™", "\u{2019}"),
    ("â€“", "\u{2013}"),
    ("â€œ", "\u{201C}"),
    ("â€\u{9D}", "\u{201D}"),
    ("â€˜", "\u{2018}"),
    ("â€¢", "\u{2022}"),
    ("â€¦", "\u{2026}"),
];

/// Tag spellings broken by whitespace normalisation.
const TAG_REPAIRS: &[(&str, &str)] = &[("< br>", "<br>"), ("</u l>", "</ul>")];

/// Length of the run of blanks (space, tab, no-break space) ending `text`.
pub fn trailing_blanks(text: &str) -> usize {
    text.chars().rev().take_while(|ch| BLANKS.contains(ch)).count()
}

/// Merges the ordered fragments of one field into a single value.
///
/// A fragment whose trailing blank run is at least
/// [`HARD_BREAK_MIN_BLANKS`] long is trimmed and followed by [`LINE_BREAK`].
/// Otherwise, when the next fragment trims down to at most
/// [`CONTINUATION_MAX_CHARS`] characters, it is appended to the trimmed
/// current fragment without a separator (followed by a marker when the
/// appended fragment itself ends in a hard break). Any other fragment is
/// emitted as is. A single fragment never gains a marker and loses its
/// trailing whitespace.
///
/// An empty slice yields an empty string.
pub fn merge_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let merged = match segments {
        [] => return String::new(),
        [single] => strip_terminators(single.as_ref()).to_string(),
        _ => join_fragments(segments),
    };

    let cleaned = normalize_text(&merged);
    if segments.len() == 1 {
        cleaned.trim_end().to_string()
    } else {
        cleaned
    }
}

fn join_fragments<S: AsRef<str>>(segments: &[S]) -> String {
    let mut merged = String::new();
    let mut index = 0;

    while index < segments.len() {
        let current = strip_terminators(segments[index].as_ref());

        if trailing_blanks(current) >= HARD_BREAK_MIN_BLANKS {
            merged.push_str(current.trim_end_matches(BLANKS));
            merged.push_str(LINE_BREAK);
            index += 1;
            continue;
        }

        if let Some(next) = segments.get(index + 1) {
            let next = strip_terminators(next.as_ref());
            let next_clean = next.trim();
            if next_clean.chars().count() <= CONTINUATION_MAX_CHARS {
                merged.push_str(current.trim_end_matches(BLANKS));
                merged.push_str(next_clean);
                if trailing_blanks(next) >= HARD_BREAK_MIN_BLANKS {
                    merged.push_str(LINE_BREAK);
                }
                index += 2;
                continue;
            }
        }

        merged.push_str(current);
        index += 1;
    }

    merged
}

fn strip_terminators(fragment: &str) -> &str {
    fragment.trim_end_matches(['\r', '\n'])
}

/// Post-processing shared by every merged value: whitespace between word
/// characters collapses to one space, broken tags are re-joined, no-break
/// spaces become plain spaces and known mis-decodings are repaired.
pub fn normalize_text(text: &str) -> String {
    let mut cleaned = collapse_inner_whitespace(text);
    for (broken, fixed) in TAG_REPAIRS {
        cleaned = cleaned.replace(broken, fixed);
    }
    cleaned = cleaned.replace('\u{A0}', " ");
    repair_mojibake(&cleaned)
}

/// Replaces the fixed table of mis-decoded multi-byte sequences.
pub fn repair_mojibake(text: &str) -> String {
    let mut repaired = text.to_string();
    for (broken, fixed) in MOJIBAKE_REPAIRS {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }
    repaired
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Collapses every whitespace run that sits between two word characters to
/// a single space. Runs touching punctuation, markup or the text edges are
/// kept verbatim.
pub fn collapse_inner_whitespace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        if !ch.is_whitespace() {
            out.push(ch);
            index += 1;
            continue;
        }

        let start = index;
        while index < chars.len() && chars[index].is_whitespace() {
            index += 1;
        }

        let between_words = start > 0
            && is_word_char(chars[start - 1])
            && index < chars.len()
            && is_word_char(chars[index]);
        if between_words {
            out.push(' ');
        } else {
            out.extend(&chars[start..index]);
        }
    }

    out
}
