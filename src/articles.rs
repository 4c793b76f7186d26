use std::collections::HashMap;
use std::path::Path;

use tracing::{info, instrument};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::model::ArticleRecord;
use crate::schema::{self, format_number, format_range};

/// Reads the primary article file. The delivery-week range of every record
/// is filled in from all records sharing its parent number.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_articles(path: &Path) -> Result<Loaded<Vec<ArticleRecord>>> {
    let rows = match flatfile::read_records(path)? {
        Loaded::Data(rows) => rows,
        Loaded::Missing(path) => return Ok(Loaded::Missing(path)),
    };

    let mut records: Vec<ArticleRecord> = rows.into_iter().map(ArticleRecord::from_raw).collect();
    fill_delivery_ranges(&mut records);
    info!(records = records.len(), "read article records");
    Ok(Loaded::Data(records))
}

/// Sets the delivery-range column of every record to the range of the
/// delivery times within its parent-number group.
pub fn fill_delivery_ranges(records: &mut [ArticleRecord]) {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for record in records.iter() {
        let delivery = record.delivery_time();
        if delivery.is_empty() {
            continue;
        }
        let values = groups.entry(record.parent_number().to_string()).or_default();
        if !values.iter().any(|value| value == delivery) {
            values.push(delivery.to_string());
        }
    }

    let ranges: HashMap<String, String> = groups
        .into_iter()
        .map(|(parent, values)| (parent, delivery_range(&values)))
        .collect();

    for record in records.iter_mut() {
        let range = ranges
            .get(record.parent_number())
            .cloned()
            .unwrap_or_default();
        record.set(schema::DELIVERY_RANGE, range);
    }
}

/// Range display for a set of distinct delivery times. When every value is
/// numeric the numeric minimum and maximum are used; otherwise the values
/// are ordered as text.
pub fn delivery_range(values: &[String]) -> String {
    let parsed: Option<Vec<f64>> = values
        .iter()
        .map(|value| value.trim().parse::<f64>().ok())
        .collect();
    if let Some(numbers) = parsed {
        return format_range(&numbers);
    }

    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    match sorted.as_slice() {
        [] => String::new(),
        [single] => format_text_number(single),
        [min, .., max] => format!("{} / {}", format_text_number(min), format_text_number(max)),
    }
}

fn format_text_number(value: &str) -> String {
    value
        .trim()
        .parse::<f64>()
        .map(format_number)
        .unwrap_or_else(|_| value.to_string())
}

/// Keeps only the record with the given article number.
pub fn retain_article(records: &mut Vec<ArticleRecord>, article_number: &str) {
    let wanted = article_number.trim();
    records.retain(|record| record.article_number() == wanted);
}
