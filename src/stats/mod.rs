//! Aggregation over raw query-service rows.
//!
//! The upstream query service returns flat tabular result sets whose schema
//! varies by deployment (`imgdate` vs `img_timestamp`, etc). The functions
//! here turn one result set into the derived views the dashboard renders:
//! daily upload series, per-user rankings, file-size histogram, and an
//! overall summary. All of them are pure and never fail: malformed rows
//! degrade to defaults instead of aborting the batch.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::resolve::DailyStat;

/// One row of analytical data: an open mapping from field name to JSON value.
pub type RawRecord = serde_json::Map<String, Value>;

/// Per-user contribution ranking entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserContribution {
    pub username: String,
    pub uploads: u64,
    /// Share of all rows, in percent. 0 when the record set is empty.
    pub percentage: f64,
}

/// One histogram bucket over file sizes in bytes.
///
/// `min` is inclusive, `max` exclusive; the last bucket is unbounded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SizeBucket {
    pub label: &'static str,
    pub min: u64,
    pub max: Option<u64>,
    pub count: u64,
}

/// Summary statistics over a whole result set.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_uploads: u64,
    pub total_size: u64,
    pub average_size: f64,
    pub unique_users: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Fixed size-histogram buckets, ordered, disjoint, covering `[0, inf)`.
const SIZE_BUCKETS: [(&str, u64, Option<u64>); 6] = [
    ("< 500 KB", 0, Some(500 * KB)),
    ("500 KB - 1 MB", 500 * KB, Some(MB)),
    ("1 MB - 2 MB", MB, Some(2 * MB)),
    ("2 MB - 5 MB", 2 * MB, Some(5 * MB)),
    ("5 MB - 10 MB", 5 * MB, Some(10 * MB)),
    ("> 10 MB", 10 * MB, None),
];

/// Zip a query-service payload (`{"headers": [...], "rows": [[...], ...]}`)
/// into a list of raw records. Payloads missing either part yield an empty
/// list rather than an error.
pub fn parse_result_set(payload: &Value) -> Vec<RawRecord> {
    // Cells pair with headers strictly by position; a non-string header gets
    // a placeholder name so later columns stay aligned.
    let headers: Vec<String> = match payload.get("headers").and_then(Value::as_array) {
        Some(headers) => headers
            .iter()
            .enumerate()
            .map(|(index, header)| match header.as_str() {
                Some(name) => name.to_string(),
                None => format!("column_{index}"),
            })
            .collect(),
        None => return Vec::new(),
    };
    let rows = match payload.get("rows").and_then(Value::as_array) {
        Some(rows) => rows,
        None => return Vec::new(),
    };

    rows.iter()
        .filter_map(Value::as_array)
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), cell.clone()))
                .collect()
        })
        .collect()
}

/// Group records by upload date, ascending. Records without a usable date
/// field are excluded from the series.
pub fn daily_uploads(records: &[RawRecord]) -> Vec<DailyStat> {
    let mut daily: std::collections::BTreeMap<String, u64> = std::collections::BTreeMap::new();

    for record in records {
        if let Some(date) = record_date(record) {
            *daily.entry(date).or_insert(0) += 1;
        }
    }

    daily
        .into_iter()
        .map(|(date, count)| DailyStat { date, count })
        .collect()
}

/// Rank users by upload count, descending. Rows without a username land in
/// an `"Unknown"` bucket; ties keep first-encountered order.
pub fn user_contributions(records: &[RawRecord]) -> Vec<UserContribution> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for record in records {
        let username = match field_string(record, "actor_name") {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown".to_string(),
        };
        match order.get(&username) {
            Some(&index) => counts[index].1 += 1,
            None => {
                order.insert(username.clone(), counts.len());
                counts.push((username, 1));
            }
        }
    }

    let total = records.len() as u64;
    let mut contributions: Vec<UserContribution> = counts
        .into_iter()
        .map(|(username, uploads)| UserContribution {
            username,
            uploads,
            percentage: if total > 0 {
                uploads as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    // Stable sort preserves encounter order among equal counts.
    contributions.sort_by(|a, b| b.uploads.cmp(&a.uploads));
    contributions
}

/// Histogram of parsed `img_size` values over the fixed buckets. Unparsable
/// or missing sizes count as 0 bytes. Only nonzero buckets are returned, in
/// fixed bucket order.
pub fn file_size_distribution(records: &[RawRecord]) -> Vec<SizeBucket> {
    let mut counts = [0u64; SIZE_BUCKETS.len()];

    for record in records {
        let size = field_u64(record, "img_size");
        for (index, (_, min, max)) in SIZE_BUCKETS.iter().enumerate() {
            if size >= *min && max.map_or(true, |max| size < max) {
                counts[index] += 1;
                break;
            }
        }
    }

    SIZE_BUCKETS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|((label, min, max), count)| SizeBucket {
            label,
            min: *min,
            max: *max,
            count,
        })
        .collect()
}

/// Summary over the whole result set. Size totals and the average only
/// consider rows with a strictly positive parsed size; every row still
/// counts toward `total_uploads`.
pub fn overall_stats(records: &[RawRecord]) -> OverallStats {
    let sizes: Vec<u64> = records
        .iter()
        .map(|record| field_u64(record, "img_size"))
        .filter(|&size| size > 0)
        .collect();
    let total_size: u64 = sizes.iter().sum();
    let average_size = if sizes.is_empty() {
        0.0
    } else {
        total_size as f64 / sizes.len() as f64
    };

    let unique_users: HashSet<String> = records
        .iter()
        .filter_map(|record| field_string(record, "actor_name"))
        .filter(|name| !name.is_empty())
        .collect();

    let mut dates: Vec<String> = records.iter().filter_map(record_date).collect();
    dates.sort();

    OverallStats {
        total_uploads: records.len() as u64,
        total_size,
        average_size,
        unique_users: unique_users.len(),
        date_range: DateRange {
            start: dates.first().cloned(),
            end: dates.last().cloned(),
        },
    }
}

/// Human-readable byte formatting, two decimal places, trailing zeros
/// dropped (`1536` becomes `"1.5 KB"`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = ((bytes as f64).ln() / (KB as f64).ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / (KB as f64).powi(exponent as i32);
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exponent])
}

/// Upload date of a record as ISO `YYYY-MM-DD`: the explicit `imgdate` field,
/// or the first 8 characters of `img_timestamp`, validated as a real
/// calendar date.
fn record_date(record: &RawRecord) -> Option<String> {
    let compact = field_string(record, "imgdate").or_else(|| {
        field_string(record, "img_timestamp").map(|ts| ts.chars().take(8).collect())
    })?;
    let date = NaiveDate::parse_from_str(&compact, "%Y%m%d").ok()?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn field_string(record: &RawRecord, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_u64(record: &RawRecord, key: &str) -> u64 {
    match record.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
