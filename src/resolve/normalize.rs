//! Normalization of tier-specific payload shapes into [`CountryStatRecord`].
//!
//! The three upstream tiers name the same quantities differently (`uploads`
//! vs `images`, `country_stats` vs `countries` vs `country_rows`, `name` vs
//! `country`). Each adapter here maps one tier's raw JSON into the canonical
//! record, trying that tier's known aliases in order and defaulting absent
//! counts to 0 so the output shape is always complete.

use serde_json::{Map, Value};

use super::error::{ResolveError, ResolveResult};
use super::models::{Coordinate, CountryStatRecord, DailyStat};

/// Fold a country name into its comparison key: lowercased, trimmed, with
/// whitespace and underscore runs collapsed to single underscores. Under
/// this key `"South Africa"`, `"south_africa"` and `"SOUTH  AFRICA"` are
/// all equivalent.
pub fn country_key(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Synthesize the Commons category name for a resolved record. Derived from
/// the normalized fields, never read from upstream, so it is reproducible
/// byte-for-byte.
pub fn category_name(campaign: &str, year: i32, country: &str) -> String {
    format!(
        "Images_from_{}_{}_in_{}",
        underscore_spaces(campaign),
        year,
        underscore_spaces(country)
    )
}

fn underscore_spaces(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Adapt a tier-1 (direct endpoint) payload. The endpoint answers for one
/// coordinate, so no searching is needed; fields may carry either the
/// canonical `total_` names or the bare bulk names.
pub fn from_direct(payload: &Value, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
    let record = payload
        .as_object()
        .ok_or_else(|| ResolveError::malformed("direct", "payload is not a JSON object"))?;

    let campaign = str_field(record, &["campaign", "campaign_name"])
        .unwrap_or_else(|| coordinate.campaign.clone());
    let country =
        str_field(record, &["country", "name"]).unwrap_or_else(|| coordinate.country.clone());
    let year = int_field(record, &["year"]).unwrap_or(coordinate.year);

    Ok(build_record(
        campaign,
        year,
        country,
        record,
        &[
            &["total_uploads", "uploads"],
            &["total_uploaders", "uploaders"],
            &["total_images_used", "images_used"],
            &["total_new_uploaders", "new_uploaders"],
        ],
    ))
}

/// Adapt a tier-2 (bulk endpoint) payload: locate the requested year in
/// `years`, then the requested country in `country_stats` or `countries`.
pub fn from_bulk(payload: &Value, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
    let year_entry = find_year(payload, coordinate, "bulk")?;
    let countries = year_entry
        .get("country_stats")
        .or_else(|| year_entry.get("countries"))
        .and_then(Value::as_array)
        .ok_or_else(|| ResolveError::malformed("bulk", "year entry has no country list"))?;

    let entry = find_country(countries, coordinate, &["name", "country"])?;
    let campaign = payload
        .get("campaign_name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| coordinate.campaign.clone());
    let country =
        str_field(entry, &["name", "country"]).unwrap_or_else(|| coordinate.country.clone());

    Ok(build_record(
        campaign,
        coordinate.year,
        country,
        entry,
        &[
            &["uploads"],
            &["uploaders"],
            &["images_used"],
            &["new_uploaders"],
        ],
    ))
}

/// Adapt a tier-3 (bundled snapshot) payload: `years[].country_rows[]`, with
/// uploads stored under `images`.
pub fn from_snapshot(payload: &Value, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
    let year_entry = find_year(payload, coordinate, "snapshot")?;
    let rows = year_entry
        .get("country_rows")
        .or_else(|| year_entry.get("country_stats"))
        .and_then(Value::as_array)
        .ok_or_else(|| ResolveError::malformed("snapshot", "year entry has no country rows"))?;

    let entry = find_country(rows, coordinate, &["country", "name"])?;
    let campaign = payload
        .get("campaign_name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| coordinate.campaign.clone());
    let country =
        str_field(entry, &["country", "name"]).unwrap_or_else(|| coordinate.country.clone());

    Ok(build_record(
        campaign,
        coordinate.year,
        country,
        entry,
        &[
            &["images", "uploads"],
            &["uploaders"],
            &["images_used"],
            &["new_uploaders"],
        ],
    ))
}

/// Assemble the canonical record. `count_aliases` lists, in canonical field
/// order (uploads, uploaders, images used, new uploaders), the upstream
/// names to try for each count.
fn build_record(
    campaign: String,
    year: i32,
    country: String,
    entry: &Map<String, Value>,
    count_aliases: &[&[&str]; 4],
) -> CountryStatRecord {
    let category_name = category_name(&campaign, year, &country);
    CountryStatRecord {
        total_uploads: count_field(entry, count_aliases[0]),
        total_uploaders: count_field(entry, count_aliases[1]),
        total_images_used: count_field(entry, count_aliases[2]),
        total_new_uploaders: count_field(entry, count_aliases[3]),
        daily_stats: daily_stats(entry),
        campaign,
        year,
        country,
        category_name,
    }
}

fn find_year<'a>(
    payload: &'a Value,
    coordinate: &Coordinate,
    tier: &'static str,
) -> ResolveResult<&'a Map<String, Value>> {
    let years = payload
        .get("years")
        .and_then(Value::as_array)
        .ok_or_else(|| ResolveError::malformed(tier, "payload has no years list"))?;

    years
        .iter()
        .filter_map(Value::as_object)
        .find(|entry| {
            entry.get("year").and_then(Value::as_i64) == Some(i64::from(coordinate.year))
        })
        .ok_or_else(|| {
            ResolveError::not_found(coordinate, format!("year {} absent", coordinate.year))
        })
}

fn find_country<'a>(
    entries: &'a [Value],
    coordinate: &Coordinate,
    name_aliases: &[&str],
) -> ResolveResult<&'a Map<String, Value>> {
    let wanted = country_key(&coordinate.country);
    entries
        .iter()
        .filter_map(Value::as_object)
        .find(|entry| {
            str_field(entry, name_aliases)
                .map(|name| country_key(&name) == wanted)
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            ResolveError::not_found(coordinate, format!("country {} absent", coordinate.country))
        })
}

/// Per-entry daily series; entries that don't parse are skipped.
fn daily_stats(entry: &Map<String, Value>) -> Vec<DailyStat> {
    entry
        .get("daily_stats")
        .and_then(Value::as_array)
        .map(|stats| {
            stats
                .iter()
                .filter_map(|stat| serde_json::from_value(stat.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(entry: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| entry.get(*alias).and_then(Value::as_str))
        .map(str::to_string)
}

fn int_field(entry: &Map<String, Value>, aliases: &[&str]) -> Option<i32> {
    aliases
        .iter()
        .find_map(|alias| entry.get(*alias).and_then(Value::as_i64))
        .and_then(|year| i32::try_from(year).ok())
}

/// Counts are non-negative; numeric strings are tolerated since some
/// exports stringify them. Anything else is 0.
fn count_field(entry: &Map<String, Value>, aliases: &[&str]) -> u64 {
    aliases
        .iter()
        .find_map(|alias| match entry.get(*alias) {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0)
}
