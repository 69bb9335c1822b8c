//! Canonical data models for country-year statistics resolution.

use serde::{Deserialize, Serialize};

/// Upload count for one calendar day (`date` is ISO `YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStat {
    pub date: String,
    pub count: u64,
}

/// The one record shape every tier is normalized into.
///
/// Every field is always present: counts an upstream tier omits become 0 and
/// a missing daily series becomes empty, so consumers never null-check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryStatRecord {
    /// Campaign display name (falls back to the slug when upstream has none).
    pub campaign: String,
    pub year: i32,
    /// Country in canonical display form as the answering tier stored it.
    pub country: String,
    /// Derived Commons category name; synthesized, never read from upstream.
    pub category_name: String,
    pub total_uploads: u64,
    pub total_uploaders: u64,
    pub total_images_used: u64,
    pub total_new_uploaders: u64,
    pub daily_stats: Vec<DailyStat>,
}

/// The (campaign, year, country) triple identifying one statistics record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub campaign: String,
    pub year: i32,
    pub country: String,
}

impl Coordinate {
    pub fn new(campaign: impl Into<String>, year: i32, country: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            year,
            country: country.into(),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.campaign, self.year, self.country)
    }
}
