//! Multi-tier resolution of campaign country-year statistics.
//!
//! Given a (campaign, year, country) coordinate, the engine queries a live
//! per-coordinate endpoint, falls back to an in-memory search of the bulk
//! per-campaign endpoint, and finally to a bundled static snapshot. Each
//! tier's payload shape differs; whichever tier answers first is normalized
//! into one canonical [`CountryStatRecord`].

pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod sources;

pub use engine::ResolutionEngine;
pub use error::{ResolveError, ResolveResult};
pub use models::{Coordinate, CountryStatRecord, DailyStat};
pub use sources::{BulkApiSource, DirectApiSource, SnapshotSource, TierSource};
