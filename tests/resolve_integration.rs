//! Integration tests for the tier resolution chain.
//!
//! The live tiers are replaced by mock sources with call counters; the
//! snapshot tier runs against the real bundled datasets so the full
//! normalization path is exercised end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use ibis::resolve::{
    normalize, Coordinate, CountryStatRecord, ResolutionEngine, ResolveError, ResolveResult,
    SnapshotSource, TierSource,
};

enum Outcome {
    Answer,
    NotFound,
    Transport,
}

struct MockTier {
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

impl MockTier {
    fn new(outcome: Outcome) -> (Box<dyn TierSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                outcome,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }
}

#[async_trait]
impl TierSource for MockTier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Answer => {
                let payload = json!({
                    "campaign": "Wiki Loves Earth",
                    "country": coordinate.country.clone(),
                    "total_uploads": 77,
                });
                normalize::from_direct(&payload, coordinate)
            }
            Outcome::NotFound => Err(ResolveError::not_found(coordinate, "absent in mock")),
            Outcome::Transport => Err(transport_error()),
        }
    }
}

fn transport_error() -> ResolveError {
    match reqwest::Client::new().get("http://\0invalid").build() {
        Err(err) => ResolveError::Transport(err),
        Ok(_) => unreachable!("NUL byte must not parse as a URL"),
    }
}

#[tokio::test]
async fn tier_one_answer_never_touches_later_tiers() {
    let (tier1, calls1) = MockTier::new(Outcome::Answer);
    let (tier2, calls2) = MockTier::new(Outcome::Answer);
    let engine = ResolutionEngine::new(vec![tier1, tier2, Box::new(SnapshotSource::new())]);

    let record = engine.resolve("earth", 2024, "France").await.unwrap();
    assert_eq!(record.total_uploads, 77);
    assert_eq!(calls1.load(Ordering::SeqCst), 1);
    assert_eq!(calls2.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn snapshot_answers_when_live_tiers_fail() {
    let (tier1, _) = MockTier::new(Outcome::Transport);
    let (tier2, _) = MockTier::new(Outcome::NotFound);
    let engine = ResolutionEngine::new(vec![tier1, tier2, Box::new(SnapshotSource::new())]);

    let record = engine.resolve("earth", 2023, "south africa").await.unwrap();
    assert_eq!(record.campaign, "Wiki Loves Earth");
    assert_eq!(record.year, 2023);
    assert_eq!(record.country, "South Africa");
    assert_eq!(record.total_uploads, 2310);
    assert_eq!(record.total_uploaders, 187);
    assert_eq!(record.total_images_used, 540);
    assert_eq!(record.total_new_uploaders, 92);
    assert!(record.daily_stats.is_empty());
    assert_eq!(
        record.category_name,
        "Images_from_Wiki_Loves_Earth_2023_in_South_Africa"
    );
}

#[tokio::test]
async fn country_matching_ignores_case_and_underscores() {
    let (tier1, _) = MockTier::new(Outcome::Transport);
    let (tier2, _) = MockTier::new(Outcome::Transport);
    let engine = ResolutionEngine::new(vec![tier1, tier2, Box::new(SnapshotSource::new())]);

    let record = engine.resolve("earth", 2024, "SOUTH_AFRICA").await.unwrap();
    assert_eq!(record.country, "South Africa");
    assert_eq!(record.total_uploads, 2875);
}

#[tokio::test]
async fn coordinate_absent_everywhere_reports_not_found() {
    let (tier1, _) = MockTier::new(Outcome::Transport);
    let (tier2, _) = MockTier::new(Outcome::NotFound);
    let engine = ResolutionEngine::new(vec![tier1, tier2, Box::new(SnapshotSource::new())]);

    // The earth snapshot exists but has no 2019 data.
    let err = engine.resolve("earth", 2019, "Germany").await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err}");
}

#[tokio::test]
async fn unknown_campaign_reports_not_found_over_transport() {
    let (tier1, _) = MockTier::new(Outcome::Transport);
    let (tier2, _) = MockTier::new(Outcome::Transport);
    let engine = ResolutionEngine::new(vec![tier1, tier2, Box::new(SnapshotSource::new())]);

    let err = engine.resolve("mars", 2024, "France").await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err}");
}

#[tokio::test]
async fn concurrent_resolutions_for_different_coordinates_are_independent() {
    let (tier1, _) = MockTier::new(Outcome::Transport);
    let (tier2, _) = MockTier::new(Outcome::NotFound);
    let engine = Arc::new(ResolutionEngine::new(vec![
        tier1,
        tier2,
        Box::new(SnapshotSource::new()),
    ]));

    let earth = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.resolve("earth", 2023, "Ukraine").await })
    };
    let monuments = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.resolve("monuments", 2024, "India").await })
    };

    let earth = earth.await.unwrap().unwrap();
    let monuments = monuments.await.unwrap().unwrap();
    assert_eq!(earth.total_uploads, 9875);
    assert_eq!(monuments.total_uploads, 19555);
}
