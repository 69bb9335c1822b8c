//! Ordered-tier resolution of country-year statistics records.

use tracing::{debug, warn};

use super::error::{ResolveError, ResolveResult};
use super::models::{Coordinate, CountryStatRecord};
use super::sources::TierSource;

/// Resolves one (campaign, year, country) coordinate against an ordered list
/// of tier sources, returning the first successfully normalized record.
///
/// Tiers are tried strictly in order and never raced: a cheap tier-1 hit
/// must short-circuit the more expensive bulk and snapshot lookups. A tier's
/// failure is never retried; escalation to the next tier is the retry.
pub struct ResolutionEngine {
    tiers: Vec<Box<dyn TierSource>>,
}

impl ResolutionEngine {
    pub fn new(tiers: Vec<Box<dyn TierSource>>) -> Self {
        Self { tiers }
    }

    /// Resolve one coordinate. Fails only when every tier has been
    /// exhausted, surfacing the most substantive tier failure: an explicit
    /// not-found outranks a malformed payload, which outranks a transport
    /// failure.
    pub async fn resolve(
        &self,
        campaign: &str,
        year: i32,
        country: &str,
    ) -> ResolveResult<CountryStatRecord> {
        let coordinate = Coordinate::new(campaign, year, country);
        let mut best: Option<ResolveError> = None;

        for tier in &self.tiers {
            match tier.fetch(&coordinate).await {
                Ok(record) => {
                    debug!(tier = tier.name(), %coordinate, "coordinate resolved");
                    return Ok(record);
                }
                Err(err) => {
                    debug!(tier = tier.name(), %coordinate, error = %err, "tier failed, falling through");
                    // Later tiers win ties so the error reflects the most
                    // recent substantive answer.
                    if best.as_ref().map_or(true, |b| err.substance() >= b.substance()) {
                        best = Some(err);
                    }
                }
            }
        }

        let err = best
            .unwrap_or_else(|| ResolveError::not_found(&coordinate, "no data sources configured"));
        warn!(%coordinate, error = %err, "all tiers exhausted");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::resolve::normalize;

    enum MockOutcome {
        Record,
        NotFound,
        Transport,
        Malformed,
    }

    struct MockTier {
        name: &'static str,
        outcome: MockOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl MockTier {
        fn new(name: &'static str, outcome: MockOutcome) -> (Box<dyn TierSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    name,
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
            self.name
        }

        async fn fetch(&self, coordinate: &Coordinate) -> ResolveResult<CountryStatRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                MockOutcome::Record => {
                    let payload = json!({"country": coordinate.country.clone(), "total_uploads": 10});
                    normalize::from_direct(&payload, coordinate)
                }
                MockOutcome::NotFound => Err(ResolveError::not_found(coordinate, "absent")),
                MockOutcome::Transport => Err(transport_error()),
                MockOutcome::Malformed => Err(ResolveError::malformed(self.name, "bad shape")),
            }
        }
    }

    /// reqwest errors cannot be constructed directly; a request-builder
    /// error stands in for a network failure.
    fn transport_error() -> ResolveError {
        match reqwest::Client::new().get("http://\0invalid").build() {
            Err(err) => ResolveError::Transport(err),
            Ok(_) => unreachable!("NUL byte must not parse as a URL"),
        }
    }

    #[tokio::test]
    async fn first_tier_success_short_circuits() {
        let (tier1, calls1) = MockTier::new("direct", MockOutcome::Record);
        let (tier2, calls2) = MockTier::new("bulk", MockOutcome::Record);
        let (tier3, calls3) = MockTier::new("snapshot", MockOutcome::Record);
        let engine = ResolutionEngine::new(vec![tier1, tier2, tier3]);

        let record = engine.resolve("earth", 2024, "France").await.unwrap();
        assert_eq!(record.total_uploads, 10);
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 0);
        assert_eq!(calls3.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_escalate_through_every_tier() {
        let (tier1, calls1) = MockTier::new("direct", MockOutcome::Transport);
        let (tier2, calls2) = MockTier::new("bulk", MockOutcome::NotFound);
        let (tier3, calls3) = MockTier::new("snapshot", MockOutcome::Record);
        let engine = ResolutionEngine::new(vec![tier1, tier2, tier3]);

        let record = engine.resolve("earth", 2024, "France").await.unwrap();
        assert_eq!(record.country, "France");
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 1);
        assert_eq!(calls3.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_prefers_not_found_over_transport() {
        let (tier1, _) = MockTier::new("direct", MockOutcome::Transport);
        let (tier2, _) = MockTier::new("bulk", MockOutcome::NotFound);
        let (tier3, _) = MockTier::new("snapshot", MockOutcome::Transport);
        let engine = ResolutionEngine::new(vec![tier1, tier2, tier3]);

        let err = engine.resolve("earth", 2024, "Atlantis").await.unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err}");
    }

    #[tokio::test]
    async fn exhaustion_prefers_not_found_over_malformed() {
        let (tier1, _) = MockTier::new("direct", MockOutcome::NotFound);
        let (tier2, _) = MockTier::new("bulk", MockOutcome::Malformed);
        let (tier3, _) = MockTier::new("snapshot", MockOutcome::Malformed);
        let engine = ResolutionEngine::new(vec![tier1, tier2, tier3]);

        let err = engine.resolve("earth", 2024, "Atlantis").await.unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got {err}");
    }

    #[tokio::test]
    async fn all_transport_failures_surface_transport() {
        let (tier1, _) = MockTier::new("direct", MockOutcome::Transport);
        let (tier2, _) = MockTier::new("bulk", MockOutcome::Transport);
        let engine = ResolutionEngine::new(vec![tier1, tier2]);

        let err = engine.resolve("earth", 2024, "France").await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport(_)));
    }
}
