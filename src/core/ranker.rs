use rayon::prelude::*;
use std::cmp::Ordering;

use crate::core::{
    distance::calculate_bounding_box,
    filters::{filter_by_distance_with, sort_by_distance, DistancedCandidate},
    scoring::score_candidate,
    source::CandidateSource,
};
use crate::error::{RankError, Result};
use crate::models::{Candidate, RankQuery, ScoredCandidate, ScoringWeights, UserPreferences};

/// Candidate count at which filtering and scoring switch to rayon
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

/// Result of the ranking process
#[derive(Debug, Clone)]
pub struct RankResult {
    pub matches: Vec<ScoredCandidate>,
    /// Candidates returned by the source (bounding-box superset)
    pub total_candidates: usize,
    /// Candidates that passed the exact radius test
    pub within_radius: usize,
}

/// Ranking orchestrator - implements the staged pipeline
///
/// # Pipeline Stages
/// 1. Input validation
/// 2. Bounding box retrieval from the candidate source
/// 3. Exact radius filter and stable distance sort
/// 4. Preference scoring
/// 5. Final ordering (score desc, distance asc, id asc) and truncation
///
/// The ranker is stateless apart from its read-only weights and can be
/// shared freely across threads.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
    parallel_threshold: usize,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank candidates around `query.center`, fetching them from `source`
    ///
    /// All validation happens before the source is called. A failed fetch is
    /// reported as [`RankError::RetrievalFailed`], never as an empty result.
    pub async fn rank<S>(&self, query: &RankQuery, source: &S) -> Result<RankResult>
    where
        S: CandidateSource,
    {
        validate_query(query)?;

        let bbox = calculate_bounding_box(&query.center, query.radius_km)?;
        let candidates = source
            .fetch(&bbox)
            .await
            .map_err(|e| RankError::RetrievalFailed(Box::new(e)))?;

        tracing::debug!(
            "Fetched {} candidates in box [{:.4}, {:.4}] x [{:.4}, {:.4}]",
            candidates.len(),
            bbox.min_lat,
            bbox.max_lat,
            bbox.min_lng,
            bbox.max_lng
        );

        self.rank_validated(query, candidates)
    }

    /// Rank an already retrieved candidate list
    pub fn rank_candidates(&self, query: &RankQuery, candidates: Vec<Candidate>) -> Result<RankResult> {
        validate_query(query)?;
        self.rank_validated(query, candidates)
    }

    fn rank_validated(&self, query: &RankQuery, candidates: Vec<Candidate>) -> Result<RankResult> {
        let total_candidates = candidates.len();

        // Stage 3: exact radius + distance order
        let nearby = sort_by_distance(filter_by_distance_with(
            candidates,
            &query.center,
            query.radius_km,
            self.parallel_threshold,
        )?);
        let within_radius = nearby.len();

        // Stage 4: scoring, reusing the stage 3 distance
        let mut scored: Vec<ScoredCandidate> = if nearby.len() >= self.parallel_threshold {
            nearby
                .into_par_iter()
                .map(|c| self.score(c, &query.preferences))
                .collect()
        } else {
            nearby
                .into_iter()
                .map(|c| self.score(c, &query.preferences))
                .collect()
        };

        // Stage 5: final order and truncation
        scored.sort_by(compare_ranked);
        scored.truncate(query.limit);

        tracing::debug!(
            "Ranked {} of {} in-radius candidates ({} fetched)",
            scored.len(),
            within_radius,
            total_candidates
        );

        Ok(RankResult {
            matches: scored,
            total_candidates,
            within_radius,
        })
    }

    fn score(&self, nearby: DistancedCandidate, preferences: &UserPreferences) -> ScoredCandidate {
        let DistancedCandidate {
            candidate,
            distance_km,
        } = nearby;
        let breakdown = score_candidate(&candidate, distance_km, preferences, &self.weights);

        ScoredCandidate {
            candidate_id: candidate.id,
            name: candidate.name,
            distance_km,
            match_percentage: breakdown.match_percentage(),
            score: breakdown.score,
            reasons: breakdown.reasons,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Fail fast on bad input, before any retrieval or computation
pub fn validate_query(query: &RankQuery) -> Result<()> {
    query.center.validate()?;

    if !query.radius_km.is_finite() || query.radius_km <= 0.0 {
        return Err(RankError::InvalidRadius(query.radius_km));
    }

    if query.limit == 0 {
        return Err(RankError::InvalidLimit(query.limit));
    }

    let travel = query.preferences.max_travel_distance_km;
    if !travel.is_finite() || travel <= 0.0 {
        return Err(RankError::InvalidTravelDistance(travel));
    }

    Ok(())
}

/// Score descending, then distance ascending, then id ascending
fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, PriceTier};
    use std::collections::HashSet;

    fn create_candidate(id: &str, lat: f64, lng: f64, tier: PriceTier, rating: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: Some(format!("Shop {}", id)),
            location: Location::new(lat, lng),
            price_tier: Some(tier),
            rating,
            review_count: 20,
            features: ["wifi".to_string()].into_iter().collect(),
        }
    }

    fn create_query(limit: usize) -> RankQuery {
        RankQuery {
            center: Location::new(52.3676, 4.9041), // Amsterdam
            radius_km: 5.0,
            preferences: UserPreferences {
                preferred_price_tiers: [PriceTier::Budget].into_iter().collect(),
                max_travel_distance_km: 2.0,
                favorite_features: ["wifi".to_string()].into_iter().collect(),
            },
            limit,
        }
    }

    #[test]
    fn test_rank_basic() {
        let ranker = Ranker::with_default_weights();
        let query = create_query(10);

        let candidates = vec![
            create_candidate("1", 52.37, 4.91, PriceTier::Budget, 4.5),    // Close, matches all
            create_candidate("2", 52.37, 4.91, PriceTier::Luxury, 3.0),    // Close, wrong tier
            create_candidate("3", 51.9225, 4.4792, PriceTier::Budget, 5.0), // Rotterdam
        ];

        let result = ranker.rank_candidates(&query, candidates).unwrap();

        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.within_radius, 2);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].candidate_id, "1");
        assert_eq!(result.matches[0].reasons.len(), 5);
        assert_eq!(result.matches[0].match_percentage, 100.0);
    }

    #[test]
    fn test_equal_scores_break_ties_by_distance_then_id() {
        let ranker = Ranker::with_default_weights();
        let query = create_query(10);

        let candidates = vec![
            create_candidate("b", 52.37, 4.91, PriceTier::Budget, 4.5),
            create_candidate("far", 52.38, 4.92, PriceTier::Budget, 4.5),
            create_candidate("a", 52.37, 4.91, PriceTier::Budget, 4.5),
        ];

        let result = ranker.rank_candidates(&query, candidates).unwrap();
        let ids: Vec<_> = result.matches.iter().map(|m| m.candidate_id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "far"]);
    }

    #[test]
    fn test_respects_limit() {
        let ranker = Ranker::with_default_weights();
        let query = create_query(5);

        let candidates: Vec<Candidate> = (0..20)
            .map(|i| create_candidate(&i.to_string(), 52.3676 + i as f64 * 0.001, 4.9041, PriceTier::Moderate, 4.0))
            .collect();

        let result = ranker.rank_candidates(&query, candidates).unwrap();
        assert_eq!(result.matches.len(), 5);
    }

    #[test]
    fn test_rejects_invalid_query() {
        let ranker = Ranker::with_default_weights();

        let mut query = create_query(0);
        assert!(matches!(ranker.rank_candidates(&query, vec![]), Err(RankError::InvalidLimit(0))));

        query.limit = 3;
        query.radius_km = 0.0;
        assert!(matches!(ranker.rank_candidates(&query, vec![]), Err(RankError::InvalidRadius(_))));

        query.radius_km = 5.0;
        query.center = Location::new(f64::NAN, 4.9);
        assert!(matches!(
            ranker.rank_candidates(&query, vec![]),
            Err(RankError::InvalidLocation { .. })
        ));

        query.center = Location::new(52.37, 4.9);
        query.preferences.max_travel_distance_km = 0.0;
        assert!(matches!(
            ranker.rank_candidates(&query, vec![]),
            Err(RankError::InvalidTravelDistance(_))
        ));
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let query = create_query(50);
        let candidates: Vec<Candidate> = (0..300)
            .map(|i| {
                let tier = if i % 2 == 0 { PriceTier::Budget } else { PriceTier::Expensive };
                create_candidate(&format!("{:03}", i), 52.3676 + (i % 40) as f64 * 0.001, 4.9041, tier, (i % 6) as f64)
            })
            .collect();

        let sequential = Ranker::with_default_weights()
            .rank_candidates(&query, candidates.clone())
            .unwrap();
        let parallel = Ranker::with_default_weights()
            .with_parallel_threshold(1)
            .rank_candidates(&query, candidates)
            .unwrap();

        assert_eq!(sequential.matches, parallel.matches);
    }

    #[test]
    fn test_empty_features_and_tiers() {
        let ranker = Ranker::with_default_weights();
        let mut query = create_query(10);
        query.preferences.preferred_price_tiers = HashSet::new();
        query.preferences.favorite_features = HashSet::new();

        let candidates = vec![create_candidate("1", 52.37, 4.91, PriceTier::Budget, 1.0)];
        let result = ranker.rank_candidates(&query, candidates).unwrap();

        assert_eq!(result.matches[0].score, 60.0);
        assert_eq!(result.matches[0].reasons, vec!["within travel distance", "popular"]);
    }
}
