use crate::models::{Candidate, PriceTier, ScoringWeights, UserPreferences};

pub const REASON_WITHIN_DISTANCE: &str = "within travel distance";
pub const REASON_MATCHES_BUDGET: &str = "matches budget";
pub const REASON_HIGHLY_RATED: &str = "highly rated";
pub const REASON_POPULAR: &str = "popular";

/// Raw score of a candidate and the reasons behind it, in application order
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl ScoreBreakdown {
    /// Score capped to `[0, 100]` for display
    pub fn match_percentage(&self) -> f64 {
        self.score.clamp(0.0, 100.0)
    }
}

/// Score a candidate against the user's preferences
///
/// Factors are applied in a fixed order so `reasons` reads the same way the
/// score was built:
/// 1. distance within `max_travel_distance_km`  -> `+distance`
/// 2. price tier preferred                      -> `+price`
/// 3. rating at or above `rating_threshold`      -> `+rating`
/// 4. each shared favourite feature             -> `+feature`
/// 5. review count above `popularity_threshold`  -> `+popularity`
///
/// `distance_km` is supplied by the caller so that scoring and filtering agree.
pub fn score_candidate(
    candidate: &Candidate,
    distance_km: f64,
    preferences: &UserPreferences,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // 1. Distance eligibility
    if distance_km <= preferences.max_travel_distance_km {
        score += weights.distance;
        reasons.push(REASON_WITHIN_DISTANCE.to_string());
    }

    // 2. Price tier
    if matches_price_tier(candidate.price_tier, preferences) {
        score += weights.price;
        reasons.push(REASON_MATCHES_BUDGET.to_string());
    }

    // 3. Rating
    if candidate.rating >= weights.rating_threshold {
        score += weights.rating;
        reasons.push(REASON_HIGHLY_RATED.to_string());
    }

    // 4. Feature overlap
    let shared = shared_feature_count(candidate, preferences);
    if shared > 0 {
        score += weights.feature * shared as f64;
        reasons.push(format!("{} preferred features", shared));
    }

    // 5. Popularity
    if candidate.review_count > weights.popularity_threshold {
        score += weights.popularity;
        reasons.push(REASON_POPULAR.to_string());
    }

    ScoreBreakdown {
        score: score.max(0.0),
        reasons,
    }
}

/// Unknown or missing tiers never match
#[inline]
fn matches_price_tier(tier: Option<PriceTier>, preferences: &UserPreferences) -> bool {
    match tier {
        Some(PriceTier::Unknown) | None => false,
        Some(tier) => preferences.preferred_price_tiers.contains(&tier),
    }
}

#[inline]
fn shared_feature_count(candidate: &Candidate, preferences: &UserPreferences) -> usize {
    // iterate the smaller set
    if candidate.features.len() <= preferences.favorite_features.len() {
        candidate
            .features
            .iter()
            .filter(|f| preferences.favorite_features.contains(*f))
            .count()
    } else {
        preferences
            .favorite_features
            .iter()
            .filter(|f| candidate.features.contains(*f))
            .count()
    }
}
