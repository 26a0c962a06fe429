use serde::{Deserialize, Serialize};

use crate::core::distance::format_distance;
use crate::models::domain::ScoredCandidate;

/// A ranked shop as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopResult {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub name: Option<String>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    /// Human readable distance, e.g. `"500m"` or `"1.5km"`
    pub distance: String,
    pub score: f64,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: f64,
    pub reasons: Vec<String>,
}

impl From<ScoredCandidate> for ShopResult {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            distance: format_distance(scored.distance_km),
            candidate_id: scored.candidate_id,
            name: scored.name,
            distance_km: scored.distance_km,
            score: scored.score,
            match_percentage: scored.match_percentage,
            reasons: scored.reasons,
        }
    }
}

/// Response for the nearby endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub results: Vec<ShopResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "withinRadius")]
    pub within_radius: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
