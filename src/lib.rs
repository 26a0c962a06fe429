//! Cafe Radar - nearby coffee shop ranking
//!
//! This library provides the geospatial filtering and preference ranking
//! engine behind Cafe Radar. Candidates come from a [`CandidateSource`];
//! the engine pre-filters them with a bounding box, applies the exact
//! Haversine radius, scores them against the user's preferences and returns
//! an explained, ranked list.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::{calculate_bounding_box, format_distance, haversine_distance, is_valid_location},
    CandidateSource, RankResult, Ranker,
};
pub use error::RankError;
pub use models::{BoundingBox, Candidate, Location, PriceTier, RankQuery, ScoredCandidate, ScoringWeights, UserPreferences};
