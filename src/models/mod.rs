// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Candidate, Location, PriceTier, RankQuery, ScoredCandidate, ScoringWeights, UserPreferences};
pub use requests::{NearbyRequest, PreferencesPayload};
pub use responses::{ErrorResponse, HealthResponse, NearbyResponse, ShopResult};
